//! Claim work-item aggregate

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, CompanyId, WorkerId};
use crate::error::DispatchError;
use crate::worker::SkillTag;

/// Claim lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Awaiting assignment (in the floating pool)
    New,
    /// Assigned to a worker, not yet started
    Assigned,
    /// Being worked
    InProgress,
    /// Worked to completion
    Completed,
    /// Cancelled externally
    Cancelled,
}

impl ClaimStatus {
    /// Terminal statuses never re-enter the floating pool
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Completed | ClaimStatus::Cancelled)
    }

    /// Open statuses count toward a worker's load
    pub fn is_open(&self) -> bool {
        matches!(self, ClaimStatus::Assigned | ClaimStatus::InProgress)
    }
}

/// Claim type, the source of the required-skill derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Professional,
    Institutional,
    Dental,
    Pharmacy,
    DurableMedicalEquipment,
}

impl ClaimType {
    /// Typed lookup table from claim type to the billing skills it needs.
    ///
    /// Denial handling is layered on top by [`Claim::required_skills`].
    pub fn base_skills(&self) -> &'static [SkillTag] {
        match self {
            ClaimType::Professional => &[SkillTag::ProfessionalBilling],
            ClaimType::Institutional => &[SkillTag::InstitutionalBilling],
            ClaimType::Dental => &[SkillTag::DentalBilling],
            ClaimType::Pharmacy => &[SkillTag::PharmacyBilling],
            ClaimType::DurableMedicalEquipment => &[SkillTag::DmeBilling],
        }
    }
}

/// Payer category for risk weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayerCategory {
    Medicare,
    Medicaid,
    Commercial,
    WorkersComp,
    SelfPay,
}

/// Denial metadata attached once a payer denies the claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialInfo {
    /// Carrier adjustment reason code (e.g. CO-97)
    pub code: String,
    pub reason: String,
    pub denied_at: DateTime<Utc>,
}

/// One hop in the claim's reassignment history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignmentRecord {
    pub from_worker: WorkerId,
    pub to_worker: WorkerId,
    pub actor: String,
    pub reason: String,
    pub reassigned_at: DateTime<Utc>,
}

/// A billable claim awaiting or under processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Owning company scope
    pub company_id: CompanyId,
    /// Claim type
    pub claim_type: ClaimType,
    /// Billed amount
    pub billed_amount: Decimal,
    /// Date of service (aging anchor)
    pub service_date: NaiveDate,
    /// Payer category
    pub payer: PayerCategory,
    /// Payer risk score 1-10 when known
    pub payer_risk_score: Option<u8>,
    /// Denial metadata when denied
    pub denial: Option<DenialInfo>,
    /// Lifecycle status
    pub status: ClaimStatus,
    /// Assigned worker; None means the claim floats in the pool
    pub assigned_to: Option<WorkerId>,
    /// SLA deadline
    pub sla_due: DateTime<Utc>,
    /// Reassignment history, oldest first
    pub reassignments: Vec<ReassignmentRecord>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a new unassigned claim
    pub fn new(
        company_id: CompanyId,
        claim_type: ClaimType,
        payer: PayerCategory,
        billed_amount: Decimal,
        service_date: NaiveDate,
        sla_due: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClaimId::new_v7(),
            company_id,
            claim_type,
            billed_amount,
            service_date,
            payer,
            payer_risk_score: None,
            denial: None,
            status: ClaimStatus::New,
            assigned_to: None,
            sla_due,
            reassignments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Days since the date of service, floored at zero for future-dated claims
    pub fn aging_days(&self, today: NaiveDate) -> i64 {
        (today - self.service_date).num_days().max(0)
    }

    /// Payer risk score with the neutral default for unknown payers
    pub fn effective_payer_risk(&self) -> u8 {
        self.payer_risk_score.unwrap_or(5).clamp(1, 10)
    }

    pub fn is_denied(&self) -> bool {
        self.denial.is_some()
    }

    /// True when the claim belongs in the floating pool
    pub fn is_poolable(&self) -> bool {
        self.assigned_to.is_none() && !self.status.is_terminal()
    }

    /// Skills a worker needs to handle this claim.
    ///
    /// Derived from the claim type table, with denial management appended
    /// for denied claims.
    pub fn required_skills(&self) -> Vec<SkillTag> {
        let mut skills: Vec<SkillTag> = self.claim_type.base_skills().to_vec();
        if self.is_denied() {
            skills.push(SkillTag::DenialManagement);
        }
        skills
    }

    /// Marks the claim denied
    pub fn record_denial(&mut self, code: impl Into<String>, reason: impl Into<String>) {
        self.denial = Some(DenialInfo {
            code: code.into(),
            reason: reason.into(),
            denied_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    /// Updates the status, validating the transition
    pub fn update_status(&mut self, status: ClaimStatus) -> Result<(), DispatchError> {
        if !self.can_transition_to(status) {
            return Err(DispatchError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (New, Assigned)
                | (Assigned, InProgress)
                | (Assigned, New)
                | (InProgress, New)
                | (Assigned, Completed)
                | (InProgress, Completed)
                | (New, Cancelled)
                | (Assigned, Cancelled)
                | (InProgress, Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn sample_claim() -> Claim {
        Claim::new(
            CompanyId::new(),
            ClaimType::Professional,
            PayerCategory::Commercial,
            dec!(1500),
            Utc::now().date_naive() - Duration::days(10),
            Utc::now() + Duration::hours(48),
        )
    }

    #[test]
    fn test_aging_clamps_future_service_dates() {
        let mut claim = sample_claim();
        let today = Utc::now().date_naive();
        claim.service_date = today + Duration::days(3);
        assert_eq!(claim.aging_days(today), 0);
    }

    #[test]
    fn test_payer_risk_defaults_to_neutral() {
        let claim = sample_claim();
        assert_eq!(claim.effective_payer_risk(), 5);
    }

    #[test]
    fn test_denied_claim_requires_denial_management() {
        let mut claim = sample_claim();
        assert_eq!(claim.required_skills(), vec![SkillTag::ProfessionalBilling]);

        claim.record_denial("CO-97", "bundled service");
        assert!(claim.required_skills().contains(&SkillTag::DenialManagement));
    }

    #[test]
    fn test_status_transitions() {
        let mut claim = sample_claim();
        assert!(claim.update_status(ClaimStatus::Assigned).is_ok());
        assert!(claim.update_status(ClaimStatus::InProgress).is_ok());
        assert!(claim.update_status(ClaimStatus::Completed).is_ok());

        // Terminal statuses are absorbing
        assert!(claim.update_status(ClaimStatus::New).is_err());
    }

    #[test]
    fn test_poolable_iff_unassigned_and_non_terminal() {
        let mut claim = sample_claim();
        assert!(claim.is_poolable());

        claim.assigned_to = Some(WorkerId::new());
        assert!(!claim.is_poolable());

        claim.assigned_to = None;
        claim.status = ClaimStatus::Cancelled;
        assert!(!claim.is_poolable());
    }
}
