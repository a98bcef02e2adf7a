//! Pre-built Test Fixtures
//!
//! Ready-to-use dispatch entities with consistent, predictable values.

use rust_decimal_macros::dec;

use core_kernel::CompanyId;
use domain_dispatch::{Claim, ClaimType, PayerCategory, SkillTag, Worker};

use crate::builders::{ClaimBuilder, WorkerBuilder};

/// Fixture for claim test data
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// The worked reference claim: 10 days aging, payer risk 8, not denied
    /// (base priority 6.4 under default weights)
    pub fn reference(company_id: CompanyId) -> Claim {
        ClaimBuilder::new()
            .company(company_id)
            .aging_days(10)
            .payer_risk(8)
            .billed(dec!(1500))
            .build()
    }

    /// A routine low-priority claim
    pub fn routine(company_id: CompanyId) -> Claim {
        ClaimBuilder::new()
            .company(company_id)
            .aging_days(1)
            .payer_risk(3)
            .sla_hours(200)
            .build()
    }

    /// A denied claim needing denial-management skills
    pub fn denied(company_id: CompanyId) -> Claim {
        ClaimBuilder::new()
            .company(company_id)
            .aging_days(20)
            .denied()
            .build()
    }

    /// A claim over the high-value boost threshold
    pub fn high_value(company_id: CompanyId) -> Claim {
        ClaimBuilder::new()
            .company(company_id)
            .billed(dec!(50000))
            .build()
    }

    /// A claim whose SLA deadline is nearly breached
    pub fn near_sla_breach(company_id: CompanyId) -> Claim {
        ClaimBuilder::new()
            .company(company_id)
            .aging_days(30)
            .sla_hours(1)
            .build()
    }
}

/// Fixture for worker test data
pub struct WorkerFixtures;

impl WorkerFixtures {
    /// A professional-billing worker with plenty of headroom
    pub fn professional(company_id: CompanyId) -> Worker {
        WorkerBuilder::new()
            .company(company_id)
            .skill(SkillTag::ProfessionalBilling)
            .capacity(10)
            .build()
    }

    /// A denial specialist
    pub fn denial_specialist(company_id: CompanyId) -> Worker {
        WorkerBuilder::new()
            .company(company_id)
            .expert_skill(SkillTag::DenialManagement)
            .skill(SkillTag::ProfessionalBilling)
            .capacity(10)
            .build()
    }

    /// A worker with a single open slot left
    pub fn nearly_full(company_id: CompanyId) -> Worker {
        WorkerBuilder::new().company(company_id).capacity(1).build()
    }
}

/// Fixture pairing a claim type with the skill that satisfies it
pub struct SkillFixtures;

impl SkillFixtures {
    pub fn matching_pairs() -> Vec<(ClaimType, SkillTag)> {
        vec![
            (ClaimType::Professional, SkillTag::ProfessionalBilling),
            (ClaimType::Institutional, SkillTag::InstitutionalBilling),
            (ClaimType::Dental, SkillTag::DentalBilling),
            (ClaimType::Pharmacy, SkillTag::PharmacyBilling),
            (ClaimType::DurableMedicalEquipment, SkillTag::DmeBilling),
        ]
    }
}

/// Common payer categories with representative risk scores
pub fn payer_with_risk() -> Vec<(PayerCategory, u8)> {
    vec![
        (PayerCategory::Medicare, 3),
        (PayerCategory::Medicaid, 6),
        (PayerCategory::Commercial, 5),
        (PayerCategory::WorkersComp, 8),
        (PayerCategory::SelfPay, 9),
    ]
}
