//! Test Data Builders
//!
//! Builder patterns for constructing dispatch test data with sensible
//! defaults, so tests specify only the fields they care about.

use chrono::{DateTime, Duration, Utc};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CompanyId, WorkerId};
use domain_dispatch::{
    Claim, ClaimStatus, ClaimType, PayerCategory, Proficiency, SkillTag, Worker, WorkerSkill,
};

/// Builder for test claims
pub struct ClaimBuilder {
    company_id: CompanyId,
    claim_type: ClaimType,
    payer: PayerCategory,
    payer_risk_score: Option<u8>,
    billed_amount: Decimal,
    aging_days: i64,
    sla_hours: i64,
    denied: bool,
    status: ClaimStatus,
    assigned_to: Option<WorkerId>,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    pub fn new() -> Self {
        Self {
            company_id: CompanyId::new(),
            claim_type: ClaimType::Professional,
            payer: PayerCategory::Commercial,
            payer_risk_score: None,
            billed_amount: dec!(1500),
            aging_days: 10,
            sla_hours: 72,
            denied: false,
            status: ClaimStatus::New,
            assigned_to: None,
        }
    }

    pub fn company(mut self, company_id: CompanyId) -> Self {
        self.company_id = company_id;
        self
    }

    pub fn claim_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = claim_type;
        self
    }

    pub fn payer(mut self, payer: PayerCategory) -> Self {
        self.payer = payer;
        self
    }

    pub fn payer_risk(mut self, score: u8) -> Self {
        self.payer_risk_score = Some(score);
        self
    }

    pub fn billed(mut self, amount: Decimal) -> Self {
        self.billed_amount = amount;
        self
    }

    pub fn aging_days(mut self, days: i64) -> Self {
        self.aging_days = days;
        self
    }

    pub fn sla_hours(mut self, hours: i64) -> Self {
        self.sla_hours = hours;
        self
    }

    pub fn denied(mut self) -> Self {
        self.denied = true;
        self
    }

    pub fn assigned(mut self, worker_id: WorkerId) -> Self {
        self.assigned_to = Some(worker_id);
        self.status = ClaimStatus::Assigned;
        self
    }

    pub fn build(self) -> Claim {
        let now = Utc::now();
        let mut claim = Claim::new(
            self.company_id,
            self.claim_type,
            self.payer,
            self.billed_amount,
            now.date_naive() - Duration::days(self.aging_days),
            now + Duration::hours(self.sla_hours),
        );
        claim.payer_risk_score = self.payer_risk_score;
        if self.denied {
            let reason: String = Sentence(3..6).fake();
            claim.record_denial("CO-97", reason);
        }
        claim.status = self.status;
        claim.assigned_to = self.assigned_to;
        claim
    }
}

/// Builder for test workers
pub struct WorkerBuilder {
    company_id: CompanyId,
    active: bool,
    skills: Vec<WorkerSkill>,
    department: Option<String>,
    role: Option<String>,
    max_daily_capacity: Option<u32>,
    last_assigned_at: Option<DateTime<Utc>>,
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self {
            company_id: CompanyId::new(),
            active: true,
            skills: Vec::new(),
            department: None,
            role: None,
            max_daily_capacity: Some(10),
            last_assigned_at: None,
        }
    }

    pub fn company(mut self, company_id: CompanyId) -> Self {
        self.company_id = company_id;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn skill(mut self, tag: SkillTag) -> Self {
        self.skills.push(WorkerSkill {
            tag,
            proficiency: Proficiency::Competent,
        });
        self
    }

    pub fn expert_skill(mut self, tag: SkillTag) -> Self {
        self.skills.push(WorkerSkill {
            tag,
            proficiency: Proficiency::Expert,
        });
        self
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn capacity(mut self, max: u32) -> Self {
        self.max_daily_capacity = Some(max);
        self
    }

    pub fn no_declared_capacity(mut self) -> Self {
        self.max_daily_capacity = None;
        self
    }

    pub fn last_assigned(mut self, at: DateTime<Utc>) -> Self {
        self.last_assigned_at = Some(at);
        self
    }

    pub fn build(self) -> Worker {
        let mut worker = Worker::new(self.company_id);
        worker.active = self.active;
        worker.skills = self.skills;
        worker.department = self.department;
        worker.role = self.role;
        worker.max_daily_capacity = self.max_daily_capacity;
        worker.last_assigned_at = self.last_assigned_at;
        worker
    }
}
