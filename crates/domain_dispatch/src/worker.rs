//! Worker snapshot consumed at selection time
//!
//! Workers are owned by an external HR subsystem; the engine reads them as
//! fully-resolved snapshots and never persists derived load back onto them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, WorkerId};

/// Billing skill tags, closed set validated at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTag {
    ProfessionalBilling,
    InstitutionalBilling,
    DentalBilling,
    PharmacyBilling,
    DmeBilling,
    DenialManagement,
    HighValueReview,
}

/// Proficiency level for a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Novice,
    Competent,
    Expert,
}

/// A skill held by a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSkill {
    pub tag: SkillTag,
    pub proficiency: Proficiency,
}

/// A claims-processing worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier
    pub id: WorkerId,
    /// Owning company scope
    pub company_id: CompanyId,
    /// Inactive workers never receive assignments
    pub active: bool,
    /// Declared skills
    pub skills: Vec<WorkerSkill>,
    /// Department tag for candidate filtering
    pub department: Option<String>,
    /// Role tag for candidate filtering
    pub role: Option<String>,
    /// Maximum open claims per day; None falls back to the configured
    /// default, an explicit zero makes the worker permanently unavailable
    pub max_daily_capacity: Option<u32>,
    /// Most recent assignment, drives round-robin fairness
    pub last_assigned_at: Option<DateTime<Utc>>,
}

impl Worker {
    /// Creates an active worker with no skills declared
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            id: WorkerId::new_v7(),
            company_id,
            active: true,
            skills: Vec::new(),
            department: None,
            role: None,
            max_daily_capacity: None,
            last_assigned_at: None,
        }
    }

    pub fn has_skill(&self, tag: SkillTag) -> bool {
        self.skills.iter().any(|s| s.tag == tag)
    }

    /// Skill tags without proficiency, for match counting
    pub fn skill_tags(&self) -> Vec<SkillTag> {
        self.skills.iter().map(|s| s.tag).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_skill() {
        let mut worker = Worker::new(CompanyId::new());
        worker.skills.push(WorkerSkill {
            tag: SkillTag::DenialManagement,
            proficiency: Proficiency::Expert,
        });

        assert!(worker.has_skill(SkillTag::DenialManagement));
        assert!(!worker.has_skill(SkillTag::DentalBilling));
    }
}
