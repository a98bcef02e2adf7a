//! Property-Test Generators
//!
//! Proptest strategies for dispatch domain values.

use proptest::prelude::*;

use domain_dispatch::{ClaimType, PayerCategory, SkillTag, StrategyKind};

pub fn claim_type_strategy() -> impl Strategy<Value = ClaimType> {
    prop_oneof![
        Just(ClaimType::Professional),
        Just(ClaimType::Institutional),
        Just(ClaimType::Dental),
        Just(ClaimType::Pharmacy),
        Just(ClaimType::DurableMedicalEquipment),
    ]
}

pub fn payer_strategy() -> impl Strategy<Value = PayerCategory> {
    prop_oneof![
        Just(PayerCategory::Medicare),
        Just(PayerCategory::Medicaid),
        Just(PayerCategory::Commercial),
        Just(PayerCategory::WorkersComp),
        Just(PayerCategory::SelfPay),
    ]
}

pub fn skill_strategy() -> impl Strategy<Value = SkillTag> {
    prop_oneof![
        Just(SkillTag::ProfessionalBilling),
        Just(SkillTag::InstitutionalBilling),
        Just(SkillTag::DentalBilling),
        Just(SkillTag::PharmacyBilling),
        Just(SkillTag::DmeBilling),
        Just(SkillTag::DenialManagement),
        Just(SkillTag::HighValueReview),
    ]
}

pub fn strategy_kind_strategy() -> impl Strategy<Value = StrategyKind> {
    prop_oneof![
        Just(StrategyKind::RoundRobin),
        Just(StrategyKind::SkillMatch),
        Just(StrategyKind::LoadBalanced),
        Just(StrategyKind::PerformanceRank),
        Just(StrategyKind::PriorityFirst),
        Just(StrategyKind::WeightedHybrid),
    ]
}

/// Aging in days, covering fresh claims through badly stale ones
pub fn aging_days_strategy() -> impl Strategy<Value = i64> {
    0i64..365
}

/// Payer risk on its valid 1..=10 scale
pub fn payer_risk_strategy() -> impl Strategy<Value = u8> {
    1u8..=10
}

/// A load percentage anywhere on the usable scale
pub fn load_pct_strategy() -> impl Strategy<Value = f64> {
    0.0f64..=100.0
}
