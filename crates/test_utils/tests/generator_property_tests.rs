//! Generator-driven property tests
//!
//! Drives the scoring, ranking, and selection invariants with the shared
//! proptest strategies and fixtures rather than hand-picked values.

use chrono::Utc;
use proptest::prelude::*;

use core_kernel::{ClaimId, CompanyId, WorkerId};
use domain_dispatch::strategy::select;
use domain_dispatch::{
    priority_score, score_claim, CandidateWorker, CapacityConfig, ClaimContext,
    FloatingPoolManager, PoolConfig, PoolEntryReason, PriorityWeights, SkillTag, UrgencyBand,
    UrgencyBands, WorkerAvailability,
};
use test_utils::{
    aging_days_strategy, assert_sorted_desc, claim_type_strategy, load_pct_strategy,
    payer_risk_strategy, payer_strategy, payer_with_risk, skill_strategy, strategy_kind_strategy,
    ClaimBuilder, SkillFixtures,
};

fn candidate(load_pct: f64, skills: Vec<SkillTag>) -> CandidateWorker {
    let worker_id = WorkerId::new();
    CandidateWorker {
        worker_id,
        skills,
        last_assigned_at: None,
        availability: WorkerAvailability {
            worker_id,
            current_load: (load_pct / 10.0) as u32,
            max_capacity: 10,
            load_percentage: load_pct,
            is_available: true,
        },
        performance: None,
    }
}

#[test]
fn test_claim_types_map_to_their_billing_skill() {
    for (claim_type, skill) in SkillFixtures::matching_pairs() {
        let claim = ClaimBuilder::new().claim_type(claim_type).build();
        assert_eq!(claim.required_skills(), vec![skill]);
    }
}

#[test]
fn test_scores_follow_payer_risk() {
    let weights = PriorityWeights::default();
    let today = Utc::now().date_naive();

    let mut scored: Vec<(u8, f64)> = payer_with_risk()
        .into_iter()
        .map(|(payer, risk)| {
            let claim = ClaimBuilder::new()
                .payer(payer)
                .payer_risk(risk)
                .aging_days(15)
                .build();
            (risk, score_claim(&claim, &weights, today))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    let scores: Vec<f64> = scored.iter().map(|(_, score)| *score).collect();
    assert_sorted_desc(&scores);
}

proptest! {
    /// Every strategy over a non-empty candidate set picks a member of it
    #[test]
    fn prop_selection_always_picks_a_candidate(
        kind in strategy_kind_strategy(),
        loads in prop::collection::vec(load_pct_strategy(), 1..8),
        required in prop::collection::vec(skill_strategy(), 0..3),
        aging in aging_days_strategy(),
        risk in payer_risk_strategy(),
    ) {
        let candidates: Vec<CandidateWorker> =
            loads.into_iter().map(|load| candidate(load, Vec::new())).collect();
        let score = priority_score(aging, risk, false, &PriorityWeights::default());
        let ctx = ClaimContext {
            claim_id: ClaimId::new(),
            required_skills: required,
            urgency: UrgencyBand::classify(score, &UrgencyBands::default()),
            priority: score,
        };

        let chosen = select(kind, &ctx, &candidates, &CapacityConfig::default())
            .expect("non-empty candidate set always yields a pick");
        prop_assert!(candidates.iter().any(|c| c.worker_id == chosen));
    }

    /// Pool ranking stays score-descending for any mix of admitted claims
    #[test]
    fn prop_pool_ranking_is_sorted(
        specs in prop::collection::vec(
            (aging_days_strategy(), payer_risk_strategy(), claim_type_strategy(), payer_strategy()),
            1..20,
        ),
    ) {
        let now = Utc::now();
        let scope = CompanyId::new();
        let mut pool = FloatingPoolManager::new(PoolConfig::default(), PriorityWeights::default());
        for (aging, risk, claim_type, payer) in specs {
            let claim = ClaimBuilder::new()
                .company(scope)
                .claim_type(claim_type)
                .payer(payer)
                .payer_risk(risk)
                .aging_days(aging)
                .build();
            pool.admit(&claim, PoolEntryReason::New, now);
        }

        let finals: Vec<f64> = pool
            .top_candidates(usize::MAX)
            .iter()
            .map(|entry| entry.final_priority)
            .collect();
        assert_sorted_desc(&finals);
    }
}
