//! Floating Pool Manager Tests
//!
//! Covers the pool entry lifecycle, priority composition, SLA risk
//! reclassification, escalation on consecutive failures, and the ordering
//! guarantee consumed by the assignment coordinator.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, CompanyId};
use domain_dispatch::{
    AssignmentEfficiency, BoostKind, Claim, ClaimStatus, ClaimType, EntryState,
    FloatingPoolManager, PayerCategory, PoolConfig, PoolEntryReason, PriorityWeights, SlaRisk,
    StrategyKind,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn manager() -> FloatingPoolManager {
    FloatingPoolManager::new(PoolConfig::default(), PriorityWeights::default())
}

/// Claim with controllable aging and SLA headroom
fn claim_aged(aging_days: i64, sla_hours: i64, now: DateTime<Utc>) -> Claim {
    Claim::new(
        CompanyId::new(),
        ClaimType::Professional,
        PayerCategory::Commercial,
        dec!(1500),
        now.date_naive() - Duration::days(aging_days),
        now + Duration::hours(sla_hours),
    )
}

fn snapshot(claims: &[Claim]) -> HashMap<ClaimId, Claim> {
    claims.iter().cloned().map(|c| (c.id, c)).collect()
}

// ============================================================================
// ADMISSION
// ============================================================================

mod admission {
    use super::*;

    #[test]
    fn test_admit_is_idempotent_per_claim() {
        let now = Utc::now();
        let mut pool = manager();
        let claim = claim_aged(5, 72, now);

        let first = pool.admit(&claim, PoolEntryReason::New, now);
        let second = pool.admit(&claim, PoolEntryReason::Timeout, now + Duration::hours(1));

        assert_eq!(first, second);
        assert_eq!(pool.active_count(), 1);
        // The original entry reason survives
        assert_eq!(pool.entry(claim.id).unwrap().reason, PoolEntryReason::New);
    }

    #[test]
    fn test_high_value_claim_gets_entry_boost() {
        let now = Utc::now();
        let mut pool = manager();
        let mut small = claim_aged(5, 72, now);
        small.billed_amount = dec!(500);
        let mut large = claim_aged(5, 72, now);
        large.billed_amount = dec!(25000);

        pool.admit(&small, PoolEntryReason::New, now);
        pool.admit(&large, PoolEntryReason::New, now);

        let small_entry = pool.entry(small.id).unwrap();
        let large_entry = pool.entry(large.id).unwrap();
        assert!(small_entry.boosts.is_empty());
        assert_eq!(large_entry.boosts.len(), 1);
        assert!(large_entry.final_priority > small_entry.final_priority);
    }

    #[test]
    fn test_new_entry_created_after_resolution() {
        let now = Utc::now();
        let mut pool = manager();
        let claim = claim_aged(5, 72, now);

        let first = pool.admit(&claim, PoolEntryReason::New, now);
        pool.resolve_assigned(claim.id, now + Duration::hours(1));
        assert!(pool.entry(claim.id).is_none());

        // Re-entry mints a fresh entry; the resolved one is never reopened
        let second = pool.admit(&claim, PoolEntryReason::ManualRelease, now + Duration::hours(2));
        assert_ne!(first, second);
        assert_eq!(pool.resolved_entries().len(), 1);
    }
}

// ============================================================================
// MAINTENANCE / SCORE COMPOSITION
// ============================================================================

mod maintenance {
    use super::*;

    #[test]
    fn test_refresh_reclassifies_sla_risk() {
        let now = Utc::now();
        let mut pool = manager();
        let claim = claim_aged(0, 48, now);
        pool.admit(&claim, PoolEntryReason::New, now);
        assert_eq!(pool.entry(claim.id).unwrap().sla_risk, SlaRisk::None);

        // 44 hours later only 4 hours remain
        let later = now + Duration::hours(44);
        pool.refresh(&snapshot(&[claim.clone()]), later.date_naive(), later);
        assert_eq!(pool.entry(claim.id).unwrap().sla_risk, SlaRisk::High);
    }

    #[test]
    fn test_risk_multiplier_applies_to_base() {
        let now = Utc::now();
        let mut pool = manager();
        // 10 days aging, payer risk 8, not denied -> base 6.4
        let mut claim = claim_aged(10, 4, now);
        claim.payer_risk_score = Some(8);
        pool.admit(&claim, PoolEntryReason::New, now);
        pool.refresh(&snapshot(&[claim.clone()]), now.date_naive(), now);

        let entry = pool.entry(claim.id).unwrap();
        assert_eq!(entry.sla_risk, SlaRisk::High);
        assert!((entry.base_priority - 6.4).abs() < 1e-9);
        assert!((entry.final_priority - 6.4 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_dwell_penalty_added_after_multiplier() {
        let entered = Utc::now() - Duration::hours(7);
        let mut pool = manager();
        let claim = claim_aged(10, 200, entered);
        pool.admit(&claim, PoolEntryReason::New, entered);

        let now = entered + Duration::hours(7);
        pool.refresh(&snapshot(&[claim.clone()]), now.date_naive(), now);

        let entry = pool.entry(claim.id).unwrap();
        assert_eq!(entry.sla_risk, SlaRisk::None);
        // base * 1.0 + 25 dwell penalty past six pool-hours
        assert!((entry.final_priority - (entry.base_priority + 25.0)).abs() < 1e-9);
    }

    #[test]
    fn test_expired_boost_drops_out_of_score() {
        let now = Utc::now();
        let mut pool = manager();
        let claim = claim_aged(10, 200, now);
        pool.admit(&claim, PoolEntryReason::New, now);
        pool.add_boost(
            claim.id,
            BoostKind::ClientRequested,
            80.0,
            Some(now + Duration::hours(2)),
            now,
        );

        let snapshot = snapshot(&[claim.clone()]);
        pool.refresh(&snapshot, now.date_naive(), now);
        let boosted = pool.entry(claim.id).unwrap().final_priority;

        let later = now + Duration::hours(3);
        pool.refresh(&snapshot, later.date_naive(), later);
        let entry = pool.entry(claim.id).unwrap();
        assert!(entry.final_priority < boosted);
        // Expired boosts are excluded, not deleted
        assert_eq!(entry.boosts.len(), 1);
    }

    #[test]
    fn test_refresh_resolves_cancelled_claims() {
        let now = Utc::now();
        let mut pool = manager();
        let mut claim = claim_aged(5, 72, now);
        pool.admit(&claim, PoolEntryReason::New, now);

        claim.status = ClaimStatus::Cancelled;
        pool.refresh(&snapshot(&[claim.clone()]), now.date_naive(), now);

        assert!(pool.entry(claim.id).is_none());
        assert!(matches!(
            pool.resolved_entries()[0].state,
            EntryState::Cancelled { .. }
        ));
    }
}

// ============================================================================
// ESCALATION
// ============================================================================

mod escalation {
    use super::*;

    #[test]
    fn test_escalates_at_threshold_with_exact_boost() {
        let now = Utc::now();
        let mut pool = manager();
        // Distant SLA keeps the risk multiplier at 1.0 so the increase is exact
        let claim = claim_aged(10, 500, now);
        pool.admit(&claim, PoolEntryReason::New, now);
        let before = pool.entry(claim.id).unwrap().final_priority;

        assert!(pool
            .record_failure(claim.id, StrategyKind::WeightedHybrid, "no eligible workers", now)
            .is_none());
        assert!(pool
            .record_failure(claim.id, StrategyKind::WeightedHybrid, "no eligible workers", now)
            .is_none());
        let notice = pool
            .record_failure(claim.id, StrategyKind::WeightedHybrid, "no eligible workers", now)
            .expect("third consecutive failure escalates");

        assert_eq!(notice.consecutive_failures, 3);
        let entry = pool.entry(claim.id).unwrap();
        assert!(entry.is_escalated());
        assert!((entry.final_priority - (before + 200.0)).abs() < 1e-9);
    }

    #[test]
    fn test_escalated_entry_stays_eligible() {
        let now = Utc::now();
        let mut pool = manager();
        let claim = claim_aged(10, 500, now);
        pool.admit(&claim, PoolEntryReason::New, now);
        for _ in 0..3 {
            pool.record_failure(claim.id, StrategyKind::LoadBalanced, "no eligible workers", now);
        }

        assert_eq!(pool.top_candidates(10).len(), 1);
        // A later success still resolves the escalated entry
        let (_, _, efficiency) = pool.resolve_assigned(claim.id, now + Duration::hours(1)).unwrap();
        assert_eq!(efficiency, AssignmentEfficiency::Excellent);
    }

    #[test]
    fn test_escalation_fires_once() {
        let now = Utc::now();
        let mut pool = manager();
        let claim = claim_aged(10, 500, now);
        pool.admit(&claim, PoolEntryReason::New, now);

        let notices: Vec<_> = (0..6)
            .filter_map(|_| {
                pool.record_failure(claim.id, StrategyKind::LoadBalanced, "no eligible workers", now)
            })
            .collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(pool.entry(claim.id).unwrap().attempts, 6);
    }
}

// ============================================================================
// ORDERING
// ============================================================================

mod ordering {
    use super::*;

    #[test]
    fn test_top_candidates_orders_by_final_then_age() {
        let now = Utc::now();
        let mut pool = manager();
        let urgent = claim_aged(40, 300, now);
        let stale = claim_aged(10, 300, now);
        let fresh = claim_aged(10, 300, now);

        // Same score, earlier entry wins
        pool.admit(&stale, PoolEntryReason::New, now - Duration::hours(2));
        pool.admit(&fresh, PoolEntryReason::New, now);
        pool.admit(&urgent, PoolEntryReason::New, now);
        pool.refresh(
            &snapshot(&[urgent.clone(), stale.clone(), fresh.clone()]),
            now.date_naive(),
            now,
        );

        let top: Vec<ClaimId> = pool.top_candidates(3).iter().map(|e| e.claim_id).collect();
        assert_eq!(top[0], urgent.id);
        assert_eq!(top[1], stale.id);
        assert_eq!(top[2], fresh.id);
    }

    #[test]
    fn test_top_candidates_truncates() {
        let now = Utc::now();
        let mut pool = manager();
        for aging in 0..5 {
            pool.admit(&claim_aged(aging, 300, now), PoolEntryReason::New, now);
        }
        assert_eq!(pool.top_candidates(2).len(), 2);
    }

    proptest! {
        /// Adjacent pairs of the ranked pool are always score-descending
        #[test]
        fn prop_pool_ordering_invariant(agings in prop::collection::vec(0i64..400, 1..30)) {
            let now = Utc::now();
            let mut pool = manager();
            let claims: Vec<Claim> = agings
                .iter()
                .map(|&aging| claim_aged(aging, 300, now))
                .collect();
            for claim in &claims {
                pool.admit(claim, PoolEntryReason::New, now);
            }
            pool.refresh(&snapshot(&claims), now.date_naive(), now);

            let ranked = pool.top_candidates(claims.len());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].final_priority >= pair[1].final_priority);
                if (pair[0].final_priority - pair[1].final_priority).abs() < f64::EPSILON {
                    prop_assert!(pair[0].entered_at <= pair[1].entered_at);
                }
            }
        }
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

mod statistics {
    use super::*;

    #[test]
    fn test_pool_stats() {
        let now = Utc::now();
        let mut pool = manager();
        let a = claim_aged(5, 1, now);
        let b = claim_aged(5, 300, now);
        pool.admit(&a, PoolEntryReason::New, now);
        pool.admit(&b, PoolEntryReason::New, now);
        for _ in 0..3 {
            pool.record_failure(a.id, StrategyKind::LoadBalanced, "no eligible workers", now);
        }

        let stats = pool.stats(now);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.escalated, 1);
        assert_eq!(stats.risk_counts.get(&SlaRisk::Imminent), Some(&1));
        assert_eq!(stats.resolved_total, 0);
    }
}
