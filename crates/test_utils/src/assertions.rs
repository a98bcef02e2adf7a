//! Assertion Helpers
//!
//! Dispatch-specific assertions with failure messages that name the
//! entity involved instead of dumping whole structs.

use core_kernel::{ClaimId, WorkerId};
use domain_dispatch::{AssignmentRunSummary, SkipReason};

use crate::memory::InMemoryClaimStore;

/// Asserts the claim is currently assigned to the expected worker
pub fn assert_assigned_to(store: &InMemoryClaimStore, claim_id: ClaimId, worker_id: WorkerId) {
    let claim = store
        .get(claim_id)
        .unwrap_or_else(|| panic!("claim {claim_id} not in store"));
    assert_eq!(
        claim.assigned_to,
        Some(worker_id),
        "claim {claim_id} assigned to {:?}, expected {worker_id}",
        claim.assigned_to
    );
}

/// Asserts the claim holds no assignment
pub fn assert_unassigned(store: &InMemoryClaimStore, claim_id: ClaimId) {
    let claim = store
        .get(claim_id)
        .unwrap_or_else(|| panic!("claim {claim_id} not in store"));
    assert_eq!(
        claim.assigned_to, None,
        "claim {claim_id} unexpectedly assigned to {:?}",
        claim.assigned_to
    );
}

/// Asserts batch counts in one place
pub fn assert_summary_counts(summary: &AssignmentRunSummary, assigned: usize, skipped: usize) {
    assert_eq!(
        summary.assigned_count(),
        assigned,
        "assigned count mismatch: {}",
        summary.message
    );
    assert_eq!(
        summary.skipped_count(),
        skipped,
        "skipped count mismatch: {}",
        summary.message
    );
}

/// Asserts a specific claim was skipped for the given reason
pub fn assert_skipped_for(summary: &AssignmentRunSummary, claim_id: ClaimId, reason: SkipReason) {
    let skip = summary
        .skipped
        .iter()
        .find(|s| s.claim_id == claim_id)
        .unwrap_or_else(|| panic!("claim {claim_id} not among skipped claims"));
    assert_eq!(skip.reason, reason, "skip reason mismatch for {claim_id}");
}

/// Asserts no worker exceeds the given load in the store
pub fn assert_no_worker_over(store: &InMemoryClaimStore, workers: &[WorkerId], max: u32) {
    for &worker_id in workers {
        let load = store.open_claim_count(worker_id);
        assert!(
            load <= max,
            "worker {worker_id} holds {load} open claims, limit {max}"
        );
    }
}

/// Asserts the slice is sorted descending; ties are acceptable
pub fn assert_sorted_desc(values: &[f64]) {
    for pair in values.windows(2) {
        assert!(
            pair[0] >= pair[1],
            "values not sorted descending: {} before {}",
            pair[0],
            pair[1]
        );
    }
}
