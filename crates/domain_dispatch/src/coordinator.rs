//! Assignment coordination
//!
//! The coordinator ties the scorer, capacity tracker, floating pool, and
//! selection strategies together. It is the sole writer of a claim's
//! assigned-worker reference and of assignment-related status transitions;
//! the storage adapter guarantees the conditional-write atomicity.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use core_kernel::{AssignmentId, ClaimId, CompanyId, WorkerId};
use crate::capacity::CapacityTracker;
use crate::claim::{Claim, ClaimStatus, ReassignmentRecord};
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::events::DispatchEvent;
use crate::pool::{BoostKind, FloatingPoolManager, PoolEntryReason, PoolStats};
use crate::ports::{AssignOutcome, ClaimFilters, ClaimStore, EventSink, WorkerFilters, WorkerStore};
use crate::priority::{score_claim, UrgencyBand};
use crate::strategy::{self, CandidateWorker, ClaimContext, StrategyKind};
use crate::worker::Worker;

/// Who initiated an assignment operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    System,
    User(String),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::System => f.write_str("system"),
            Actor::User(name) => f.write_str(name),
        }
    }
}

/// How an assignment was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    Manual,
    Auto(StrategyKind),
}

impl fmt::Display for AssignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentMethod::Manual => f.write_str("manual"),
            AssignmentMethod::Auto(kind) => f.write_str(kind.as_str()),
        }
    }
}

/// The inputs that produced an assignment decision, kept for audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub load_percentage: f64,
    pub skill_score: f64,
    pub performance: Option<f64>,
    pub claim_priority: f64,
}

/// Immutable audit record, one per successful assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: AssignmentId,
    pub claim_id: ClaimId,
    pub worker_id: WorkerId,
    pub method: AssignmentMethod,
    pub score_inputs: ScoreInputs,
    pub assigned_by: Actor,
    pub reason: String,
    pub assigned_at: DateTime<Utc>,
}

/// Why a claim was skipped within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoEligibleCandidates,
    AssignmentConflict,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoEligibleCandidates => f.write_str("NoEligibleCandidates"),
            SkipReason::AssignmentConflict => f.write_str("AssignmentConflict"),
        }
    }
}

/// A claim the batch could not place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedClaim {
    pub claim_id: ClaimId,
    pub reason: SkipReason,
    pub detail: String,
}

/// One successful placement within a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDetail {
    pub claim_id: ClaimId,
    pub worker_id: WorkerId,
    pub strategy: StrategyKind,
    pub reason: String,
}

/// Structured result of an auto-assignment batch.
///
/// Partial failure never throws; per-claim outcomes accumulate here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRunSummary {
    pub total_claims: usize,
    pub assigned: Vec<AssignmentDetail>,
    pub skipped: Vec<SkippedClaim>,
    pub message: String,
}

impl AssignmentRunSummary {
    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    fn empty(message: impl Into<String>) -> Self {
        Self {
            total_claims: 0,
            assigned: Vec::new(),
            skipped: Vec::new(),
            message: message.into(),
        }
    }
}

/// Options for an auto-assignment batch
#[derive(Debug, Clone, Default)]
pub struct AssignOptions {
    /// Strategy override; None uses the configured default
    pub strategy: Option<StrategyKind>,
    pub claim_filters: ClaimFilters,
    pub worker_filters: WorkerFilters,
    /// Cap on claims considered in this batch
    pub max_claims: Option<usize>,
}

/// Orchestrates claim-to-worker assignment
pub struct AssignmentCoordinator {
    claims: Arc<dyn ClaimStore>,
    workers: Arc<dyn WorkerStore>,
    events: Arc<dyn EventSink>,
    config: DispatchConfig,
    tracker: CapacityTracker,
    pool: Mutex<FloatingPoolManager>,
}

impl AssignmentCoordinator {
    /// Creates a coordinator, validating configuration up front so a
    /// misconfigured engine can never reach a write.
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        workers: Arc<dyn WorkerStore>,
        events: Arc<dyn EventSink>,
        config: DispatchConfig,
    ) -> Result<Self, DispatchError> {
        config.validate()?;
        let tracker = CapacityTracker::new(config.capacity.clone());
        let pool = Mutex::new(FloatingPoolManager::new(config.pool.clone(), config.weights));
        Ok(Self {
            claims,
            workers,
            events,
            config,
            tracker,
            pool,
        })
    }

    /// Assigns every placeable claim in scope, highest priority first.
    ///
    /// Each claim is an independent unit of work: skips and lost races are
    /// accumulated in the summary and never roll back earlier placements.
    /// Re-running on a fully assigned scope is a no-op.
    pub async fn auto_assign(
        &self,
        scope: CompanyId,
        options: AssignOptions,
    ) -> Result<AssignmentRunSummary, DispatchError> {
        let requested = options.strategy.unwrap_or(self.config.default_strategy);
        let now = Utc::now();
        let today = now.date_naive();

        let mut claims: Vec<Claim> = self
            .claims
            .find_unassigned(scope, &options.claim_filters)
            .await?;
        claims.retain(Claim::is_poolable);
        if claims.is_empty() {
            info!(%scope, "auto-assign: no unassigned claims");
            return Ok(AssignmentRunSummary::empty("no unassigned claims in scope"));
        }

        let claim_map: HashMap<ClaimId, Claim> =
            claims.into_iter().map(|c| (c.id, c)).collect();

        let mut pool = self.pool.lock().await;
        for claim in claim_map.values() {
            pool.admit(claim, PoolEntryReason::New, now);
        }
        pool.refresh(&claim_map, today, now);

        // (claim id, ranking score, base score) in dispatch order. Entries
        // whose claims left the unassigned set are dropped before the batch
        // cap applies, so they cannot consume slots.
        let ordered: Vec<(ClaimId, f64, f64)> = pool
            .top_candidates(usize::MAX)
            .into_iter()
            .filter(|entry| claim_map.contains_key(&entry.claim_id))
            .take(options.max_claims.unwrap_or(usize::MAX))
            .map(|entry| (entry.claim_id, entry.final_priority, entry.base_priority))
            .collect();

        let (mut candidates, perf_lookup_failed) =
            self.build_candidates(scope, &options.worker_filters).await?;
        let strategy_kind = if perf_lookup_failed && requested == StrategyKind::WeightedHybrid {
            warn!("performance lookup failed; degrading weighted_hybrid to load_balanced");
            StrategyKind::LoadBalanced
        } else {
            requested
        };

        info!(
            %scope,
            strategy = %strategy_kind,
            claims = ordered.len(),
            candidates = candidates.len(),
            "auto-assign batch start"
        );

        let mut assigned = Vec::new();
        let mut skipped = Vec::new();

        for (claim_id, final_priority, base_priority) in ordered {
            let claim = &claim_map[&claim_id];
            let ctx = ClaimContext {
                claim_id,
                required_skills: claim.required_skills(),
                urgency: UrgencyBand::classify(base_priority, &self.config.urgency),
                priority: final_priority,
            };

            let chosen = strategy::select(strategy_kind, &ctx, &candidates, &self.config.capacity);
            let Some(worker_id) = chosen else {
                skipped.push(SkippedClaim {
                    claim_id,
                    reason: SkipReason::NoEligibleCandidates,
                    detail: "no available worker satisfied the strategy".to_string(),
                });
                if let Some(notice) =
                    pool.record_failure(claim_id, strategy_kind, "no eligible workers", now)
                {
                    self.emit_or_log(DispatchEvent::ClaimEscalated {
                        claim_id,
                        entry_id: notice.entry_id,
                        consecutive_failures: notice.consecutive_failures,
                        boost: notice.boost,
                        at: now,
                    })
                    .await;
                }
                continue;
            };

            match self.claims.atomic_assign(claim_id, worker_id).await? {
                AssignOutcome::Conflict => {
                    debug!(%claim_id, "lost assignment race, skipping for this batch");
                    skipped.push(SkippedClaim {
                        claim_id,
                        reason: SkipReason::AssignmentConflict,
                        detail: "claim was assigned by a concurrent process".to_string(),
                    });
                    // Another coordinator placed it; the entry is no longer ours
                    pool.resolve_assigned(claim_id, now);
                    continue;
                }
                AssignOutcome::Assigned => {}
            }
            self.claims.update_status(claim_id, ClaimStatus::Assigned).await?;

            let idx = candidates
                .iter()
                .position(|c| c.worker_id == worker_id)
                .ok_or_else(|| DispatchError::worker_not_found(worker_id))?;
            let score_inputs = ScoreInputs {
                load_percentage: candidates[idx].availability.load_percentage,
                skill_score: strategy::skill_score(&ctx.required_skills, &candidates[idx].skills),
                performance: candidates[idx].performance,
                claim_priority: final_priority,
            };

            // In-batch bookkeeping: the next claim sees this worker's new load
            candidates[idx].availability = self.tracker.after_assignment(&candidates[idx].availability);
            candidates[idx].last_assigned_at = Some(now);
            if !candidates[idx].availability.is_available {
                candidates.remove(idx);
            }

            pool.resolve_assigned(claim_id, now);

            let reason = format!(
                "selected by {} (load {:.0}%, skill {:.0}, priority {:.1})",
                strategy_kind,
                score_inputs.load_percentage,
                score_inputs.skill_score,
                final_priority,
            );
            let record = AssignmentRecord {
                id: AssignmentId::new_v7(),
                claim_id,
                worker_id,
                method: AssignmentMethod::Auto(strategy_kind),
                score_inputs,
                assigned_by: Actor::System,
                reason: reason.clone(),
                assigned_at: now,
            };
            self.claims.record_assignment(&record).await?;

            self.emit_or_log(DispatchEvent::ClaimAssigned {
                claim_id,
                worker_id,
                method: AssignmentMethod::Auto(strategy_kind).to_string(),
                actor: Actor::System.to_string(),
                at: now,
            })
            .await;

            assigned.push(AssignmentDetail {
                claim_id,
                worker_id,
                strategy: strategy_kind,
                reason,
            });
        }

        let total_claims = claim_map.len();
        let message = format!(
            "assigned {} of {} claims ({} skipped)",
            assigned.len(),
            total_claims,
            skipped.len()
        );
        info!(%scope, %message, "auto-assign batch complete");
        Ok(AssignmentRunSummary {
            total_claims,
            assigned,
            skipped,
            message,
        })
    }

    /// Assigns one claim to one worker without consulting a strategy.
    ///
    /// Fails with `CapacityExceeded` when the worker is at or over its
    /// maximum, and `AssignmentConflict` when the claim is already taken.
    pub async fn manual_assign(
        &self,
        claim_id: ClaimId,
        worker_id: WorkerId,
        actor: Actor,
        reason: impl Into<String>,
    ) -> Result<AssignmentRecord, DispatchError> {
        let reason = reason.into();
        let now = Utc::now();

        let claim = self
            .claims
            .find_by_id(claim_id)
            .await?
            .ok_or_else(|| DispatchError::claim_not_found(claim_id))?;
        if claim.status.is_terminal() {
            return Err(DispatchError::InvalidStatusTransition {
                from: claim.status,
                to: ClaimStatus::Assigned,
            });
        }
        let worker = self
            .workers
            .find_by_id(worker_id)
            .await?
            .ok_or_else(|| DispatchError::worker_not_found(worker_id))?;

        self.ensure_below_capacity(&worker).await?;

        // Capture decision-time inputs before the write changes the load
        let record = self
            .build_manual_record(&claim, &worker, actor.clone(), reason, now)
            .await;

        match self.claims.atomic_assign(claim_id, worker_id).await? {
            AssignOutcome::Conflict => return Err(DispatchError::AssignmentConflict { claim_id }),
            AssignOutcome::Assigned => {}
        }
        self.claims.update_status(claim_id, ClaimStatus::Assigned).await?;
        self.pool.lock().await.resolve_assigned(claim_id, now);

        self.claims.record_assignment(&record).await?;

        self.emit_or_log(DispatchEvent::ClaimAssigned {
            claim_id,
            worker_id,
            method: AssignmentMethod::Manual.to_string(),
            actor: actor.to_string(),
            at: now,
        })
        .await;

        Ok(record)
    }

    /// Moves an assigned claim to a different worker, recording the hop and
    /// notifying both sides.
    pub async fn reassign(
        &self,
        claim_id: ClaimId,
        new_worker_id: WorkerId,
        actor: Actor,
        reason: impl Into<String>,
    ) -> Result<AssignmentRecord, DispatchError> {
        let reason = reason.into();
        let now = Utc::now();

        let claim = self
            .claims
            .find_by_id(claim_id)
            .await?
            .ok_or_else(|| DispatchError::claim_not_found(claim_id))?;
        if claim.status.is_terminal() {
            return Err(DispatchError::InvalidStatusTransition {
                from: claim.status,
                to: ClaimStatus::Assigned,
            });
        }
        let previous = claim
            .assigned_to
            .ok_or(DispatchError::NotAssigned { claim_id })?;
        let worker = self
            .workers
            .find_by_id(new_worker_id)
            .await?
            .ok_or_else(|| DispatchError::worker_not_found(new_worker_id))?;

        if previous != new_worker_id {
            self.ensure_below_capacity(&worker).await?;
        }

        let record = self
            .build_manual_record(&claim, &worker, actor.clone(), reason.clone(), now)
            .await;

        self.claims
            .append_reassignment(
                claim_id,
                ReassignmentRecord {
                    from_worker: previous,
                    to_worker: new_worker_id,
                    actor: actor.to_string(),
                    reason: reason.clone(),
                    reassigned_at: now,
                },
            )
            .await?;

        self.claims.clear_assignment(claim_id).await?;
        match self.claims.atomic_assign(claim_id, new_worker_id).await? {
            AssignOutcome::Conflict => return Err(DispatchError::AssignmentConflict { claim_id }),
            AssignOutcome::Assigned => {}
        }
        self.claims.update_status(claim_id, ClaimStatus::Assigned).await?;
        self.claims.record_assignment(&record).await?;

        let recipients = if previous == new_worker_id {
            vec![new_worker_id]
        } else {
            vec![previous, new_worker_id]
        };
        for recipient in recipients {
            self.emit_or_log(DispatchEvent::ClaimReassigned {
                claim_id,
                previous_worker: previous,
                new_worker: new_worker_id,
                recipient,
                actor: actor.to_string(),
                reason: reason.clone(),
                at: now,
            })
            .await;
        }

        Ok(record)
    }

    /// Releases a claim back into the floating pool
    pub async fn unassign(
        &self,
        claim_id: ClaimId,
        actor: Actor,
        reason: impl Into<String>,
    ) -> Result<(), DispatchError> {
        let reason = reason.into();
        let now = Utc::now();

        let mut claim = self
            .claims
            .find_by_id(claim_id)
            .await?
            .ok_or_else(|| DispatchError::claim_not_found(claim_id))?;
        if claim.status.is_terminal() {
            return Err(DispatchError::InvalidStatusTransition {
                from: claim.status,
                to: ClaimStatus::New,
            });
        }
        let previous = claim
            .assigned_to
            .ok_or(DispatchError::NotAssigned { claim_id })?;

        self.claims.clear_assignment(claim_id).await?;

        claim.assigned_to = None;
        claim.status = ClaimStatus::New;
        self.pool
            .lock()
            .await
            .admit(&claim, PoolEntryReason::ManualRelease, now);

        self.emit_or_log(DispatchEvent::ClaimUnassigned {
            claim_id,
            previous_worker: previous,
            actor: actor.to_string(),
            reason,
            at: now,
        })
        .await;

        Ok(())
    }

    /// Periodic floating-pool maintenance: admits newly unassigned claims,
    /// resolves entries whose claims left the unassigned set (cancelled or
    /// completed externally, or assigned by a concurrent process),
    /// re-scores everything, and reports pool statistics.
    pub async fn run_pool_maintenance(&self, scope: CompanyId) -> Result<PoolStats, DispatchError> {
        let now = Utc::now();
        let mut claims = self
            .claims
            .find_unassigned(scope, &ClaimFilters::default())
            .await?;
        claims.retain(Claim::is_poolable);
        let claim_map: HashMap<ClaimId, Claim> = claims.into_iter().map(|c| (c.id, c)).collect();

        let mut pool = self.pool.lock().await;
        for claim_id in pool.active_claim_ids() {
            if claim_map.contains_key(&claim_id) {
                continue;
            }
            match self.claims.find_by_id(claim_id).await? {
                // Still pooled, just outside this scope's snapshot
                Some(claim) if claim.is_poolable() => {}
                Some(claim) if !claim.status.is_terminal() => {
                    debug!(%claim_id, "pooled claim assigned externally, resolving entry");
                    pool.resolve_assigned(claim_id, now);
                }
                _ => {
                    debug!(%claim_id, "pooled claim no longer placeable, resolving entry");
                    pool.resolve_cancelled(claim_id, now);
                }
            }
        }

        for claim in claim_map.values() {
            pool.admit(claim, PoolEntryReason::New, now);
        }
        pool.refresh(&claim_map, now.date_naive(), now);
        Ok(pool.stats(now))
    }

    /// Grants an external priority boost to a pooled claim
    pub async fn boost_claim(
        &self,
        claim_id: ClaimId,
        kind: BoostKind,
        value: f64,
        expires_at: Option<DateTime<Utc>>,
    ) -> bool {
        self.pool
            .lock()
            .await
            .add_boost(claim_id, kind, value, expires_at, Utc::now())
    }

    /// Current pool statistics
    pub async fn pool_stats(&self) -> PoolStats {
        self.pool.lock().await.stats(Utc::now())
    }

    async fn ensure_below_capacity(&self, worker: &Worker) -> Result<(), DispatchError> {
        let load = self.workers.count_open_claims(worker.id).await?;
        let availability = self.tracker.availability(worker, load);
        if availability.max_capacity == 0 || load >= availability.max_capacity {
            return Err(DispatchError::CapacityExceeded {
                worker_id: worker.id,
                current_load: load,
                max_capacity: availability.max_capacity,
            });
        }
        Ok(())
    }

    async fn build_manual_record(
        &self,
        claim: &Claim,
        worker: &Worker,
        actor: Actor,
        reason: String,
        now: DateTime<Utc>,
    ) -> AssignmentRecord {
        let load = self
            .workers
            .count_open_claims(worker.id)
            .await
            .unwrap_or(0);
        let availability = self.tracker.availability(worker, load);
        let performance = match self.workers.performance_score(worker.id).await {
            Ok(score) => score,
            Err(error) => {
                warn!(worker_id = %worker.id, %error, "performance lookup failed");
                None
            }
        };
        AssignmentRecord {
            id: AssignmentId::new_v7(),
            claim_id: claim.id,
            worker_id: worker.id,
            method: AssignmentMethod::Manual,
            score_inputs: ScoreInputs {
                load_percentage: availability.load_percentage,
                skill_score: strategy::skill_score(&claim.required_skills(), &worker.skill_tags()),
                performance,
                claim_priority: score_claim(claim, &self.config.weights, now.date_naive()),
            },
            assigned_by: actor,
            reason,
            assigned_at: now,
        }
    }

    /// Builds the candidate working set for a batch. Returns the candidates
    /// plus whether any performance lookup errored.
    async fn build_candidates(
        &self,
        scope: CompanyId,
        filters: &WorkerFilters,
    ) -> Result<(Vec<CandidateWorker>, bool), DispatchError> {
        let workers = self.workers.find_available(scope, filters).await?;
        let mut candidates = Vec::with_capacity(workers.len());
        let mut perf_lookup_failed = false;

        for worker in workers {
            if !worker.active {
                continue;
            }
            let load = self.workers.count_open_claims(worker.id).await?;
            let availability = self.tracker.availability(&worker, load);
            if !availability.is_available {
                continue;
            }
            let performance = match self.workers.performance_score(worker.id).await {
                Ok(score) => score,
                Err(error) => {
                    warn!(worker_id = %worker.id, %error, "performance lookup failed");
                    perf_lookup_failed = true;
                    None
                }
            };
            candidates.push(CandidateWorker {
                worker_id: worker.id,
                skills: worker.skill_tags(),
                last_assigned_at: worker.last_assigned_at,
                availability,
                performance,
            });
        }
        Ok((candidates, perf_lookup_failed))
    }

    async fn emit_or_log(&self, event: DispatchEvent) {
        let event_type = event.event_type();
        let claim_id = event.claim_id();
        if let Err(error) = self.events.emit(event).await {
            warn!(%claim_id, event_type, %error, "event emission failed, continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_display() {
        assert_eq!(Actor::System.to_string(), "system");
        assert_eq!(Actor::User("jmorales".to_string()).to_string(), "jmorales");
    }

    #[test]
    fn test_method_display() {
        assert_eq!(AssignmentMethod::Manual.to_string(), "manual");
        assert_eq!(
            AssignmentMethod::Auto(StrategyKind::WeightedHybrid).to_string(),
            "weighted_hybrid"
        );
    }
}
