//! Floating pool management
//!
//! Every unassigned, non-terminal claim owns exactly one active pool entry.
//! A periodic maintenance pass re-scores entries, reclassifies SLA risk, and
//! escalates entries that keep failing assignment. Resolving an entry is
//! terminal; a claim that re-enters the pool gets a fresh entry.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::{ClaimId, PoolEntryId};
use crate::claim::Claim;
use crate::config::PoolConfig;
use crate::priority::{score_claim, PriorityWeights};
use crate::strategy::StrategyKind;

/// SLA breach risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaRisk {
    None,
    Low,
    Medium,
    High,
    Imminent,
}

impl SlaRisk {
    /// Classifies by hours remaining; past the fixed thresholds the fraction
    /// of the original SLA window decides between Low and None. Overdue
    /// deadlines are Imminent.
    pub fn classify(hours_remaining: f64, window_hours: f64) -> Self {
        if hours_remaining <= 2.0 {
            SlaRisk::Imminent
        } else if hours_remaining <= 6.0 {
            SlaRisk::High
        } else if hours_remaining <= 12.0 {
            SlaRisk::Medium
        } else if window_hours > 0.0 && hours_remaining / window_hours < 0.25 {
            SlaRisk::Low
        } else {
            SlaRisk::None
        }
    }

    /// Multiplier applied to the base score when composing the final ranking
    pub fn multiplier(&self) -> f64 {
        match self {
            SlaRisk::Imminent => 2.0,
            SlaRisk::High => 1.5,
            SlaRisk::Medium => 1.2,
            SlaRisk::Low | SlaRisk::None => 1.0,
        }
    }
}

/// How quickly a pooled claim found a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentEfficiency {
    Excellent,
    Good,
    Average,
    Poor,
}

impl AssignmentEfficiency {
    pub fn classify(hours_in_pool: f64) -> Self {
        if hours_in_pool <= 2.0 {
            AssignmentEfficiency::Excellent
        } else if hours_in_pool <= 6.0 {
            AssignmentEfficiency::Good
        } else if hours_in_pool <= 24.0 {
            AssignmentEfficiency::Average
        } else {
            AssignmentEfficiency::Poor
        }
    }
}

/// Why a claim entered the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolEntryReason {
    New,
    Reassigned,
    Overflow,
    Escalation,
    Timeout,
    ManualRelease,
}

/// Kind of a priority boost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostKind {
    ClientRequested,
    ManagementOverride,
    HighValue,
    Escalation,
}

/// An additive priority boost, excluded (but kept for audit) once expired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityBoost {
    pub kind: BoostKind,
    pub value: f64,
    pub granted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PriorityBoost {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expiry| now < expiry)
    }
}

/// One assignment attempt against a pooled claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub at: DateTime<Utc>,
    pub strategy: StrategyKind,
    pub reason: String,
}

/// Resolution state of a pool entry.
///
/// Escalated entries stay eligible for assignment; Assigned and Cancelled
/// are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum EntryState {
    Unresolved,
    Escalated,
    Assigned {
        at: DateTime<Utc>,
        hours_in_pool: f64,
        efficiency: AssignmentEfficiency,
    },
    Cancelled {
        at: DateTime<Utc>,
    },
}

/// A claim floating in the pool, with ranking metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
    pub id: PoolEntryId,
    pub claim_id: ClaimId,
    pub entered_at: DateTime<Utc>,
    pub reason: PoolEntryReason,
    pub sla_due: DateTime<Utc>,
    /// Entry-to-deadline span, the denominator for fractional risk
    pub sla_window_hours: f64,
    pub hours_remaining: f64,
    pub sla_risk: SlaRisk,
    /// Score before boosts, risk multiplier, and dwell penalty
    pub base_priority: f64,
    /// The ranking score selection actually uses
    pub final_priority: f64,
    pub boosts: Vec<PriorityBoost>,
    pub attempts: u32,
    pub attempt_history: Vec<AttemptRecord>,
    pub consecutive_failures: u32,
    pub state: EntryState,
}

impl PoolEntry {
    pub fn is_active(&self) -> bool {
        matches!(self.state, EntryState::Unresolved | EntryState::Escalated)
    }

    pub fn is_escalated(&self) -> bool {
        matches!(self.state, EntryState::Escalated)
    }

    fn active_boost_sum(&self, now: DateTime<Utc>) -> f64 {
        self.boosts
            .iter()
            .filter(|b| b.is_active_at(now))
            .map(|b| b.value)
            .sum()
    }

    fn hours_in_pool(&self, now: DateTime<Utc>) -> f64 {
        (now - self.entered_at).num_minutes() as f64 / 60.0
    }
}

/// Fired when an entry crosses the escalation threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationNotice {
    pub entry_id: PoolEntryId,
    pub claim_id: ClaimId,
    pub consecutive_failures: u32,
    pub boost: f64,
}

/// Pool-wide statistics for operational visibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStats {
    pub active: usize,
    pub escalated: usize,
    pub risk_counts: HashMap<SlaRisk, usize>,
    pub average_hours_in_pool: f64,
    pub resolved_total: usize,
}

/// Dwell penalty: flat additions once an entry has aged past 6/12/24 hours
fn dwell_penalty(hours_in_pool: f64) -> f64 {
    if hours_in_pool > 24.0 {
        100.0
    } else if hours_in_pool > 12.0 {
        50.0
    } else if hours_in_pool > 6.0 {
        25.0
    } else {
        0.0
    }
}

/// Composition order: multiply the boosted base by the risk factor, then add
/// the dwell penalty
fn compose_final(base: f64, boost_sum: f64, risk: SlaRisk, dwell: f64) -> f64 {
    (base + boost_sum) * risk.multiplier() + dwell
}

/// Owns the lifecycle of unassigned claims
#[derive(Debug)]
pub struct FloatingPoolManager {
    config: PoolConfig,
    weights: PriorityWeights,
    active: HashMap<ClaimId, PoolEntry>,
    resolved: Vec<PoolEntry>,
}

impl FloatingPoolManager {
    pub fn new(config: PoolConfig, weights: PriorityWeights) -> Self {
        Self {
            config,
            weights,
            active: HashMap::new(),
            resolved: Vec::new(),
        }
    }

    /// Admits a claim into the pool.
    ///
    /// Idempotent per claim: an already-pooled claim keeps its existing
    /// active entry. High-value claims receive a boost on first entry.
    pub fn admit(&mut self, claim: &Claim, reason: PoolEntryReason, now: DateTime<Utc>) -> PoolEntryId {
        if let Some(existing) = self.active.get(&claim.id) {
            return existing.id;
        }

        let window_hours = ((claim.sla_due - now).num_minutes() as f64 / 60.0).max(1.0);
        let base = score_claim(claim, &self.weights, now.date_naive());
        let hours_remaining = (claim.sla_due - now).num_minutes() as f64 / 60.0;
        let risk = SlaRisk::classify(hours_remaining, window_hours);

        let mut boosts = Vec::new();
        if claim.billed_amount >= self.config.high_value_threshold {
            boosts.push(PriorityBoost {
                kind: BoostKind::HighValue,
                value: self.config.high_value_boost,
                granted_at: now,
                expires_at: None,
            });
        }
        let boost_sum: f64 = boosts.iter().map(|b| b.value).sum();

        let entry = PoolEntry {
            id: PoolEntryId::new_v7(),
            claim_id: claim.id,
            entered_at: now,
            reason,
            sla_due: claim.sla_due,
            sla_window_hours: window_hours,
            hours_remaining,
            sla_risk: risk,
            base_priority: base,
            final_priority: compose_final(base, boost_sum, risk, 0.0),
            boosts,
            attempts: 0,
            attempt_history: Vec::new(),
            consecutive_failures: 0,
            state: EntryState::Unresolved,
        };
        debug!(claim_id = %claim.id, reason = ?reason, priority = entry.final_priority, "claim entered floating pool");
        let id = entry.id;
        self.active.insert(claim.id, entry);
        id
    }

    /// Maintenance pass: re-scores every active entry against the current
    /// claim snapshot. Cancelled claims resolve; claims missing from the
    /// snapshot keep their last known scores.
    pub fn refresh(&mut self, claims: &HashMap<ClaimId, Claim>, today: NaiveDate, now: DateTime<Utc>) {
        let cancelled: Vec<ClaimId> = self
            .active
            .values()
            .filter(|e| {
                claims
                    .get(&e.claim_id)
                    .is_some_and(|c| c.status.is_terminal())
            })
            .map(|e| e.claim_id)
            .collect();
        for claim_id in cancelled {
            self.resolve_cancelled(claim_id, now);
        }

        for entry in self.active.values_mut() {
            let Some(claim) = claims.get(&entry.claim_id) else {
                continue;
            };
            entry.base_priority = score_claim(claim, &self.weights, today);
            entry.hours_remaining = (entry.sla_due - now).num_minutes() as f64 / 60.0;
            entry.sla_risk = SlaRisk::classify(entry.hours_remaining, entry.sla_window_hours);

            let boost_sum = entry.active_boost_sum(now);
            let dwell = dwell_penalty(entry.hours_in_pool(now));
            entry.final_priority = compose_final(entry.base_priority, boost_sum, entry.sla_risk, dwell);
        }
    }

    /// Returns up to `n` active entries ordered by final priority descending,
    /// ties broken by entry timestamp ascending, then claim id
    pub fn top_candidates(&self, n: usize) -> Vec<&PoolEntry> {
        let mut entries: Vec<&PoolEntry> = self.active.values().filter(|e| e.is_active()).collect();
        entries.sort_by(|a, b| {
            b.final_priority
                .total_cmp(&a.final_priority)
                .then_with(|| a.entered_at.cmp(&b.entered_at))
                .then_with(|| a.claim_id.cmp(&b.claim_id))
        });
        entries.truncate(n);
        entries
    }

    /// Records a failed assignment attempt.
    ///
    /// The consecutive-failure counter, not wall-clock time, drives
    /// escalation; crossing the threshold escalates once and boosts the
    /// entry while leaving it eligible for assignment.
    pub fn record_failure(
        &mut self,
        claim_id: ClaimId,
        strategy: StrategyKind,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Option<EscalationNotice> {
        let threshold = self.config.escalation_threshold;
        let boost_value = self.config.escalation_boost;
        let entry = self.active.get_mut(&claim_id)?;
        if !entry.is_active() {
            return None;
        }

        entry.attempts += 1;
        entry.consecutive_failures += 1;
        entry.attempt_history.push(AttemptRecord {
            at: now,
            strategy,
            reason: reason.to_string(),
        });

        if entry.consecutive_failures >= threshold && !entry.is_escalated() {
            entry.state = EntryState::Escalated;
            entry.boosts.push(PriorityBoost {
                kind: BoostKind::Escalation,
                value: boost_value,
                granted_at: now,
                expires_at: None,
            });
            // Reflect the boost immediately instead of waiting for the next
            // maintenance pass
            entry.final_priority += boost_value * entry.sla_risk.multiplier();
            warn!(
                claim_id = %claim_id,
                failures = entry.consecutive_failures,
                boost = boost_value,
                "pool entry escalated"
            );
            return Some(EscalationNotice {
                entry_id: entry.id,
                claim_id,
                consecutive_failures: entry.consecutive_failures,
                boost: boost_value,
            });
        }
        None
    }

    /// Grants an external priority boost (client request, management
    /// override) to an active entry
    pub fn add_boost(
        &mut self,
        claim_id: ClaimId,
        kind: BoostKind,
        value: f64,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        match self.active.get_mut(&claim_id) {
            Some(entry) if entry.is_active() => {
                entry.boosts.push(PriorityBoost {
                    kind,
                    value,
                    granted_at: now,
                    expires_at,
                });
                entry.final_priority += value * entry.sla_risk.multiplier();
                true
            }
            _ => false,
        }
    }

    /// Terminal resolution on successful assignment; returns the resolved
    /// entry's time-in-pool outcome
    pub fn resolve_assigned(&mut self, claim_id: ClaimId, now: DateTime<Utc>) -> Option<(PoolEntryId, f64, AssignmentEfficiency)> {
        let mut entry = self.active.remove(&claim_id)?;
        let hours = entry.hours_in_pool(now);
        let efficiency = AssignmentEfficiency::classify(hours);
        entry.state = EntryState::Assigned {
            at: now,
            hours_in_pool: hours,
            efficiency,
        };
        let id = entry.id;
        self.resolved.push(entry);
        Some((id, hours, efficiency))
    }

    /// Terminal resolution on external cancellation
    pub fn resolve_cancelled(&mut self, claim_id: ClaimId, now: DateTime<Utc>) -> bool {
        match self.active.remove(&claim_id) {
            Some(mut entry) => {
                entry.state = EntryState::Cancelled { at: now };
                self.resolved.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn entry(&self, claim_id: ClaimId) -> Option<&PoolEntry> {
        self.active.get(&claim_id)
    }

    /// Claim ids with an active entry, for reconciliation against storage
    pub fn active_claim_ids(&self) -> Vec<ClaimId> {
        self.active.keys().copied().collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Resolved entry archive, oldest first
    pub fn resolved_entries(&self) -> &[PoolEntry] {
        &self.resolved
    }

    pub fn stats(&self, now: DateTime<Utc>) -> PoolStats {
        let mut risk_counts: HashMap<SlaRisk, usize> = HashMap::new();
        let mut escalated = 0;
        let mut total_hours = 0.0;
        for entry in self.active.values() {
            *risk_counts.entry(entry.sla_risk).or_insert(0) += 1;
            if entry.is_escalated() {
                escalated += 1;
            }
            total_hours += entry.hours_in_pool(now);
        }
        let active = self.active.len();
        PoolStats {
            active,
            escalated,
            risk_counts,
            average_hours_in_pool: if active == 0 { 0.0 } else { total_hours / active as f64 },
            resolved_total: self.resolved.len(),
        }
    }
}
