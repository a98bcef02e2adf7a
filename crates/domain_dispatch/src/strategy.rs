//! Selection strategies
//!
//! Each strategy is a pure function of the claim context and a candidate
//! snapshot: no hidden state, no mutation of inputs, deterministic
//! tie-breaks (worker id last), so every strategy is unit-testable in
//! isolation. The strategy for a scope is chosen by configuration.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, WorkerId};
use crate::capacity::WorkerAvailability;
use crate::config::CapacityConfig;
use crate::priority::UrgencyBand;
use crate::worker::SkillTag;

/// Neutral score used when a worker has no performance history
pub const NEUTRAL_PERFORMANCE: f64 = 50.0;

/// Neutral skill score when a claim declares no required skills
pub const NEUTRAL_SKILL_SCORE: f64 = 50.0;

/// Weighted-hybrid component weights
pub const HYBRID_SKILL_WEIGHT: f64 = 0.30;
pub const HYBRID_LOAD_WEIGHT: f64 = 0.25;
pub const HYBRID_PERFORMANCE_WEIGHT: f64 = 0.25;
pub const HYBRID_PRIORITY_WEIGHT: f64 = 0.20;

/// The interchangeable selection algorithms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RoundRobin,
    SkillMatch,
    LoadBalanced,
    PerformanceRank,
    PriorityFirst,
    #[default]
    WeightedHybrid,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RoundRobin => "round_robin",
            StrategyKind::SkillMatch => "skill_match",
            StrategyKind::LoadBalanced => "load_balanced",
            StrategyKind::PerformanceRank => "performance_rank",
            StrategyKind::PriorityFirst => "priority_first",
            StrategyKind::WeightedHybrid => "weighted_hybrid",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(StrategyKind::RoundRobin),
            "skill_match" => Ok(StrategyKind::SkillMatch),
            "load_balanced" => Ok(StrategyKind::LoadBalanced),
            "performance_rank" => Ok(StrategyKind::PerformanceRank),
            "priority_first" => Ok(StrategyKind::PriorityFirst),
            "weighted_hybrid" => Ok(StrategyKind::WeightedHybrid),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Error for unrecognized strategy names from configuration
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown selection strategy: {0}")]
pub struct UnknownStrategy(pub String);

/// The claim-side inputs a strategy may consult
#[derive(Debug, Clone)]
pub struct ClaimContext {
    pub claim_id: ClaimId,
    pub required_skills: Vec<SkillTag>,
    pub urgency: UrgencyBand,
    pub priority: f64,
}

/// One worker in the candidate set, fully resolved for this batch
#[derive(Debug, Clone)]
pub struct CandidateWorker {
    pub worker_id: WorkerId,
    pub skills: Vec<SkillTag>,
    pub last_assigned_at: Option<DateTime<Utc>>,
    pub availability: WorkerAvailability,
    /// Externally supplied performance score, 0-100; None means no history
    pub performance: Option<f64>,
}

impl CandidateWorker {
    fn performance_or_neutral(&self) -> f64 {
        self.performance.unwrap_or(NEUTRAL_PERFORMANCE)
    }

    fn load_pct(&self) -> f64 {
        self.availability.load_percentage
    }
}

/// Fraction of the claim's required skills this candidate holds, as 0-100.
///
/// Claims with no skill requirements score everyone at the neutral value.
pub fn skill_score(required: &[SkillTag], candidate_skills: &[SkillTag]) -> f64 {
    if required.is_empty() {
        return NEUTRAL_SKILL_SCORE;
    }
    let matched = required
        .iter()
        .filter(|tag| candidate_skills.contains(tag))
        .count();
    matched as f64 / required.len() as f64 * 100.0
}

/// Weighted-hybrid component scores for one candidate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HybridScore {
    pub skill: f64,
    pub inverted_load: f64,
    pub performance: f64,
    pub priority_context: f64,
    pub total: f64,
}

/// Computes the weighted-hybrid score for one candidate.
///
/// Priority context rewards headroom for urgent claims: candidates under
/// the strict capacity threshold score 100, the rest 25. Non-urgent claims
/// get a flat neutral component so skill, load, and performance decide.
pub fn hybrid_score(
    ctx: &ClaimContext,
    candidate: &CandidateWorker,
    capacity: &CapacityConfig,
) -> HybridScore {
    let skill = skill_score(&ctx.required_skills, &candidate.skills);
    let inverted_load = (100.0 - candidate.load_pct()).max(0.0);
    let performance = candidate.performance_or_neutral();
    let priority_context = if ctx.urgency.is_urgent() {
        if candidate.load_pct() < capacity.strict_threshold_pct {
            100.0
        } else {
            25.0
        }
    } else {
        50.0
    };

    let total = skill * HYBRID_SKILL_WEIGHT
        + inverted_load * HYBRID_LOAD_WEIGHT
        + performance * HYBRID_PERFORMANCE_WEIGHT
        + priority_context * HYBRID_PRIORITY_WEIGHT;

    HybridScore {
        skill,
        inverted_load,
        performance,
        priority_context,
        total,
    }
}

/// Picks one worker for the claim, or None when no candidate is usable
pub fn select(
    kind: StrategyKind,
    ctx: &ClaimContext,
    candidates: &[CandidateWorker],
    capacity: &CapacityConfig,
) -> Option<WorkerId> {
    if candidates.is_empty() {
        return None;
    }
    match kind {
        StrategyKind::RoundRobin => round_robin(candidates),
        StrategyKind::SkillMatch => skill_match(ctx, candidates),
        StrategyKind::LoadBalanced => load_balanced(candidates),
        StrategyKind::PerformanceRank => performance_rank(candidates),
        StrategyKind::PriorityFirst => priority_first(ctx, candidates, capacity),
        StrategyKind::WeightedHybrid => weighted_hybrid(ctx, candidates, capacity),
    }
}

/// Oldest most-recent-assignment wins; never-assigned workers go first
fn round_robin(candidates: &[CandidateWorker]) -> Option<WorkerId> {
    pick(candidates, |a, b| {
        a.last_assigned_at
            .cmp(&b.last_assigned_at)
            .then_with(|| a.worker_id.cmp(&b.worker_id))
    })
}

/// Best skill coverage, ties broken by ascending load
fn skill_match(ctx: &ClaimContext, candidates: &[CandidateWorker]) -> Option<WorkerId> {
    pick(candidates, |a, b| {
        let score_a = skill_score(&ctx.required_skills, &a.skills);
        let score_b = skill_score(&ctx.required_skills, &b.skills);
        score_b
            .total_cmp(&score_a)
            .then_with(|| a.load_pct().total_cmp(&b.load_pct()))
            .then_with(|| a.worker_id.cmp(&b.worker_id))
    })
}

/// Minimum load percentage; the universal fallback
fn load_balanced(candidates: &[CandidateWorker]) -> Option<WorkerId> {
    pick(candidates, |a, b| {
        a.load_pct()
            .total_cmp(&b.load_pct())
            .then_with(|| a.worker_id.cmp(&b.worker_id))
    })
}

/// Highest performance score, ties broken by ascending load
fn performance_rank(candidates: &[CandidateWorker]) -> Option<WorkerId> {
    pick(candidates, |a, b| {
        b.performance_or_neutral()
            .total_cmp(&a.performance_or_neutral())
            .then_with(|| a.load_pct().total_cmp(&b.load_pct()))
            .then_with(|| a.worker_id.cmp(&b.worker_id))
    })
}

/// For urgent claims, restrict to candidates under the strict capacity
/// threshold before load-balancing; otherwise plain load-balancing
fn priority_first(
    ctx: &ClaimContext,
    candidates: &[CandidateWorker],
    capacity: &CapacityConfig,
) -> Option<WorkerId> {
    if ctx.urgency.is_urgent() {
        let strict: Vec<CandidateWorker> = candidates
            .iter()
            .filter(|c| c.load_pct() < capacity.strict_threshold_pct)
            .cloned()
            .collect();
        if !strict.is_empty() {
            return load_balanced(&strict);
        }
    }
    load_balanced(candidates)
}

/// Maximum weighted-hybrid total, ties broken by ascending load
fn weighted_hybrid(
    ctx: &ClaimContext,
    candidates: &[CandidateWorker],
    capacity: &CapacityConfig,
) -> Option<WorkerId> {
    pick(candidates, |a, b| {
        let score_a = hybrid_score(ctx, a, capacity).total;
        let score_b = hybrid_score(ctx, b, capacity).total;
        score_b
            .total_cmp(&score_a)
            .then_with(|| a.load_pct().total_cmp(&b.load_pct()))
            .then_with(|| a.worker_id.cmp(&b.worker_id))
    })
}

fn pick(
    candidates: &[CandidateWorker],
    cmp: impl Fn(&CandidateWorker, &CandidateWorker) -> Ordering,
) -> Option<WorkerId> {
    candidates
        .iter()
        .min_by(|a, b| cmp(a, b))
        .map(|c| c.worker_id)
}
