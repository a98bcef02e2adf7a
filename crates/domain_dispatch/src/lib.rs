//! Claim Assignment & Prioritization Domain
//!
//! This crate implements the dispatch engine: dynamic priority scoring,
//! floating-pool lifecycle management, capacity-aware candidate filtering,
//! interchangeable selection strategies, and the assignment coordinator
//! that ties them together.
//!
//! # Dispatch Flow
//!
//! ```text
//! unassigned claims -> floating pool (score, SLA risk, boosts)
//!                   -> ordered candidates -> selection strategy
//!                   -> atomic assignment -> audit record + events
//! ```
//!
//! Persistence and notification delivery live behind the port traits in
//! [`ports`]; the engine computes intended assignments and relies on the
//! storage adapter for conditional-write atomicity.

pub mod claim;
pub mod worker;
pub mod config;
pub mod priority;
pub mod capacity;
pub mod pool;
pub mod strategy;
pub mod coordinator;
pub mod ports;
pub mod events;
pub mod error;

pub use claim::{Claim, ClaimStatus, ClaimType, DenialInfo, PayerCategory, ReassignmentRecord};
pub use worker::{Proficiency, SkillTag, Worker, WorkerSkill};
pub use config::{CapacityConfig, DispatchConfig, PoolConfig};
pub use priority::{priority_score, score_claim, PriorityWeights, UrgencyBand, UrgencyBands};
pub use capacity::{CapacityTracker, WorkerAvailability};
pub use pool::{
    AssignmentEfficiency, BoostKind, EntryState, EscalationNotice, FloatingPoolManager,
    PoolEntry, PoolEntryReason, PoolStats, PriorityBoost, SlaRisk,
};
pub use strategy::{CandidateWorker, ClaimContext, StrategyKind, UnknownStrategy};
pub use coordinator::{
    Actor, AssignOptions, AssignmentCoordinator, AssignmentDetail, AssignmentMethod,
    AssignmentRecord, AssignmentRunSummary, ScoreInputs, SkipReason, SkippedClaim,
};
pub use ports::{AssignOutcome, ClaimFilters, ClaimStore, EventSink, WorkerFilters, WorkerStore};
pub use events::DispatchEvent;
pub use error::DispatchError;
