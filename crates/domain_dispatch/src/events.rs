//! Dispatch domain events
//!
//! Emitted to the event sink after assignment state changes. Delivery is
//! fire-and-forget: sink failures are logged by the coordinator, never
//! propagated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, PoolEntryId, WorkerId};

/// Events the engine emits to the surrounding application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    ClaimAssigned {
        claim_id: ClaimId,
        worker_id: WorkerId,
        method: String,
        actor: String,
        at: DateTime<Utc>,
    },
    ClaimReassigned {
        claim_id: ClaimId,
        previous_worker: WorkerId,
        new_worker: WorkerId,
        /// Worker this notification is addressed to; reassignment notifies
        /// both sides when they differ
        recipient: WorkerId,
        actor: String,
        reason: String,
        at: DateTime<Utc>,
    },
    ClaimUnassigned {
        claim_id: ClaimId,
        previous_worker: WorkerId,
        actor: String,
        reason: String,
        at: DateTime<Utc>,
    },
    ClaimEscalated {
        claim_id: ClaimId,
        entry_id: PoolEntryId,
        consecutive_failures: u32,
        boost: f64,
        at: DateTime<Utc>,
    },
}

impl DispatchEvent {
    /// Stable event type tag for routing in sinks
    pub fn event_type(&self) -> &'static str {
        match self {
            DispatchEvent::ClaimAssigned { .. } => "claim_assigned",
            DispatchEvent::ClaimReassigned { .. } => "claim_reassigned",
            DispatchEvent::ClaimUnassigned { .. } => "claim_unassigned",
            DispatchEvent::ClaimEscalated { .. } => "claim_escalated",
        }
    }

    /// JSON payload for sinks that forward raw documents
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn claim_id(&self) -> ClaimId {
        match self {
            DispatchEvent::ClaimAssigned { claim_id, .. }
            | DispatchEvent::ClaimReassigned { claim_id, .. }
            | DispatchEvent::ClaimUnassigned { claim_id, .. }
            | DispatchEvent::ClaimEscalated { claim_id, .. } => *claim_id,
        }
    }
}
