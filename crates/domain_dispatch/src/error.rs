//! Dispatch domain errors

use thiserror::Error;

use core_kernel::{ClaimId, PortError, WorkerId};
use crate::claim::ClaimStatus;

/// Errors that can occur in the dispatch domain.
///
/// Per-claim conditions inside a batch (no eligible workers, a lost
/// assignment race) are not errors; they surface as skip reasons in the
/// batch summary.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Worker {worker_id} is at capacity ({current_load}/{max_capacity})")]
    CapacityExceeded {
        worker_id: WorkerId,
        current_load: u32,
        max_capacity: u32,
    },

    #[error("Claim {claim_id} was assigned by a concurrent process")]
    AssignmentConflict { claim_id: ClaimId },

    #[error("Claim {claim_id} has no assigned worker")]
    NotAssigned { claim_id: ClaimId },

    #[error("Invalid status transition from {from:?} to {to:?}")]
    InvalidStatusTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Store(#[from] PortError),
}

impl DispatchError {
    pub fn claim_not_found(id: ClaimId) -> Self {
        DispatchError::NotFound {
            entity: "Claim",
            id: id.to_string(),
        }
    }

    pub fn worker_not_found(id: WorkerId) -> Self {
        DispatchError::NotFound {
            entity: "Worker",
            id: id.to_string(),
        }
    }
}
