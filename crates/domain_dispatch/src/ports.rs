//! Storage and event ports
//!
//! The engine computes intended assignments; durability and atomicity live
//! behind these traits. The storage adapter must make `atomic_assign` a
//! conditional write (assign only while unassigned) so concurrent
//! coordinators cannot double-assign a claim or blow past worker capacity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, CompanyId, DomainPort, PortError, WorkerId};
use crate::claim::{Claim, ClaimStatus, ClaimType, PayerCategory, ReassignmentRecord};
use crate::coordinator::AssignmentRecord;
use crate::events::DispatchEvent;
use crate::worker::{SkillTag, Worker};

/// Result of the conditional assignment write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOutcome {
    /// The claim was unassigned and is now assigned to the worker
    Assigned,
    /// Another process assigned the claim first
    Conflict,
}

/// Optional constraints when fetching unassigned claims
#[derive(Debug, Clone, Default)]
pub struct ClaimFilters {
    pub claim_type: Option<ClaimType>,
    pub payer: Option<PayerCategory>,
    pub limit: Option<usize>,
}

/// Optional constraints when fetching candidate workers
#[derive(Debug, Clone, Default)]
pub struct WorkerFilters {
    pub skill: Option<SkillTag>,
    pub department: Option<String>,
    pub role: Option<String>,
}

/// Claim persistence port
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// All unassigned, non-terminal claims in scope
    async fn find_unassigned(
        &self,
        scope: CompanyId,
        filters: &ClaimFilters,
    ) -> Result<Vec<Claim>, PortError>;

    async fn find_by_id(&self, claim_id: ClaimId) -> Result<Option<Claim>, PortError>;

    /// Conditional write: sets the assigned worker only if the claim is
    /// currently unassigned. Must be atomic at the storage layer.
    async fn atomic_assign(
        &self,
        claim_id: ClaimId,
        worker_id: WorkerId,
    ) -> Result<AssignOutcome, PortError>;

    async fn update_status(&self, claim_id: ClaimId, status: ClaimStatus) -> Result<(), PortError>;

    /// Clears the assigned worker and reverts the claim to New
    async fn clear_assignment(&self, claim_id: ClaimId) -> Result<(), PortError>;

    async fn append_reassignment(
        &self,
        claim_id: ClaimId,
        record: ReassignmentRecord,
    ) -> Result<(), PortError>;

    /// Appends an immutable audit record for a successful assignment
    async fn record_assignment(&self, record: &AssignmentRecord) -> Result<(), PortError>;
}

/// Worker read port; workers are owned by an external HR subsystem
#[async_trait]
pub trait WorkerStore: DomainPort {
    async fn find_available(
        &self,
        scope: CompanyId,
        filters: &WorkerFilters,
    ) -> Result<Vec<Worker>, PortError>;

    async fn find_by_id(&self, worker_id: WorkerId) -> Result<Option<Worker>, PortError>;

    /// Open (assigned or in-progress) claim count, recomputed from the
    /// claim set at call time
    async fn count_open_claims(&self, worker_id: WorkerId) -> Result<u32, PortError>;

    /// Latest performance score 0-100; Ok(None) means no history
    async fn performance_score(&self, worker_id: WorkerId) -> Result<Option<f64>, PortError>;
}

/// Fire-and-forget event sink
#[async_trait]
pub trait EventSink: DomainPort {
    async fn emit(&self, event: DispatchEvent) -> Result<(), PortError>;
}
