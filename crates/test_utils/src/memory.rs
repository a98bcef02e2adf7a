//! In-memory port adapters
//!
//! Deterministic, single-process implementations of the dispatch ports for
//! tests. The claim store honors the conditional-write contract of
//! `atomic_assign`, and both stores offer fault-injection toggles so tests
//! can exercise conflict and degradation paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use core_kernel::{ClaimId, CompanyId, DomainPort, PortError, WorkerId};
use domain_dispatch::{
    AssignOutcome, AssignmentRecord, Claim, ClaimFilters, ClaimStatus, ClaimStore, DispatchEvent,
    EventSink, ReassignmentRecord, Worker, WorkerFilters, WorkerStore,
};

/// In-memory claim store
#[derive(Default)]
pub struct InMemoryClaimStore {
    claims: Mutex<HashMap<ClaimId, Claim>>,
    assignments: Mutex<Vec<AssignmentRecord>>,
    forced_conflicts: Mutex<HashSet<ClaimId>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, claim: Claim) {
        self.claims.lock().unwrap().insert(claim.id, claim);
    }

    pub fn get(&self, claim_id: ClaimId) -> Option<Claim> {
        self.claims.lock().unwrap().get(&claim_id).cloned()
    }

    /// Every audit record written so far
    pub fn assignment_records(&self) -> Vec<AssignmentRecord> {
        self.assignments.lock().unwrap().clone()
    }

    /// Forces the next `atomic_assign` for this claim to report a lost race
    pub fn force_conflict(&self, claim_id: ClaimId) {
        self.forced_conflicts.lock().unwrap().insert(claim_id);
    }

    /// Open claims currently referencing this worker
    pub fn open_claim_count(&self, worker_id: WorkerId) -> u32 {
        self.claims
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.assigned_to == Some(worker_id) && c.status.is_open())
            .count() as u32
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn find_unassigned(
        &self,
        scope: CompanyId,
        filters: &ClaimFilters,
    ) -> Result<Vec<Claim>, PortError> {
        let claims = self.claims.lock().unwrap();
        let mut found: Vec<Claim> = claims
            .values()
            .filter(|c| c.company_id == scope && c.is_poolable())
            .filter(|c| filters.claim_type.map_or(true, |t| c.claim_type == t))
            .filter(|c| filters.payer.map_or(true, |p| c.payer == p))
            .cloned()
            .collect();
        found.sort_by_key(|c| c.id);
        if let Some(limit) = filters.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn find_by_id(&self, claim_id: ClaimId) -> Result<Option<Claim>, PortError> {
        Ok(self.get(claim_id))
    }

    async fn atomic_assign(
        &self,
        claim_id: ClaimId,
        worker_id: WorkerId,
    ) -> Result<AssignOutcome, PortError> {
        if self.forced_conflicts.lock().unwrap().remove(&claim_id) {
            return Ok(AssignOutcome::Conflict);
        }
        let mut claims = self.claims.lock().unwrap();
        let claim = claims
            .get_mut(&claim_id)
            .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
        if claim.assigned_to.is_some() || claim.status.is_terminal() {
            return Ok(AssignOutcome::Conflict);
        }
        claim.assigned_to = Some(worker_id);
        Ok(AssignOutcome::Assigned)
    }

    async fn update_status(&self, claim_id: ClaimId, status: ClaimStatus) -> Result<(), PortError> {
        let mut claims = self.claims.lock().unwrap();
        let claim = claims
            .get_mut(&claim_id)
            .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
        claim.status = status;
        Ok(())
    }

    async fn clear_assignment(&self, claim_id: ClaimId) -> Result<(), PortError> {
        let mut claims = self.claims.lock().unwrap();
        let claim = claims
            .get_mut(&claim_id)
            .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
        claim.assigned_to = None;
        claim.status = ClaimStatus::New;
        Ok(())
    }

    async fn append_reassignment(
        &self,
        claim_id: ClaimId,
        record: ReassignmentRecord,
    ) -> Result<(), PortError> {
        let mut claims = self.claims.lock().unwrap();
        let claim = claims
            .get_mut(&claim_id)
            .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
        claim.reassignments.push(record);
        Ok(())
    }

    async fn record_assignment(&self, record: &AssignmentRecord) -> Result<(), PortError> {
        self.assignments.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// In-memory worker store; open-claim counts are derived from the claim
/// store at call time, never cached
pub struct InMemoryWorkerStore {
    workers: Mutex<HashMap<WorkerId, Worker>>,
    performance: Mutex<HashMap<WorkerId, f64>>,
    claims: Arc<InMemoryClaimStore>,
    fail_performance: AtomicBool,
}

impl InMemoryWorkerStore {
    pub fn new(claims: Arc<InMemoryClaimStore>) -> Arc<Self> {
        Arc::new(Self {
            workers: Mutex::new(HashMap::new()),
            performance: Mutex::new(HashMap::new()),
            claims,
            fail_performance: AtomicBool::new(false),
        })
    }

    pub fn insert(&self, worker: Worker) {
        self.workers.lock().unwrap().insert(worker.id, worker);
    }

    pub fn set_performance(&self, worker_id: WorkerId, score: f64) {
        self.performance.lock().unwrap().insert(worker_id, score);
    }

    /// Makes every performance lookup fail, for degradation tests
    pub fn fail_performance_lookups(&self, fail: bool) {
        self.fail_performance.store(fail, Ordering::SeqCst);
    }
}

impl DomainPort for InMemoryWorkerStore {}

#[async_trait]
impl WorkerStore for InMemoryWorkerStore {
    async fn find_available(
        &self,
        scope: CompanyId,
        filters: &WorkerFilters,
    ) -> Result<Vec<Worker>, PortError> {
        let workers = self.workers.lock().unwrap();
        let mut found: Vec<Worker> = workers
            .values()
            .filter(|w| w.company_id == scope && w.active)
            .filter(|w| filters.skill.map_or(true, |s| w.has_skill(s)))
            .filter(|w| {
                filters
                    .department
                    .as_ref()
                    .map_or(true, |d| w.department.as_deref() == Some(d.as_str()))
            })
            .filter(|w| {
                filters
                    .role
                    .as_ref()
                    .map_or(true, |r| w.role.as_deref() == Some(r.as_str()))
            })
            .cloned()
            .collect();
        found.sort_by_key(|w| w.id);
        Ok(found)
    }

    async fn find_by_id(&self, worker_id: WorkerId) -> Result<Option<Worker>, PortError> {
        Ok(self.workers.lock().unwrap().get(&worker_id).cloned())
    }

    async fn count_open_claims(&self, worker_id: WorkerId) -> Result<u32, PortError> {
        Ok(self.claims.open_claim_count(worker_id))
    }

    async fn performance_score(&self, worker_id: WorkerId) -> Result<Option<f64>, PortError> {
        if self.fail_performance.load(Ordering::SeqCst) {
            return Err(PortError::connection("performance service unavailable"));
        }
        Ok(self.performance.lock().unwrap().get(&worker_id).copied())
    }
}

/// Event sink that records everything it is given
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<DispatchEvent>>,
    fail: AtomicBool,
}

impl RecordingEventSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<DispatchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.event_type()).collect()
    }

    /// Makes every emission fail, to prove sink failures never break
    /// assignment operations
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl DomainPort for RecordingEventSink {}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn emit(&self, event: DispatchEvent) -> Result<(), PortError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::connection("sink unavailable"));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
