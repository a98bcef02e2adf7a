//! Capacity tracking
//!
//! Load is always recomputed from the claim set at decision time and never
//! persisted, so concurrent writers cannot observe a stale stored count.

use serde::{Deserialize, Serialize};

use core_kernel::WorkerId;
use crate::config::CapacityConfig;
use crate::worker::Worker;

/// Point-in-time availability snapshot for one worker
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkerAvailability {
    pub worker_id: WorkerId,
    pub current_load: u32,
    pub max_capacity: u32,
    pub load_percentage: f64,
    pub is_available: bool,
}

/// Computes worker availability against configured thresholds
#[derive(Debug, Clone)]
pub struct CapacityTracker {
    config: CapacityConfig,
}

impl CapacityTracker {
    pub fn new(config: CapacityConfig) -> Self {
        Self { config }
    }

    /// Availability for one worker given its externally counted open load.
    ///
    /// A worker without a declared capacity uses the configured default; a
    /// worker explicitly capped at zero is always unavailable.
    pub fn availability(&self, worker: &Worker, current_load: u32) -> WorkerAvailability {
        let max_capacity = worker
            .max_daily_capacity
            .unwrap_or(self.config.default_max_capacity);

        if max_capacity == 0 {
            return WorkerAvailability {
                worker_id: worker.id,
                current_load,
                max_capacity,
                load_percentage: 100.0,
                is_available: false,
            };
        }

        let load_percentage = f64::from(current_load) / f64::from(max_capacity) * 100.0;
        WorkerAvailability {
            worker_id: worker.id,
            current_load,
            max_capacity,
            load_percentage,
            is_available: worker.active && load_percentage < self.config.available_threshold_pct,
        }
    }

    /// Re-evaluates a snapshot after an in-batch assignment bumped its load
    pub fn after_assignment(&self, snapshot: &WorkerAvailability) -> WorkerAvailability {
        let current_load = snapshot.current_load + 1;
        let load_percentage = if snapshot.max_capacity == 0 {
            100.0
        } else {
            f64::from(current_load) / f64::from(snapshot.max_capacity) * 100.0
        };
        WorkerAvailability {
            worker_id: snapshot.worker_id,
            current_load,
            max_capacity: snapshot.max_capacity,
            load_percentage,
            is_available: load_percentage < self.config.available_threshold_pct,
        }
    }
}
