//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! dispatch engine test suite.
//!
//! # Modules
//!
//! - `memory`: In-memory port adapters (claim store, worker store, event sink)
//! - `builders`: Builder patterns for test data construction
//! - `fixtures`: Pre-built test data for common entities
//! - `assertions`: Custom assertion helpers for dispatch types
//! - `generators`: Property-based test data generators

pub mod memory;
pub mod builders;
pub mod fixtures;
pub mod assertions;
pub mod generators;

pub use memory::*;
pub use builders::*;
pub use fixtures::*;
pub use assertions::*;
pub use generators::*;

use once_cell::sync::OnceCell;

static TRACING: OnceCell<()> = OnceCell::new();

/// Initializes tracing once per test binary; honors `RUST_LOG`
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}
