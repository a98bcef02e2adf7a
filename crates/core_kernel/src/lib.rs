//! Core Kernel - Foundational types for the claim dispatch engine
//!
//! This crate provides the fundamental building blocks used across the
//! dispatch domain:
//! - Strongly-typed identifiers for claims, workers, and pool entries
//! - The shared error type
//! - Port abstractions for storage and event collaborators

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{AssignmentId, ClaimId, CompanyId, PoolEntryId, WorkerId};
pub use error::CoreError;
pub use ports::{DomainPort, PortError};
