//! Port contracts for workflow task tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by tracking
//! services.

pub mod store;

pub use store::{TaskStore, TaskStoreError, TaskStoreResult};
