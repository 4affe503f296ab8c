//! Workflow task state tracking.
//!
//! This module implements the task tracking engine: creating task
//! records with their opening state event and payload, advancing tasks
//! through named states while keeping exactly one state event open per
//! task, and querying tasks with their full transition history. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
