//! Stateline: workflow task state tracking engine.
//!
//! This crate records the lifecycle of workflow tasks: each task moves
//! through named states, every visit to a state is captured as a timed
//! event, and per-state results accumulate on the task's payload.
//!
//! # Architecture
//!
//! Stateline follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`tracking`]: Task creation, state transitions, and history queries

pub mod tracking;
