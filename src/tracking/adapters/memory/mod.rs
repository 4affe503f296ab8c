//! In-memory adapters for workflow task tracking.

mod store;

pub use store::InMemoryTaskStore;
