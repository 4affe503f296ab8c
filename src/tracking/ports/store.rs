//! Store port for task persistence, transitions, and queries.

use crate::tracking::domain::{
    NewTaskRecord, StateChange, TaskDetail, TaskFilter, TaskId, TaskSummary,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
///
/// Each operation is independently transactional: it either applies
/// fully or leaves the store unchanged. Implementations assume a single
/// logical writer per task; concurrent transitions on one task must be
/// serialised by the caller.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Atomically inserts a task, its opening state event, and its
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the task ID
    /// already exists.
    async fn create(&self, record: &NewTaskRecord) -> TaskStoreResult<()>;

    /// Applies one state transition: seals the open state event,
    /// appends a new one, recomputes the task's derived flags, and
    /// folds the result and error into the payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::TaskNotFound`] when the task does not
    /// exist; nothing is persisted in that case.
    async fn transition(&self, task_id: &TaskId, change: &StateChange) -> TaskStoreResult<()>;

    /// Retrieves the full detail for a task, state history ordered by
    /// entry time ascending.
    ///
    /// Returns `None` when the task does not exist.
    async fn fetch(&self, task_id: &TaskId) -> TaskStoreResult<Option<TaskDetail>>;

    /// Lists task summaries matching the filter, most recently updated
    /// first, capped at the filter's limit.
    async fn list(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<TaskSummary>>;

    /// Administrative wipe: deletes every task, state event, and
    /// payload in one transaction.
    async fn reset(&self) -> TaskStoreResult<()>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
