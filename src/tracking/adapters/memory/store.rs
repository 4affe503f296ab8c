//! In-memory task store for tests and embedded deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::tracking::domain::{
    NewTaskRecord, StateChange, StateEvent, Task, TaskDetail, TaskFilter, TaskId, TaskPayload,
    TaskSummary,
};
use crate::tracking::ports::{TaskStore, TaskStoreError, TaskStoreResult};

/// Thread-safe in-memory task store.
///
/// Applies the same domain transition algebra as the `PostgreSQL`
/// adapter, so the two backends stay behaviourally identical. Each
/// instance is fully isolated, which gives every test its own store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<HashMap<TaskId, StoredTask>>>,
}

#[derive(Debug, Clone)]
struct StoredTask {
    task: Task,
    payload: TaskPayload,
    history: Vec<StateEvent>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned<E: std::fmt::Display>(err: E) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, record: &NewTaskRecord) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let task_id = record.task().id().clone();
        if state.contains_key(&task_id) {
            return Err(TaskStoreError::DuplicateTask(task_id));
        }

        state.insert(
            task_id,
            StoredTask {
                task: record.task().clone(),
                payload: record.payload().clone(),
                history: vec![record.opening_event().clone()],
            },
        );
        Ok(())
    }

    async fn transition(&self, task_id: &TaskId, change: &StateChange) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored = state
            .get_mut(task_id)
            .ok_or_else(|| TaskStoreError::TaskNotFound(task_id.clone()))?;

        let exited_state = stored.task.current_state().clone();
        if let Some(open_event) = stored.history.iter_mut().find(|event| event.is_open()) {
            open_event.seal(change.occurred_at(), change.result().map(ToOwned::to_owned));
        }
        stored.history.push(StateEvent::open_for_change(change));
        stored.task.apply_transition(change);
        stored.payload.record_transition(&exited_state, change);
        Ok(())
    }

    async fn fetch(&self, task_id: &TaskId) -> TaskStoreResult<Option<TaskDetail>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let detail = state.get(task_id).map(|stored| {
            TaskDetail::from_parts(
                stored.task.clone(),
                stored.payload.clone(),
                stored.history.clone(),
            )
        });
        Ok(detail)
    }

    async fn list(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<TaskSummary>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut summaries: Vec<TaskSummary> = state
            .values()
            .filter(|stored| {
                filter
                    .workflow_id()
                    .is_none_or(|id| stored.task.workflow().id() == id)
            })
            .filter(|stored| {
                filter
                    .state()
                    .is_none_or(|name| stored.task.current_state() == name)
            })
            .map(|stored| TaskSummary::from_task(&stored.task))
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries.truncate(usize::try_from(filter.limit()).unwrap_or(usize::MAX));
        Ok(summaries)
    }

    async fn reset(&self) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state.clear();
        Ok(())
    }
}
