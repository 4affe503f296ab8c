//! Read models returned by the query surface.

use super::{StateEvent, StateName, Task, TaskId, TaskPayload, WorkflowId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default cap on `list` results when the caller gives none.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Full detail for one task: the aggregate, its payload, and its state
/// history ordered by entry time ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetail {
    task: Task,
    payload: TaskPayload,
    history: Vec<StateEvent>,
}

impl TaskDetail {
    /// Assembles a detail view from its stored parts.
    #[must_use]
    pub const fn from_parts(task: Task, payload: TaskPayload, history: Vec<StateEvent>) -> Self {
        Self {
            task,
            payload,
            history,
        }
    }

    /// Returns the task aggregate.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the task payload.
    #[must_use]
    pub const fn payload(&self) -> &TaskPayload {
        &self.payload
    }

    /// Returns the state history, oldest entry first.
    #[must_use]
    pub fn history(&self) -> &[StateEvent] {
        &self.history
    }
}

/// Listing projection of a task; no payload, no history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    /// Task identifier.
    pub task_id: TaskId,
    /// Owning workflow identifier.
    pub workflow_id: WorkflowId,
    /// Owning workflow name.
    pub workflow_name: String,
    /// State the task currently occupies.
    pub current_state: StateName,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest transition timestamp.
    pub updated_at: DateTime<Utc>,
    /// Whether the most recent transition reached completion.
    pub is_complete: bool,
    /// Whether the most recent transition carried an error.
    pub has_error: bool,
}

impl TaskSummary {
    /// Projects a summary out of a task aggregate.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.id().clone(),
            workflow_id: task.workflow().id().clone(),
            workflow_name: task.workflow().name().to_owned(),
            current_state: task.current_state().clone(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            is_complete: task.is_complete(),
            has_error: task.has_error(),
        }
    }
}

/// Conjunctive filter and cap for task listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    workflow_id: Option<WorkflowId>,
    state: Option<StateName>,
    limit: u32,
}

impl TaskFilter {
    /// Creates an unfiltered query capped at [`DEFAULT_LIST_LIMIT`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            workflow_id: None,
            state: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Restricts results to one workflow.
    #[must_use]
    pub fn with_workflow_id(mut self, workflow_id: WorkflowId) -> Self {
        self.workflow_id = Some(workflow_id);
        self
    }

    /// Restricts results to tasks currently in the given state.
    #[must_use]
    pub fn with_state(mut self, state: StateName) -> Self {
        self.state = Some(state);
        self
    }

    /// Caps the number of results returned.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the workflow filter, if any.
    #[must_use]
    pub const fn workflow_id(&self) -> Option<&WorkflowId> {
        self.workflow_id.as_ref()
    }

    /// Returns the current-state filter, if any.
    #[must_use]
    pub const fn state(&self) -> Option<&StateName> {
        self.state.as_ref()
    }

    /// Returns the result cap.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self::new()
    }
}
