//! Task aggregate root and workflow metadata.

use super::{Priority, StateChange, StateName, TaskId, TrackingDomainError, WorkflowId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Identity of the workflow definition a task is an instance of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRef {
    id: WorkflowId,
    name: String,
    version: String,
}

impl WorkflowRef {
    /// Creates a validated workflow reference.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::EmptyWorkflowName`] when the name
    /// is empty after trimming.
    pub fn new(
        id: WorkflowId,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, TrackingDomainError> {
        let raw_name = name.into();
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(TrackingDomainError::EmptyWorkflowName);
        }
        Ok(Self {
            id,
            name: trimmed.to_owned(),
            version: version.into(),
        })
    }

    /// Returns the workflow identifier.
    #[must_use]
    pub const fn id(&self) -> &WorkflowId {
        &self.id
    }

    /// Returns the workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the workflow version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Scheduling and retry settings fixed at task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSettings {
    /// Identity of the creating principal.
    pub creator_id: String,
    /// Relative priority.
    pub priority: Priority,
    /// Retries the upstream runner may attempt.
    pub max_retries: i32,
    /// Per-state timeout the upstream runner enforces, in seconds.
    pub timeout_seconds: i32,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            creator_id: "system".to_owned(),
            priority: Priority::Normal,
            max_retries: 3,
            timeout_seconds: 120,
        }
    }
}

/// Task aggregate root: one workflow instance being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    workflow: WorkflowRef,
    current_state: StateName,
    completion_state: StateName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    creator_id: String,
    priority: Priority,
    max_retries: i32,
    retry_count: i32,
    timeout_seconds: i32,
    is_complete: bool,
    has_error: bool,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted workflow reference.
    pub workflow: WorkflowRef,
    /// Persisted current state.
    pub current_state: StateName,
    /// Persisted completion state.
    pub completion_state: StateName,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest transition timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted creator identity.
    pub creator_id: String,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted retry ceiling.
    pub max_retries: i32,
    /// Persisted retries consumed.
    pub retry_count: i32,
    /// Persisted per-state timeout.
    pub timeout_seconds: i32,
    /// Persisted completion flag.
    pub is_complete: bool,
    /// Persisted error flag.
    pub has_error: bool,
}

impl Task {
    /// Creates a new task entering `initial_state`.
    ///
    /// Completion and error flags start false even when the initial and
    /// completion states coincide; only a transition recomputes them.
    #[must_use]
    pub fn new(
        id: TaskId,
        workflow: WorkflowRef,
        initial_state: StateName,
        completion_state: StateName,
        settings: TaskSettings,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id,
            workflow,
            current_state: initial_state,
            completion_state,
            created_at: timestamp,
            updated_at: timestamp,
            creator_id: settings.creator_id,
            priority: settings.priority,
            max_retries: settings.max_retries,
            retry_count: 0,
            timeout_seconds: settings.timeout_seconds,
            is_complete: false,
            has_error: false,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            workflow: data.workflow,
            current_state: data.current_state,
            completion_state: data.completion_state,
            created_at: data.created_at,
            updated_at: data.updated_at,
            creator_id: data.creator_id,
            priority: data.priority,
            max_retries: data.max_retries,
            retry_count: data.retry_count,
            timeout_seconds: data.timeout_seconds,
            is_complete: data.is_complete,
            has_error: data.has_error,
        }
    }

    /// Moves the task into the transition's new state.
    ///
    /// Recomputes the derived flags: `is_complete` holds iff the
    /// entered state is the completion state, and `has_error` reflects
    /// this transition's error only, not history. A self-loop (new
    /// state equal to the current one) is valid.
    pub fn apply_transition(&mut self, change: &StateChange) {
        self.current_state = change.new_state().clone();
        self.updated_at = change.occurred_at();
        self.is_complete = self.current_state == self.completion_state;
        self.has_error = change.has_error();
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the workflow reference.
    #[must_use]
    pub const fn workflow(&self) -> &WorkflowRef {
        &self.workflow
    }

    /// Returns the state the task currently occupies.
    #[must_use]
    pub const fn current_state(&self) -> &StateName {
        &self.current_state
    }

    /// Returns the state whose arrival marks success.
    #[must_use]
    pub const fn completion_state(&self) -> &StateName {
        &self.completion_state
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest transition timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the identity of the creating principal.
    #[must_use]
    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the retry ceiling.
    #[must_use]
    pub const fn max_retries(&self) -> i32 {
        self.max_retries
    }

    /// Returns the retries consumed so far.
    #[must_use]
    pub const fn retry_count(&self) -> i32 {
        self.retry_count
    }

    /// Returns the per-state timeout in seconds.
    #[must_use]
    pub const fn timeout_seconds(&self) -> i32 {
        self.timeout_seconds
    }

    /// Returns whether the most recent transition reached completion.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Returns whether the most recent transition carried an error.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.has_error
    }
}
