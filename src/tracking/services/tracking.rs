//! Service layer for task creation, transitions, and queries.

use crate::tracking::domain::{
    DEFAULT_LIST_LIMIT, ErrorReport, NewTaskRecord, Priority, StateChange, StateName, Task,
    TaskDetail, TaskFilter, TaskId, TaskPayload, TaskSettings, TaskSummary, TrackingDomainError,
    WorkflowId, WorkflowRef,
};
use crate::tracking::ports::{TaskStore, TaskStoreError};
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// State a task enters when the caller names none.
pub const DEFAULT_INITIAL_STATE: &str = "initial";

/// Completion state assumed when the caller names none.
pub const DEFAULT_COMPLETION_STATE: &str = "completion";

/// Workflow version assumed when the caller supplies none.
pub const DEFAULT_WORKFLOW_VERSION: &str = "1.0";

/// Creator identity recorded when the caller supplies none.
pub const DEFAULT_CREATOR_ID: &str = "system";

/// Request payload for creating a workflow task.
///
/// Only the task identifier, workflow name, and prompt are required;
/// everything else falls back to the documented defaults, and a fresh
/// workflow identifier is generated when none is given.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    task_id: String,
    workflow_name: String,
    prompt: String,
    workflow_id: Option<String>,
    workflow_version: Option<String>,
    initial_state: Option<String>,
    completion_state: Option<String>,
    context: Option<String>,
    parameters: Map<String, Value>,
    next_states: Vec<String>,
    creator_id: Option<String>,
    priority: Priority,
    max_retries: i32,
    timeout_seconds: i32,
    error: Option<ErrorReport>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        task_id: impl Into<String>,
        workflow_name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            workflow_name: workflow_name.into(),
            prompt: prompt.into(),
            workflow_id: None,
            workflow_version: None,
            initial_state: None,
            completion_state: None,
            context: None,
            parameters: Map::new(),
            next_states: Vec::new(),
            creator_id: None,
            priority: Priority::Normal,
            max_retries: 3,
            timeout_seconds: 120,
            error: None,
        }
    }

    /// Sets an explicit workflow identifier.
    #[must_use]
    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    /// Sets the workflow version.
    #[must_use]
    pub fn with_workflow_version(mut self, version: impl Into<String>) -> Self {
        self.workflow_version = Some(version.into());
        self
    }

    /// Sets the state the task starts in.
    #[must_use]
    pub fn with_initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    /// Sets the state whose arrival marks success.
    #[must_use]
    pub fn with_completion_state(mut self, state: impl Into<String>) -> Self {
        self.completion_state = Some(state.into());
        self
    }

    /// Sets additional context text.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Sets creation parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets the candidate follow-on state names.
    #[must_use]
    pub fn with_next_states(mut self, next_states: impl IntoIterator<Item = String>) -> Self {
        self.next_states = next_states.into_iter().collect();
        self
    }

    /// Sets the creator identity.
    #[must_use]
    pub fn with_creator_id(mut self, creator_id: impl Into<String>) -> Self {
        self.creator_id = Some(creator_id.into());
        self
    }

    /// Sets the scheduling priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the retry ceiling.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: i32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the per-state timeout in seconds.
    #[must_use]
    pub const fn with_timeout_seconds(mut self, timeout_seconds: i32) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Marks the task as created already carrying an error.
    #[must_use]
    pub fn with_error(mut self, error: ErrorReport) -> Self {
        self.error = Some(error);
        self
    }
}

/// Request payload for advancing a task to a new state.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceStateRequest {
    new_state: String,
    result: Option<String>,
    error: Option<ErrorReport>,
}

impl AdvanceStateRequest {
    /// Creates a request entering `new_state`.
    #[must_use]
    pub fn new(new_state: impl Into<String>) -> Self {
        Self {
            new_state: new_state.into(),
            result: None,
            error: None,
        }
    }

    /// Attaches the result produced in the state being exited.
    #[must_use]
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Attaches an error report to the transition.
    #[must_use]
    pub fn with_error(mut self, error: ErrorReport) -> Self {
        self.error = Some(error);
        self
    }
}

/// Query parameters for task listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    workflow_id: Option<String>,
    state: Option<String>,
    limit: Option<u32>,
}

impl TaskListQuery {
    /// Creates an unfiltered query with the default result cap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            workflow_id: None,
            state: None,
            limit: None,
        }
    }

    /// Restricts results to one workflow.
    #[must_use]
    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    /// Restricts results to tasks currently in the given state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Caps the number of results returned.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Service-level errors for task tracking operations.
#[derive(Debug, Error)]
pub enum TaskTrackingError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TrackingDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for task tracking service operations.
pub type TaskTrackingResult<T> = Result<T, TaskTrackingError>;

/// Task tracking orchestration service.
///
/// Owns the injected store and clock; every operation validates its
/// input, stamps timestamps from the clock, delegates to the store,
/// and logs the outcome. Store failures are logged once here and
/// returned as definitive; the service never retries.
#[derive(Clone)]
pub struct TaskTrackingService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskTrackingService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task tracking service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a workflow task, persisting the task row, its opening
    /// state event, and its payload atomically.
    ///
    /// Returns the task identifier for correlation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Domain`] when input validation
    /// fails and [`TaskTrackingError::Store`] when persistence rejects
    /// the record (including duplicate task identifiers).
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskTrackingResult<TaskId> {
        let record = self.build_record(request)?;
        let task_id = record.task().id().clone();
        match self.store.create(&record).await {
            Ok(()) => {
                tracing::info!(
                    task_id = %task_id,
                    workflow_id = %record.task().workflow().id(),
                    workflow = record.task().workflow().name(),
                    state = record.task().current_state().as_str(),
                    "created workflow task"
                );
                Ok(task_id)
            }
            Err(err) => {
                tracing::error!(task_id = %task_id, error = %err, "failed to create workflow task");
                Err(err.into())
            }
        }
    }

    /// Advances a task to `new_state`, sealing the open state event and
    /// appending the next one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Domain`] when the identifiers fail
    /// validation and [`TaskTrackingError::Store`] when the task does
    /// not exist or persistence fails; nothing is persisted on failure.
    pub async fn advance_state(
        &self,
        task_id: &str,
        request: AdvanceStateRequest,
    ) -> TaskTrackingResult<()> {
        let id = TaskId::new(task_id)?;
        let mut change = StateChange::new(StateName::new(request.new_state)?, self.clock.utc());
        if let Some(result) = request.result {
            change = change.with_result(result);
        }
        if let Some(error) = request.error {
            change = change.with_error(error);
        }

        match self.store.transition(&id, &change).await {
            Ok(()) => {
                tracing::info!(
                    task_id = %id,
                    state = change.new_state().as_str(),
                    has_error = change.has_error(),
                    "advanced task state"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(task_id = %id, error = %err, "failed to advance task state");
                Err(err.into())
            }
        }
    }

    /// Retrieves the full detail for a task.
    ///
    /// Returns `Ok(None)` when the task does not exist; an existing
    /// task with empty payload fields is always `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Store`] when the lookup fails.
    pub async fn get_task(&self, task_id: &str) -> TaskTrackingResult<Option<TaskDetail>> {
        let id = TaskId::new(task_id)?;
        self.store.fetch(&id).await.map_err(|err| {
            tracing::error!(task_id = %id, error = %err, "failed to fetch task");
            TaskTrackingError::from(err)
        })
    }

    /// Lists task summaries matching the query, most recently updated
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Domain`] when a filter value fails
    /// validation and [`TaskTrackingError::Store`] when the listing
    /// fails.
    pub async fn list_tasks(&self, query: TaskListQuery) -> TaskTrackingResult<Vec<TaskSummary>> {
        let mut filter = TaskFilter::new().with_limit(query.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        if let Some(workflow_id) = query.workflow_id {
            filter = filter.with_workflow_id(WorkflowId::new(workflow_id)?);
        }
        if let Some(state) = query.state {
            filter = filter.with_state(StateName::new(state)?);
        }

        self.store.list(&filter).await.map_err(|err| {
            tracing::error!(error = %err, "failed to list tasks");
            TaskTrackingError::from(err)
        })
    }

    /// Administrative wipe of every tracked task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Store`] when the wipe fails.
    pub async fn reset_all(&self) -> TaskTrackingResult<()> {
        match self.store.reset().await {
            Ok(()) => {
                tracing::info!("reset task store, all records deleted");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to reset task store");
                Err(err.into())
            }
        }
    }

    fn build_record(&self, request: CreateTaskRequest) -> TaskTrackingResult<NewTaskRecord> {
        let task_id = TaskId::new(request.task_id)?;
        if request.prompt.trim().is_empty() {
            return Err(TrackingDomainError::EmptyPrompt.into());
        }

        let workflow_id = match request.workflow_id {
            Some(raw) => WorkflowId::new(raw)?,
            None => WorkflowId::generate(),
        };
        let workflow = WorkflowRef::new(
            workflow_id,
            request.workflow_name,
            request
                .workflow_version
                .unwrap_or_else(|| DEFAULT_WORKFLOW_VERSION.to_owned()),
        )?;
        let initial_state = StateName::new(
            request
                .initial_state
                .unwrap_or_else(|| DEFAULT_INITIAL_STATE.to_owned()),
        )?;
        let completion_state = StateName::new(
            request
                .completion_state
                .unwrap_or_else(|| DEFAULT_COMPLETION_STATE.to_owned()),
        )?;
        let next_states = request
            .next_states
            .into_iter()
            .map(StateName::new)
            .collect::<Result<Vec<_>, _>>()?;

        let settings = TaskSettings {
            creator_id: request
                .creator_id
                .unwrap_or_else(|| DEFAULT_CREATOR_ID.to_owned()),
            priority: request.priority,
            max_retries: request.max_retries,
            timeout_seconds: request.timeout_seconds,
        };
        let task = Task::new(
            task_id,
            workflow,
            initial_state,
            completion_state,
            settings,
            &*self.clock,
        );
        let payload = TaskPayload::new(
            request.prompt,
            request.context,
            request.parameters,
            next_states,
            request.error,
        );
        Ok(NewTaskRecord::new(task, payload))
    }
}
