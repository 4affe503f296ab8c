//! `PostgreSQL` store implementation for workflow task tracking.

use super::{
    models::{
        NewPayloadRow, NewStateEventRow, NewTaskRow, PayloadRow, PayloadTransitionChangeset,
        SealEventChangeset, StateEventRow, TaskRow, TaskTransitionChangeset,
    },
    schema::{task_payloads, task_state_events, tasks},
};
use crate::tracking::config::StoreConfig;
use crate::tracking::domain::{
    ErrorReport, NewTaskRecord, PersistedPayloadData, PersistedStateEventData, PersistedTaskData,
    Priority, StateChange, StateEvent, StateName, Task, TaskDetail, TaskFilter, TaskId,
    TaskPayload, TaskSummary, WorkflowId, WorkflowRef,
};
use crate::tracking::ports::{TaskStore, TaskStoreError, TaskStoreResult};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// `PostgreSQL` connection pool type used by tracking adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
///
/// Every public operation runs as a single transaction on one pooled
/// connection, offloaded to a blocking thread via
/// [`tokio::task::spawn_blocking`] so the async runtime is never
/// blocked on database I/O.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl From<DieselError> for TaskStoreError {
    fn from(err: DieselError) -> Self {
        // Unique violations are mapped where the offending identifier
        // is in scope; everything reaching this point is a plain
        // persistence fault.
        Self::persistence(err)
    }
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool from configuration and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the pool cannot be
    /// established.
    pub fn connect(config: &StoreConfig) -> TaskStoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(config.database_url());
        let pool = Pool::builder()
            .max_size(config.pool_size())
            .build(manager)
            .map_err(TaskStoreError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn create(&self, record: &NewTaskRecord) -> TaskStoreResult<()> {
        let task_id = record.task().id().clone();
        let task_row = to_new_task_row(record.task());
        let event_row = to_new_event_row(record.task().id(), record.opening_event());
        let payload_row = to_new_payload_row(record.task().id(), record.payload())?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&task_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskStoreError::DuplicateTask(task_id.clone())
                        }
                        other => TaskStoreError::persistence(other),
                    })?;
                diesel::insert_into(task_state_events::table)
                    .values(&event_row)
                    .execute(tx)?;
                diesel::insert_into(task_payloads::table)
                    .values(&payload_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn transition(&self, task_id: &TaskId, change: &StateChange) -> TaskStoreResult<()> {
        let id = task_id.clone();
        let requested = change.clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| {
                let row = tasks::table
                    .find(id.as_str())
                    .select(TaskRow::as_select())
                    .first::<TaskRow>(tx)
                    .optional()?;
                let Some(task_row) = row else {
                    return Err(TaskStoreError::TaskNotFound(id.clone()));
                };
                let mut task = row_to_task(task_row)?;
                let exited_state = task.current_state().clone();

                seal_open_event(tx, &id, &requested)?;

                let entering = StateEvent::open_for_change(&requested);
                diesel::insert_into(task_state_events::table)
                    .values(&to_new_event_row(&id, &entering))
                    .execute(tx)?;

                task.apply_transition(&requested);
                diesel::update(tasks::table.find(id.as_str()))
                    .set(&TaskTransitionChangeset {
                        current_state: task.current_state().as_str().to_owned(),
                        updated_at: task.updated_at(),
                        is_complete: task.is_complete(),
                        has_error: task.has_error(),
                    })
                    .execute(tx)?;

                fold_into_payload(tx, &id, &exited_state, &requested)?;
                Ok(())
            })
        })
        .await
    }

    async fn fetch(&self, task_id: &TaskId) -> TaskStoreResult<Option<TaskDetail>> {
        let id = task_id.clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| {
                let joined = tasks::table
                    .inner_join(task_payloads::table)
                    .filter(tasks::task_id.eq(id.as_str()))
                    .select((TaskRow::as_select(), PayloadRow::as_select()))
                    .first::<(TaskRow, PayloadRow)>(tx)
                    .optional()?;
                let Some((task_row, payload_row)) = joined else {
                    return Ok(None);
                };

                let event_rows = task_state_events::table
                    .filter(task_state_events::task_id.eq(id.as_str()))
                    .order((
                        task_state_events::entered_at.asc(),
                        task_state_events::id.asc(),
                    ))
                    .select(StateEventRow::as_select())
                    .load::<StateEventRow>(tx)?;

                let task = row_to_task(task_row)?;
                let payload = row_to_payload(&id, payload_row);
                let history = event_rows
                    .into_iter()
                    .map(row_to_event)
                    .collect::<TaskStoreResult<Vec<_>>>()?;
                Ok(Some(TaskDetail::from_parts(task, payload, history)))
            })
        })
        .await
    }

    async fn list(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<TaskSummary>> {
        let workflow_id = filter.workflow_id().map(|id| id.as_str().to_owned());
        let state = filter.state().map(|name| name.as_str().to_owned());
        let limit = i64::from(filter.limit());

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| {
                let mut query = tasks::table.into_boxed();
                if let Some(workflow) = workflow_id {
                    query = query.filter(tasks::workflow_id.eq(workflow));
                }
                if let Some(current) = state {
                    query = query.filter(tasks::current_state.eq(current));
                }

                let rows = query
                    .order(tasks::updated_at.desc())
                    .limit(limit)
                    .select(TaskRow::as_select())
                    .load::<TaskRow>(tx)?;
                rows.into_iter()
                    .map(|row| row_to_task(row).map(|task| TaskSummary::from_task(&task)))
                    .collect()
            })
        })
        .await
    }

    async fn reset(&self) -> TaskStoreResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskStoreError, _>(|tx| {
                diesel::delete(task_state_events::table).execute(tx)?;
                diesel::delete(task_payloads::table).execute(tx)?;
                diesel::delete(tasks::table).execute(tx)?;
                Ok(())
            })
        })
        .await
    }
}

/// Seals the single open state event for a task, if one exists.
fn seal_open_event(
    connection: &mut PgConnection,
    task_id: &TaskId,
    change: &StateChange,
) -> TaskStoreResult<()> {
    let open_row = task_state_events::table
        .filter(task_state_events::task_id.eq(task_id.as_str()))
        .filter(task_state_events::exited_at.is_null())
        .select(StateEventRow::as_select())
        .first::<StateEventRow>(connection)
        .optional()?;
    let Some(open) = open_row else {
        return Ok(());
    };

    let mut event = row_to_event(open.clone())?;
    event.seal(change.occurred_at(), change.result().map(ToOwned::to_owned));
    diesel::update(task_state_events::table.find(open.id))
        .set(&SealEventChangeset {
            exited_at: change.occurred_at(),
            duration_seconds: event.duration_seconds().unwrap_or(0),
            result: event.result().map(ToOwned::to_owned),
        })
        .execute(connection)?;
    Ok(())
}

/// Folds a transition's result and error into the payload row.
fn fold_into_payload(
    connection: &mut PgConnection,
    task_id: &TaskId,
    exited_state: &StateName,
    change: &StateChange,
) -> TaskStoreResult<()> {
    let row = task_payloads::table
        .find(task_id.as_str())
        .select(PayloadRow::as_select())
        .first::<PayloadRow>(connection)
        .optional()?;
    let Some(payload_row) = row else {
        return Ok(());
    };

    let mut payload = row_to_payload(task_id, payload_row);
    payload.record_transition(exited_state, change);
    let changeset = PayloadTransitionChangeset {
        results: serde_json::to_value(payload.results()).map_err(TaskStoreError::persistence)?,
        error_details: change
            .error()
            .map(serde_json::to_value)
            .transpose()
            .map_err(TaskStoreError::persistence)?,
    };
    diesel::update(task_payloads::table.find(task_id.as_str()))
        .set(&changeset)
        .execute(connection)?;
    Ok(())
}

fn to_new_task_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        task_id: task.id().as_str().to_owned(),
        workflow_id: task.workflow().id().as_str().to_owned(),
        workflow_name: task.workflow().name().to_owned(),
        workflow_version: task.workflow().version().to_owned(),
        current_state: task.current_state().as_str().to_owned(),
        completion_state: task.completion_state().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        creator_id: task.creator_id().to_owned(),
        priority: task.priority().as_str().to_owned(),
        max_retries: task.max_retries(),
        retry_count: task.retry_count(),
        timeout_seconds: task.timeout_seconds(),
        is_complete: task.is_complete(),
        has_error: task.has_error(),
    }
}

fn to_new_event_row(task_id: &TaskId, event: &StateEvent) -> NewStateEventRow {
    NewStateEventRow {
        task_id: task_id.as_str().to_owned(),
        state_name: event.state_name().as_str().to_owned(),
        entered_at: event.entered_at(),
        has_error: event.has_error(),
        error_message: event.error_message().map(ToOwned::to_owned),
    }
}

fn to_new_payload_row(task_id: &TaskId, payload: &TaskPayload) -> TaskStoreResult<NewPayloadRow> {
    Ok(NewPayloadRow {
        task_id: task_id.as_str().to_owned(),
        prompt: payload.prompt().to_owned(),
        context: payload.context().map(ToOwned::to_owned),
        parameters: Value::Object(payload.parameters().clone()),
        results: serde_json::to_value(payload.results()).map_err(TaskStoreError::persistence)?,
        next_states: serde_json::to_value(payload.next_states())
            .map_err(TaskStoreError::persistence)?,
        error_details: payload
            .error_details()
            .map(serde_json::to_value)
            .transpose()
            .map_err(TaskStoreError::persistence)?,
    })
}

fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow {
        task_id,
        workflow_id,
        workflow_name,
        workflow_version,
        current_state,
        completion_state,
        created_at,
        updated_at,
        creator_id,
        priority,
        max_retries,
        retry_count,
        timeout_seconds,
        is_complete,
        has_error,
    } = row;

    let workflow = WorkflowRef::new(
        WorkflowId::new(workflow_id).map_err(TaskStoreError::persistence)?,
        workflow_name,
        workflow_version,
    )
    .map_err(TaskStoreError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::new(task_id).map_err(TaskStoreError::persistence)?,
        workflow,
        current_state: StateName::new(current_state).map_err(TaskStoreError::persistence)?,
        completion_state: StateName::new(completion_state).map_err(TaskStoreError::persistence)?,
        created_at,
        updated_at,
        creator_id,
        priority: Priority::try_from(priority.as_str()).map_err(TaskStoreError::persistence)?,
        max_retries,
        retry_count,
        timeout_seconds,
        is_complete,
        has_error,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_event(row: StateEventRow) -> TaskStoreResult<StateEvent> {
    let StateEventRow {
        id: _,
        task_id: _,
        state_name,
        entered_at,
        exited_at,
        duration_seconds,
        result,
        has_error,
        error_message,
    } = row;

    let data = PersistedStateEventData {
        state_name: StateName::new(state_name).map_err(TaskStoreError::persistence)?,
        entered_at,
        exited_at,
        duration_seconds,
        result,
        has_error,
        error_message,
    };
    Ok(StateEvent::from_persisted(data))
}

/// Converts a payload row to its domain form.
///
/// JSONB columns that fail to decode are replaced with empty values and
/// logged; a corrupt mapping never aborts a read.
fn row_to_payload(task_id: &TaskId, row: PayloadRow) -> TaskPayload {
    let PayloadRow {
        task_id: _,
        prompt,
        context,
        parameters,
        results,
        next_states,
        error_details,
    } = row;

    let data = PersistedPayloadData {
        prompt,
        context,
        parameters: decode_or_default(task_id, "parameters", parameters),
        results: decode_or_default(task_id, "results", results),
        next_states: decode_or_default(task_id, "next_states", next_states),
        error_details: error_details.and_then(|value| decode_optional(task_id, value)),
    };
    TaskPayload::from_persisted(data)
}

fn decode_or_default<T>(task_id: &TaskId, column: &'static str, value: Value) -> T
where
    T: Default + DeserializeOwned,
{
    serde_json::from_value(value).unwrap_or_else(|err| {
        tracing::warn!(task_id = %task_id, column, error = %err, "malformed stored payload column, substituting empty value");
        T::default()
    })
}

fn decode_optional(task_id: &TaskId, value: Value) -> Option<ErrorReport> {
    match serde_json::from_value(value) {
        Ok(report) => Some(report),
        Err(err) => {
            tracing::warn!(task_id = %task_id, column = "error_details", error = %err, "malformed stored error report, dropping it");
            None
        }
    }
}
