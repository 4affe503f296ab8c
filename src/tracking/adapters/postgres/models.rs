//! Diesel row models for workflow task persistence.

use super::schema::{task_payloads, task_state_events, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Caller-assigned task identifier.
    pub task_id: String,
    /// Owning workflow identifier.
    pub workflow_id: String,
    /// Owning workflow name.
    pub workflow_name: String,
    /// Owning workflow version.
    pub workflow_version: String,
    /// State the task currently occupies.
    pub current_state: String,
    /// State whose arrival marks success.
    pub completion_state: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest transition timestamp.
    pub updated_at: DateTime<Utc>,
    /// Identity of the creating principal.
    pub creator_id: String,
    /// Scheduling priority.
    pub priority: String,
    /// Retry ceiling.
    pub max_retries: i32,
    /// Retries consumed.
    pub retry_count: i32,
    /// Per-state timeout in seconds.
    pub timeout_seconds: i32,
    /// Whether the most recent transition reached completion.
    pub is_complete: bool,
    /// Whether the most recent transition carried an error.
    pub has_error: bool,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Caller-assigned task identifier.
    pub task_id: String,
    /// Owning workflow identifier.
    pub workflow_id: String,
    /// Owning workflow name.
    pub workflow_name: String,
    /// Owning workflow version.
    pub workflow_version: String,
    /// State the task currently occupies.
    pub current_state: String,
    /// State whose arrival marks success.
    pub completion_state: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest transition timestamp.
    pub updated_at: DateTime<Utc>,
    /// Identity of the creating principal.
    pub creator_id: String,
    /// Scheduling priority.
    pub priority: String,
    /// Retry ceiling.
    pub max_retries: i32,
    /// Retries consumed.
    pub retry_count: i32,
    /// Per-state timeout in seconds.
    pub timeout_seconds: i32,
    /// Whether the most recent transition reached completion.
    pub is_complete: bool,
    /// Whether the most recent transition carried an error.
    pub has_error: bool,
}

/// Changeset applied to the task row on every transition.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskTransitionChangeset {
    /// New current state.
    pub current_state: String,
    /// Transition timestamp.
    pub updated_at: DateTime<Utc>,
    /// Recomputed completion flag.
    pub is_complete: bool,
    /// Recomputed error flag.
    pub has_error: bool,
}

/// Query result row for state events.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_state_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StateEventRow {
    /// Surrogate event identifier.
    pub id: i64,
    /// Owning task identifier.
    pub task_id: String,
    /// State the task occupied.
    pub state_name: String,
    /// When the state was entered.
    pub entered_at: DateTime<Utc>,
    /// When the state was exited, if sealed.
    pub exited_at: Option<DateTime<Utc>>,
    /// Whole-second dwell time, if sealed.
    pub duration_seconds: Option<i64>,
    /// Result produced in the state, if any.
    pub result: Option<String>,
    /// Whether the state was entered under error.
    pub has_error: bool,
    /// Error message recorded at entry, if any.
    pub error_message: Option<String>,
}

/// Insert model for state events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_state_events)]
pub struct NewStateEventRow {
    /// Owning task identifier.
    pub task_id: String,
    /// State the task occupied.
    pub state_name: String,
    /// When the state was entered.
    pub entered_at: DateTime<Utc>,
    /// Whether the state was entered under error.
    pub has_error: bool,
    /// Error message recorded at entry, if any.
    pub error_message: Option<String>,
}

/// Changeset sealing the open state event on transition.
///
/// `treat_none_as_null` makes an absent result write SQL `NULL` rather
/// than leaving the column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = task_state_events)]
#[diesel(treat_none_as_null = true)]
pub struct SealEventChangeset {
    /// Exit timestamp.
    pub exited_at: DateTime<Utc>,
    /// Whole-second dwell time.
    pub duration_seconds: i64,
    /// Result produced in the state, if any.
    pub result: Option<String>,
}

/// Query result row for task payloads.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_payloads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PayloadRow {
    /// Owning task identifier.
    pub task_id: String,
    /// Prompt text supplied at creation.
    pub prompt: String,
    /// Context text supplied at creation, if any.
    pub context: Option<String>,
    /// Creation parameters.
    pub parameters: Value,
    /// Accumulated results keyed by exited state.
    pub results: Value,
    /// Candidate follow-on state names.
    pub next_states: Value,
    /// Most recent error report, if any.
    pub error_details: Option<Value>,
}

/// Insert model for task payloads.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_payloads)]
pub struct NewPayloadRow {
    /// Owning task identifier.
    pub task_id: String,
    /// Prompt text supplied at creation.
    pub prompt: String,
    /// Context text supplied at creation, if any.
    pub context: Option<String>,
    /// Creation parameters.
    pub parameters: Value,
    /// Accumulated results keyed by exited state.
    pub results: Value,
    /// Candidate follow-on state names.
    pub next_states: Value,
    /// Most recent error report, if any.
    pub error_details: Option<Value>,
}

/// Changeset folding a transition into the payload row.
///
/// `error_details` is skipped when `None`, so an error-free transition
/// leaves the previously recorded report in place.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = task_payloads)]
pub struct PayloadTransitionChangeset {
    /// Updated results mapping.
    pub results: Value,
    /// Replacement error report, when the transition carried one.
    pub error_details: Option<Value>,
}
