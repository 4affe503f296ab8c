//! Task payload: the free-form input and accumulated output of a task.

use super::{ErrorReport, StateChange, StateName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Variable-shaped data owned 1:1 by a task.
///
/// `prompt`, `context`, `parameters`, and `next_states` are fixed at
/// creation. `results` grows by one key per transition that carries a
/// result; `error_details` holds the most recent error report only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    prompt: String,
    context: Option<String>,
    parameters: Map<String, Value>,
    results: BTreeMap<StateName, String>,
    next_states: Vec<StateName>,
    error_details: Option<ErrorReport>,
}

/// Parameter object for reconstructing a persisted payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedPayloadData {
    /// Persisted prompt text.
    pub prompt: String,
    /// Persisted context text, if any.
    pub context: Option<String>,
    /// Persisted creation parameters.
    pub parameters: Map<String, Value>,
    /// Persisted accumulated results.
    pub results: BTreeMap<StateName, String>,
    /// Persisted candidate follow-on states.
    pub next_states: Vec<StateName>,
    /// Persisted latest error report, if any.
    pub error_details: Option<ErrorReport>,
}

impl TaskPayload {
    /// Creates a payload for a newly created task.
    ///
    /// `initial_error` seeds `error_details` when the task was created
    /// already carrying an error.
    #[must_use]
    pub fn new(
        prompt: String,
        context: Option<String>,
        parameters: Map<String, Value>,
        next_states: Vec<StateName>,
        initial_error: Option<ErrorReport>,
    ) -> Self {
        Self {
            prompt,
            context,
            parameters,
            results: BTreeMap::new(),
            next_states,
            error_details: initial_error,
        }
    }

    /// Reconstructs a payload from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPayloadData) -> Self {
        Self {
            prompt: data.prompt,
            context: data.context,
            parameters: data.parameters,
            results: data.results,
            next_states: data.next_states,
            error_details: data.error_details,
        }
    }

    /// Folds a transition into the payload.
    ///
    /// A result is recorded under `exited_state`, the state the task is
    /// leaving, never the one it enters; other result keys are
    /// untouched. An error report replaces `error_details` wholesale.
    pub fn record_transition(&mut self, exited_state: &StateName, change: &StateChange) {
        if let Some(result) = change.result() {
            self.results.insert(exited_state.clone(), result.to_owned());
        }
        if let Some(error) = change.error() {
            self.error_details = Some(error.clone());
        }
    }

    /// Returns the prompt text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the context text, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the creation parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Returns the results accumulated so far, keyed by exited state.
    #[must_use]
    pub const fn results(&self) -> &BTreeMap<StateName, String> {
        &self.results
    }

    /// Returns the candidate follow-on state names.
    #[must_use]
    pub fn next_states(&self) -> &[StateName] {
        &self.next_states
    }

    /// Returns the most recent error report, if any.
    #[must_use]
    pub const fn error_details(&self) -> Option<&ErrorReport> {
        self.error_details.as_ref()
    }
}
