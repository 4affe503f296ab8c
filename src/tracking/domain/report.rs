//! Error report carried by failed transitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured error information attached to a state transition.
///
/// The full report is persisted in the payload's `error_details`
/// column; only the message is copied onto the state event row. A later
/// report overwrites an earlier one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    details: Map<String, Value>,
}

impl ErrorReport {
    /// Creates a report with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Attaches structured detail fields to the report.
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured detail fields.
    #[must_use]
    pub const fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}
