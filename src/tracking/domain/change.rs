//! Description of one requested state transition.

use super::{ErrorReport, StateName};
use chrono::{DateTime, Utc};

/// A single state transition, stamped with the instant it occurred.
///
/// The service layer stamps `occurred_at` from its injected clock so
/// store adapters stay deterministic and clock-free.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    new_state: StateName,
    result: Option<String>,
    error: Option<ErrorReport>,
    occurred_at: DateTime<Utc>,
}

impl StateChange {
    /// Creates a transition into `new_state` at the given instant.
    #[must_use]
    pub const fn new(new_state: StateName, occurred_at: DateTime<Utc>) -> Self {
        Self {
            new_state,
            result: None,
            error: None,
            occurred_at,
        }
    }

    /// Attaches the result produced while in the state being exited.
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

    /// Returns the state being entered.
    #[must_use]
    pub const fn new_state(&self) -> &StateName {
        &self.new_state
    }

    /// Returns the result for the state being exited, if any.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Returns the attached error report, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorReport> {
        self.error.as_ref()
    }

    /// Returns true when the transition carries an error report.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the instant the transition occurred.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
