//! State event records: one interval a task spent in one state.

use super::{ErrorReport, StateChange, StateName};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a task's state history.
///
/// An event is open (no exit time) while the task occupies the state
/// and is sealed exactly once, when the task leaves it. Per task, at
/// most one event is open at any time; the open event names the task's
/// current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    state_name: StateName,
    entered_at: DateTime<Utc>,
    exited_at: Option<DateTime<Utc>>,
    duration_seconds: Option<i64>,
    result: Option<String>,
    has_error: bool,
    error_message: Option<String>,
}

/// Parameter object for reconstructing a persisted state event.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedStateEventData {
    /// State the task occupied.
    pub state_name: StateName,
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

impl StateEvent {
    /// Opens a new event for a state just entered.
    ///
    /// The error report, when present, marks the entry itself as
    /// errored; its message is copied onto the event.
    #[must_use]
    pub fn open(
        state_name: StateName,
        entered_at: DateTime<Utc>,
        error: Option<&ErrorReport>,
    ) -> Self {
        Self {
            state_name,
            entered_at,
            exited_at: None,
            duration_seconds: None,
            result: None,
            has_error: error.is_some(),
            error_message: error.map(|report| report.message().to_owned()),
        }
    }

    /// Opens the event for the state a transition enters.
    #[must_use]
    pub fn open_for_change(change: &StateChange) -> Self {
        Self::open(
            change.new_state().clone(),
            change.occurred_at(),
            change.error(),
        )
    }

    /// Reconstructs an event from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedStateEventData) -> Self {
        Self {
            state_name: data.state_name,
            entered_at: data.entered_at,
            exited_at: data.exited_at,
            duration_seconds: data.duration_seconds,
            result: data.result,
            has_error: data.has_error,
            error_message: data.error_message,
        }
    }

    /// Seals the event at `exited_at`, recording the dwell time and the
    /// result produced while in the state.
    ///
    /// Sealing an already-sealed event overwrites its exit fields; the
    /// store only ever seals the single open event.
    pub fn seal(&mut self, exited_at: DateTime<Utc>, result: Option<String>) {
        self.exited_at = Some(exited_at);
        self.duration_seconds = Some(rounded_whole_seconds(exited_at - self.entered_at));
        self.result = result;
    }

    /// Returns true while the event has no exit time.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.exited_at.is_none()
    }

    /// Returns the state this event records.
    #[must_use]
    pub const fn state_name(&self) -> &StateName {
        &self.state_name
    }

    /// Returns when the state was entered.
    #[must_use]
    pub const fn entered_at(&self) -> DateTime<Utc> {
        self.entered_at
    }

    /// Returns when the state was exited, if sealed.
    #[must_use]
    pub const fn exited_at(&self) -> Option<DateTime<Utc>> {
        self.exited_at
    }

    /// Returns the whole-second dwell time, if sealed.
    #[must_use]
    pub const fn duration_seconds(&self) -> Option<i64> {
        self.duration_seconds
    }

    /// Returns the result recorded at exit, if any.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Returns whether the state was entered under error.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.has_error
    }

    /// Returns the error message recorded at entry, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// Rounds a time delta to whole seconds, half-up, clamped at zero.
fn rounded_whole_seconds(delta: TimeDelta) -> i64 {
    (delta + TimeDelta::milliseconds(500)).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::rounded_whole_seconds;
    use chrono::TimeDelta;
    use rstest::rstest;

    #[rstest]
    #[case(TimeDelta::zero(), 0)]
    #[case(TimeDelta::milliseconds(499), 0)]
    #[case(TimeDelta::milliseconds(500), 1)]
    #[case(TimeDelta::milliseconds(2_600), 3)]
    #[case(TimeDelta::seconds(90), 90)]
    #[case(TimeDelta::seconds(-5), 0)]
    fn rounds_half_up_and_clamps(#[case] delta: TimeDelta, #[case] expected: i64) {
        assert_eq!(rounded_whole_seconds(delta), expected);
    }
}
