//! The three-row aggregate persisted atomically at task creation.

use super::{StateEvent, Task, TaskPayload};

/// Everything `create` writes in one transaction: the task row, its
/// opening state event, and its payload.
///
/// The opening event is derived here rather than supplied, so it cannot
/// disagree with the task: it names the initial state, enters at the
/// creation timestamp, and carries the payload's initial error, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTaskRecord {
    task: Task,
    opening_event: StateEvent,
    payload: TaskPayload,
}

impl NewTaskRecord {
    /// Bundles a freshly constructed task and payload for creation.
    #[must_use]
    pub fn new(task: Task, payload: TaskPayload) -> Self {
        let opening_event = StateEvent::open(
            task.current_state().clone(),
            task.created_at(),
            payload.error_details(),
        );
        Self {
            task,
            opening_event,
            payload,
        }
    }

    /// Returns the task row to insert.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the opening state event to insert.
    #[must_use]
    pub const fn opening_event(&self) -> &StateEvent {
        &self.opening_event
    }

    /// Returns the payload row to insert.
    #[must_use]
    pub const fn payload(&self) -> &TaskPayload {
        &self.payload
    }
}
