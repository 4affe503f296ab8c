//! Domain model for workflow task state tracking.
//!
//! The tracking domain models task creation, state transitions with
//! append-only history, and result accumulation, while keeping all
//! infrastructure concerns outside of the domain boundary. The
//! transition algebra ([`StateEvent::seal`], [`Task::apply_transition`],
//! [`TaskPayload::record_transition`]) is shared by every store adapter
//! so semantics cannot drift between backends.

mod change;
mod error;
mod event;
mod ids;
mod payload;
mod priority;
mod record;
mod report;
mod task;
mod views;

pub use change::StateChange;
pub use error::{ParsePriorityError, TrackingDomainError};
pub use event::{PersistedStateEventData, StateEvent};
pub use ids::{StateName, TaskId, WorkflowId};
pub use payload::{PersistedPayloadData, TaskPayload};
pub use priority::Priority;
pub use record::NewTaskRecord;
pub use report::ErrorReport;
pub use task::{PersistedTaskData, Task, TaskSettings, WorkflowRef};
pub use views::{DEFAULT_LIST_LIMIT, TaskDetail, TaskFilter, TaskSummary};
