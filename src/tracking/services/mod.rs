//! Application services orchestrating domain logic over the ports.

mod tracking;

pub use tracking::{
    AdvanceStateRequest, CreateTaskRequest, DEFAULT_COMPLETION_STATE, DEFAULT_CREATOR_ID,
    DEFAULT_INITIAL_STATE, DEFAULT_WORKFLOW_VERSION, TaskListQuery, TaskTrackingError,
    TaskTrackingResult, TaskTrackingService,
};
