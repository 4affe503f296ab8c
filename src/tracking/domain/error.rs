//! Error types for tracking domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain tracking values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackingDomainError {
    /// The task identifier is empty after trimming.
    #[error("task identifier must not be empty")]
    EmptyTaskId,

    /// The task identifier exceeds the persisted column width.
    #[error("task identifier is {0} characters long, maximum is 255")]
    TaskIdTooLong(usize),

    /// The workflow identifier is empty after trimming.
    #[error("workflow identifier must not be empty")]
    EmptyWorkflowId,

    /// The workflow name is empty after trimming.
    #[error("workflow name must not be empty")]
    EmptyWorkflowName,

    /// The state name is empty after trimming.
    #[error("state name must not be empty")]
    EmptyStateName,

    /// The task prompt is empty after trimming.
    #[error("task prompt must not be empty")]
    EmptyPrompt,
}

/// Error returned while parsing priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);
