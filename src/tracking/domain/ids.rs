//! Identifier and validated scalar types for the tracking domain.

use super::TrackingDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Caller-assigned unique identifier for a tracked workflow task.
///
/// Task identifiers arrive from the upstream trigger (queue message or
/// API call) rather than being minted here, so they are validated text
/// instead of UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Widest task identifier the persisted column accepts.
    const MAX_PERSISTED_LENGTH: usize = 255;

    /// Creates a validated task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::EmptyTaskId`] when the value is
    /// empty after trimming, or [`TrackingDomainError::TaskIdTooLong`]
    /// when it exceeds the schema-backed maximum.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackingDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TrackingDomainError::EmptyTaskId);
        }
        if trimmed.chars().count() > Self::MAX_PERSISTED_LENGTH {
            return Err(TrackingDomainError::TaskIdTooLong(trimmed.chars().count()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the workflow definition a task runs under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    /// Creates a validated workflow identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::EmptyWorkflowId`] when the value
    /// is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackingDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TrackingDomainError::EmptyWorkflowId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generates a fresh random workflow identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for WorkflowId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a workflow state a task can occupy.
///
/// State names are free-form per workflow definition; only emptiness is
/// rejected. `Ord` is derived so names can key the accumulated results
/// mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateName(String);

impl StateName {
    /// Creates a validated state name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingDomainError::EmptyStateName`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackingDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TrackingDomainError::EmptyStateName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the state name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StateName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
