//! Status enumeration shared by plans and steps.

use std::{convert::Infallible, str::FromStr};

use serde::{Deserialize, Serialize};

/// Lifecycle status of a plan or a step.
///
/// Values the client does not know are kept verbatim in
/// [`Status::Unrecognized`] so that a newer server never breaks
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    /// Not started yet
    Pending,

    /// Being worked on
    InProgress,

    /// Finished successfully
    Completed,

    /// Finished unsuccessfully
    Failed,

    /// Any value outside the known set, passed through as received
    Unrecognized(String),
}

impl Status {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::Failed => "failed",
            Status::Unrecognized(raw) => raw,
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use planwatch_core::models::Status;
    ///
    /// assert_eq!(Status::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(Status::InProgress.with_icon(), "➤ In Progress");
    /// assert_eq!(Status::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            Status::Pending => "○ Pending",
            Status::InProgress => "➤ In Progress",
            Status::Completed => "✓ Completed",
            Status::Failed => "✗ Failed",
            Status::Unrecognized(_) => "? Unknown",
        }
    }
}

impl From<&str> for Status {
    fn from(raw: &str) -> Self {
        match raw {
            "pending" => Status::Pending,
            "in_progress" => Status::InProgress,
            "completed" => Status::Completed,
            "failed" => Status::Failed,
            other => Status::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match Status::from(raw.as_str()) {
            Status::Unrecognized(_) => Status::Unrecognized(raw),
            known => known,
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Status {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Status::from(s))
    }
}
