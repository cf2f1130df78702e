//! Step model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Status;

/// Represents an individual step within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Unique identifier for the step
    pub id: String,

    /// ID of the owning plan
    pub plan_id: String,

    /// Brief title/summary of the step
    pub title: String,

    /// Detailed multi-line description of the step
    #[serde(default)]
    pub description: Option<String>,

    /// Current status of the step
    pub status: Status,

    /// Position among sibling steps; lower sorts first
    #[serde(rename = "step_order", alias = "order")]
    pub order: i64,

    /// Completion percentage, meaningful only while in progress
    #[serde(default)]
    pub progress: i64,

    /// Timestamp when the step was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the step was last updated (UTC)
    pub updated_at: Timestamp,
}

impl Step {
    /// Progress clamped to `0..=100`, or `None` unless the step is in
    /// progress.
    pub fn progress_percent(&self) -> Option<u8> {
        if self.status != Status::InProgress {
            return None;
        }
        // Lossless after the clamp.
        Some(self.progress.clamp(0, 100) as u8)
    }
}
