//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

use super::{Status, Step};

/// Represents a plan with its metadata, steps and nested child plans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan
    pub id: String,

    /// ID of the parent plan when nested
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Title of the plan
    pub title: String,

    /// Detailed multi-line description of the plan
    #[serde(default)]
    pub description: Option<String>,

    /// Current status of the plan
    pub status: Status,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    pub updated_at: Timestamp,

    /// Steps, kept sorted by `order`
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub steps: Vec<Step>,

    /// Child plans, when the server sends them nested
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Plan>,
}

impl Plan {
    /// Sorts this plan's steps by `order`, recursing into children.
    ///
    /// The sort is stable, so steps sharing an order keep their arrival
    /// order.
    pub fn sort_steps(&mut self) {
        self.steps.sort_by_key(|step| step.order);
        for child in &mut self.children {
            child.sort_steps();
        }
    }

    /// Number of completed steps and total steps.
    pub fn step_counts(&self) -> (usize, usize) {
        let completed = self
            .steps
            .iter()
            .filter(|step| step.status == Status::Completed)
            .count();
        (completed, self.steps.len())
    }
}

/// Treats an explicit `null` list the same as an absent one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
