//! Partial plan records carried by `plan:updated` events.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer};

use super::{Plan, Status, Step};

/// A plan update where every field except the ID is optional.
///
/// Absent keys leave the local field untouched. For nullable fields an
/// explicit `null` decodes to `Some(None)` and clears the local value.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PlanPatch {
    /// ID of the plan to update
    pub id: String,

    #[serde(default, deserialize_with = "present")]
    pub parent_id: Option<Option<String>>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub status: Option<Status>,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,

    #[serde(default)]
    pub steps: Option<Vec<Step>>,

    #[serde(default)]
    pub children: Option<Vec<Plan>>,
}

impl PlanPatch {
    /// Merges the present fields into `plan`.
    ///
    /// The plan ID is never changed. Replaced step lists are re-sorted by
    /// `order`.
    pub fn apply_to(self, plan: &mut Plan) {
        if let Some(parent_id) = self.parent_id {
            plan.parent_id = parent_id;
        }
        if let Some(title) = self.title {
            plan.title = title;
        }
        if let Some(description) = self.description {
            plan.description = description;
        }
        if let Some(status) = self.status {
            plan.status = status;
        }
        if let Some(created_at) = self.created_at {
            plan.created_at = created_at;
        }
        if let Some(updated_at) = self.updated_at {
            plan.updated_at = updated_at;
        }
        if let Some(children) = self.children {
            plan.children = children;
        }
        if let Some(steps) = self.steps {
            plan.steps = steps;
        }
        plan.sort_steps();
    }
}

/// Marks a key as present, keeping `null` distinguishable from absence.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
