//! Data models for plans and steps.
//!
//! These types mirror the JSON records served by the plan tracker: the
//! snapshot endpoint returns a list of [`Plan`]s with nested [`Step`]s, and
//! the event stream carries single plans, steps, or [`PlanPatch`]es.
//! Display implementations live in [`crate::display`].
//!
//! # Examples
//!
//! ```rust
//! use planwatch_core::models::{Plan, Status};
//!
//! let plan: Plan = serde_json::from_str(
//!     r#"{
//!         "id": "p1",
//!         "parent_id": null,
//!         "title": "Ship it",
//!         "description": null,
//!         "status": "in_progress",
//!         "created_at": "2024-01-01T00:00:00Z",
//!         "updated_at": "2024-01-01T00:00:00Z"
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(plan.status, Status::InProgress);
//! assert!(plan.steps.is_empty());
//! ```

pub mod patch;
pub mod plan;
pub mod status;
pub mod step;


pub use patch::PlanPatch;
pub use plan::Plan;
pub use status::Status;
pub use step::Step;
