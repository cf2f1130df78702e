//! Markdown formatting for the plan collection.
//!
//! Statuses implement [`std::fmt::Display`] directly (see [`models`]); the
//! collection goes through the [`Plans`] newtype wrapper so empty lists and
//! nesting are handled in one place.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Newtype Wrapper │    │    Markdown     │
//! │  (Plan, Step)   │───▶│     (Plans)     │───▶│     Output      │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Formatting only reads the collection; nothing here mutates a plan.
//!
//! # Examples
//!
//! ```rust
//! use planwatch_core::display::Plans;
//!
//! let output = Plans(&[]).to_string();
//! assert_eq!(output, "No plans yet.\n");
//! ```

pub mod collections;
pub mod models;

pub use collections::Plans;
