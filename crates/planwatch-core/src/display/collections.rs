//! Collection wrapper types for displaying groups of domain objects.

use std::fmt;

use crate::models::Plan;

/// Compact overview of a plan collection, one section per plan with its
/// steps as a checklist.
///
/// # Examples
///
/// ```rust
/// use planwatch_core::{display::Plans, models::Plan};
///
/// let plan: Plan = serde_json::from_str(
///     r#"{
///         "id": "p1",
///         "title": "Ship it",
///         "status": "pending",
///         "created_at": "2024-01-01T00:00:00Z",
///         "updated_at": "2024-01-01T00:00:00Z"
///     }"#,
/// )
/// .unwrap();
///
/// let output = Plans(&[plan]).to_string();
/// assert!(output.contains("## Ship it"));
/// ```
pub struct Plans<'a>(pub &'a [Plan]);

impl fmt::Display for Plans<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans yet.");
        }

        for plan in self.0 {
            let (completed, total) = plan.step_counts();
            write!(f, "## {} ({})", plan.title, plan.status.with_icon())?;
            if total > 0 {
                write!(f, " {completed}/{total}")?;
            }
            writeln!(f)?;
            writeln!(f)?;

            if let Some(desc) = &plan.description {
                writeln!(f, "{desc}")?;
                writeln!(f)?;
            }

            for step in &plan.steps {
                write!(f, "- {} {}", step.status.with_icon(), step.title)?;
                if let Some(percent) = step.progress_percent() {
                    write!(f, " ({percent}%)")?;
                }
                writeln!(f)?;
            }
            for child in &plan.children {
                writeln!(f, "- Sub-plan: {} ({})", child.title, child.status.with_icon())?;
            }
            if !plan.steps.is_empty() || !plan.children.is_empty() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
