//! State transitions over the local plan collection.
//!
//! One function per event kind. Each returns `true` when the collection
//! changed so the caller knows whether to publish a new view. Plans are
//! matched in the top-level list only; the snapshot endpoint returns plans
//! flat, with `parent_id` links rather than nesting.
//!
//! The transitions are not commutative: an update that overtakes its create
//! is dropped, and the next snapshot load repairs the drift.

use log::debug;

use crate::{
    models::{Plan, PlanPatch, Step},
    router::SyncEvent,
};

/// Applies one event, returning whether anything changed.
pub fn apply(plans: &mut Vec<Plan>, event: SyncEvent) -> bool {
    match event {
        SyncEvent::PlanCreated(plan) => plan_created(plans, plan),
        SyncEvent::PlanUpdated(patch) => plan_updated(plans, patch),
        SyncEvent::PlanDeleted { id } => plan_deleted(plans, &id),
        SyncEvent::StepCreated(step) => step_created(plans, step),
        SyncEvent::StepUpdated(step) => step_updated(plans, step),
        SyncEvent::StepDeleted { id } => step_deleted(plans, &id),
    }
}

/// Inserts `plan` at the head of the list (most recent first).
///
/// IDs are never reused, so a plan already present under the same ID is the
/// same entity (typically picked up by a snapshot that raced the event) and
/// is replaced rather than duplicated.
pub fn plan_created(plans: &mut Vec<Plan>, mut plan: Plan) -> bool {
    plans.retain(|existing| existing.id != plan.id);
    plan.sort_steps();
    plans.insert(0, plan);
    true
}

/// Merges the fields present in `patch` into the matching plan.
pub fn plan_updated(plans: &mut [Plan], patch: PlanPatch) -> bool {
    match plans.iter_mut().find(|plan| plan.id == patch.id) {
        Some(plan) => {
            patch.apply_to(plan);
            true
        }
        None => {
            debug!("Update for unknown plan {} dropped", patch.id);
            false
        }
    }
}

/// Removes the matching plan. Children are not cascaded.
pub fn plan_deleted(plans: &mut Vec<Plan>, id: &str) -> bool {
    let before = plans.len();
    plans.retain(|plan| plan.id != id);
    plans.len() != before
}

/// Appends `step` to its owning plan and re-sorts that plan's steps by
/// `order`. Steps for plans not held locally are dropped.
pub fn step_created(plans: &mut [Plan], step: Step) -> bool {
    let Some(plan) = plans.iter_mut().find(|plan| plan.id == step.plan_id) else {
        debug!("Step {} for unknown plan {} dropped", step.id, step.plan_id);
        return false;
    };
    plan.steps.retain(|existing| existing.id != step.id);
    plan.steps.push(step);
    plan.steps.sort_by_key(|step| step.order);
    true
}

/// Replaces the matching step of the owning plan wholesale.
pub fn step_updated(plans: &mut [Plan], step: Step) -> bool {
    let slot = plans
        .iter_mut()
        .filter(|plan| plan.id == step.plan_id)
        .flat_map(|plan| plan.steps.iter_mut())
        .find(|existing| existing.id == step.id);
    match slot {
        Some(existing) => {
            *existing = step;
            true
        }
        None => false,
    }
}

/// Removes the step from every plan; deletions carry no plan ID.
pub fn step_deleted(plans: &mut [Plan], id: &str) -> bool {
    let mut changed = false;
    for plan in plans {
        let before = plan.steps.len();
        plan.steps.retain(|step| step.id != id);
        changed |= plan.steps.len() != before;
    }
    changed
}

/// Replaces the whole collection with a snapshot.
pub fn replace_all(plans: &mut Vec<Plan>, mut snapshot: Vec<Plan>) {
    for plan in &mut snapshot {
        plan.sort_steps();
    }
    *plans = snapshot;
}
