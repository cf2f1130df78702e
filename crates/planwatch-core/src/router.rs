//! Typed dispatch of parsed envelopes.
//!
//! The router turns an [`Envelope`] into exactly one [`Routed`] outcome:
//! a [`SyncEvent`] for the reconciler, the connection acknowledgement, or an
//! ignored unknown discriminant. Decoding failures are reported as errors
//! and never close the connection.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::Result,
    models::{Plan, PlanPatch, Step},
    protocol::{Envelope, EventKind},
};

/// A decoded change to the entity collection.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    PlanCreated(Plan),
    PlanUpdated(PlanPatch),
    PlanDeleted { id: String },
    StepCreated(Step),
    StepUpdated(Step),
    StepDeleted { id: String },
}

impl SyncEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SyncEvent::PlanCreated(_) => EventKind::PlanCreated,
            SyncEvent::PlanUpdated(_) => EventKind::PlanUpdated,
            SyncEvent::PlanDeleted { .. } => EventKind::PlanDeleted,
            SyncEvent::StepCreated(_) => EventKind::StepCreated,
            SyncEvent::StepUpdated(_) => EventKind::StepUpdated,
            SyncEvent::StepDeleted { .. } => EventKind::StepDeleted,
        }
    }
}

/// Outcome of routing one envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    Event(SyncEvent),
    /// The server confirmed the connection
    Acknowledged,
    /// Unrecognized discriminant
    Ignored(String),
}

/// Payload of deletion events.
#[derive(Debug, Deserialize)]
struct DeletedRef {
    id: String,
}

/// Decodes the envelope payload according to its discriminant.
pub fn route(envelope: Envelope) -> Result<Routed> {
    let kind = envelope.event_kind();
    let data = envelope.data;
    let routed = match kind {
        EventKind::Connected => Routed::Acknowledged,
        EventKind::PlanCreated => Routed::Event(SyncEvent::PlanCreated(decode(data)?)),
        EventKind::PlanUpdated => Routed::Event(SyncEvent::PlanUpdated(decode(data)?)),
        EventKind::PlanDeleted => Routed::Event(SyncEvent::PlanDeleted {
            id: decode::<DeletedRef>(data)?.id,
        }),
        EventKind::StepCreated => Routed::Event(SyncEvent::StepCreated(decode(data)?)),
        EventKind::StepUpdated => Routed::Event(SyncEvent::StepUpdated(decode(data)?)),
        EventKind::StepDeleted => Routed::Event(SyncEvent::StepDeleted {
            id: decode::<DeletedRef>(data)?.id,
        }),
        EventKind::Unknown(raw) => {
            debug!("Unknown message type: {raw}");
            Routed::Ignored(raw)
        }
    };
    Ok(routed)
}

fn decode<T: for<'de> Deserialize<'de>>(data: Value) -> Result<T> {
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Status;

    fn envelope(kind: &str, data: Value) -> Envelope {
        Envelope {
            kind: kind.to_string(),
            data,
            timestamp: None,
            id: Some("m1".to_string()),
        }
    }

    fn plan_json(id: &str) -> Value {
        json!({
            "id": id,
            "parent_id": null,
            "title": "Plan",
            "description": null,
            "status": "pending",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
        })
    }

    fn step_json(id: &str, order: i64) -> Value {
        json!({
            "id": id,
            "plan_id": "p1",
            "title": "Step",
            "description": null,
            "status": "in_progress",
            "step_order": order,
            "progress": 50,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
        })
    }

    #[test]
    fn test_routes_connected_ack() {
        let routed = route(envelope("connected", json!({"status": "connected"}))).unwrap();
        assert_eq!(routed, Routed::Acknowledged);
    }

    #[test]
    fn test_routes_plan_events() {
        let Routed::Event(SyncEvent::PlanCreated(plan)) =
            route(envelope("plan:created", plan_json("p1"))).unwrap()
        else {
            panic!("expected plan:created");
        };
        assert_eq!(plan.id, "p1");

        let Routed::Event(SyncEvent::PlanUpdated(patch)) =
            route(envelope("plan:updated", json!({"id": "p1", "title": "New"}))).unwrap()
        else {
            panic!("expected plan:updated");
        };
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert!(patch.status.is_none());

        let routed = route(envelope("plan:deleted", json!({"id": "p1"}))).unwrap();
        assert_eq!(
            routed,
            Routed::Event(SyncEvent::PlanDeleted {
                id: "p1".to_string()
            })
        );
    }

    #[test]
    fn test_routes_step_events() {
        let Routed::Event(SyncEvent::StepCreated(step)) =
            route(envelope("step:created", step_json("s1", 2))).unwrap()
        else {
            panic!("expected step:created");
        };
        assert_eq!(step.order, 2);
        assert_eq!(step.status, Status::InProgress);

        let Routed::Event(SyncEvent::StepUpdated(step)) =
            route(envelope("step:updated", step_json("s1", 3))).unwrap()
        else {
            panic!("expected step:updated");
        };
        assert_eq!(step.order, 3);
        assert_eq!(step.progress_percent(), Some(50));

        let routed = route(envelope("step:deleted", json!({"id": "s1"}))).unwrap();
        assert_eq!(
            routed,
            Routed::Event(SyncEvent::StepDeleted {
                id: "s1".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_kind_is_ignored() {
        let routed = route(envelope("plan:archived", json!({}))).unwrap();
        assert_eq!(routed, Routed::Ignored("plan:archived".to_string()));
    }

    #[test]
    fn test_bad_payload_is_an_error() {
        assert!(route(envelope("plan:created", json!({"id": "p1"}))).is_err());
        assert!(route(envelope("step:deleted", json!({}))).is_err());
        assert!(route(envelope("step:created", Value::Null)).is_err());
    }

    #[test]
    fn test_event_kind_matches_variant() {
        let event = SyncEvent::StepDeleted {
            id: "s1".to_string(),
        };
        assert_eq!(event.kind(), EventKind::StepDeleted);
    }
}
