//! Wire format of the event stream.
//!
//! Over WebSocket every text frame is a JSON envelope:
//!
//! ```json
//! { "type": "plan:created", "data": { ... }, "timestamp": "...", "id": "..." }
//! ```
//!
//! The server-sent events transport carries the same event kinds as named
//! events whose `data` line holds the payload; those frames have neither a
//! message ID nor a timestamp.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Discriminant of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Server acknowledgement sent right after the connection opens
    Connected,
    PlanCreated,
    PlanUpdated,
    PlanDeleted,
    StepCreated,
    StepUpdated,
    StepDeleted,
    /// Any other `type` value
    Unknown(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Connected => "connected",
            EventKind::PlanCreated => "plan:created",
            EventKind::PlanUpdated => "plan:updated",
            EventKind::PlanDeleted => "plan:deleted",
            EventKind::StepCreated => "step:created",
            EventKind::StepUpdated => "step:updated",
            EventKind::StepDeleted => "step:deleted",
            EventKind::Unknown(raw) => raw,
        }
    }
}

impl FromStr for EventKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "connected" => EventKind::Connected,
            "plan:created" => EventKind::PlanCreated,
            "plan:updated" => EventKind::PlanUpdated,
            "plan:deleted" => EventKind::PlanDeleted,
            "step:created" => EventKind::StepCreated,
            "step:updated" => EventKind::StepUpdated,
            "step:deleted" => EventKind::StepDeleted,
            other => EventKind::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed message envelope with its payload still untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event discriminant as sent by the server
    #[serde(rename = "type")]
    pub kind: String,

    /// Plan, step, or `{ "id": ... }` for deletions
    #[serde(default)]
    pub data: Value,

    /// Server-side emission time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,

    /// Globally unique message ID, used only for deduplication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Envelope {
    /// Parses a JSON text frame.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn event_kind(&self) -> EventKind {
        match self.kind.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

/// A unit of application data received from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// WebSocket text frame holding a JSON envelope
    Text(String),
    /// Named server-sent event with its (joined) data lines
    Event { name: String, data: String },
}

impl Frame {
    /// Parses the frame into an envelope.
    pub fn into_envelope(self) -> Result<Envelope> {
        match self {
            Frame::Text(text) => Envelope::parse(&text),
            Frame::Event { name, data } => Ok(Envelope {
                kind: name,
                data: serde_json::from_str(&data)?,
                timestamp: None,
                id: None,
            }),
        }
    }
}

/// Anything a transport yields while the connection is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Frame(Frame),
    /// Traffic without application data (pings, comments); still proves
    /// liveness
    Keepalive,
}
