//! Event envelope for the event bus
//!
//! The wire shape delivered to the broker. Derived deterministically from a
//! topic and a record; never persisted independently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope sent to the event bus for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event type, `<namespace>.<resource>.<action>`
    pub event_type: String,
    /// Event subject, `<namespace>.<resource>/<id>`
    pub subject: String,
    /// Converted payload
    pub payload: Value,
}

impl EventEnvelope {
    /// Creates a new event envelope
    pub fn new(event_type: impl Into<String>, subject: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            subject: subject.into(),
            payload,
        }
    }
}
