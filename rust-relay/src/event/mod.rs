//! Event classification.
//!
//! Decides what happens to a parsed webhook envelope:
//!
//! ```text
//! envelope → classify() → Status | Echo | Inbound
//! ```
//!
//! Only `Inbound` events are forwarded.

pub mod envelope;

use serde_json::Value;
use tracing::debug;

pub use envelope::{first_change_value, first_message_sender, has_field, is_truthy};

/// Outcome of classifying a delivery envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Delivery status update, or nothing recognisable as a message
    Status,
    /// The relay's own outbound message reflected back by the platform
    Echo { from: String },
    /// A genuine user message
    Inbound { from: Option<String> },
}

impl Disposition {
    /// Short name used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            Disposition::Status => "status",
            Disposition::Echo { .. } => "echo",
            Disposition::Inbound { .. } => "inbound",
        }
    }
}

/// Classify an envelope against the relay's own sender id.
///
/// Checks run in priority order: status, then echo, then inbound.
pub fn classify(envelope: &Value, self_id: &str) -> Disposition {
    let value = match first_change_value(envelope) {
        Some(v) => v,
        None => return Disposition::Status,
    };

    if !has_field(value, "messages") || has_field(value, "statuses") {
        return Disposition::Status;
    }

    let from = first_message_sender(value);
    debug!(from = ?from, "event_sender");

    match from {
        Some(sender) if sender == self_id => Disposition::Echo {
            from: sender.to_string(),
        },
        other => Disposition::Inbound {
            from: other.map(str::to_string),
        },
    }
}
