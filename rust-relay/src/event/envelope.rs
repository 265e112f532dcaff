//! Safe navigation over the webhook envelope.
//!
//! Meta wraps every notification as
//! `{"entry":[{"changes":[{"value":{...}}]}]}`. Any level may be missing or
//! carry an unexpected type; both cases read as absence.

use serde_json::Value;

/// Return `entry[0].changes[0].value`, or `None` if any level is absent.
pub fn first_change_value(envelope: &Value) -> Option<&Value> {
    envelope
        .get("entry")?
        .get(0)?
        .get("changes")?
        .get(0)?
        .get("value")
}

/// Loose presence test for optional envelope fields.
///
/// `null`, `false`, `0`, and `""` count as absent. Arrays and objects are
/// present even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `true` when `field` exists on `value` and is truthy.
pub fn has_field(value: &Value, field: &str) -> bool {
    value.get(field).map(is_truthy).unwrap_or(false)
}

/// Sender of the first inbound message, when it is a string.
pub fn first_message_sender(value: &Value) -> Option<&str> {
    value.get("messages")?.get(0)?.get("from")?.as_str()
}
