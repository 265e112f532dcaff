//! Outbound forwarding to the n8n webhook.

pub mod client;

pub use client::{ForwardError, Forwarder};
