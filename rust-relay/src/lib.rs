//! wa-relay - WhatsApp Cloud API webhook relay.
//!
//! Receives Meta webhook callbacks, answers the subscription handshake,
//! filters out status events and echoes, and forwards genuine user
//! messages unmodified to an n8n webhook.
//!
//! ## Architecture
//!
//! ```text
//! Meta → web::verify  (GET)  → challenge echo
//! Meta → web::deliver (POST) → event::classify → forward::Forwarder → n8n
//! ```

pub mod config;
pub mod event;
pub mod forward;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use event::{classify, Disposition};
pub use forward::{ForwardError, Forwarder};
pub use web::{router, AppState};
