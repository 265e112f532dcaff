//! Web server module for the WhatsApp webhook.
//!
//! This module provides a thin web server that:
//! - Answers the `hub.challenge` subscription handshake
//! - Drops status events and echoes of our own messages
//! - Forwards genuine user messages to n8n
//!
//! No state is kept between requests.

pub mod handlers;
pub mod signature;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::HEALTH_PATH;

pub use handlers::{deliver, health, verify, AppState, HealthResponse, VerifyQuery};
pub use signature::{is_signature_verification_enabled, verify_hub_signature};

/// Build the application router.
///
/// GET on the webhook path is the handshake; every other method is a delivery.
/// Request bodies are not size-limited, so any parseable envelope is forwarded.
pub fn router(state: AppState) -> Router {
    let webhook_path = state.config.webhook_path.clone();

    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(&webhook_path, get(verify).fallback(deliver))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
