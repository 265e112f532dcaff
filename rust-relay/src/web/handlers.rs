//! Webhook endpoint handlers.
//!
//! `verify` answers the subscription handshake. `deliver` filters
//! notifications and forwards genuine user messages, at most once per
//! request. Every outcome maps to a fixed plain-text response; nothing here
//! propagates an error.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header::CONTENT_LENGTH, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::event::{classify, Disposition};
use crate::forward::Forwarder;
use crate::web::signature::{
    is_signature_verification_enabled, verify_hub_signature, SIGNATURE_HEADER,
};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config, forwarder: Forwarder) -> Self {
        Self {
            config: Arc::new(config),
            forwarder,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Verification Handshake
// =============================================================================

/// Query parameters of the `hub.challenge` handshake.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct VerifyQuery {
    pub mode: Option<String>,
    pub verify_token: Option<String>,
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// Parse a raw query string. The first occurrence of a key wins.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = VerifyQuery::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match &*key {
                "hub.mode" => &mut query.mode,
                "hub.verify_token" => &mut query.verify_token,
                "hub.challenge" => &mut query.challenge,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        query
    }
}

/// Webhook verification endpoint (GET).
///
/// Echoes `hub.challenge` verbatim when `hub.verify_token` matches.
pub async fn verify(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> impl IntoResponse {
    let query = VerifyQuery::parse(raw_query.as_deref());

    let token_matches = query.verify_token.as_deref() == Some(state.config.verify_token.as_str());
    let challenge = query.challenge.filter(|c| !c.is_empty());

    info!(
        method = "GET",
        mode = ?query.mode,
        has_token = query.verify_token.is_some(),
        token_matches = token_matches,
        has_challenge = challenge.is_some(),
        "verify_handshake_received"
    );

    match challenge {
        Some(challenge) if token_matches => {
            info!(challenge_length = challenge.len(), "verify_handshake_accepted");
            (StatusCode::OK, challenge)
        }
        _ => {
            warn!("verify_handshake_rejected");
            (StatusCode::FORBIDDEN, "Forbidden".to_string())
        }
    }
}

// =============================================================================
// Event Delivery
// =============================================================================

/// Webhook delivery endpoint (POST).
///
/// This endpoint:
/// 1. Verifies `X-Hub-Signature-256` (if an app secret is configured)
/// 2. Parses the body as JSON
/// 3. Drops status events and echoes of our own messages
/// 4. Forwards everything else, unmodified, to n8n
pub async fn deliver(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let content_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    info!(
        method = %method,
        content_length = ?content_length,
        body_length = body.len(),
        "delivery_received"
    );

    if is_signature_verification_enabled(&state.config.app_secret) {
        let app_secret = state.config.app_secret.as_deref().unwrap_or_default();
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());

        let valid = signature
            .map(|sig| verify_hub_signature(app_secret, sig, &body))
            .unwrap_or(false);

        if !valid {
            warn!(has_signature = signature.is_some(), "delivery_signature_invalid");
            return (StatusCode::UNAUTHORIZED, "Invalid signature");
        }
    }

    let envelope: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "delivery_bad_json");
            return (StatusCode::BAD_REQUEST, "Bad JSON");
        }
    };

    let disposition = classify(&envelope, &state.config.business_phone_msisdn);

    match &disposition {
        Disposition::Status => {
            info!(decision = disposition.label(), "delivery_dropped_status");
            return (StatusCode::OK, "dropped status");
        }
        Disposition::Echo { from } => {
            info!(decision = disposition.label(), from = %from, "delivery_dropped_echo");
            return (StatusCode::OK, "dropped echo");
        }
        Disposition::Inbound { from } => {
            info!(decision = disposition.label(), from = ?from, "delivery_forwarding");
        }
    }

    match state.forwarder.forward(&envelope).await {
        Ok(status) => {
            info!(
                destination = %state.forwarder.destination(),
                status_code = status.as_u16(),
                "delivery_forwarded"
            );
            (StatusCode::OK, "ok")
        }
        Err(e) => {
            error!(error = %e, "delivery_forward_failed");
            (StatusCode::BAD_GATEWAY, "n8n unreachable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_query_parse() {
        let query = VerifyQuery::parse(Some(
            "hub.mode=subscribe&hub.verify_token=test&hub.challenge=abc123",
        ));

        assert_eq!(query.mode.as_deref(), Some("subscribe"));
        assert_eq!(query.verify_token.as_deref(), Some("test"));
        assert_eq!(query.challenge.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_verify_query_first_occurrence_wins() {
        let query = VerifyQuery::parse(Some("hub.challenge=first&hub.challenge=second"));
        assert_eq!(query.challenge.as_deref(), Some("first"));
    }

    #[test]
    fn test_verify_query_decodes_values() {
        let query = VerifyQuery::parse(Some("hub.verify_token=a%20b%2Bc&other=1"));
        assert_eq!(query.verify_token.as_deref(), Some("a b+c"));
        assert!(query.challenge.is_none());
    }

    #[test]
    fn test_verify_query_empty() {
        assert_eq!(VerifyQuery::parse(None), VerifyQuery::default());
        assert_eq!(VerifyQuery::parse(Some("")), VerifyQuery::default());
    }
}
