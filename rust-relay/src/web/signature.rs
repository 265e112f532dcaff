//! Meta webhook payload signature verification.
//!
//! When an app secret is configured, Meta signs every delivery with
//! `X-Hub-Signature-256: sha256=<hex HMAC-SHA256(app_secret, raw body)>`.
//! Reference: https://developers.facebook.com/docs/graph-api/webhooks/getting-started#validate-payloads

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a `X-Hub-Signature-256` header value against the raw request body.
///
/// Returns `false` for a missing prefix, malformed hex, or a digest mismatch.
pub fn verify_hub_signature(app_secret: &str, header: &str, body: &[u8]) -> bool {
    let hex_digest = match header.trim().strip_prefix(SIGNATURE_PREFIX) {
        Some(h) => h,
        None => {
            warn!(header_length = header.len(), "hub_signature_missing_prefix");
            return false;
        }
    };

    let provided = match hex::decode(hex_digest) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "hub_signature_invalid_hex");
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("hub_signature_invalid_key");
            return false;
        }
    };
    mac.update(body);

    // verify_slice compares in constant time
    let valid = mac.verify_slice(&provided).is_ok();
    if !valid {
        warn!(
            body_length = body.len(),
            provided_length = provided.len(),
            "hub_signature_mismatch"
        );
    }

    valid
}

/// Check if payload signature verification is enabled.
pub fn is_signature_verification_enabled(app_secret: &Option<String>) -> bool {
    app_secret
        .as_ref()
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false)
}

/// Compute the header value Meta would send for `body`.
pub fn sign_body(app_secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}
