//! Configuration module for environment variable parsing.
//!
//! Configuration is read once at startup and handed to the router as an
//! immutable value. `Config::from_lookup` accepts any key lookup so tests can
//! build fixtures without touching the process environment.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Path reserved for the health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Configuration errors that abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("{name} is not a valid http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{name} must be a static path starting with '/' other than /health: {value}")]
    InvalidPath { name: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// n8n webhook that receives forwarded events
    pub n8n_url: Url,

    /// The relay's own business number, without the leading `+`
    pub business_phone_msisdn: String,

    /// Shared secret expected in `hub.verify_token`
    pub verify_token: String,

    /// Meta app secret for `X-Hub-Signature-256` checks
    pub app_secret: Option<String>,

    /// Port for the web server to listen on
    pub port: u16,

    /// Path the webhook is mounted on
    pub webhook_path: String,

    /// Upper bound for the forward call, unset means no internal timeout
    pub forward_timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = required(&lookup, "N8N_URL")?;
        let n8n_url = Url::parse(&raw_url)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| ConfigError::InvalidUrl {
                name: "N8N_URL",
                value: raw_url.clone(),
            })?;

        let business_phone_msisdn = required(&lookup, "BUSINESS_PHONE_MSISDN")?
            .trim_start_matches('+')
            .to_string();
        if business_phone_msisdn.is_empty() {
            return Err(ConfigError::Missing("BUSINESS_PHONE_MSISDN"));
        }

        let verify_token = required(&lookup, "VERIFY_TOKEN")?;

        let app_secret = lookup("APP_SECRET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let webhook_path = lookup("WEBHOOK_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "/".to_string());
        if !is_static_path(&webhook_path) || webhook_path == HEALTH_PATH {
            return Err(ConfigError::InvalidPath {
                name: "WEBHOOK_PATH",
                value: webhook_path,
            });
        }

        let port = parse_or(&lookup, "PORT", 8080);

        let forward_timeout_ms = parse_optional::<u64, _>(&lookup, "FORWARD_TIMEOUT_MS")
            .filter(|ms| *ms > 0);

        Ok(Config {
            n8n_url,
            business_phone_msisdn,
            verify_token,
            app_secret,
            port,
            webhook_path,
            forward_timeout_ms,
        })
    }

    /// Timeout applied to the forward call, if any.
    pub fn forward_timeout(&self) -> Option<Duration> {
        self.forward_timeout_ms.map(Duration::from_millis)
    }
}

/// A path with no router capture or wildcard syntax.
fn is_static_path(path: &str) -> bool {
    path.starts_with('/') && !path.contains([':', '*', '{', '}'])
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Parse an optional value, warning and ignoring it when malformed.
fn parse_optional<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            None
        }
    }
}

fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    parse_optional(lookup, name).unwrap_or(default)
}
