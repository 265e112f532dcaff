//! Single-attempt POST of the original envelope to the destination.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::Config;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("forward timed out after {timeout_ms}ms")]
    Timeout {
        timeout_ms: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error("destination unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
}

/// Forwards envelopes to a fixed destination.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: Client,
    destination: Url,
    timeout: Option<Duration>,
}

impl Forwarder {
    pub fn new(destination: Url, timeout: Option<Duration>) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .user_agent(concat!("wa-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            destination,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ForwardError> {
        Self::new(config.n8n_url.clone(), config.forward_timeout())
    }

    pub fn destination(&self) -> &Url {
        &self.destination
    }

    /// POST the envelope as JSON and return the destination's status.
    ///
    /// Any HTTP response counts as delivered, whatever its status code.
    /// Only transport failures are errors.
    pub async fn forward(&self, envelope: &Value) -> Result<StatusCode, ForwardError> {
        let started = Instant::now();

        let mut request = self.client.post(self.destination.clone()).json(envelope);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        match request.send().await {
            Ok(resp) => {
                let status = resp.status();
                info!(
                    destination = %self.destination,
                    status_code = status.as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "forward_complete"
                );
                Ok(status)
            }
            Err(e) if e.is_timeout() => {
                let timeout_ms = self
                    .timeout
                    .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
                    .unwrap_or_default();
                error!(
                    destination = %self.destination,
                    timeout_ms = timeout_ms,
                    error = %e,
                    "forward_timeout"
                );
                Err(ForwardError::Timeout {
                    timeout_ms,
                    source: e,
                })
            }
            Err(e) => {
                error!(
                    destination = %self.destination,
                    is_connect = e.is_connect(),
                    error = %e,
                    "forward_error"
                );
                Err(ForwardError::Unreachable(e))
            }
        }
    }
}
