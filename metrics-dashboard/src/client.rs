//! HTTP client for the metrics server.
//!
//! Three endpoints, all GET, all JSON:
//! - `/names.json` - job summary
//! - `/metrics_aggregate.json?rate=1&rounding=1&tlast=<s>` - fleet-wide rates
//! - `/metrics_by_machine.json?rate=1&align=1&tlast=<s>` - per-node rates

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Error types for a single poll.
///
/// The poller treats every variant the same way (log and try again later);
/// the split exists so the log line says what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    JobInfo,
    Aggregate,
    ByMachine,
}

impl Endpoint {
    /// Short name used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::JobInfo => "job_info",
            Endpoint::Aggregate => "aggregate",
            Endpoint::ByMachine => "by_machine",
        }
    }

    /// Path and query relative to the server address. `window` is the
    /// lookback the rate endpoints are asked for, sent as whole seconds.
    pub fn path_and_query(&self, window: Duration) -> String {
        let tlast = window.as_secs();
        match self {
            Endpoint::JobInfo => "/names.json".to_string(),
            Endpoint::Aggregate => {
                format!("/metrics_aggregate.json?rate=1&rounding=1&tlast={}", tlast)
            }
            Endpoint::ByMachine => {
                format!("/metrics_by_machine.json?rate=1&align=1&tlast={}", tlast)
            }
        }
    }

    pub fn url(&self, base_url: &str, window: Duration) -> String {
        format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            self.path_and_query(window)
        )
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP client for the metrics server. Cheap to clone.
#[derive(Clone)]
pub struct MetricsClient {
    client: reqwest::Client,
    window: Duration,
}

impl MetricsClient {
    /// `timeout` of `None` leaves requests unbounded: a hung request only
    /// holds up the poller that issued it.
    pub fn new(window: Duration, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client, window })
    }

    /// GET `endpoint` on the server at `base_url` and decode the body.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        base_url: &str,
        endpoint: Endpoint,
    ) -> std::result::Result<T, FetchError> {
        let url = endpoint.url(base_url, self.window);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { url, source })
    }
}
