//! Runtime configuration.
//!
//! The binary fills this in from the command line; tests build it directly.

use std::time::Duration;

pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:8090";
pub const DEFAULT_PORT: u16 = 8060;
pub const DEFAULT_LAST_MINUTES: u64 = 5;
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(5000);

/// Delay between the end of one fetch and the start of the next, per poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub job_info: Duration,
    pub aggregate: Duration,
    pub nodes: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            job_info: DEFAULT_UPDATE_INTERVAL,
            aggregate: DEFAULT_UPDATE_INTERVAL,
            nodes: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base address of the metrics server. Can be changed at runtime.
    pub server_address: String,
    /// Port the dashboard itself serves on.
    pub port: u16,
    /// Lookback window requested from the rate endpoints, in minutes.
    pub last_minutes: u64,
    pub intervals: PollIntervals,
    /// Per-request timeout. `None` means requests may hang indefinitely.
    pub request_timeout: Option<Duration>,
    /// Draw a gauge per job metric from `/names.json`.
    pub enable_job_gauges: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            last_minutes: DEFAULT_LAST_MINUTES,
            intervals: PollIntervals::default(),
            request_timeout: None,
            enable_job_gauges: false,
        }
    }
}

impl DashboardConfig {
    /// Lookback window sent as `tlast`. Saturates instead of overflowing on
    /// absurd minute counts.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.last_minutes.saturating_mul(60))
    }
}
