//! Dashboard binary: polls a metrics server and serves the charts over HTTP.
//!
//! # Usage
//!
//! ```bash
//! metrics-dashboard
//! metrics-dashboard --server http://10.0.0.5:8090 --port 8080
//! metrics-dashboard --last-minutes 15 --enable-job-gauges
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use metrics_dashboard::client::MetricsClient;
use metrics_dashboard::config::{self, DashboardConfig, PollIntervals};
use metrics_dashboard::poller::{self, Poller, ServerAddress};
use metrics_dashboard::server::{self, AppState};
use metrics_dashboard::{Dashboard, PageView};

/// Live charts for a metrics server
#[derive(Parser, Debug)]
#[command(name = "metrics-dashboard")]
#[command(about = "Poll a metrics server and serve live charts")]
#[command(version)]
struct Args {
    /// Base address of the metrics server
    #[arg(short, long, env = "METRICS_SERVER_ADDRESS", default_value = config::DEFAULT_SERVER_ADDRESS)]
    server: String,

    /// Port for the dashboard web server
    #[arg(short, long, env = "METRICS_DASHBOARD_PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Lookback window requested from the rate endpoints, in minutes
    #[arg(long, default_value_t = config::DEFAULT_LAST_MINUTES)]
    last_minutes: u64,

    /// Delay between job summary polls, in milliseconds
    #[arg(long, default_value = "5000")]
    job_interval_ms: u64,

    /// Delay between aggregate rate polls, in milliseconds
    #[arg(long, default_value = "5000")]
    aggregate_interval_ms: u64,

    /// Delay between per-node rate polls, in milliseconds
    #[arg(long, default_value = "5000")]
    node_interval_ms: u64,

    /// Per-request timeout in milliseconds (unset: no timeout)
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    /// Draw a gauge for each job metric
    #[arg(long, default_value = "false")]
    enable_job_gauges: bool,
}

impl From<Args> for DashboardConfig {
    fn from(args: Args) -> Self {
        DashboardConfig {
            server_address: args.server,
            port: args.port,
            last_minutes: args.last_minutes,
            intervals: PollIntervals {
                job_info: Duration::from_millis(args.job_interval_ms),
                aggregate: Duration::from_millis(args.aggregate_interval_ms),
                nodes: Duration::from_millis(args.node_interval_ms),
            },
            request_timeout: args.request_timeout_ms.map(Duration::from_millis),
            enable_job_gauges: args.enable_job_gauges,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - RUST_LOG takes precedence, fallback to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config: DashboardConfig = Args::parse().into();

    tracing::info!(
        server = %config.server_address,
        port = config.port,
        last_minutes = config.last_minutes,
        enable_job_gauges = config.enable_job_gauges,
        "Starting metrics-dashboard"
    );

    run(config).await
}

async fn run(config: DashboardConfig) -> Result<()> {
    let client = MetricsClient::new(config.window(), config.request_timeout)?;
    let dashboard = Dashboard::new(PageView::new(), config.enable_job_gauges).into_shared();
    let address = ServerAddress::new(config.server_address.clone());

    let handles = poller::spawn_pollers(
        &Poller::new(client, &address),
        dashboard.clone(),
        config.intervals,
    );

    let state = Arc::new(AppState { dashboard, address });

    let result = tokio::select! {
        result = server::run_server(state, config.port) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down");
            Ok(())
        }
    };

    handles.abort();
    result
}
