//! Fixed-delay polling of the metrics server.
//!
//! Each poller is one task running fetch → decode → process → wait, forever.
//! The wait starts after the fetch completes, so a slow server never sees
//! overlapping requests from the same poller. Failures are logged and the
//! loop carries on at the same pace; there is no backoff.
//!
//! All pollers watch the same server address. Publishing a new address wakes
//! any poller that is waiting on its timer so it fetches from the new server
//! right away. A request already in flight is allowed to finish and land
//! first.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{Endpoint, MetricsClient};
use crate::config::PollIntervals;
use crate::dashboard::{self, SharedDashboard};
use crate::data::{AggregateMetric, JobInfo, NodeMetric};
use crate::render::{Renderer, Surface};

/// Publisher side of the server address all pollers read from.
///
/// Dropping it stops the pollers after their current cycle.
#[derive(Debug)]
pub struct ServerAddress {
    tx: watch::Sender<String>,
}

impl ServerAddress {
    pub fn new(address: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(address.into());
        Self { tx }
    }

    pub fn get(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Point every poller at a new server. Takes effect immediately for
    /// pollers that are between requests.
    pub fn set(&self, address: impl Into<String>) {
        let address = address.into();
        info!(address = %address, "Setting domain");
        self.tx.send_replace(address);
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

/// Spawns polling loops sharing one HTTP client and one address.
#[derive(Clone)]
pub struct Poller {
    client: MetricsClient,
    address: watch::Receiver<String>,
}

impl Poller {
    pub fn new(client: MetricsClient, address: &ServerAddress) -> Self {
        Self {
            client,
            address: address.subscribe(),
        }
    }

    /// Poll `endpoint` every `delay` (measured from completion), handing each
    /// decoded response to `on_success`.
    pub fn schedule<T, F>(&self, endpoint: Endpoint, on_success: F, delay: Duration) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let client = self.client.clone();
        let address = self.address.clone();
        tokio::spawn(poll_loop(client, address, endpoint, on_success, delay))
    }
}

async fn poll_loop<T, F>(
    client: MetricsClient,
    mut address: watch::Receiver<String>,
    endpoint: Endpoint,
    mut on_success: F,
    delay: Duration,
) where
    T: DeserializeOwned,
    F: FnMut(T),
{
    debug!(endpoint = %endpoint, delay_ms = delay.as_millis() as u64, "Poller started");

    loop {
        let base_url = address.borrow_and_update().clone();

        match client.fetch::<T>(&base_url, endpoint).await {
            Ok(data) => on_success(data),
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Unable to access {} will try again.", base_url);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            changed = address.changed() => {
                if changed.is_err() {
                    debug!(endpoint = %endpoint, "Server address dropped, poller stopping");
                    return;
                }
                info!(endpoint = %endpoint, "Server address changed, restarting poll");
            }
        }
    }
}

/// Handles to the three running pollers.
#[derive(Debug)]
pub struct PollerHandles {
    pub job_info: JoinHandle<()>,
    pub aggregate: JoinHandle<()>,
    pub nodes: JoinHandle<()>,
}

impl PollerHandles {
    pub fn abort(&self) {
        self.job_info.abort();
        self.aggregate.abort();
        self.nodes.abort();
    }

    /// Wait for all three loops to finish (they finish once the address
    /// publisher is dropped).
    pub async fn join(self) {
        for (endpoint, handle) in [
            (Endpoint::JobInfo, self.job_info),
            (Endpoint::Aggregate, self.aggregate),
            (Endpoint::ByMachine, self.nodes),
        ] {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(endpoint = %endpoint, error = %e, "Poller task failed");
                }
            }
        }
    }
}

/// Start the job-info, aggregate and per-node pollers, each feeding its
/// category on the shared dashboard.
pub fn spawn_pollers<V>(
    poller: &Poller,
    shared: SharedDashboard<V>,
    intervals: PollIntervals,
) -> PollerHandles
where
    V: Surface + Renderer + Send + 'static,
{
    let job_dashboard = shared.clone();
    let job_info = poller.schedule(
        Endpoint::JobInfo,
        move |info: JobInfo| dashboard::lock(&job_dashboard).process_job_info(info),
        intervals.job_info,
    );

    let aggregate_dashboard = shared.clone();
    let aggregate = poller.schedule(
        Endpoint::Aggregate,
        move |metrics: Vec<AggregateMetric>| {
            dashboard::lock(&aggregate_dashboard).process_aggregate(metrics)
        },
        intervals.aggregate,
    );

    let nodes = poller.schedule(
        Endpoint::ByMachine,
        move |metrics: Vec<NodeMetric>| dashboard::lock(&shared).process_nodes(metrics),
        intervals.nodes,
    );

    info!("Pollers started");
    PollerHandles {
        job_info,
        aggregate,
        nodes,
    }
}
