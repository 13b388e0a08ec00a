//! Wire types returned by the metrics server.
//!
//! Decoding is deliberately lenient: only `id` is required on a metric, every
//! other field falls back to an empty value so one odd record never drops a
//! whole poll.

use serde::{Deserialize, Serialize};

/// A single `(timestamp, value)` pair, encoded on the wire as `[t, v]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample(pub f64, pub f64);

impl Sample {
    pub fn time(&self) -> f64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.1
    }

    /// Per-node series mark "no sample at this time" with a negative value.
    pub fn is_missing(&self) -> bool {
        self.1 < 0.0
    }
}

/// A named, unit-labeled series identified by a stable integer id.
///
/// `R` is the record shape: a flat series for aggregate metrics, one series
/// per node for per-machine metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord<R> {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub record: R,
}

/// Fleet-wide rate metric from `/metrics_aggregate.json`.
pub type AggregateMetric = MetricRecord<Vec<Sample>>;

/// Per-node metric from `/metrics_by_machine.json`, one series per node
/// aligned by index.
pub type NodeMetric = MetricRecord<Vec<Vec<Sample>>>;

/// Current value of a job metric, as listed in `/names.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetric {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rate_val: f64,
}

/// Job summary from `/names.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    #[serde(default)]
    pub program_name: Option<String>,
    /// Seconds since the job started.
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub metrics: Vec<JobMetric>,
}

/// Stable ascending-id order. Panels are appended in processing order, so
/// this keeps the layout fixed even when the server shuffles its output.
pub fn sort_by_id<R>(metrics: &mut [MetricRecord<R>]) {
    metrics.sort_by_key(|m| m.id);
}
