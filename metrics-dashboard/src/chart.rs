//! Chart descriptions handed to the renderer.

use serde::Serialize;

use crate::table::DataTable;

/// Vertical axis title colour used by every metric chart.
const AXIS_TITLE_COLOR: &str = "red";

/// Default upper bound before any data stretches the axis.
const DEFAULT_AXIS_MAX: f64 = 10.0;

/// Added to a gauge's first value so `max > min` even for a zero reading.
const GAUGE_MAX_EPSILON: f64 = 1.0e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Area,
    Line,
    Gauge,
}

/// What a panel draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Dataset {
    Table(DataTable),
    Gauge { label: String, value: f64 },
}

impl Dataset {
    pub fn as_table(&self) -> Option<&DataTable> {
        match self {
            Dataset::Table(table) => Some(table),
            Dataset::Gauge { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisOptions {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Lower edge of the visible window; keeps the axis pinned at zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_window_min: Option<f64>,
}

impl AxisOptions {
    fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            title_color: None,
            min_value: None,
            max_value: None,
            view_window_min: None,
        }
    }
}

/// Gauge range. `max` only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeBounds {
    pub min: f64,
    pub max: f64,
}

impl GaugeBounds {
    pub fn starting_at(value: f64) -> Self {
        Self {
            min: 0.0,
            max: value + GAUGE_MAX_EPSILON,
        }
    }

    pub fn track(&mut self, value: f64) {
        self.max = self.max.max(value);
    }
}

/// Render options stored with each chart and passed on every draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_axis: Option<AxisOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_axis: Option<AxisOptions>,
    pub interactive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gauge: Option<GaugeBounds>,
}

impl ChartOptions {
    /// Rate chart for one metric: titled with the metric name, y axis in
    /// `<units> per Second` starting at zero, x axis in seconds.
    pub fn rate(name: &str, units: &str) -> Self {
        Self {
            title: name.to_string(),
            v_axis: Some(AxisOptions {
                title_color: Some(AXIS_TITLE_COLOR.to_string()),
                min_value: Some(0.0),
                max_value: Some(DEFAULT_AXIS_MAX),
                view_window_min: Some(0.0),
                ..AxisOptions::titled(format!("{} per Second", units))
            }),
            h_axis: Some(AxisOptions::titled("Time (seconds)")),
            interactive: true,
            gauge: None,
        }
    }

    pub fn gauge(name: &str, value: f64) -> Self {
        Self {
            title: name.to_string(),
            v_axis: None,
            h_axis: None,
            interactive: true,
            gauge: Some(GaugeBounds::starting_at(value)),
        }
    }

    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }
}
