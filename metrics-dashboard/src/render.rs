//! Seams between the dashboard logic and whatever displays it.
//!
//! `Surface` is the document side: named text fields and containers that
//! panels are appended to. `Renderer` draws a chart into an existing panel.
//! The dashboard only ever talks to these traits; [`crate::page::PageView`]
//! is the in-process implementation served over HTTP.

use serde::Serialize;

use crate::chart::{ChartKind, ChartOptions, Dataset};

/// Region of the page that owns a category of panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Gauges,
    Aggregate,
    Nodes,
}

impl Container {
    pub const ALL: [Container; 3] = [Container::Gauges, Container::Aggregate, Container::Nodes];

    /// Suffix of the element id given to panels in this container.
    pub fn panel_suffix(&self) -> &'static str {
        match self {
            Container::Gauges => "info_gauge",
            Container::Aggregate => "aggregate_chart",
            Container::Nodes => "node_chart",
        }
    }

    pub fn element_id(&self, metric_id: i64) -> String {
        format!("{}_{}", metric_id, self.panel_suffix())
    }
}

/// Fixed text fields written by the job summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ProgramName,
    CurrentTime,
}

/// Opaque reference to a panel created by a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PanelHandle(pub usize);

pub trait Surface {
    fn set_text(&mut self, field: Field, text: &str);

    /// Append a titled panel to the end of `container`.
    fn append_panel(&mut self, container: Container, element_id: &str, title: &str)
        -> PanelHandle;

    /// Caption shown next to a panel's chart (the gauge's numeric value).
    fn set_panel_value(&mut self, panel: PanelHandle, text: &str);
}

pub trait Renderer {
    fn draw(&mut self, panel: PanelHandle, kind: ChartKind, data: &Dataset, options: &ChartOptions);
}
