//! In-process page model.
//!
//! Panels live in an arena indexed by [`PanelHandle`]; containers keep the
//! append order. Each draw replaces the panel's frame, so a snapshot always
//! shows the most recent render.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::chart::{ChartKind, ChartOptions, Dataset};
use crate::render::{Container, Field, PanelHandle, Renderer, Surface};

/// Last thing drawn into a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub kind: ChartKind,
    pub dataset: Dataset,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub element_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub frame: Option<Frame>,
    pub draw_count: u64,
}

#[derive(Debug, Default)]
pub struct PageView {
    fields: BTreeMap<Field, String>,
    containers: BTreeMap<Container, Vec<PanelHandle>>,
    panels: Vec<Panel>,
}

impl PageView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn panel(&self, handle: PanelHandle) -> Option<&Panel> {
        self.panels.get(handle.0)
    }

    /// Panels of `container` in append order.
    pub fn panels_in(&self, container: Container) -> impl Iterator<Item = &Panel> + '_ {
        self.containers
            .get(&container)
            .into_iter()
            .flatten()
            .filter_map(|handle| self.panels.get(handle.0))
    }

    /// Element ids of `container` in append order.
    pub fn element_ids(&self, container: Container) -> Vec<&str> {
        self.panels_in(container)
            .map(|p| p.element_id.as_str())
            .collect()
    }

    pub fn total_draws(&self) -> u64 {
        self.panels.iter().map(|p| p.draw_count).sum()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            fields: self.fields.clone(),
            containers: Container::ALL
                .iter()
                .map(|&container| ContainerSnapshot {
                    container,
                    panels: self.panels_in(container).cloned().collect(),
                })
                .collect(),
        }
    }
}

impl Surface for PageView {
    fn set_text(&mut self, field: Field, text: &str) {
        self.fields.insert(field, text.to_string());
    }

    fn append_panel(
        &mut self,
        container: Container,
        element_id: &str,
        title: &str,
    ) -> PanelHandle {
        let handle = PanelHandle(self.panels.len());
        self.panels.push(Panel {
            element_id: element_id.to_string(),
            title: title.to_string(),
            value: None,
            frame: None,
            draw_count: 0,
        });
        self.containers.entry(container).or_default().push(handle);
        handle
    }

    fn set_panel_value(&mut self, panel: PanelHandle, text: &str) {
        if let Some(panel) = self.panels.get_mut(panel.0) {
            panel.value = Some(text.to_string());
        }
    }
}

impl Renderer for PageView {
    fn draw(&mut self, handle: PanelHandle, kind: ChartKind, data: &Dataset, options: &ChartOptions) {
        let Some(panel) = self.panels.get_mut(handle.0) else {
            tracing::warn!(panel = handle.0, "Draw into unknown panel ignored");
            return;
        };
        panel.frame = Some(Frame {
            kind,
            dataset: data.clone(),
            options: options.clone(),
        });
        panel.draw_count += 1;
    }
}

/// Serializable copy of the whole page.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub fields: BTreeMap<Field, String>,
    pub containers: Vec<ContainerSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerSnapshot {
    pub container: Container,
    pub panels: Vec<Panel>,
}
