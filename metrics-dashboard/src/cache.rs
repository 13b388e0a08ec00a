//! Id-keyed chart state, one cache per data category.
//!
//! Every metric id gets exactly one panel, created the first time the id is
//! seen and redrawn on every later poll that carries it. Entries are never
//! removed: a metric that stops reporting keeps its last frame.

use std::collections::HashMap;

use tracing::debug;

use crate::chart::{ChartKind, ChartOptions, Dataset};
use crate::render::{Container, PanelHandle, Renderer, Surface};

/// Chart bookkeeping for one metric id.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartState {
    pub panel: PanelHandle,
    pub kind: ChartKind,
    pub options: ChartOptions,
    pub last_dataset: Option<Dataset>,
}

#[derive(Debug)]
pub struct MetricChartCache {
    container: Container,
    kind: ChartKind,
    interactive: bool,
    charts: HashMap<i64, ChartState>,
}

impl MetricChartCache {
    /// Area charts in the aggregate container.
    pub fn aggregate() -> Self {
        Self::new(Container::Aggregate, ChartKind::Area, true)
    }

    /// Non-interactive line charts in the per-node container.
    pub fn nodes() -> Self {
        Self::new(Container::Nodes, ChartKind::Line, false)
    }

    fn new(container: Container, kind: ChartKind, interactive: bool) -> Self {
        Self {
            container,
            kind,
            interactive,
            charts: HashMap::new(),
        }
    }

    pub fn get(&self, metric_id: i64) -> Option<&ChartState> {
        self.charts.get(&metric_id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Find or create the chart for `metric_id` and draw `dataset` into it.
    ///
    /// `dataset` is `None` when the metric's record was empty; the chart is
    /// still created on first sight but nothing is drawn and the previous
    /// frame stays on screen.
    pub fn upsert<V>(
        &mut self,
        view: &mut V,
        metric_id: i64,
        name: &str,
        units: &str,
        dataset: Option<Dataset>,
    ) -> &ChartState
    where
        V: Surface + Renderer,
    {
        let container = self.container;
        let kind = self.kind;
        let interactive = self.interactive;

        let state = self.charts.entry(metric_id).or_insert_with(|| {
            let element_id = container.element_id(metric_id);
            debug!(metric_id, metric_name = name, element_id = %element_id, "Creating chart");

            let panel = view.append_panel(container, &element_id, name);
            let options = ChartOptions::rate(name, units);
            ChartState {
                panel,
                kind,
                options: if interactive { options } else { options.non_interactive() },
                last_dataset: None,
            }
        });

        if let Some(dataset) = dataset {
            view.draw(state.panel, state.kind, &dataset, &state.options);
            state.last_dataset = Some(dataset);
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;
    use crate::page::PageView;
    use crate::table::DataTable;

    fn series(points: &[(f64, f64)]) -> Option<Dataset> {
        let samples: Vec<_> = points.iter().map(|&(t, v)| Sample(t, v)).collect();
        Some(Dataset::Table(DataTable::from_series(&samples)))
    }

    #[test]
    fn test_first_sight_creates_panel() {
        let mut page = PageView::new();
        let mut cache = MetricChartCache::aggregate();

        let state = cache.upsert(&mut page, 4, "CPU", "ops", series(&[(0.0, 1.0)]));
        let panel = page.panel(state.panel).unwrap();

        assert_eq!(panel.element_id, "4_aggregate_chart");
        assert_eq!(panel.title, "CPU");
        assert_eq!(cache.get(4).unwrap().options.v_axis.as_ref().unwrap().title, "ops per Second");
    }

    #[test]
    fn test_same_id_reuses_state() {
        let mut page = PageView::new();
        let mut cache = MetricChartCache::aggregate();

        let first = cache.upsert(&mut page, 1, "CPU", "ops", series(&[(0.0, 1.0)])).panel;
        let second = cache.upsert(&mut page, 1, "CPU", "ops", series(&[(1.0, 2.0)])).panel;

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(page.element_ids(Container::Aggregate).len(), 1);
    }

    #[test]
    fn test_empty_record_keeps_last_dataset() {
        let mut page = PageView::new();
        let mut cache = MetricChartCache::aggregate();

        cache.upsert(&mut page, 1, "CPU", "ops", series(&[(0.0, 1.0)]));
        let state = cache.upsert(&mut page, 1, "CPU", "ops", None);

        assert_eq!(state.last_dataset, series(&[(0.0, 1.0)]));
        assert_eq!(page.total_draws(), 1);
    }

    #[test]
    fn test_empty_record_on_first_sight_creates_blank_panel() {
        let mut page = PageView::new();
        let mut cache = MetricChartCache::nodes();

        let state = cache.upsert(&mut page, 9, "net", "bytes", None);

        assert!(state.last_dataset.is_none());
        assert_eq!(page.element_ids(Container::Nodes), vec!["9_node_chart"]);
        assert_eq!(page.total_draws(), 0);
    }

    #[test]
    fn test_node_charts_are_line_and_static() {
        let mut page = PageView::new();
        let mut cache = MetricChartCache::nodes();

        let state = cache.upsert(&mut page, 2, "net", "bytes", None);

        assert_eq!(state.kind, ChartKind::Line);
        assert!(!state.options.interactive);
    }
}
