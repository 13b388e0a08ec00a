//! Dashboard controller.
//!
//! Owns the page and every chart cache for the lifetime of the session. Each
//! `process_*` method handles one decoded poll response for its category.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::cache::MetricChartCache;
use crate::chart::{ChartKind, ChartOptions, Dataset};
use crate::data::{sort_by_id, AggregateMetric, JobInfo, JobMetric, NodeMetric};
use crate::page::PageView;
use crate::render::{Container, Field, PanelHandle, Renderer, Surface};
use crate::table::DataTable;

#[derive(Debug)]
struct GaugeState {
    panel: PanelHandle,
    options: ChartOptions,
}

/// Controller shared between the pollers and the HTTP server.
pub type SharedDashboard<V = PageView> = Arc<Mutex<Dashboard<V>>>;

/// Lock the shared controller. A panic in one callback does not leave the
/// page unusable for the others, so poisoning is ignored.
pub fn lock<V>(dashboard: &SharedDashboard<V>) -> MutexGuard<'_, Dashboard<V>> {
    dashboard.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct Dashboard<V = PageView> {
    view: V,
    enable_job_gauges: bool,
    gauges: HashMap<i64, GaugeState>,
    aggregate: MetricChartCache,
    nodes: MetricChartCache,
}

impl<V: Surface + Renderer> Dashboard<V> {
    pub fn new(view: V, enable_job_gauges: bool) -> Self {
        Self {
            view,
            enable_job_gauges,
            gauges: HashMap::new(),
            aggregate: MetricChartCache::aggregate(),
            nodes: MetricChartCache::nodes(),
        }
    }

    pub fn into_shared(self) -> SharedDashboard<V> {
        Arc::new(Mutex::new(self))
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn aggregate_charts(&self) -> &MetricChartCache {
        &self.aggregate
    }

    pub fn node_charts(&self) -> &MetricChartCache {
        &self.nodes
    }

    /// Job summary: program name and elapsed time go straight into their
    /// fields. Fields the server left out keep their previous text.
    pub fn process_job_info(&mut self, info: JobInfo) {
        debug!("Processing job info.");

        if let Some(program_name) = &info.program_name {
            self.view.set_text(Field::ProgramName, program_name);
        }
        if let Some(time) = info.time {
            self.view.set_text(Field::CurrentTime, &format!("{} seconds", time));
        }

        if self.enable_job_gauges {
            let mut metrics = info.metrics;
            metrics.sort_by_key(|m| m.id);
            for metric in &metrics {
                self.update_gauge(metric);
            }
        }
    }

    fn update_gauge(&mut self, metric: &JobMetric) {
        let view = &mut self.view;
        let gauge = self.gauges.entry(metric.id).or_insert_with(|| {
            let element_id = Container::Gauges.element_id(metric.id);
            debug!(metric_id = metric.id, element_id = %element_id, "Creating gauge");
            GaugeState {
                panel: view.append_panel(Container::Gauges, &element_id, &metric.name),
                options: ChartOptions::gauge(&metric.name, metric.rate_val),
            }
        });

        if let Some(bounds) = gauge.options.gauge.as_mut() {
            bounds.track(metric.rate_val);
        }
        let dataset = Dataset::Gauge {
            label: metric.name.clone(),
            value: metric.rate_val,
        };
        view.draw(gauge.panel, ChartKind::Gauge, &dataset, &gauge.options);
        view.set_panel_value(gauge.panel, &metric.rate_val.to_string());
    }

    pub fn process_aggregate(&mut self, mut metrics: Vec<AggregateMetric>) {
        debug!(count = metrics.len(), "Processing aggregate info.");

        sort_by_id(&mut metrics);
        for metric in metrics {
            let dataset = (!metric.record.is_empty())
                .then(|| Dataset::Table(DataTable::from_series(&metric.record)));
            self.aggregate
                .upsert(&mut self.view, metric.id, &metric.name, &metric.units, dataset);
        }
    }

    pub fn process_nodes(&mut self, mut metrics: Vec<NodeMetric>) {
        debug!(count = metrics.len(), "Processing node info.");

        sort_by_id(&mut metrics);
        for metric in metrics {
            let dataset = (!metric.record.is_empty())
                .then(|| Dataset::Table(DataTable::from_tensor(&metric.record)));
            self.nodes
                .upsert(&mut self.view, metric.id, &metric.name, &metric.units, dataset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MetricRecord, Sample};
    use proptest::prelude::*;

    fn aggregate(id: i64, record: &[(f64, f64)]) -> AggregateMetric {
        MetricRecord {
            id,
            name: format!("metric {}", id),
            units: "ops".to_string(),
            record: record.iter().map(|&(t, v)| Sample(t, v)).collect(),
        }
    }

    fn node(id: i64, record: &[(f64, f64)]) -> NodeMetric {
        MetricRecord {
            id,
            name: format!("metric {}", id),
            units: "ops".to_string(),
            record: vec![record.iter().map(|&(t, v)| Sample(t, v)).collect()],
        }
    }

    fn job_info(ids: &[i64], rate: f64) -> JobInfo {
        JobInfo {
            metrics: ids
                .iter()
                .map(|&id| JobMetric { id, name: format!("metric {}", id), rate_val: rate })
                .collect(),
            ..JobInfo::default()
        }
    }

    /// Two distinct orderings of the same id set.
    fn shuffled_ids() -> impl Strategy<Value = (Vec<i64>, Vec<i64>)> {
        prop::collection::hash_set(0i64..1000, 1..20)
            .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
            .prop_flat_map(|ids| (Just(ids.clone()), Just(ids).prop_shuffle()))
    }

    fn expected_ids(ids: &[i64], suffix: &str) -> Vec<String> {
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        sorted.iter().map(|id| format!("{}_{}", id, suffix)).collect()
    }

    fn actual_ids(dash: &Dashboard, container: Container) -> Vec<String> {
        dash.view()
            .element_ids(container)
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(PageView::new(), false)
    }

    #[test]
    fn test_job_info_fills_fields() {
        let mut dash = dashboard();
        let info: JobInfo = serde_json::from_str(r#"{"program_name": "X", "time": 42}"#).unwrap();

        dash.process_job_info(info);

        assert_eq!(dash.view().text(Field::ProgramName), Some("X"));
        assert_eq!(dash.view().text(Field::CurrentTime), Some("42 seconds"));
    }

    #[test]
    fn test_job_info_fractional_time() {
        let mut dash = dashboard();
        dash.process_job_info(JobInfo {
            time: Some(1.5),
            ..JobInfo::default()
        });

        assert_eq!(dash.view().text(Field::CurrentTime), Some("1.5 seconds"));
    }

    #[test]
    fn test_job_info_missing_fields_keep_text() {
        let mut dash = dashboard();
        dash.process_job_info(JobInfo {
            program_name: Some("first".into()),
            time: Some(1.0),
            metrics: Vec::new(),
        });
        dash.process_job_info(JobInfo::default());

        assert_eq!(dash.view().text(Field::ProgramName), Some("first"));
        assert_eq!(dash.view().text(Field::CurrentTime), Some("1 seconds"));
    }

    #[test]
    fn test_gauges_disabled_by_default() {
        let mut dash = dashboard();
        let info: JobInfo =
            serde_json::from_str(r#"{"metrics": [{"id": 1, "name": "u", "rate_val": 3}]}"#).unwrap();

        dash.process_job_info(info);

        assert!(dash.view().element_ids(Container::Gauges).is_empty());
        assert_eq!(dash.view().total_draws(), 0);
    }

    #[test]
    fn test_gauges_track_max() {
        let mut dash = Dashboard::new(PageView::new(), true);
        let poll = |rate: f64| JobInfo {
            metrics: vec![JobMetric { id: 1, name: "updates".into(), rate_val: rate }],
            ..JobInfo::default()
        };

        dash.process_job_info(poll(5.0));
        dash.process_job_info(poll(2.0));

        let panels: Vec<_> = dash.view().panels_in(Container::Gauges).collect();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].element_id, "1_info_gauge");
        assert_eq!(panels[0].value.as_deref(), Some("2"));

        let frame = panels[0].frame.as_ref().unwrap();
        assert!(frame.options.gauge.unwrap().max >= 5.0);
        assert_eq!(frame.dataset, Dataset::Gauge { label: "updates".into(), value: 2.0 });
    }

    #[test]
    fn test_aggregate_dataset_replaced_not_appended() {
        let mut dash = dashboard();

        dash.process_aggregate(vec![aggregate(1, &[(0.0, 1.0), (1.0, 2.0)])]);
        dash.process_aggregate(vec![aggregate(1, &[(2.0, 3.0)])]);

        let panels: Vec<_> = dash.view().panels_in(Container::Aggregate).collect();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].draw_count, 2);

        let table = panels[0].frame.as_ref().unwrap().dataset.as_table().unwrap();
        assert_eq!(table.columns, vec!["Time", "Value"]);
        assert_eq!(table.rows, vec![vec![Some(2.0), Some(3.0)]]);
    }

    #[test]
    fn test_aggregate_empty_record_skips_draw() {
        let mut dash = dashboard();

        dash.process_aggregate(vec![aggregate(1, &[(0.0, 1.0)])]);
        dash.process_aggregate(vec![aggregate(1, &[])]);

        assert_eq!(dash.view().total_draws(), 1);
        let state = dash.aggregate_charts().get(1).unwrap();
        assert_eq!(
            state.last_dataset.as_ref().and_then(Dataset::as_table).unwrap().rows,
            vec![vec![Some(0.0), Some(1.0)]]
        );
    }

    #[test]
    fn test_nodes_use_tensor_table() {
        let mut dash = dashboard();
        let metric: NodeMetric = serde_json::from_str(
            r#"{"id": 3, "name": "net", "units": "bytes",
                "record": [[[0, 1], [1, 2]], [[0, -1], [1, 5]]]}"#,
        )
        .unwrap();

        dash.process_nodes(vec![metric]);

        let panel = dash.view().panels_in(Container::Nodes).next().unwrap();
        assert_eq!(panel.element_id, "3_node_chart");
        let frame = panel.frame.as_ref().unwrap();
        assert_eq!(frame.kind, ChartKind::Line);
        let table = frame.dataset.as_table().unwrap();
        assert_eq!(table.columns, vec!["Time", "Node 0", "Node 1"]);
        assert_eq!(table.rows[0], vec![Some(0.0), Some(1.0), None]);
    }

    #[test]
    fn test_categories_do_not_share_ids() {
        let mut dash = dashboard();
        let node: NodeMetric = MetricRecord {
            id: 1,
            name: "n".into(),
            units: "u".into(),
            record: Vec::new(),
        };

        dash.process_aggregate(vec![aggregate(1, &[(0.0, 1.0)])]);
        dash.process_nodes(vec![node]);

        assert_eq!(dash.aggregate_charts().len(), 1);
        assert_eq!(dash.node_charts().len(), 1);
        assert_eq!(dash.view().element_ids(Container::Nodes), vec!["1_node_chart"]);
    }

    proptest! {
        #[test]
        fn prop_append_order_is_ascending((first, second) in shuffled_ids()) {
            let mut dash = dashboard();
            dash.process_aggregate(first.iter().map(|&id| aggregate(id, &[(0.0, 1.0)])).collect());
            dash.process_aggregate(second.iter().map(|&id| aggregate(id, &[(1.0, 2.0)])).collect());

            prop_assert_eq!(
                actual_ids(&dash, Container::Aggregate),
                expected_ids(&first, "aggregate_chart")
            );
            prop_assert_eq!(dash.aggregate_charts().len(), first.len());
        }

        #[test]
        fn prop_node_append_order_is_ascending((first, second) in shuffled_ids()) {
            let mut dash = dashboard();
            dash.process_nodes(first.iter().map(|&id| node(id, &[(0.0, 1.0)])).collect());
            dash.process_nodes(second.iter().map(|&id| node(id, &[(1.0, 2.0)])).collect());

            prop_assert_eq!(
                actual_ids(&dash, Container::Nodes),
                expected_ids(&first, "node_chart")
            );
            prop_assert_eq!(dash.node_charts().len(), first.len());
        }

        #[test]
        fn prop_gauge_append_order_is_ascending((first, second) in shuffled_ids()) {
            let mut dash = Dashboard::new(PageView::new(), true);
            dash.process_job_info(job_info(&first, 1.0));
            dash.process_job_info(job_info(&second, 2.0));

            prop_assert_eq!(
                actual_ids(&dash, Container::Gauges),
                expected_ids(&first, "info_gauge")
            );
            prop_assert_eq!(dash.view().total_draws(), 2 * first.len() as u64);
        }
    }
}
