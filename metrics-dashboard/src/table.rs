//! Display tables built from raw metric records.

use serde::Serialize;

use crate::data::Sample;

/// Column-labeled table of optional numeric cells.
///
/// A `None` cell means "no data" and is drawn as a gap, which is different
/// from a zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl DataTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(column)).copied().flatten()
    }

    /// Aggregate series: a `["Time", "Value"]` header and one row per sample.
    pub fn from_series(series: &[Sample]) -> Self {
        Self {
            columns: vec!["Time".to_string(), "Value".to_string()],
            rows: series
                .iter()
                .map(|s| vec![Some(s.time()), Some(s.value())])
                .collect(),
        }
    }

    /// Per-node series: a `"Time"` column plus one `"Node i"` column per node.
    ///
    /// Row count is the shortest node series. Timestamps come from node 0 and
    /// nodes are assumed co-sampled at matching indices. Negative values are
    /// left unset.
    pub fn from_tensor(tensor: &[Vec<Sample>]) -> Self {
        let mut columns = Vec::with_capacity(tensor.len() + 1);
        columns.push("Time".to_string());
        columns.extend((0..tensor.len()).map(|i| format!("Node {}", i)));

        let num_rows = tensor.iter().map(Vec::len).min().unwrap_or(0);

        let rows = (0..num_rows)
            .map(|j| {
                let mut row = Vec::with_capacity(tensor.len() + 1);
                row.push(Some(tensor[0][j].time()));
                row.extend(tensor.iter().map(|node| {
                    let sample = node[j];
                    (!sample.is_missing()).then(|| sample.value())
                }));
                row
            })
            .collect();

        Self { columns, rows }
    }
}
