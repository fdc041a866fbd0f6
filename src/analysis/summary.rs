/// Per-column summary statistics for the "Data Summary" view.

use serde::Serialize;

use crate::analysis::quantile::{self, quantile};
use crate::model::{ColumnData, Dataset};

/// Descriptive statistics for one numeric column.
///
/// Every statistic except `count` is `None` when the column has no present
/// values; `std` additionally needs at least two.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Summarises every numeric column, in dataset order. Text columns are skipped.
pub fn summarize(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .columns()
        .iter()
        .filter_map(|c| match &c.data {
            ColumnData::Numeric(values) => Some(summarize_column(&c.name, values)),
            ColumnData::Text(_) => None,
        })
        .collect()
}

pub fn summarize_column(name: &str, values: &[Option<f64>]) -> ColumnSummary {
    ColumnSummary {
        column: name.to_string(),
        count: values.iter().filter(|v| v.is_some()).count(),
        mean: quantile::mean(values),
        std: quantile::std_dev(values),
        min: quantile::min(values),
        p25: quantile(values, 0.25),
        p50: quantile(values, 0.50),
        p75: quantile(values, 0.75),
        max: quantile::max(values),
    }
}
