/// Data series behind the dashboard's two charts:
/// "Land Altitude vs. Rainfall" (scatter) and "Rainfall Distribution" (bar).

use serde::Serialize;

use crate::model::{Dataset, DatasetError, COL_ALTITUDE, COL_RAINFALL};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Rows where both cells are present.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub title: String,
    pub label: String,
    /// (row index, value) for each present cell.
    pub bars: Vec<(usize, f64)>,
}

pub fn scatter_series(dataset: &Dataset, x: &str, y: &str) -> Result<ScatterSeries, DatasetError> {
    let xs = numeric_column(dataset, x)?;
    let ys = numeric_column(dataset, y)?;
    let points = xs
        .iter()
        .zip(ys)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    Ok(ScatterSeries {
        title: format!("{} vs. {}", x, y),
        x_label: x.to_string(),
        y_label: y.to_string(),
        points,
    })
}

pub fn bar_series(dataset: &Dataset, column: &str) -> Result<BarSeries, DatasetError> {
    let values = numeric_column(dataset, column)?;
    let bars = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    Ok(BarSeries {
        title: format!("{} Distribution", column),
        label: column.to_string(),
        bars,
    })
}

/// Altitude against rainfall, titled the way the dashboard shows it.
pub fn altitude_vs_rainfall(dataset: &Dataset) -> Result<ScatterSeries, DatasetError> {
    let mut series = scatter_series(dataset, COL_ALTITUDE, COL_RAINFALL)?;
    series.title = "Land Altitude vs. Rainfall".to_string();
    Ok(series)
}

pub fn rainfall_distribution(dataset: &Dataset) -> Result<BarSeries, DatasetError> {
    let mut series = bar_series(dataset, COL_RAINFALL)?;
    series.title = "Rainfall Distribution".to_string();
    Ok(series)
}

fn numeric_column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a [Option<f64>], DatasetError> {
    match dataset.column(name) {
        None => Err(DatasetError::UnknownColumn(name.to_string())),
        Some(_) => dataset
            .numeric(name)
            .ok_or_else(|| DatasetError::NotNumeric(name.to_string())),
    }
}
