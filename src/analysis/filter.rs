/// Equality filtering for the "Filter Data" view.
///
/// The user picks a column, then one of that column's distinct values, and
/// sees every row holding it.

use crate::model::{CellValue, ColumnData, Dataset, DatasetError};

/// Distinct values of `column` in first-seen order. Missing cells appear
/// once, as `CellValue::Missing`.
pub fn unique_values(dataset: &Dataset, column: &str) -> Result<Vec<CellValue>, DatasetError> {
    let col = dataset
        .column(column)
        .ok_or_else(|| DatasetError::UnknownColumn(column.to_string()))?;

    let mut seen: Vec<CellValue> = Vec::new();
    for row in 0..col.data.len() {
        if let Some(cell) = col.data.cell(row) {
            if !seen.contains(&cell) {
                seen.push(cell);
            }
        }
    }
    Ok(seen)
}

/// Rows where `column` equals `value`.
///
/// Numeric columns compare numerically; a text value is parsed as a float
/// first, so `"12"` matches `12.0`. A text value that isn't a number never
/// matches a numeric column.
pub fn filter_eq(dataset: &Dataset, column: &str, value: &CellValue) -> Result<Dataset, DatasetError> {
    let col = dataset
        .column(column)
        .ok_or_else(|| DatasetError::UnknownColumn(column.to_string()))?;

    let rows: Vec<usize> = match &col.data {
        ColumnData::Numeric(cells) => {
            let target = numeric_target(value);
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| match (cell, &target) {
                    (Some(v), NumericTarget::Number(t)) => v == t,
                    (None, NumericTarget::Missing) => true,
                    _ => false,
                })
                .map(|(i, _)| i)
                .collect()
        }
        ColumnData::Text(cells) => {
            let target = value.to_string();
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| **cell == target)
                .map(|(i, _)| i)
                .collect()
        }
    };

    Ok(dataset.select_rows(&rows))
}

enum NumericTarget {
    Number(f64),
    Missing,
    NoMatch,
}

fn numeric_target(value: &CellValue) -> NumericTarget {
    match value {
        CellValue::Number(n) => NumericTarget::Number(*n),
        CellValue::Missing => NumericTarget::Missing,
        // Blank and "NaN" are how ingestion spells a missing cell.
        CellValue::Text(s) if s.trim().is_empty() => NumericTarget::Missing,
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_nan() => NumericTarget::Missing,
            Ok(n) => NumericTarget::Number(n),
            Err(_) => NumericTarget::NoMatch,
        },
    }
}
