/// CSV ingestion for uploaded flood-risk measurement files.
///
/// The first record is the header. Every column is read as text first, then
/// promoted to numeric if all of its non-empty cells parse as floats.
/// Empty cells (and literal `NaN`) in a numeric column become missing values,
/// which statistics skip.
///
/// Schema checks are not done here; a file without the flood columns still
/// loads so the preview and summary views can show what was uploaded.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::model::{Column, ColumnData, Dataset, DatasetError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] ::csv::Error),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Reads a CSV file from disk.
pub fn read_csv_path(path: &Path) -> Result<Dataset, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(BufReader::new(file))
}

/// Reads CSV from any reader. Rows must all have the header's width.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, IngestError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(::csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in reader.records() {
        let record = result?;
        for (i, field) in record.iter().enumerate() {
            cells[i].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column {
            name,
            data: infer_column(raw),
        })
        .collect();

    Ok(Dataset::from_columns(columns)?)
}

/// Numeric when every non-blank cell parses; a column of only blanks is
/// numeric with every value missing.
fn infer_column(raw: Vec<String>) -> ColumnData {
    let mut numeric = Vec::with_capacity(raw.len());
    for cell in &raw {
        match parse_cell(cell) {
            Some(parsed) => numeric.push(parsed),
            None => return ColumnData::Text(raw),
        }
    }
    ColumnData::Numeric(numeric)
}

/// `Some(None)` for a blank or NaN cell, `Some(Some(v))` for a number,
/// `None` if the cell is not numeric at all.
fn parse_cell(cell: &str) -> Option<Option<f64>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_nan() { Some(None) } else { Some(Some(value)) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
