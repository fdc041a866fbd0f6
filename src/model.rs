/// Dataset, Metric, ThresholdSet, QuantileSpec, Alert and the evaluator's
/// error types.
///
/// Core data types for the AquaShield flood assessment tool.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O: parsing lives in `ingest`, statistics in `analysis`,
/// and threshold comparison in `alert::thresholds`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COL_ALTITUDE: &str = "Altitude (m)";
pub const COL_WATER_BODY_PROXIMITY: &str = "Water Body Proximity (km)";
pub const COL_RAINFALL: &str = "Rainfall (cm)";
pub const COL_SLOPE: &str = "Slope (%)";
pub const COL_PROXIMITY: &str = "Proximity (km)";
pub const COL_WATER_LEVEL: &str = "Water Level (m)";

/// Every column an uploaded CSV must carry, in the order they are reported
/// when missing.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_ALTITUDE,
    COL_WATER_BODY_PROXIMITY,
    COL_RAINFALL,
    COL_SLOPE,
    COL_PROXIMITY,
    COL_WATER_LEVEL,
];

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// The four measurements that carry an alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    Rainfall,
    WaterLevel,
    Slope,
    Proximity,
}

impl Metric {
    /// Fixed evaluation and reporting order.
    pub const ALL: [Metric; 4] = [
        Metric::Rainfall,
        Metric::WaterLevel,
        Metric::Slope,
        Metric::Proximity,
    ];

    /// The CSV column this metric is read from.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Rainfall => COL_RAINFALL,
            Metric::WaterLevel => COL_WATER_LEVEL,
            Metric::Slope => COL_SLOPE,
            Metric::Proximity => COL_PROXIMITY,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Rainfall => "cm",
            Metric::WaterLevel => "m",
            Metric::Slope => "%",
            Metric::Proximity => "km",
        }
    }

    /// Default quantile used to derive this metric's threshold.
    pub fn default_quantile(self) -> f64 {
        match self {
            Metric::Rainfall => 0.95,
            Metric::WaterLevel => 0.90,
            Metric::Slope => 0.75,
            Metric::Proximity => 0.25,
        }
    }

    /// Headline shown to the user when this metric exceeds its threshold.
    pub fn headline(self) -> &'static str {
        match self {
            Metric::Rainfall => "High rainfall detected!",
            Metric::WaterLevel => "High water level detected!",
            Metric::Slope => "Steep slope detected!",
            Metric::Proximity => "High proximity detected!",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Rainfall => write!(f, "Rainfall"),
            Metric::WaterLevel => write!(f, "WaterLevel"),
            Metric::Slope => write!(f, "Slope"),
            Metric::Proximity => write!(f, "Proximity"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// A single cell as seen by the filter and preview views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Missing => write!(f, "NaN"),
        }
    }
}

/// Column storage. Numeric cells that were empty in the source are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    pub fn cell(&self, row: usize) -> Option<CellValue> {
        match self {
            ColumnData::Numeric(v) => v.get(row).map(|c| match c {
                Some(n) => CellValue::Number(*n),
                None => CellValue::Missing,
            }),
            ColumnData::Text(v) => v.get(row).map(|s| CellValue::Text(s.clone())),
        }
    }

    fn select(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// In-memory tabular data with named, equal-length columns.
///
/// Built once per upload and treated as read-only afterwards. Construction
/// goes through `Dataset::from_columns`, which enforces equal lengths and
/// unique names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        for (i, col) in columns.iter().enumerate() {
            if col.data.len() != rows {
                return Err(DatasetError::RaggedColumns {
                    column: col.name.clone(),
                    expected: rows,
                    found: col.data.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric cells of `name`, including missing ones. `None` if the column
    /// is absent or textual.
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Numeric(v)) => Some(v),
            _ => None,
        }
    }

    /// One row as cells, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<CellValue>> {
        if index >= self.rows {
            return None;
        }
        self.columns.iter().map(|c| c.data.cell(index)).collect()
    }

    /// New dataset with only the given rows, in the given order. Indices
    /// past the last row are skipped.
    pub fn select_rows(&self, rows: &[usize]) -> Dataset {
        let rows: Vec<usize> = rows.iter().copied().filter(|&r| r < self.rows).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                data: c.data.select(&rows),
            })
            .collect();
        Dataset {
            columns,
            rows: rows.len(),
        }
    }

    /// First `n` rows (all rows if fewer).
    pub fn head(&self, n: usize) -> Dataset {
        let rows: Vec<usize> = (0..self.rows.min(n)).collect();
        self.select_rows(&rows)
    }
}

// ---------------------------------------------------------------------------
// Threshold types
// ---------------------------------------------------------------------------

/// Quantile fraction per metric used to derive default thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantileSpec {
    pub rainfall: f64,
    pub water_level: f64,
    pub slope: f64,
    pub proximity: f64,
}

impl Default for QuantileSpec {
    fn default() -> Self {
        Self {
            rainfall: Metric::Rainfall.default_quantile(),
            water_level: Metric::WaterLevel.default_quantile(),
            slope: Metric::Slope.default_quantile(),
            proximity: Metric::Proximity.default_quantile(),
        }
    }
}

impl QuantileSpec {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Rainfall => self.rainfall,
            Metric::WaterLevel => self.water_level,
            Metric::Slope => self.slope,
            Metric::Proximity => self.proximity,
        }
    }

    /// Every fraction must lie in [0, 1].
    pub fn validate(&self) -> Result<(), AssessmentError> {
        for metric in Metric::ALL {
            let q = self.get(metric);
            if !(0.0..=1.0).contains(&q) {
                return Err(AssessmentError::InvalidQuantile { metric, value: q });
            }
        }
        Ok(())
    }
}

/// Alert threshold for each of the four metrics.
///
/// Always covers every metric; defaults come from `compute_default_thresholds`
/// and any finite value may replace them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub rainfall: f64,
    pub water_level: f64,
    pub slope: f64,
    pub proximity: f64,
}

impl ThresholdSet {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Rainfall => self.rainfall,
            Metric::WaterLevel => self.water_level,
            Metric::Slope => self.slope,
            Metric::Proximity => self.proximity,
        }
    }

    /// Replaces one threshold. Rejects NaN and infinities.
    pub fn set(&mut self, metric: Metric, value: f64) -> Result<(), AssessmentError> {
        if !value.is_finite() {
            return Err(AssessmentError::InvalidThreshold { metric, value });
        }
        match metric {
            Metric::Rainfall => self.rainfall = value,
            Metric::WaterLevel => self.water_level = value,
            Metric::Slope => self.slope = value,
            Metric::Proximity => self.proximity = value,
        }
        Ok(())
    }

    /// Copy of `self` with every override present in `overrides` applied.
    pub fn with_overrides(mut self, overrides: &ThresholdOverrides) -> Result<Self, AssessmentError> {
        for metric in Metric::ALL {
            if let Some(value) = overrides.get(metric) {
                self.set(metric, value)?;
            }
        }
        Ok(self)
    }
}

/// User-supplied thresholds; `None` keeps the quantile default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdOverrides {
    pub rainfall: Option<f64>,
    pub water_level: Option<f64>,
    pub slope: Option<f64>,
    pub proximity: Option<f64>,
}

impl ThresholdOverrides {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Rainfall => self.rainfall,
            Metric::WaterLevel => self.water_level,
            Metric::Slope => self.slope,
            Metric::Proximity => self.proximity,
        }
    }

    /// Overrides from `other` win where present.
    pub fn merged_with(self, other: &ThresholdOverrides) -> Self {
        Self {
            rainfall: other.rainfall.or(self.rainfall),
            water_level: other.water_level.or(self.water_level),
            slope: other.slope.or(self.slope),
            proximity: other.proximity.or(self.proximity),
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Raised when a metric's observed maximum strictly exceeds its threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub metric: Metric,
    pub observed_max: f64,
    pub threshold: f64,
    pub message: String,
}

impl Alert {
    pub fn new(metric: Metric, observed_max: f64, threshold: f64) -> Self {
        let message = format!(
            "{} Threshold: {} {}",
            metric.headline(),
            threshold,
            metric.unit()
        );
        Self {
            metric,
            observed_max,
            threshold,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Required columns that are absent or hold non-numeric data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", describe_schema_error(.missing, .non_numeric))]
pub struct SchemaError {
    pub missing: Vec<String>,
    pub non_numeric: Vec<String>,
}

fn describe_schema_error(missing: &[String], non_numeric: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing required columns: {}", missing.join(", ")));
    }
    if !non_numeric.is_empty() {
        parts.push(format!("non-numeric columns: {}", non_numeric.join(", ")));
    }
    format!("CSV schema error: {}", parts.join("; "))
}

/// A required column had no values to take a quantile or maximum of.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("column '{column}' has no values")]
pub struct EmptyColumnError {
    pub column: String,
}

/// Anything that stops the threshold evaluator from producing alerts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    EmptyColumn(#[from] EmptyColumnError),
    #[error("quantile for {metric} must be within [0, 1], got {value}")]
    InvalidQuantile { metric: Metric, value: f64 },
    #[error("threshold for {metric} must be a finite number, got {value}")]
    InvalidThreshold { metric: Metric, value: f64 },
    /// The quantile of a column holding infinite values came out non-finite.
    #[error("default threshold for {metric} is not finite ({value}); its column holds infinite values")]
    NonFiniteThreshold { metric: Metric, value: f64 },
}

/// Structural problems building a `Dataset`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
