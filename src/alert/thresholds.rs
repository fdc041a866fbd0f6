//! Flood-risk threshold checking.
//!
//! Default thresholds are quantiles of the uploaded data; an alert fires
//! when a metric's observed maximum strictly exceeds its threshold. Every
//! function here is pure: no I/O, no logging, no shared state. Calling
//! `evaluate` twice with the same inputs yields the same alerts.

use serde::Serialize;

use crate::analysis::quantile::{max, quantile};
use crate::model::{
    Alert, AssessmentError, Dataset, EmptyColumnError, Metric, QuantileSpec, SchemaError,
    ThresholdOverrides, ThresholdSet, REQUIRED_COLUMNS,
};

/// Checks that every required column is present and numeric.
///
/// Reports all offending columns at once, in `REQUIRED_COLUMNS` order.
pub fn validate_schema(dataset: &Dataset) -> Result<(), SchemaError> {
    let mut missing = Vec::new();
    let mut non_numeric = Vec::new();

    for name in REQUIRED_COLUMNS {
        match dataset.column(name) {
            None => missing.push(name.to_string()),
            Some(col) if !col.data.is_numeric() => non_numeric.push(name.to_string()),
            Some(_) => {}
        }
    }

    if missing.is_empty() && non_numeric.is_empty() {
        Ok(())
    } else {
        Err(SchemaError {
            missing,
            non_numeric,
        })
    }
}

/// Derives one threshold per metric as the quantile of its column.
///
/// Fails with `EmptyColumnError` rather than producing NaN when a column has
/// no values, since a NaN threshold would silently suppress every alert.
pub fn compute_default_thresholds(
    dataset: &Dataset,
    spec: &QuantileSpec,
) -> Result<ThresholdSet, AssessmentError> {
    spec.validate()?;
    Ok(ThresholdSet {
        rainfall: metric_quantile(dataset, Metric::Rainfall, spec)?,
        water_level: metric_quantile(dataset, Metric::WaterLevel, spec)?,
        slope: metric_quantile(dataset, Metric::Slope, spec)?,
        proximity: metric_quantile(dataset, Metric::Proximity, spec)?,
    })
}

/// Compares each metric's maximum against its threshold.
///
/// Alerts come back in `Metric::ALL` order. Equality does not alert. An
/// empty result means nothing was exceeded.
pub fn evaluate(dataset: &Dataset, thresholds: &ThresholdSet) -> Result<Vec<Alert>, AssessmentError> {
    let mut alerts = Vec::new();
    for metric in Metric::ALL {
        let observed_max = max(metric_values(dataset, metric)?).ok_or_else(|| empty(metric))?;
        let threshold = thresholds.get(metric);
        if observed_max > threshold {
            alerts.push(Alert::new(metric, observed_max, threshold));
        }
    }
    Ok(alerts)
}

/// Outcome of a full threshold pass over one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Quantile-derived thresholds before any user override.
    pub defaults: ThresholdSet,
    /// Thresholds actually compared against.
    pub thresholds: ThresholdSet,
    pub alerts: Vec<Alert>,
}

/// Validate, derive defaults, apply overrides, evaluate.
pub fn assess(
    dataset: &Dataset,
    spec: &QuantileSpec,
    overrides: &ThresholdOverrides,
) -> Result<Assessment, AssessmentError> {
    validate_schema(dataset)?;
    let defaults = compute_default_thresholds(dataset, spec)?;
    let thresholds = defaults.with_overrides(overrides)?;
    let alerts = evaluate(dataset, &thresholds)?;
    Ok(Assessment {
        defaults,
        thresholds,
        alerts,
    })
}

/// Infinite cells are valid data, but a threshold derived from them can be
/// ±inf or NaN; either would make `observed_max > threshold` meaningless.
fn metric_quantile(dataset: &Dataset, metric: Metric, spec: &QuantileSpec) -> Result<f64, AssessmentError> {
    let value = quantile(metric_values(dataset, metric)?, spec.get(metric)).ok_or_else(|| empty(metric))?;
    if !value.is_finite() {
        return Err(AssessmentError::NonFiniteThreshold { metric, value });
    }
    Ok(value)
}

fn metric_values(dataset: &Dataset, metric: Metric) -> Result<&[Option<f64>], AssessmentError> {
    dataset.numeric(metric.column()).ok_or_else(|| {
        let name = metric.column().to_string();
        let err = match dataset.column(metric.column()) {
            None => SchemaError {
                missing: vec![name],
                non_numeric: Vec::new(),
            },
            Some(_) => SchemaError {
                missing: Vec::new(),
                non_numeric: vec![name],
            },
        };
        AssessmentError::Schema(err)
    })
}

fn empty(metric: Metric) -> AssessmentError {
    AssessmentError::EmptyColumn(EmptyColumnError {
        column: metric.column().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
