//! AquaShield flood assessment.
//!
//! Loads a CSV of flood-risk measurements, derives quantile thresholds for
//! rainfall, water level, slope and proximity, and reports which observed
//! maxima exceed them. The threshold evaluator in `alert::thresholds` is pure
//! and independent of how the results are shown; `report` builds the
//! dashboard views the CLI prints.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;

pub use alert::thresholds::{assess, compute_default_thresholds, evaluate, validate_schema, Assessment};
pub use model::{
    Alert, AssessmentError, Dataset, EmptyColumnError, Metric, QuantileSpec, SchemaError,
    ThresholdOverrides, ThresholdSet,
};
