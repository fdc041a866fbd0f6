/// Threshold derivation and alerting.
///
/// Submodules:
/// - `thresholds` — schema validation, quantile defaults, and max-vs-threshold alerts.

pub mod thresholds;
