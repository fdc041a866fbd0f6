/// Descriptive statistics and table views for the flood assessment tool.
///
/// Everything here is a pure function of an in-memory `Dataset`; rendering
/// is left to `report`.
///
/// Submodules:
/// - `quantile` — linear-interpolated quantiles, maxima and means over numeric cells.
/// - `summary`  — per-column "describe" statistics.
/// - `filter`   — unique values and equality filtering for the filter view.
/// - `charts`   — data series behind the scatter plot and bar chart.

pub mod charts;
pub mod filter;
pub mod quantile;
pub mod summary;
