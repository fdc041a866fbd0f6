//! Dashboard assembly and rendering.
//!
//! `Dashboard::build` runs every view over one dataset; `render_text` and
//! `render_json` turn the result into what the CLI prints. The data views
//! are built even when the threshold stage is blocked, so a file with the
//! wrong columns still shows what was uploaded. Rendering never
//! recomputes anything, so a dashboard can be printed repeatedly with
//! identical output.

use serde::{Serialize, Serializer};
use std::fmt::Write;

use crate::alert::thresholds::{assess, Assessment};
use crate::analysis::charts::{altitude_vs_rainfall, rainfall_distribution, BarSeries, ScatterSeries};
use crate::analysis::filter::{filter_eq, unique_values};
use crate::analysis::summary::{summarize, ColumnSummary};
use crate::model::{
    AssessmentError, CellValue, Dataset, DatasetError, Metric, QuantileSpec, ThresholdOverrides,
    COL_ALTITUDE, COL_RAINFALL,
};

const BAR_WIDTH: usize = 40;
const SCATTER_COLS: usize = 48;
const SCATTER_ROWS: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("failed to serialize dashboard: {0}")]
    Json(#[from] serde_json::Error),
}

/// Column/value pair chosen in the filter view.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub preview_rows: usize,
    pub filter: Option<FilterSelection>,
    pub quantiles: QuantileSpec,
    pub overrides: ThresholdOverrides,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            preview_rows: crate::config::DEFAULT_PREVIEW_ROWS,
            filter: None,
            quantiles: QuantileSpec::default(),
            overrides: ThresholdOverrides::default(),
        }
    }
}

/// Rows of a dataset laid out for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableView {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            columns: dataset.column_names().iter().map(|c| c.to_string()).collect(),
            rows: (0..dataset.row_count()).filter_map(|i| dataset.row(i)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterView {
    pub column: String,
    pub value: String,
    /// Every distinct value the column offers, for the selector.
    pub choices: Vec<CellValue>,
    pub matches: TableView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub scatter: ScatterSeries,
    pub bars: BarSeries,
}

/// Everything the dashboard shows for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub row_count: usize,
    pub preview: TableView,
    pub summary: Vec<ColumnSummary>,
    pub filter: Option<FilterView>,
    /// `None` when Altitude or Rainfall is missing or not numeric.
    pub charts: Option<Charts>,
    /// `None` when `blocked` is set.
    pub assessment: Option<Assessment>,
    /// Why threshold evaluation did not run.
    #[serde(serialize_with = "serialize_blocked")]
    pub blocked: Option<AssessmentError>,
}

impl Dashboard {
    /// Builds the preview, summary, filter and chart views, then runs the
    /// assessment. An assessment failure is recorded in `blocked` rather
    /// than returned; only a bad filter selection fails the build.
    pub fn build(dataset: &Dataset, options: &DashboardOptions) -> Result<Self, ReportError> {
        let filter = match &options.filter {
            Some(selection) => {
                let choices = unique_values(dataset, &selection.column)?;
                let matches = filter_eq(
                    dataset,
                    &selection.column,
                    &CellValue::Text(selection.value.clone()),
                )?;
                Some(FilterView {
                    column: selection.column.clone(),
                    value: selection.value.clone(),
                    choices,
                    matches: TableView::from_dataset(&matches),
                })
            }
            None => None,
        };

        let charts = match (altitude_vs_rainfall(dataset), rainfall_distribution(dataset)) {
            (Ok(scatter), Ok(bars)) => Some(Charts { scatter, bars }),
            _ => None,
        };

        let (assessment, blocked) = match assess(dataset, &options.quantiles, &options.overrides) {
            Ok(assessment) => (Some(assessment), None),
            Err(err) => (None, Some(err)),
        };

        Ok(Self {
            row_count: dataset.row_count(),
            preview: TableView::from_dataset(&dataset.head(options.preview_rows)),
            summary: summarize(dataset),
            filter,
            charts,
            assessment,
            blocked,
        })
    }
}

fn serialize_blocked<S: Serializer>(blocked: &Option<AssessmentError>, s: S) -> Result<S::Ok, S::Error> {
    match blocked {
        Some(err) => s.serialize_some(&err.to_string()),
        None => s.serialize_none(),
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

pub fn render_json(dashboard: &Dashboard) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn render_text(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str("AquaShield: Flood Assessment Tool\n");

    section(&mut out, "Data Preview");
    out.push_str(&render_table(&dashboard.preview));
    let _ = writeln!(
        out,
        "({} of {} rows)",
        dashboard.preview.rows.len(),
        dashboard.row_count
    );

    section(&mut out, "Data Summary");
    out.push_str(&render_summary(&dashboard.summary));

    if let Some(filter) = &dashboard.filter {
        section(&mut out, "Filter Data");
        let choices: Vec<String> = filter.choices.iter().map(|c| c.to_string()).collect();
        let _ = writeln!(out, "{} values: {}", filter.column, choices.join(", "));
        let _ = writeln!(out, "Rows where {} = {}:", filter.column, filter.value);
        out.push_str(&render_table(&filter.matches));
    }

    section(&mut out, "Visualizations");
    match &dashboard.charts {
        Some(charts) => {
            out.push_str(&render_scatter(&charts.scatter));
            out.push('\n');
            out.push_str(&render_bars(&charts.bars));
        }
        None => {
            let _ = writeln!(
                out,
                "(charts need numeric {} and {} columns)",
                COL_ALTITUDE, COL_RAINFALL
            );
        }
    }

    if let Some(assessment) = &dashboard.assessment {
        section(&mut out, "Thresholds");
        for metric in Metric::ALL {
            let used = assessment.thresholds.get(metric);
            let default = assessment.defaults.get(metric);
            let _ = write!(out, "{}: {} {}", metric.column(), used, metric.unit());
            if used != default {
                let _ = write!(out, " (default {})", default);
            }
            out.push('\n');
        }
    }

    section(&mut out, "Alerts");
    match (&dashboard.assessment, &dashboard.blocked) {
        (_, Some(err)) => {
            let _ = writeln!(out, "BLOCKED: {}", err);
        }
        (Some(assessment), None) => out.push_str(&render_alerts(assessment)),
        (None, None) => {}
    }
    out
}

/// One `WARNING:` line per alert, in metric order.
pub fn render_alerts(assessment: &Assessment) -> String {
    if assessment.alerts.is_empty() {
        return "No thresholds exceeded.\n".to_string();
    }
    assessment
        .alerts
        .iter()
        .map(|a| format!("WARNING: {} (observed max {})\n", a.message, a.observed_max))
        .collect()
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {} ==", title);
}

fn render_table(table: &TableView) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    let header: Vec<String> = table.columns.clone();
    grid(&header, &cells)
}

fn render_summary(summary: &[ColumnSummary]) -> String {
    let header: Vec<String> = ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = summary
        .iter()
        .map(|s| {
            vec![
                s.column.clone(),
                s.count.to_string(),
                stat(s.mean),
                stat(s.std),
                stat(s.min),
                stat(s.p25),
                stat(s.p50),
                stat(s.p75),
                stat(s.max),
            ]
        })
        .collect();
    grid(&header, &rows)
}

fn stat(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "NaN".to_string())
}

/// Left-aligned columns padded to their widest cell.
fn grid(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        format!("{}\n", padded.join(" | ").trim_end())
    };

    let mut out = line(header);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("-+-")));
    for row in rows {
        out.push_str(&line(row.as_slice()));
    }
    out
}

fn render_bars(series: &BarSeries) -> String {
    let mut out = format!("{}\n", series.title);
    let peak = series.bars.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
    for (row, value) in &series.bars {
        let len = if peak > 0.0 {
            ((value.abs() / peak) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(out, "{:>5} | {:<width$} {}", row, "#".repeat(len), value, width = BAR_WIDTH);
    }
    out
}

fn render_scatter(series: &ScatterSeries) -> String {
    let mut out = format!("{}\n", series.title);
    if series.points.is_empty() {
        out.push_str("(no points)\n");
        return out;
    }

    let (min_x, max_x) = bounds(series.points.iter().map(|p| p.0));
    let (min_y, max_y) = bounds(series.points.iter().map(|p| p.1));
    let mut canvas = vec![vec![' '; SCATTER_COLS]; SCATTER_ROWS];
    for (x, y) in &series.points {
        let col = scale(*x, min_x, max_x, SCATTER_COLS);
        let row = SCATTER_ROWS - 1 - scale(*y, min_y, max_y, SCATTER_ROWS);
        canvas[row][col] = '*';
    }

    let _ = writeln!(out, "{} ({} .. {})", series.y_label, min_y, max_y);
    for line in canvas {
        let _ = writeln!(out, "|{}", line.into_iter().collect::<String>().trim_end());
    }
    let _ = writeln!(out, "+{}", "-".repeat(SCATTER_COLS));
    let _ = writeln!(out, "{} ({} .. {})", series.x_label, min_x, max_x);
    out
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Maps `v` in [lo, hi] onto 0..cells.
fn scale(v: f64, lo: f64, hi: f64, cells: usize) -> usize {
    if hi <= lo {
        return 0;
    }
    let pos = ((v - lo) / (hi - lo) * (cells - 1) as f64).round();
    (pos.max(0.0) as usize).min(cells - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Column, ColumnData, COL_ALTITUDE, COL_PROXIMITY, COL_RAINFALL, COL_SLOPE,
        COL_WATER_BODY_PROXIMITY, COL_WATER_LEVEL,
    };

    fn numeric(name: &str, values: &[f64]) -> Column {
        Column {
            name: name.to_string(),
            data: ColumnData::Numeric(values.iter().copied().map(Some).collect()),
        }
    }

    fn flood_dataset() -> Dataset {
        Dataset::from_columns(vec![
            numeric(COL_ALTITUDE, &[120.0, 95.0, 300.0, 80.0, 60.0, 210.0]),
            numeric(COL_WATER_BODY_PROXIMITY, &[0.5, 1.2, 3.0, 0.2, 0.1, 2.2]),
            numeric(COL_RAINFALL, &[1.0, 2.0, 3.0, 4.0, 100.0, 2.5]),
            numeric(COL_SLOPE, &[5.0, 7.0, 2.0, 9.0, 4.0, 3.0]),
            numeric(COL_PROXIMITY, &[1.0, 0.4, 2.5, 0.3, 0.2, 1.1]),
            numeric(COL_WATER_LEVEL, &[2.0, 3.1, 1.0, 4.2, 5.5, 1.8]),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_collects_every_view() {
        let ds = flood_dataset();
        let dash = Dashboard::build(&ds, &DashboardOptions::default()).unwrap();
        assert_eq!(dash.row_count, 6);
        assert_eq!(dash.preview.rows.len(), 5);
        assert_eq!(dash.summary.len(), 6);
        assert!(dash.filter.is_none());
        let charts = dash.charts.expect("flood columns are numeric");
        assert_eq!(charts.scatter.points.len(), 6);
        assert_eq!(charts.bars.bars.len(), 6);
        assert!(dash.assessment.is_some());
        assert!(dash.blocked.is_none());
    }

    #[test]
    fn test_filter_view_uses_selection() {
        let ds = flood_dataset();
        let options = DashboardOptions {
            filter: Some(FilterSelection {
                column: COL_SLOPE.to_string(),
                value: "9".to_string(),
            }),
            ..DashboardOptions::default()
        };
        let dash = Dashboard::build(&ds, &options).unwrap();
        let filter = dash.filter.expect("filter view requested");
        assert_eq!(filter.choices.len(), 6);
        assert_eq!(filter.matches.rows.len(), 1);
        assert_eq!(filter.matches.rows[0][0], CellValue::Number(80.0));
    }

    #[test]
    fn test_filter_on_unknown_column_fails() {
        let options = DashboardOptions {
            filter: Some(FilterSelection {
                column: "Depth".to_string(),
                value: "1".to_string(),
            }),
            ..DashboardOptions::default()
        };
        assert!(matches!(
            Dashboard::build(&flood_dataset(), &options),
            Err(ReportError::Dataset(DatasetError::UnknownColumn(_)))
        ));
    }

    #[test]
    fn test_schema_error_blocks_only_the_assessment() {
        let ds = Dataset::from_columns(vec![
            numeric(COL_RAINFALL, &[1.0, 4.0]),
            Column {
                name: "Region".to_string(),
                data: ColumnData::Text(vec!["north".to_string(), "south".to_string()]),
            },
        ])
        .unwrap();
        let options = DashboardOptions {
            filter: Some(FilterSelection {
                column: "Region".to_string(),
                value: "south".to_string(),
            }),
            ..DashboardOptions::default()
        };
        let dash = Dashboard::build(&ds, &options).unwrap();

        assert_eq!(dash.preview.rows.len(), 2);
        assert_eq!(dash.summary.len(), 1);
        assert_eq!(dash.filter.as_ref().unwrap().matches.rows.len(), 1);
        assert!(dash.charts.is_none(), "no altitude column to plot");
        assert!(dash.assessment.is_none());
        assert!(matches!(dash.blocked, Some(AssessmentError::Schema(_))));

        let text = render_text(&dash);
        for heading in ["Data Preview", "Data Summary", "Filter Data", "Alerts"] {
            assert!(text.contains(&format!("== {} ==", heading)), "missing {}", heading);
        }
        assert!(!text.contains("== Thresholds =="));
        assert!(text.contains("BLOCKED: "), "got:\n{}", text);
        assert!(text.contains(COL_WATER_LEVEL));
        assert!(!text.contains("WARNING:"));

        let json: serde_json::Value = serde_json::from_str(&render_json(&dash).unwrap()).unwrap();
        assert!(json["assessment"].is_null());
        assert!(json["blocked"].as_str().unwrap().contains(COL_WATER_LEVEL));
    }

    #[test]
    fn test_empty_column_blocks_assessment_but_keeps_preview() {
        let ds = flood_dataset().select_rows(&[]);
        let dash = Dashboard::build(&ds, &DashboardOptions::default()).unwrap();
        assert_eq!(dash.row_count, 0);
        assert!(dash.preview.rows.is_empty());
        assert!(matches!(dash.blocked, Some(AssessmentError::EmptyColumn(_))));
    }

    #[test]
    fn test_text_lists_alerts_in_metric_order() {
        let dash = Dashboard::build(&flood_dataset(), &DashboardOptions::default()).unwrap();
        let text = render_text(&dash);
        for heading in ["Data Preview", "Data Summary", "Visualizations", "Thresholds", "Alerts"] {
            assert!(text.contains(&format!("== {} ==", heading)), "missing {}", heading);
        }

        let warnings: Vec<&str> = text.lines().filter(|l| l.starts_with("WARNING:")).collect();
        let assessment = dash.assessment.as_ref().unwrap();
        assert_eq!(warnings.len(), assessment.alerts.len());
        assert!(warnings[0].contains("High rainfall detected!"));
        let positions: Vec<usize> = assessment
            .alerts
            .iter()
            .map(|a| text.find(&a.message).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_text_marks_overridden_thresholds() {
        let options = DashboardOptions {
            overrides: ThresholdOverrides {
                rainfall: Some(150.0),
                ..Default::default()
            },
            ..DashboardOptions::default()
        };
        let dash = Dashboard::build(&flood_dataset(), &options).unwrap();
        let text = render_text(&dash);
        assert!(text.contains("Rainfall (cm): 150 cm (default "), "got:\n{}", text);
        assert!(!text.contains("High rainfall detected!"));
    }

    #[test]
    fn test_no_alerts_message() {
        let options = DashboardOptions {
            overrides: ThresholdOverrides {
                rainfall: Some(1e6),
                water_level: Some(1e6),
                slope: Some(1e6),
                proximity: Some(1e6),
            },
            ..DashboardOptions::default()
        };
        let dash = Dashboard::build(&flood_dataset(), &options).unwrap();
        assert_eq!(render_alerts(dash.assessment.as_ref().unwrap()), "No thresholds exceeded.\n");
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let dash = Dashboard::build(&flood_dataset(), &DashboardOptions::default()).unwrap();
        assert_eq!(render_json(&dash).unwrap(), render_json(&dash).unwrap());
        let json: serde_json::Value = serde_json::from_str(&render_json(&dash).unwrap()).unwrap();
        assert_eq!(json["assessment"]["alerts"][0]["metric"], "Rainfall");
        assert_eq!(json["row_count"], 6);
        assert!(json["blocked"].is_null());
    }

    #[test]
    fn test_scale_clamps_to_canvas() {
        assert_eq!(scale(0.0, 0.0, 10.0, 5), 0);
        assert_eq!(scale(10.0, 0.0, 10.0, 5), 4);
        assert_eq!(scale(3.0, 3.0, 3.0, 5), 0);
    }
}
