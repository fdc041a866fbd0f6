/// Integration tests for the CSV → thresholds → alerts pipeline
///
/// Tests verify:
/// 1. CSV files on disk load into datasets with the expected column types
/// 2. Schema validation blocks files missing flood columns
/// 3. Quantile defaults and user overrides drive the alerts
/// 4. Config files feed quantiles and overrides into the dashboard
///
/// Run with: cargo test --test assessment_integration

use aquashield::config::AppConfig;
use aquashield::ingest::csv::{read_csv_path, IngestError};
use aquashield::report::{render_text, Dashboard, DashboardOptions, FilterSelection};
use aquashield::{
    assess, compute_default_thresholds, evaluate, validate_schema, AssessmentError, Metric,
    QuantileSpec, ThresholdOverrides,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const HEADER: &str =
    "Altitude (m),Water Body Proximity (km),Rainfall (cm),Slope (%),Proximity (km),Water Level (m)";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture");
    file.write_all(contents.as_bytes()).expect("write fixture");
    path
}

/// Five rows; rainfall spikes to 100 in the last one.
fn spike_csv() -> String {
    format!(
        "{}\n\
         120,0.5,1,5,1.0,2.0\n\
         95,1.2,2,7,0.4,3.1\n\
         300,3.0,3,2,2.5,1.0\n\
         80,0.2,4,9,0.3,4.2\n\
         60,0.1,100,4,0.2,5.5\n",
        HEADER
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_rainfall_spike_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "flood.csv", &spike_csv());

    let dataset = read_csv_path(&path).expect("fixture should load");
    validate_schema(&dataset).expect("fixture has every required column");

    let thresholds = compute_default_thresholds(&dataset, &QuantileSpec::default()).unwrap();
    assert!((thresholds.rainfall - 80.8).abs() < 1e-9, "got {}", thresholds.rainfall);

    let alerts = evaluate(&dataset, &thresholds).unwrap();
    let rainfall: Vec<_> = alerts.iter().filter(|a| a.metric == Metric::Rainfall).collect();
    assert_eq!(rainfall.len(), 1);
    assert_eq!(rainfall[0].observed_max, 100.0);
    assert_eq!(alerts[0].metric, Metric::Rainfall, "rainfall alert comes first");
}

#[test]
fn test_override_silences_rainfall() {
    let dir = TempDir::new().unwrap();
    let dataset = read_csv_path(&write_file(&dir, "flood.csv", &spike_csv())).unwrap();

    let overrides = ThresholdOverrides {
        rainfall: Some(150.0),
        ..Default::default()
    };
    let assessment = assess(&dataset, &QuantileSpec::default(), &overrides).unwrap();
    assert_eq!(assessment.thresholds.rainfall, 150.0);
    assert!(assessment.alerts.iter().all(|a| a.metric != Metric::Rainfall));
}

#[test]
fn test_file_without_water_level_is_rejected() {
    let dir = TempDir::new().unwrap();
    let csv = "Altitude (m),Water Body Proximity (km),Rainfall (cm),Slope (%),Proximity (km)\n\
               120,0.5,1,5,1.0\n";
    let dataset = read_csv_path(&write_file(&dir, "old.csv", csv)).unwrap();

    let err = validate_schema(&dataset).unwrap_err();
    assert_eq!(err.missing, vec!["Water Level (m)".to_string()]);

    let result = assess(&dataset, &QuantileSpec::default(), &ThresholdOverrides::default());
    assert!(matches!(result, Err(AssessmentError::Schema(_))));
}

#[test]
fn test_file_without_water_level_still_shows_data_views() {
    let dir = TempDir::new().unwrap();
    let csv = "Altitude (m),Water Body Proximity (km),Rainfall (cm),Slope (%),Proximity (km)\n\
               120,0.5,1,5,1.0\n\
               95,1.2,,7,0.4\n";
    let dataset = read_csv_path(&write_file(&dir, "old.csv", csv)).unwrap();

    let dashboard = Dashboard::build(&dataset, &DashboardOptions::default()).unwrap();
    assert_eq!(dashboard.preview.rows.len(), 2);
    assert_eq!(dashboard.summary.len(), 5);
    assert!(dashboard.charts.is_some());
    assert!(dashboard.assessment.is_none());
    assert!(matches!(
        dashboard.blocked,
        Some(AssessmentError::Schema(ref e)) if e.missing == vec!["Water Level (m)".to_string()]
    ));

    let text = render_text(&dashboard);
    assert!(text.contains("== Data Preview =="));
    assert!(text.contains("== Data Summary =="));
    assert!(text.contains("BLOCKED: "), "got:\n{}", text);
}

#[test]
fn test_blank_cell_is_selectable_through_its_displayed_value() {
    let dir = TempDir::new().unwrap();
    let csv = format!("{}\n120,0.5,,5,1.0,2.0\n95,1.2,3,7,0.4,3.1\n", HEADER);
    let dataset = read_csv_path(&write_file(&dir, "gaps.csv", &csv)).unwrap();

    let options = DashboardOptions {
        filter: Some(FilterSelection {
            column: "Rainfall (cm)".to_string(),
            value: "NaN".to_string(),
        }),
        ..DashboardOptions::default()
    };
    let dashboard = Dashboard::build(&dataset, &options).unwrap();
    let filter = dashboard.filter.expect("filter requested");
    assert!(filter.choices.iter().any(|c| c.to_string() == "NaN"));
    assert_eq!(filter.matches.rows.len(), 1);
}

#[test]
fn test_header_only_file_reports_empty_column() {
    let dir = TempDir::new().unwrap();
    let dataset = read_csv_path(&write_file(&dir, "empty.csv", &format!("{}\n", HEADER))).unwrap();

    assert!(validate_schema(&dataset).is_ok());
    let err = compute_default_thresholds(&dataset, &QuantileSpec::default()).unwrap_err();
    assert!(
        matches!(err, AssessmentError::EmptyColumn(ref e) if e.column == "Rainfall (cm)"),
        "got {:?}",
        err
    );
}

#[test]
fn test_text_cells_in_required_column_fail_schema() {
    let dir = TempDir::new().unwrap();
    let csv = format!("{}\n120,0.5,heavy,5,1.0,2.0\n", HEADER);
    let dataset = read_csv_path(&write_file(&dir, "text.csv", &csv)).unwrap();
    let err = validate_schema(&dataset).unwrap_err();
    assert_eq!(err.non_numeric, vec!["Rainfall (cm)".to_string()]);
}

#[test]
fn test_ragged_file_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let csv = format!("{}\n120,0.5,1\n", HEADER);
    let result = read_csv_path(&write_file(&dir, "ragged.csv", &csv));
    assert!(matches!(result, Err(IngestError::Csv(_))));
}

#[test]
fn test_config_file_drives_dashboard() {
    let dir = TempDir::new().unwrap();
    let dataset = read_csv_path(&write_file(&dir, "flood.csv", &spike_csv())).unwrap();
    let config_path = write_file(
        &dir,
        "aquashield.toml",
        "[quantiles]\nrainfall = 1.0\n\n[thresholds]\nwater_level = 99.0\n\n[dashboard]\npreview_rows = 2\n",
    );
    let config = AppConfig::load(&config_path, true).unwrap();

    let options = DashboardOptions {
        preview_rows: config.dashboard.preview_rows,
        quantiles: config.quantiles,
        overrides: config.thresholds,
        ..DashboardOptions::default()
    };
    let dashboard = Dashboard::build(&dataset, &options).unwrap();

    assert_eq!(dashboard.preview.rows.len(), 2);
    // Quantile 1.0 is the maximum itself, so rainfall can't exceed it.
    let assessment = dashboard.assessment.as_ref().expect("assessment should run");
    assert_eq!(assessment.thresholds.rainfall, 100.0);
    let metrics: Vec<Metric> = assessment.alerts.iter().map(|a| a.metric).collect();
    assert_eq!(metrics, vec![Metric::Slope, Metric::Proximity]);

    let text = render_text(&dashboard);
    assert!(text.contains("Water Level (m): 99 m (default "));
}

#[test]
fn test_repeated_assessment_is_identical() {
    let dir = TempDir::new().unwrap();
    let dataset = read_csv_path(&write_file(&dir, "flood.csv", &spike_csv())).unwrap();
    let first = assess(&dataset, &QuantileSpec::default(), &ThresholdOverrides::default()).unwrap();
    let second = assess(&dataset, &QuantileSpec::default(), &ThresholdOverrides::default()).unwrap();
    assert_eq!(first, second);
}
