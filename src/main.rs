//! # aquashield
//!
//! Command-line flood assessment dashboard.

use aquashield::config::{AppConfig, DEFAULT_CONFIG_FILE};
use aquashield::ingest::csv::read_csv_path;
use aquashield::logging::{self, Component};
use aquashield::model::ThresholdOverrides;
use aquashield::report::{render_json, render_text, Dashboard, DashboardOptions, FilterSelection};
use clap::{Parser, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "aquashield")]
#[command(about = "AquaShield: Flood Assessment Tool", long_about = None)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// CSV file of flood-risk measurements
    input: PathBuf,

    /// Config file (default: ./aquashield.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rainfall threshold in cm (default: 95th percentile)
    #[arg(long)]
    rainfall_threshold: Option<f64>,

    /// Water level threshold in m (default: 90th percentile)
    #[arg(long)]
    water_level_threshold: Option<f64>,

    /// Slope threshold in % (default: 75th percentile)
    #[arg(long)]
    slope_threshold: Option<f64>,

    /// Proximity threshold in km (default: 25th percentile)
    #[arg(long)]
    proximity_threshold: Option<f64>,

    /// Column to filter the table by
    #[arg(long, requires = "filter_value")]
    filter_column: Option<String>,

    /// Value the filter column must equal
    #[arg(long, requires = "filter_column")]
    filter_value: Option<String>,

    /// Number of rows in the data preview
    #[arg(long)]
    preview_rows: Option<usize>,

    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Append log entries to this file
    #[arg(long)]
    log_file: Option<String>,
}

impl Cli {
    fn threshold_overrides(&self) -> ThresholdOverrides {
        ThresholdOverrides {
            rainfall: self.rainfall_threshold,
            water_level: self.water_level_threshold,
            slope: self.slope_threshold,
            proximity: self.proximity_threshold,
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path, true)?,
        None => AppConfig::load(&PathBuf::from(DEFAULT_CONFIG_FILE), false)?,
    };
    config.apply_env()?;

    if let Some(level) = &cli.log_level {
        config.logging.level = Some(level.clone());
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
    if let Some(rows) = cli.preview_rows {
        config.dashboard.preview_rows = rows;
    }
    config.thresholds = config.thresholds.merged_with(&cli.threshold_overrides());
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(&cli)?;
    logging::init_logger(
        config.logging.min_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    logging::info(
        Component::Ingest,
        None,
        &format!("Reading {}", cli.input.display()),
    );
    let dataset = read_csv_path(&cli.input)?;
    logging::debug(
        Component::Ingest,
        None,
        &format!(
            "Loaded {} rows x {} columns",
            dataset.row_count(),
            dataset.columns().len()
        ),
    );

    let options = DashboardOptions {
        preview_rows: config.dashboard.preview_rows,
        filter: match (&cli.filter_column, &cli.filter_value) {
            (Some(column), Some(value)) => Some(FilterSelection {
                column: column.clone(),
                value: value.clone(),
            }),
            _ => None,
        },
        quantiles: config.quantiles,
        overrides: config.thresholds,
    };

    let dashboard = Dashboard::build(&dataset, &options)?;
    if let Some(assessment) = &dashboard.assessment {
        logging::log_assessment_summary(assessment);
    }

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&dashboard)),
        OutputFormat::Json => println!("{}", render_json(&dashboard)?),
    }

    if let Some(err) = dashboard.blocked {
        logging::log_assessment_failure(&err);
        logging::warn(
            Component::Alerts,
            None,
            "Threshold evaluation skipped; only the data views were produced",
        );
        return Err(err.into());
    }

    logging::info(Component::System, None, "Data processing complete!");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}
