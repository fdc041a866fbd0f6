/// Structured logging for the flood assessment tool
///
/// Provides levelled logging tagged with the pipeline stage and, where
/// relevant, the column involved. Supports console output and optional
/// append-to-file logging.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::alert::thresholds::Assessment;
use crate::model::AssessmentError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Ingest,
    Schema,
    Thresholds,
    Alerts,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Ingest => write!(f, "CSV"),
            Component::Schema => write!(f, "SCHEMA"),
            Component::Thresholds => write!(f, "THRESH"),
            Component::Alerts => write!(f, "ALERT"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, component: Component, column: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let column_part = column.map(|c| format!(" [{}]", c)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, column_part, message)
    }

    fn log(&self, level: LogLevel, component: Component, column: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, component, column, message);
        let column_part = column.map(|c| format!(" [{}]", c)).unwrap_or_default();

        // Diagnostics go to stderr so stdout stays clean for the report.
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, column_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, column_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, component: Component, column: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, column, message);
        }
    }
}

pub fn info(component: Component, column: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, column, message);
}

pub fn warn(component: Component, column: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, column, message);
}

pub fn error(component: Component, column: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, column, message);
}

pub fn debug(component: Component, column: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, column, message);
}

// ---------------------------------------------------------------------------
// Assessment Logging
// ---------------------------------------------------------------------------

/// Log a failed assessment under the stage it failed in.
pub fn log_assessment_failure(err: &AssessmentError) {
    match err {
        AssessmentError::Schema(e) => error(Component::Schema, None, &e.to_string()),
        AssessmentError::EmptyColumn(e) => {
            error(Component::Thresholds, Some(e.column.as_str()), "column has no values")
        }
        other => error(Component::Thresholds, None, &other.to_string()),
    }
}

/// Level for an assessment summary: info when quiet, warn when any metric
/// exceeded its threshold.
pub fn summary_level(assessment: &Assessment) -> LogLevel {
    if assessment.alerts.is_empty() {
        LogLevel::Info
    } else {
        LogLevel::Warning
    }
}

/// Log the thresholds in use and the number of alerts raised.
pub fn log_assessment_summary(assessment: &Assessment) {
    for metric in crate::model::Metric::ALL {
        let (default, used) = (assessment.defaults.get(metric), assessment.thresholds.get(metric));
        let message = if default == used {
            format!("{} threshold {} (default)", metric, used)
        } else {
            format!("{} threshold {} (default {} overridden)", metric, used, default)
        };
        debug(Component::Thresholds, Some(metric.column()), &message);
    }

    let message = format!(
        "Assessment complete: {} of {} metrics above threshold",
        assessment.alerts.len(),
        crate::model::Metric::ALL.len()
    );
    dispatch(summary_level(assessment), Component::Alerts, None, &message);
}
