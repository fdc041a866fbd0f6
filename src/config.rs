//! Runtime configuration.
//!
//! Settings come from three layers, later ones winning:
//!   1. `aquashield.toml` (or the file passed with `--config`)
//!   2. environment variables, with `.env` loaded first via `dotenv`
//!   3. command-line flags, applied by `main`
//!
//! Every table and key in the TOML file is optional:
//!
//! ```toml
//! [quantiles]
//! rainfall = 0.95
//! water_level = 0.90
//!
//! [thresholds]
//! rainfall = 120.0
//!
//! [dashboard]
//! preview_rows = 10
//!
//! [logging]
//! level = "debug"
//! file = "aquashield.log"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::logging::LogLevel;
use crate::model::{QuantileSpec, ThresholdOverrides};

pub const DEFAULT_CONFIG_FILE: &str = "aquashield.toml";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

pub const ENV_LOG_LEVEL: &str = "AQUASHIELD_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "AQUASHIELD_LOG_FILE";
pub const ENV_PREVIEW_ROWS: &str = "AQUASHIELD_PREVIEW_ROWS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of debug, info, warn, error. Defaults to info.
    pub level: Option<String>,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, ConfigError> {
        match &self.level {
            None => Ok(LogLevel::Info),
            Some(level) => level.parse().map_err(|message| ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub quantiles: QuantileSpec,
    pub thresholds: ThresholdOverrides,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Toml {
            path: path.to_string(),
            source,
        })
    }

    /// Loads a config file. A missing file is an error only when `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents, &display),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: display,
                source,
            }),
        }
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = Some(level);
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.logging.file = Some(file);
        }
        if let Some(rows) = lookup(ENV_PREVIEW_ROWS) {
            self.dashboard.preview_rows =
                rows.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_PREVIEW_ROWS.to_string(),
                    message: format!("expected a row count, got '{}'", rows),
                })?;
        }
        Ok(())
    }

    /// Loads `.env` and applies process environment overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        dotenv::dotenv().ok();
        self.apply_env_with(|key| std::env::var(key).ok())
    }
}
