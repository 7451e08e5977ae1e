//! Configuration management for Tariffwatch
//!
//! This module handles loading and validation of the application
//! configuration from YAML files with support for environment variable overrides.

use crate::error::{Result, TariffWatchError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod defaults;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "TARIFFWATCH_CONFIG";

/// Longest accepted refresh or publish period (one week)
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Longest accepted per-request timeout
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Tariff provider endpoints
    pub provider: ProviderConfig,

    /// Refresh and publish cadence
    pub schedule: ScheduleConfig,

    /// Metrics backend
    pub metrics: MetricsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Tariff provider endpoints and transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the hourly tariff API; the feed name is appended
    pub spot_base_url: String,

    /// HTML page listing the fixed fees and levies
    pub fees_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Feed name of the electricity market
    pub electricity_feed: String,

    /// Feed name of the gas market
    pub gas_feed: String,
}

/// Timer periods
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between tariff refreshes
    pub refresh_interval_secs: u64,

    /// Seconds between metric publications
    pub publish_interval_secs: u64,
}

/// InfluxDB target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Write to InfluxDB (default); when false points are only logged
    pub enabled: bool,

    /// InfluxDB base URL
    pub url: String,

    /// Target database
    pub database: String,

    /// Measurement name
    pub measurement: String,

    /// Value of the `source` tag
    pub source_tag: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file (its parent directory holds the rotated files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to log to rotating files
    pub file_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl ProviderConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ScheduleConfig {
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub const fn publish_interval(&self) -> Duration {
        Duration::from_secs(self.publish_interval_secs)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first location found, apply environment
    /// overrides and validate
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::load_default_locations()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_default_locations() -> Result<Self> {
        let default_paths = [
            "tariffwatch.yaml",
            "/data/tariffwatch.yaml",
            "/etc/tariffwatch/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty("TARIFFWATCH_INFLUX_URL") {
            self.metrics.url = url;
            self.metrics.enabled = true;
        }
        if let Some(db) = non_empty("TARIFFWATCH_INFLUX_DATABASE") {
            self.metrics.database = db;
        }
        if let Some(level) = non_empty("TARIFFWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.provider.spot_base_url.trim().is_empty() {
            return Err(TariffWatchError::validation(
                "provider.spot_base_url",
                "URL cannot be empty",
            ));
        }

        if self.provider.fees_url.trim().is_empty() {
            return Err(TariffWatchError::validation(
                "provider.fees_url",
                "URL cannot be empty",
            ));
        }

        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.provider.request_timeout_secs) {
            return Err(TariffWatchError::validation(
                "provider.request_timeout_secs".to_string(),
                format!("Must be between 1 and {}", MAX_REQUEST_TIMEOUT_SECS),
            ));
        }

        for (field, secs) in [
            (
                "schedule.refresh_interval_secs",
                self.schedule.refresh_interval_secs,
            ),
            (
                "schedule.publish_interval_secs",
                self.schedule.publish_interval_secs,
            ),
        ] {
            if !(1..=MAX_INTERVAL_SECS).contains(&secs) {
                return Err(TariffWatchError::validation(
                    field.to_string(),
                    format!("Must be between 1 and {} seconds", MAX_INTERVAL_SECS),
                ));
            }
        }

        if self.metrics.enabled && self.metrics.url.trim().is_empty() {
            return Err(TariffWatchError::validation(
                "metrics.url",
                "URL cannot be empty when metrics are enabled",
            ));
        }

        if self.metrics.measurement.trim().is_empty() {
            return Err(TariffWatchError::validation(
                "metrics.measurement",
                "Measurement name cannot be empty",
            ));
        }

        Ok(())
    }
}
