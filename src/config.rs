//! Configuration management for Agile Tracker
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

mod defaults;

use crate::error::{Result, TrackerError};
use crate::staleness::StalenessPolicy;
use chrono::NaiveTime;
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Tariff and provider API settings
    pub tariff: TariffConfig,

    /// On-disk cache settings
    pub cache: CacheConfig,

    /// Daily publish schedule of the provider
    pub release: ReleaseConfig,

    /// Default cheapest-window search parameters
    pub search: SearchConfig,

    /// Price band thresholds (GBP/kWh)
    pub bands: BandsConfig,

    /// Hours of upcoming slots shown from the current slot onwards
    pub chart_hours: u32,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Provider tariff identification and HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TariffConfig {
    /// Product code (e.g. AGILE-24-10-01)
    pub product_code: String,

    /// Full tariff code (e.g. E-1R-AGILE-24-10-01-C)
    pub tariff_code: String,

    /// API base URL without trailing slash
    pub api_base: String,

    /// Records requested per page
    pub page_size: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Cache directory and expiry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory; platform cache dir when unset
    pub dir: Option<String>,

    /// Entries older than this are removed by the sweep
    pub expiry_days: u32,
}

/// When the provider publishes the next day's prices
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Time of day in HH:MM format
    pub time: String,

    /// IANA timezone the release time is expressed in
    pub timezone: String,

    /// Minutes after the release to schedule the daily refetch
    pub fetch_delay_minutes: u32,
}

/// Cheapest-window search parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SearchConfig {
    /// Run duration in whole hours
    pub duration_hours: u32,

    /// Latest start, in whole hours from now
    pub horizon_hours: u32,
}

/// Price band thresholds
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BandsConfig {
    /// Prices below this are LOW
    pub low_below: f64,

    /// Prices below this (and not LOW) are MEDIUM
    pub medium_below: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level
    pub console_level: Option<String>,

    /// Optional file-specific level
    pub file_level: Option<String>,

    /// Path to log file (its directory receives the rotated files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl TariffConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheConfig {
    /// Resolved cache directory
    pub fn resolve_dir(&self) -> PathBuf {
        self.dir
            .as_ref()
            .filter(|d| !d.trim().is_empty())
            .map_or_else(default_cache_dir, PathBuf::from)
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(u64::from(self.expiry_days) * 86_400)
    }
}

impl ReleaseConfig {
    /// Parse the configured time and zone into a staleness policy
    pub fn policy(&self) -> Result<StalenessPolicy> {
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|e| TrackerError::validation("release.time", e.to_string()))?;
        let tz: Tz = self.timezone.trim().parse().map_err(|_| {
            TrackerError::validation(
                "release.timezone",
                format!("Unknown timezone: {}", self.timezone),
            )
        })?;
        Ok(StalenessPolicy::with_timezone(time, tz))
    }

    pub fn fetch_delay(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.fetch_delay_minutes))
    }
}

/// Platform cache directory for this application
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("agile-tracker")
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let mut candidates = vec![PathBuf::from("agile_tracker.yaml")];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("agile-tracker").join("config.yaml"));
        }
        candidates.push(PathBuf::from("/etc/agile-tracker/config.yaml"));

        for path in &candidates {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Config)).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tariff.tariff_code.trim().is_empty() {
            return Err(TrackerError::validation(
                "tariff.tariff_code",
                "Tariff code cannot be empty",
            ));
        }

        if self.tariff.product_code.trim().is_empty() {
            return Err(TrackerError::validation(
                "tariff.product_code",
                "Product code cannot be empty",
            ));
        }

        if self.tariff.page_size == 0 {
            return Err(TrackerError::validation(
                "tariff.page_size",
                "Must be greater than 0",
            ));
        }

        if self.tariff.timeout_secs == 0 {
            return Err(TrackerError::validation(
                "tariff.timeout_secs",
                "Must be greater than 0",
            ));
        }

        if self.cache.expiry_days == 0 {
            return Err(TrackerError::validation(
                "cache.expiry_days",
                "Must be greater than 0",
            ));
        }

        self.release.policy()?;

        if self.search.duration_hours == 0 {
            return Err(TrackerError::validation(
                "search.duration_hours",
                "Must be at least 1 hour",
            ));
        }

        if self.search.horizon_hours == 0 {
            return Err(TrackerError::validation(
                "search.horizon_hours",
                "Must be at least 1 hour",
            ));
        }

        if self.chart_hours == 0 {
            return Err(TrackerError::validation(
                "chart_hours",
                "Must be at least 1 hour",
            ));
        }

        for (field, level) in [
            ("logging.level", Some(&self.logging.level)),
            ("logging.console_level", self.logging.console_level.as_ref()),
            ("logging.file_level", self.logging.file_level.as_ref()),
        ] {
            if let Some(level) = level
                && crate::logging::parse_log_level(level).is_err()
            {
                return Err(TrackerError::validation(
                    field,
                    format!("Unknown log level: {}", level),
                ));
            }
        }

        if self.bands.low_below > self.bands.medium_below {
            return Err(TrackerError::validation(
                "bands.low_below",
                "Must not exceed bands.medium_below",
            ));
        }

        Ok(())
    }
}
