//! Monitor configuration
//!
//! Stored as TOML; every field has a default matching the stock dongle, so an
//! empty or missing file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battery_log::DEFAULT_LOG_FILE;
use crate::report::ReportLayout;

pub const DEFAULT_VENDOR_ID: u16 = 0x1D57;
pub const DEFAULT_PRODUCT_ID: u16 = 0xFA60;
pub const DEFAULT_DEVICE_PATH: &str = "/dev/hidraw2";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Optional history file of every valid reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Used to open the device when no path is given, and by `list`
    pub vendor_id: u16,
    pub product_id: u16,
    /// hidraw node of the battery interface
    pub device_path: PathBuf,
    /// Ignore `device_path` and open the first interface matching VID/PID
    pub open_by_id: bool,
    /// Seconds between re-emissions of an unchanged status
    pub update_interval_secs: u64,
    /// Sleep between polls
    pub poll_interval_ms: u64,
    /// Bytes requested per read
    pub read_size: usize,
    pub report: ReportLayout,
    pub logging: LoggingConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            open_by_id: false,
            update_interval_secs: 5,
            poll_interval_ms: 100,
            read_size: hidbat_transport::MAX_REPORT_SIZE,
            report: ReportLayout::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// `~/.config/hidbat/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hidbat")
            .join("config.toml")
    }

    /// Load from `path`; with `required == false` a missing file means defaults
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.report;
        if r.report_length <= r.status_offset || r.report_length <= r.level_offset {
            return Err(ConfigError::Invalid(format!(
                "report_length {} must exceed status_offset {} and level_offset {}",
                r.report_length, r.status_offset, r.level_offset
            )));
        }
        if self.update_interval_secs == 0 {
            return Err(ConfigError::Invalid("update_interval_secs must be > 0".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be > 0".into()));
        }
        if self.read_size < r.report_length {
            return Err(ConfigError::Invalid(format!(
                "read_size {} is smaller than report_length {}",
                self.read_size, r.report_length
            )));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
