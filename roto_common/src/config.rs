//! Configuration loading traits and types.
//!
//! Loads the daemon configuration from a single TOML file:
//! `[shared]` identity and logging, `[control]` cycle timing and fault
//! policy, `[axes.azim]`/`[axes.elev]` calibration, `[targets]` startup
//! targets, `[link]` station credentials and telemetry endpoint.
//!
//! # Usage
//!
//! ```rust,no_run
//! use roto_common::config::{ConfigLoader, RotoConfig};
//! use std::path::Path;
//!
//! let config = RotoConfig::load(Path::new("config/roto.toml")).unwrap();
//! config.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

/// Common configuration fields shared across roto applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "rotod-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Control cycle timing and sensor fault policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Cycle period [ms].
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Consecutive sensor failures tolerated before an axis is forced to Stop.
    #[serde(default = "default_fault_escalation")]
    pub fault_escalation: u32,
}

fn default_period_ms() -> u64 {
    consts::DEFAULT_CYCLE_PERIOD_MS
}

fn default_fault_escalation() -> u32 {
    consts::DEFAULT_FAULT_ESCALATION
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            fault_escalation: default_fault_escalation(),
        }
    }
}

impl ControlConfig {
    /// Validate cycle timing bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::ValidationError(
                "control.period_ms must be > 0".to_string(),
            ));
        }
        if self.fault_escalation == 0 {
            return Err(ConfigError::ValidationError(
                "control.fault_escalation must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-axis calibration and regulation parameters.
///
/// Physical units = `raw * slope + intercept`; the deadband is the
/// half-width of the hold band around the target, in physical units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Calibration slope.
    pub slope: i32,
    /// Calibration intercept.
    pub intercept: i32,
    /// Deadband half-width [physical units].
    pub deadband: i32,
}

impl AxisConfig {
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.deadband <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "axes.{name}.deadband must be > 0"
            )));
        }
        Ok(())
    }
}

/// Calibration for both axes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxesConfig {
    /// Azimuth axis.
    pub azim: AxisConfig,
    /// Elevation axis.
    pub elev: AxisConfig,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            azim: AxisConfig {
                slope: consts::AZIM_SLOPE,
                intercept: consts::AZIM_INTERCEPT,
                deadband: consts::AZIM_DEADBAND,
            },
            elev: AxisConfig {
                slope: consts::ELEV_SLOPE,
                intercept: consts::ELEV_INTERCEPT,
                deadband: consts::ELEV_DEADBAND,
            },
        }
    }
}

/// Startup target positions [physical units].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Azimuth startup target.
    #[serde(default = "default_tgt_azim")]
    pub azim: i32,
    /// Elevation startup target.
    #[serde(default = "default_tgt_elev")]
    pub elev: i32,
}

fn default_tgt_azim() -> i32 {
    consts::DEFAULT_TGT_AZIM
}

fn default_tgt_elev() -> i32 {
    consts::DEFAULT_TGT_ELEV
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            azim: default_tgt_azim(),
            elev: default_tgt_elev(),
        }
    }
}

/// Station credentials and telemetry endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Station SSID.
    pub ssid: String,

    /// Station passphrase.
    #[serde(default)]
    pub passphrase: String,

    /// Reconnection attempts before the session is declared failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Telemetry listen address.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Largest command frame a client may declare [bytes].
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: u32,
}

fn default_max_retries() -> u32 {
    consts::DEFAULT_MAX_RETRIES
}

fn default_listen() -> String {
    consts::DEFAULT_LISTEN_ADDR.to_string()
}

fn default_max_frame_len() -> u32 {
    consts::DEFAULT_MAX_FRAME_LEN
}

impl LinkConfig {
    /// Validate station and endpoint parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::ValidationError(
                "link.ssid cannot be empty".to_string(),
            ));
        }
        if self.max_frame_len == 0 {
            return Err(ConfigError::ValidationError(
                "link.max_frame_len must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotoConfig {
    /// Identity and logging.
    pub shared: SharedConfig,

    /// Cycle timing and fault policy.
    #[serde(default)]
    pub control: ControlConfig,

    /// Per-axis calibration.
    #[serde(default)]
    pub axes: AxesConfig,

    /// Startup targets.
    #[serde(default)]
    pub targets: TargetConfig,

    /// Station credentials and telemetry endpoint.
    pub link: LinkConfig,
}

impl RotoConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.control.validate()?;
        self.axes.azim.validate("azim")?;
        self.axes.elev.validate("elev")?;
        self.link.validate()?;
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
/// - Semantic validation is a separate `validate()` call on the loaded type
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
