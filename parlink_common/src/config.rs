//! Configuration loading traits and types.
//!
//! This module provides the device configuration (`device.toml`) and a
//! standardized way to load TOML configuration files across parlink
//! applications.
//!
//! # TOML Example
//!
//! ```toml
//! process_delay = 3000
//!
//! [measure]
//! enabled = true
//! done_slot = "par5"
//!
//! [duplex]
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::{DEFAULT_PROCESS_DELAY, MEASURE_DONE_ALTERNATE, MEASURE_DONE_PRIMARY};

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

/// Which register slot carries the measure process completion flag.
///
/// Two near-identical deployments of the measure process exist, wired
/// to different flag slots. Both remain selectable; they are never
/// unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DoneSlot {
    /// Primary wiring.
    #[default]
    Par5,
    /// Alternate wiring.
    Par6,
}

impl DoneSlot {
    /// Register index of the flag slot.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            DoneSlot::Par5 => MEASURE_DONE_PRIMARY,
            DoneSlot::Par6 => MEASURE_DONE_ALTERNATE,
        }
    }
}

/// Measure process configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// Install the measure process.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Completion flag wiring.
    #[serde(default)]
    pub done_slot: DoneSlot,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            done_slot: DoneSlot::default(),
        }
    }
}

/// Duplex process configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplexConfig {
    /// Install the duplex process.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for DuplexConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Top-level device configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Handler period in native clock units.
    #[serde(default = "default_process_delay")]
    pub process_delay: u32,

    /// Measure process settings.
    #[serde(default)]
    pub measure: MeasureConfig,

    /// Duplex process settings.
    #[serde(default)]
    pub duplex: DuplexConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            process_delay: DEFAULT_PROCESS_DELAY,
            measure: MeasureConfig::default(),
            duplex: DuplexConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `process_delay` is zero
    /// - no process is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process_delay == 0 {
            return Err(ConfigError::ValidationError(
                "process_delay must be non-zero".to_string(),
            ));
        }
        if !self.measure.enabled && !self.duplex.enabled {
            return Err(ConfigError::ValidationError(
                "at least one process must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_process_delay() -> u32 {
    DEFAULT_PROCESS_DELAY
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
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
