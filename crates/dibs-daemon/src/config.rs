//! Configuration file parsing for the daemon
//!
//! Loads settings from TOML files: the claim database path and the
//! shepherd's policy thresholds and cadence.

use dibs_shepherd::ShepherdConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Daemon configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A parsed value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Daemon configuration loaded from TOML
///
/// ```toml
/// database_path = "dibs.db"
///
/// [shepherd]
/// nudge_interval_days = 7
/// claim_expiry_days = 14
/// sweep_interval_minutes = 60
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Path to the SQLite claim database
    pub database_path: String,

    /// Shepherd policy and cadence
    pub shepherd: ShepherdConfig,
}

impl DaemonConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;

        if config.database_path.is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".to_string()));
        }
        config
            .shepherd
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(config)
    }
}
