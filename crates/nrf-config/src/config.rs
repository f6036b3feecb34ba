//! Service configuration
//!
//! Loaded from TOML or YAML. The owner identifier is mandatory; everything
//! else has a default.

use nrf_document::{OwnerId, SchemaVersion};
use nrf_model::LogLevel;
use nrf_validation::DEFAULT_MAX_COUNT;
use serde::{Deserialize, Serialize};

/// Configuration service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Owner of every document this service reads and writes
    pub nrf_instance_id: String,
    /// Per-field entry limit for semantic validation
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    /// Document schema version this deployment expects
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Initial process log level
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

fn default_max_count() -> usize {
    DEFAULT_MAX_COUNT
}

fn default_schema_version() -> String {
    SchemaVersion::CURRENT.to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl ServiceConfig {
    /// Defaults for the given owner
    #[inline]
    #[must_use]
    pub fn new(nrf_instance_id: impl Into<String>) -> Self {
        Self {
            nrf_instance_id: nrf_instance_id.into(),
            max_count: default_max_count(),
            schema_version: default_schema_version(),
            log_level: default_log_level(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns error on malformed input or invalid settings
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML
    ///
    /// # Errors
    /// Returns error on malformed input or invalid settings
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings
    ///
    /// # Errors
    /// Returns the first invalid setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nrf_instance_id.trim().is_empty() {
            return Err(ConfigError::MissingInstanceId);
        }
        if self.max_count == 0 {
            return Err(ConfigError::InvalidMaxCount);
        }
        if !SchemaVersion::new(self.schema_version.as_str()).is_supported() {
            return Err(ConfigError::UnsupportedSchemaVersion(self.schema_version.clone()));
        }
        Ok(())
    }

    /// Owner identifier for document keys
    #[inline]
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.nrf_instance_id.as_str())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Bad NRF configuration. Missing 'nrf.nrf-instance-id'")]
    MissingInstanceId,

    #[error("Bad NRF configuration. 'max_count' must be greater than zero")]
    InvalidMaxCount,

    #[error("Bad NRF configuration. Unsupported schema version '{0}'")]
    UnsupportedSchemaVersion(String),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
