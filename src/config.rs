//! Configuration for device tree behaviour and validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(String),
}

/// Knobs for how strictly a [`crate::tree::DeviceTree`] applies the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationConfig {
    /// Reject ACS writes to read-only parameters and tables
    pub enforce_access: bool,

    /// Reject writes that make two rows share a functional unique key
    pub enforce_unique_keys: bool,

    /// Treat non-functional unique keys (such as `Alias`) like functional ones
    pub strict_unique_keys: bool,

    /// Enforce `minEntries` / `maxEntries` on AddObject and DeleteObject
    pub enforce_cardinality: bool,

    /// Skip unknown names in SetParameterValues instead of faulting
    pub ignore_unknown_parameters: bool,

    /// Give new rows an `Alias` when the table has one
    pub auto_assign_alias: bool,

    /// Prefix of auto-assigned aliases
    pub alias_prefix: String,

    /// Highest instance number handed out before AddObject fails
    pub max_instance_number: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_access: true,
            enforce_unique_keys: true,
            strict_unique_keys: false,
            enforce_cardinality: true,
            ignore_unknown_parameters: false,
            auto_assign_alias: true,
            alias_prefix: "cpe-".to_string(),
            max_instance_number: u32::MAX,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ValidationConfigBuilder {
        ValidationConfigBuilder::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Builder for ValidationConfig
#[derive(Debug, Default)]
pub struct ValidationConfigBuilder {
    config: ValidationConfig,
}

impl ValidationConfigBuilder {
    pub fn enforce_access(mut self, enforce: bool) -> Self {
        self.config.enforce_access = enforce;
        self
    }

    pub fn enforce_unique_keys(mut self, enforce: bool) -> Self {
        self.config.enforce_unique_keys = enforce;
        self
    }

    pub fn strict_unique_keys(mut self, strict: bool) -> Self {
        self.config.strict_unique_keys = strict;
        self
    }

    pub fn enforce_cardinality(mut self, enforce: bool) -> Self {
        self.config.enforce_cardinality = enforce;
        self
    }

    pub fn ignore_unknown_parameters(mut self, ignore: bool) -> Self {
        self.config.ignore_unknown_parameters = ignore;
        self
    }

    pub fn auto_assign_alias(mut self, assign: bool) -> Self {
        self.config.auto_assign_alias = assign;
        self
    }

    /// Set the alias prefix. Falls back to `cpe-` when empty, since aliases
    /// must not start with a digit.
    pub fn alias_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.config.alias_prefix = prefix;
        }
        self
    }

    /// Set the highest instance number (at least 1)
    pub fn max_instance_number(mut self, max: u32) -> Self {
        self.config.max_instance_number = max.max(1);
        self
    }

    pub fn build(self) -> ValidationConfig {
        self.config
    }
}
