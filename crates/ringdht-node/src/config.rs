use std::fs;
use std::path::Path;

use ringdht_codec::ser::MAX_VALUE_SIZE;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Admission settings for a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Largest packed value accepted, in bytes.
    pub max_value_size: usize,
    /// Verify owner signatures before running type policies.
    pub verify_signatures: bool,
    /// Reject values whose type id is not registered instead of treating
    /// them as user data.
    pub reject_unknown_types: bool,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            max_value_size: MAX_VALUE_SIZE,
            verify_signatures: true,
            reject_unknown_types: false,
            log_filter: "info".to_string(),
        }
    }
}

impl NodeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_value_size == 0 {
            return Err(ConfigError::Invalid("max_value_size must be > 0"));
        }
        Ok(())
    }
}
