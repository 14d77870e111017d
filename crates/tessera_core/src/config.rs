//! Store configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tuning knobs for a `Store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum instances each per-type component pool keeps.
    pub pool_capacity: usize,
    /// Rows reserved up front when an archetype is first created.
    pub initial_archetype_capacity: usize,
}

impl StoreConfig {
    /// Largest row count an archetype may pre-reserve.
    pub const MAX_INITIAL_ARCHETYPE_CAPACITY: usize = 1 << 20;

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Every column of a new archetype reserves this many rows.
        if self.initial_archetype_capacity > Self::MAX_INITIAL_ARCHETYPE_CAPACITY {
            return Err(ConfigError::Invalid {
                field: "initial_archetype_capacity",
                reason: format!(
                    "{} exceeds the limit of {} rows",
                    self.initial_archetype_capacity,
                    Self::MAX_INITIAL_ARCHETYPE_CAPACITY
                ),
            });
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 1000,
            initial_archetype_capacity: 64,
        }
    }
}
