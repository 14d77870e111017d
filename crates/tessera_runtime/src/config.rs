//! Runtime configuration

use serde::{Deserialize, Serialize};
use tessera_core::{ConfigError, StoreConfig};

/// Runtime settings: store tuning plus the fixed-step clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub store: StoreConfig,
    /// Length of one fixed simulation step in seconds.
    pub fixed_timestep_secs: f32,
    /// Upper bound on fixed steps run for a single frame.
    pub max_fixed_steps_per_frame: u32,
}

impl RuntimeConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        if !(self.fixed_timestep_secs.is_finite() && self.fixed_timestep_secs > 0.0) {
            return Err(ConfigError::Invalid {
                field: "fixed_timestep_secs",
                reason: format!("must be a positive number, got {}", self.fixed_timestep_secs),
            });
        }
        if self.max_fixed_steps_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "max_fixed_steps_per_frame",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            fixed_timestep_secs: 1.0 / 60.0,
            max_fixed_steps_per_frame: 8,
        }
    }
}
