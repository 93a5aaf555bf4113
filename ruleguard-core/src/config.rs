//! Validator configuration.
//!
//! Thresholds that callers may tune, loadable from TOML. Every key is optional;
//! missing keys take the documented defaults:
//!
//! ```toml
//! max_nesting = 3
//! overfit_condition_limit = 10
//! max_rsi_instances = 3
//! max_moving_averages = 5
//! min_rsi_band_gap = 20.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or checking a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunable thresholds for the rule and indicator validators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Deepest allowed group, counting the root as depth 0.
    pub max_nesting: usize,
    /// Trees with more conditions than this get an overfitting suggestion.
    pub overfit_condition_limit: usize,
    /// More simultaneous RSI indicators than this produce a clutter warning.
    pub max_rsi_instances: usize,
    /// More simultaneous moving averages than this produce a clutter warning.
    pub max_moving_averages: usize,
    /// RSI overbought/oversold gaps narrower than this produce a warning.
    pub min_rsi_band_gap: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_nesting: 3,
            overfit_condition_limit: 10,
            max_rsi_instances: 3,
            max_moving_averages: 5,
            min_rsi_band_gap: 20.0,
        }
    }
}

impl ValidatorConfig {
    /// Load from a TOML file and check it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string and check it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values no validator can work with.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.overfit_condition_limit == 0 {
            return Err(ConfigError::Invalid(
                "overfit_condition_limit must be at least 1".into(),
            ));
        }
        if !self.min_rsi_band_gap.is_finite() || self.min_rsi_band_gap < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_rsi_band_gap must be a non-negative number, got {}",
                self.min_rsi_band_gap
            )));
        }
        Ok(())
    }
}
