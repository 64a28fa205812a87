//! Dispatch configuration: tariff, ETA heuristic and shortlist size.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::eta::EtaConfig;
use crate::pricing::PricingConfig;

/// Nearest providers shown to the requester.
pub const DEFAULT_SHORTLIST_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub pricing: PricingConfig,
    pub eta: EtaConfig,
    /// Maximum number of ranked providers in a shortlist.
    pub shortlist_limit: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            eta: EtaConfig::default(),
            shortlist_limit: DEFAULT_SHORTLIST_LIMIT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl DispatchConfig {
    pub fn with_shortlist_limit(mut self, limit: usize) -> Self {
        self.shortlist_limit = limit;
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.pricing.per_km_rate.is_finite() || self.pricing.per_km_rate < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pricing.per_km_rate must be a non-negative number, got {}",
                self.pricing.per_km_rate
            )));
        }
        if !self.eta.minutes_per_km.is_finite() || self.eta.minutes_per_km <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "eta.minutes_per_km must be positive, got {}",
                self.eta.minutes_per_km
            )));
        }
        if self.shortlist_limit == 0 {
            return Err(ConfigError::Invalid(
                "shortlist_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
