//! Engine configuration
//!
//! Built either through [`EngineConfig::builder`] or loaded from TOML:
//!
//! ```toml
//! max_workers = 4
//! verify_round_trip = true
//! timeout_ms = 5000
//! default_seed = 7
//!
//! [options.subword_bpe]
//! max_merges = 32
//! tie_break = "seeded"
//!
//! [options.char]
//! unit = "grapheme"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tessera_core::StrategyOptions;

use crate::error::{EngineError, Result};

/// Default configuration constants
pub mod defaults {
    /// Seed used when neither config nor request sets one
    pub const SEED: u64 = tessera_core::DEFAULT_SEED;

    /// Round-trip verification is off unless requested
    pub const VERIFY_ROUND_TRIP: bool = false;

    /// Upper bound on configured workers
    pub const MAX_WORKERS_LIMIT: usize = 1024;
}

/// Workers used when none are configured
pub fn available_workers() -> usize {
    num_cpus::get().max(1)
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker pool size (None = one per available CPU)
    pub max_workers: Option<usize>,
    /// Reconstruct every stream and compare it against the input
    pub verify_round_trip: bool,
    /// Cancel the request after this many milliseconds
    pub timeout_ms: Option<u64>,
    /// Seed for requests built through the orchestrator
    pub default_seed: u64,
    /// Strategy options for requests built through the orchestrator
    pub options: StrategyOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            verify_round_trip: defaults::VERIFY_ROUND_TRIP,
            timeout_ms: None,
            default_seed: defaults::SEED,
            options: StrategyOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.max_workers {
            if workers == 0 {
                return Err(EngineError::InvalidConfig(
                    "max_workers must be greater than 0".into(),
                ));
            }
            if workers > defaults::MAX_WORKERS_LIMIT {
                return Err(EngineError::InvalidConfig(format!(
                    "max_workers must be at most {}",
                    defaults::MAX_WORKERS_LIMIT
                )));
            }
        }

        if self.timeout_ms == Some(0) {
            return Err(EngineError::InvalidConfig(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        self.options
            .validate()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }

    /// Pool size this configuration resolves to
    pub fn worker_count(&self) -> usize {
        self.max_workers.unwrap_or_else(available_workers)
    }

    /// Request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Fluent builder for [`EngineConfig`]
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    max_workers: Option<usize>,
    verify_round_trip: Option<bool>,
    timeout_ms: Option<u64>,
    default_seed: Option<u64>,
    options: Option<StrategyOptions>,
}

impl EngineConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool size
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    /// Enable or disable round-trip verification
    pub fn verify_round_trip(mut self, enabled: bool) -> Self {
        self.verify_round_trip = Some(enabled);
        self
    }

    /// Cancel requests that run longer than `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Set the default seed
    pub fn default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Set the default strategy options
    pub fn options(mut self, options: StrategyOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        let mut config = EngineConfig::default();

        if self.max_workers.is_some() {
            config.max_workers = self.max_workers;
        }
        if let Some(enabled) = self.verify_round_trip {
            config.verify_round_trip = enabled;
        }
        if self.timeout_ms.is_some() {
            config.timeout_ms = self.timeout_ms;
        }
        if let Some(seed) = self.default_seed {
            config.default_seed = seed;
        }
        if let Some(options) = self.options {
            config.options = options;
        }

        config.validate()?;
        Ok(config)
    }
}
