//! Configuration management for nfenrich
//!
//! The externally tunable surface is deliberately small: the registry
//! capacity bound and the detection strategy. Record field names are fixed
//! by convention with the upstream log shipper and are not configurable.

use crate::enrich::{DetectorStrategy, DEFAULT_CAPACITY};
use crate::error::{EnrichError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Enrichment stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Maximum number of distinct log sources tracked before FIFO eviction
    pub capacity: usize,
    /// Metadata detection strategy ("flag" or "inline-json")
    pub strategy: DetectorStrategy,
}

/// Pipeline driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Log a stats summary every N processed records
    pub report_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            enrichment: EnrichmentConfig {
                capacity: DEFAULT_CAPACITY,
                strategy: DetectorStrategy::Flag,
            },
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            report_interval: 10_000,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EnrichError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| EnrichError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| EnrichError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Default configuration file path (~/.config/nfenrich/config.toml)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EnrichError::Config("Cannot determine config directory".to_string()))?;
        Ok(config_dir.join("nfenrich").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// `NFENRICH_CAPACITY` and `NFENRICH_STRATEGY` override their config
    /// file counterparts; unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("NFENRICH_CAPACITY") {
            match value.parse::<usize>() {
                Ok(capacity) => self.enrichment.capacity = capacity,
                Err(_) => {
                    tracing::warn!("Ignoring invalid NFENRICH_CAPACITY: {}", value);
                }
            }
        }

        if let Ok(value) = std::env::var("NFENRICH_STRATEGY") {
            match value.parse::<DetectorStrategy>() {
                Ok(strategy) => self.enrichment.strategy = strategy,
                Err(e) => {
                    tracing::warn!("Ignoring invalid NFENRICH_STRATEGY: {}", e);
                }
            }
        }
    }
}
