//! Configuration for the block decision engine.
//!
//! Hosts embed the engine with an explicit [`Config`], loaded from YAML or
//! built in code. Everything has a sensible default: an empty config gives
//! an in-memory store and the default spam threshold.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::spam::DEFAULT_SPAM_THRESHOLD;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Block-list store backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Spam evaluation settings
    #[serde(default)]
    pub spam: SpamConfig,
}

/// Store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: StorageBackend,

    /// Fjall backend settings
    #[serde(default)]
    pub fjall: FjallConfig,
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory, volatile
    #[default]
    Memory,
    /// Fjall LSM-tree, durable
    Fjall,
}

/// Fjall backend settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FjallConfig {
    /// Data directory; resolved against the platform data dir when unset
    pub path: Option<PathBuf>,
}

/// Spam evaluation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SpamConfig {
    /// Minimum spam level treated as spam
    #[serde(default = "default_spam_threshold")]
    pub threshold: u32,
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            threshold: default_spam_threshold(),
        }
    }
}

fn default_spam_threshold() -> u32 {
    DEFAULT_SPAM_THRESHOLD
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        debug!(path = %path.display(), "loading configuration");

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        Self::from_yaml(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(yaml).context("failed to parse YAML configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == StorageBackend::Fjall {
            if let Some(path) = &self.store.fjall.path {
                if path.as_os_str().is_empty() {
                    anyhow::bail!("fjall store path must not be empty");
                }
            }
        }

        Ok(())
    }
}
