//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section carries defaults so the server boots without a config
//! file at all; the file only overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::estimator::EstimatorConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub estimator: EstimatorConfig,
    pub models: ModelsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// On-disk model/scaler artifact locations, one entry per ticker family.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelsConfig {
    pub bundles: Vec<BundleConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BundleConfig {
    /// Canonical ticker for this bundle ("ETH", "AMZN", ...).
    pub name: String,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    /// Alternate spellings that resolve to the same bundle.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let bundle = |name: &str, stem: &str, aliases: &[&str]| BundleConfig {
            name: name.to_string(),
            model_path: PathBuf::from(format!("assets/models/model_{stem}.pt")),
            scaler_path: PathBuf::from(format!("assets/scalers/minmax_scaler_{stem}.pkl")),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };
        Self {
            bundles: vec![
                bundle("ETH", "eth", &[]),
                bundle("AMZN", "amazon", &["AMAZON"]),
                bundle("GOOG", "google", &["GOOGL"]),
                bundle("TSLA", "tsla", &[]),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load configuration, falling back to built-in defaults when the
    /// file does not exist. A present-but-broken file is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }
}
