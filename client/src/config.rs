//! Configuration management for the Busy Fool client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with BF_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::CostingSettings;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// REST API configuration
    pub api: ApiConfig,

    /// Margin thresholds, waste presets and supplier list
    #[serde(default)]
    pub costing: CostingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the Busy Fool API
    pub base_url: String,

    /// Bearer token from `busy-fool login`
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("BF_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        Self::builder(&environment)?.build()?.try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = ApiConfig::default();
        Ok(config::Config::builder()
            // Start with default values
            .set_default("environment", environment)?
            .set_default("api.base_url", defaults.base_url)?
            .set_default("api.timeout_secs", defaults.timeout_secs as i64)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (BF_ prefix)
            .add_source(
                Environment::with_prefix("BF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ))
    }
}
