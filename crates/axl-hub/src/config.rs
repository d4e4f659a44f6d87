//! Hub client configuration.

use serde::{Deserialize, Serialize};

use axl_core::{Error, Result};

/// Connection settings for the telemetry hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Base URL of the hub API.
    pub server: String,

    /// Read token passed with every request.
    pub token: String,

    /// Request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:3000".to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

impl HubConfig {
    /// Load from environment variables: `AXL_SERVER`, `AXL_TOKEN`,
    /// `AXL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&HubConfig::default()).map_err(config_err)?)
            .add_source(config::Environment::with_prefix("AXL"))
            .build()
            .map_err(config_err)?;

        settings.try_deserialize().map_err(config_err)
    }

    /// Load from a config file, with environment overrides on top.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&HubConfig::default()).map_err(config_err)?)
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("AXL"))
            .build()
            .map_err(config_err)?;

        settings.try_deserialize().map_err(config_err)
    }
}

fn config_err(e: config::ConfigError) -> Error {
    Error::Config(e.to_string())
}
