//! Server Configuration
//!
//! Layered as built-in defaults, then an optional `diagnosis.toml`, then
//! `DIAGNOSIS_*` environment variables (e.g. `DIAGNOSIS_PORT=9090`).

use crate::ApiError;
use serde::{Deserialize, Serialize};

/// Default configuration file name, without extension
pub const CONFIG_FILE: &str = "diagnosis";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DIAGNOSIS";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            json_logs: false,
            metrics: true,
        }
    }
}

impl ServerConfig {
    /// Load from `diagnosis.toml` (if present) and the environment
    pub fn load() -> Result<Self, ApiError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load with an explicit configuration file name
    pub fn load_from(file: &str) -> Result<Self, ApiError> {
        let defaults = Self::default();

        let settings = ::config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("json_logs", defaults.json_logs)?
            .set_default("metrics", defaults.metrics)?
            .add_source(::config::File::with_name(file).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Socket address to bind, `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
