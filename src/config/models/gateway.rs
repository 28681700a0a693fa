//! Main gateway configuration

use super::*;
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::debug;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Batch execution configuration
    #[serde(default)]
    pub batch: BatchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment variables");

        let mut config = Self::default();

        if let Ok(host) = env::var("GATEWAY_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("GATEWAY_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid port: {}", e)))?;
        }
        if let Ok(timeout) = env::var("GATEWAY_TIMEOUT") {
            config.server.timeout = timeout
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid timeout: {}", e)))?;
        }
        if let Ok(base_path) = env::var("BATCH_BASE_PATH") {
            config.batch.base_path = base_path;
        }
        if let Ok(route) = env::var("BATCH_ROUTE") {
            config.batch.route = route;
        }
        if let Ok(max) = env::var("BATCH_MAX_OPERATIONS") {
            config.batch.max_operations = max
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid max operations: {}", e)))?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = env::var("LOG_JSON") {
            config.logging.json = json
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid LOG_JSON flag: {}", e)))?;
        }

        Ok(config)
    }

    /// Merge two configurations, with other taking precedence
    pub fn merge(mut self, other: Self) -> Self {
        self.server = self.server.merge(other.server);
        self.batch = self.batch.merge(other.batch);
        self.logging = other.logging;
        self
    }
}
