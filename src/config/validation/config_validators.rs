//! Configuration validators
//!
//! Validation implementations for every gateway configuration section.

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::{debug, warn};
use url::Url;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.server.validate()?;
        self.batch.validate()?;
        self.logging.validate()?;

        debug!("Gateway configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
            if workers > 1000 {
                return Err("Worker count seems too high (>1000)".to_string());
            }
        }

        if self.timeout == 0 {
            return Err("Server timeout must be greater than 0".to_string());
        }

        if self.timeout > 3600 {
            return Err("Server timeout should not exceed 1 hour".to_string());
        }

        if self.max_body_size == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }

        self.cors.validate()
    }
}

impl Validate for CorsConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.allows_all_origins() && self.allow_credentials {
            return Err(
                "CORS cannot allow all origins (*) when credentials are enabled".to_string(),
            );
        }

        if self.allows_all_origins() {
            warn!("CORS allows all origins. This may be insecure for production.");
        }

        Ok(())
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.base_path)
            .map_err(|e| format!("Batch base path '{}' is not a valid URL: {}", self.base_path, e))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(format!(
                    "Batch base path must use http:// or https://, got: {}",
                    scheme
                ));
            }
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err("Batch base path must not carry a query or fragment".to_string());
        }

        if !self.route.starts_with('/') {
            return Err(format!("Batch route must start with '/', got: {}", self.route));
        }

        if self.max_operations == 0 {
            return Err("Batch max operations must be greater than 0".to_string());
        }

        self.client.validate()
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<(), String> {
        if self.connect_timeout == 0 {
            return Err("Client connect timeout must be greater than 0".to_string());
        }

        if self.user_agent.is_empty() {
            return Err("Client user agent cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        Ok(())
    }
}
