//! Application state shared across HTTP handlers
//!
//! This module provides the AppState struct and its implementations.

use crate::config::Config;
use crate::core::batch::{BatchExecutor, TracingLogger, request_id_propagation};
use crate::utils::error::{GatewayError, Result};
use crate::utils::net::create_client;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// All fields are wrapped in Arc for cheap sharing across worker threads.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Batch executor bound to the configured backend
    pub executor: Arc<BatchExecutor>,
}

impl AppState {
    /// Build the state from configuration
    pub fn new(config: Config) -> Result<Self> {
        let batch = config.batch();
        let client = create_client(&batch.client)
            .map_err(|e| GatewayError::config(format!("Failed to build HTTP client: {}", e)))?;

        let mut executor = BatchExecutor::new(batch.base_path.clone(), Arc::new(TracingLogger))
            .with_client(client)
            .with_max_operations(batch.max_operations);
        if batch.propagate_request_id {
            executor = executor.with_trace(request_id_propagation());
        }

        Ok(Self::with_executor(config, executor))
    }

    /// Build the state around an existing executor
    pub fn with_executor(config: Config, executor: BatchExecutor) -> Self {
        Self {
            config: Arc::new(config),
            executor: Arc::new(executor),
        }
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
