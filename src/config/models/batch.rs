//! Batch execution configuration

use serde::{Deserialize, Serialize};

/// Batch execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Base address every operation path is appended to
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Route the batch endpoint is mounted on
    #[serde(default = "default_route")]
    pub route: String,
    /// Maximum number of operations per batch
    #[serde(default = "default_max_operations")]
    pub max_operations: usize,
    /// Forward the inbound request id to every sub-call as `x-request-id`
    #[serde(default = "super::default_true")]
    pub propagate_request_id: bool,
    /// Outbound HTTP client settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            route: default_route(),
            max_operations: default_max_operations(),
            propagate_request_id: true,
            client: ClientConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Merge batch configurations, other takes precedence
    pub fn merge(mut self, other: Self) -> Self {
        if other.base_path != default_base_path() {
            self.base_path = other.base_path;
        }
        if other.route != default_route() {
            self.route = other.route;
        }
        if other.max_operations != default_max_operations() {
            self.max_operations = other.max_operations;
        }
        if !other.propagate_request_id {
            self.propagate_request_id = false;
        }
        self.client = other.client;
        self
    }
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Idle pooled connection timeout in seconds
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout: u64,
    /// Maximum idle connections per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
    /// User agent sent on sub-calls without one
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            pool_idle_timeout: default_pool_idle_timeout(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_path() -> String {
    "http://localhost:8080".to_string()
}

fn default_route() -> String {
    "/batch".to_string()
}

fn default_max_operations() -> usize {
    crate::core::batch::MAX_OPERATIONS
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_pool_idle_timeout() -> u64 {
    90
}

fn default_pool_max_idle_per_host() -> usize {
    32
}

fn default_user_agent() -> String {
    format!("batch-gateway/{}", env!("CARGO_PKG_VERSION"))
}
