//! Outbound HTTP client for batch sub-calls
//!
//! The client is built once per executor and shared by every `process` call.
//! It holds only the connection pool; no batch state lives in it.
//!
//! No total request timeout is set here: sub-calls are bounded by the
//! execution context deadline of the batch they belong to.

use crate::config::ClientConfig;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// Build the outbound client from configuration
pub fn create_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    debug!(
        connect_timeout = config.connect_timeout,
        pool_max_idle_per_host = config.pool_max_idle_per_host,
        "Creating batch HTTP client"
    );

    ClientBuilder::new()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .user_agent(config.user_agent.as_str())
        // Redirects are reported back to the caller as-is
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
