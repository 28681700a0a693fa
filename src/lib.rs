//! # Batch Gateway
//!
//! An HTTP facade that accepts a list of REST operations in a single request,
//! replays them one by one against a backing service and returns every
//! response in order.
//!
//! ## Features
//!
//! - **Ordered execution**: operations run sequentially, results keep request order
//! - **Error tolerance**: `failOnErrors` aborts the batch after N failed operations
//! - **Partial results**: an aborted batch still reports what was processed
//! - **Cancellation**: request deadlines and cancellation stop in-flight calls
//!
//! ## Library Mode
//!
//! ```rust,no_run
//! use batch_gateway::{BatchExecutor, BatchPayload, ExecutionContext, Operation, TracingLogger};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = BatchExecutor::new("http://localhost:8080", Arc::new(TracingLogger));
//!     let payload = BatchPayload::new(vec![
//!         Operation::new("GET", "/v1/users/1").with_bulk_id("first"),
//!         Operation::new("DELETE", "/v1/users/2").with_bulk_id("second"),
//!     ])
//!     .fail_on_errors(1);
//!
//!     let results = executor
//!         .process(&ExecutionContext::background(), payload)
//!         .await
//!         .into_result()?;
//!     println!("{}", serde_json::to_string_pretty(&results)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use batch_gateway::{Gateway, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config)?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

// Export batch execution
pub use core::batch::{
    BatchError, BatchExecutor, BatchLogger, BatchOutcome, BatchPayload, CancelHandle,
    ExecutionContext, Header, LogFields, MAX_OPERATIONS, NoopLogger, Operation, OperationError,
    Status, TraceHook, TracingLogger, request_id_propagation,
};

use tracing::{debug, info};

/// Batch gateway: configuration plus the HTTP server serving it
pub struct Gateway {
    config: Config,
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");

        config.validate()?;
        let server = server::HttpServer::new(&config)?;

        Ok(Self { config, server })
    }

    /// Run the gateway server
    pub async fn run(self) -> Result<()> {
        info!("Starting batch gateway {} ({})", VERSION, build_info().git_hash);
        debug!("Configuration: {:#?}", self.config);

        self.server.start().await
    }
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        }
    }
}

/// Build information baked in at compile time
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
