//! Error types for the gateway

use crate::core::batch::BatchError;
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Batch processing errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Request body could not be decoded into a batch payload
    #[error("Malformed request: {message}")]
    MalformedRequest { status: u16, message: String },

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}
