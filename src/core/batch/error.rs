//! Batch execution errors

use thiserror::Error;

/// Failure of a single dispatched operation
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Invalid HTTP method '{method}'")]
    InvalidMethod { method: String },

    #[error("Invalid target URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Status and headers were received but the body could not be read
    #[error("Partial response (status {status}): {source}")]
    PartialResponse {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response body is not valid JSON (status {status}): {source}")]
    BodyParse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Backend responded with status {0}")]
    UnsuccessfulStatus(u16),
}

impl OperationError {
    /// Whether no response was obtained at all
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Cancelled | Self::DeadlineExceeded
        )
    }

    /// Status code observed before the failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::PartialResponse { status, .. } | Self::BodyParse { status, .. } => Some(*status),
            Self::UnsuccessfulStatus(status) => Some(*status),
            _ => None,
        }
    }
}

/// Batch level failure
#[derive(Error, Debug)]
pub enum BatchError {
    /// Rejected before any dispatch
    #[error("Maximum number of operations exceeded: {count} > {limit}")]
    TooManyOperations { count: usize, limit: usize },

    /// Error tolerance reached; remaining operations were not dispatched
    #[error("Batch aborted at operation {index} after {failures} failure(s): {source}")]
    Aborted {
        index: usize,
        failures: u32,
        #[source]
        source: OperationError,
    },
}

impl BatchError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::TooManyOperations { .. })
    }

    /// Operation error that tripped the tolerance
    pub fn operation_error(&self) -> Option<&OperationError> {
        match self {
            Self::Aborted { source, .. } => Some(source),
            Self::TooManyOperations { .. } => None,
        }
    }
}
