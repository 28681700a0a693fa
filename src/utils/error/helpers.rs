//! Helper functions for creating specific error types

use super::types::GatewayError;

/// Helper functions for creating specific errors
impl GatewayError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn malformed<S: Into<String>>(status: u16, message: S) -> Self {
        Self::MalformedRequest {
            status,
            message: message.into(),
        }
    }

    /// Whether this error came from decoding a malformed request body
    pub fn is_malformed_request(&self) -> bool {
        matches!(self, Self::MalformedRequest { .. })
    }
}
