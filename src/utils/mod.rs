//! Utility modules for the batch gateway
//!
//! - **error**: Error types and their HTTP representation
//! - **logging**: Tracing subscriber setup
//! - **net**: Outbound HTTP client construction

pub mod error;
pub mod logging;
pub mod net;

use uuid::Uuid;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
