//! HTTP response handling for errors

use super::types::GatewayError;
use crate::core::batch::BatchError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl GatewayError {
    /// Status code, machine readable code and client facing message
    pub fn response_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            GatewayError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                self.to_string(),
            ),
            GatewayError::MalformedRequest { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
                "MALFORMED_REQUEST",
                message.clone(),
            ),
            GatewayError::Batch(batch_error) => match batch_error {
                BatchError::TooManyOperations { .. } => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    batch_error.to_string(),
                ),
                BatchError::Aborted { .. } => (
                    StatusCode::BAD_GATEWAY,
                    "BATCH_ABORTED",
                    batch_error.to_string(),
                ),
            },
            GatewayError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        }
    }

    /// Build the JSON error response, tagging it with the request id
    pub fn to_response(&self, request_id: Option<String>) -> HttpResponse {
        let (status_code, error_code, message) = self.response_parts();
        HttpResponse::build(status_code).json(ErrorResponse::new(error_code, message, request_id))
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        self.response_parts().0
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response(None)
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(code: &str, message: String, request_id: Option<String>) -> Self {
        Self {
            error: ErrorDetail::new(code, message, request_id),
        }
    }
}

/// Error detail structure
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: String, request_id: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            message,
            timestamp: chrono::Utc::now().timestamp(),
            request_id,
        }
    }
}
