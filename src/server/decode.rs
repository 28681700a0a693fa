//! Batch request body decoding
//!
//! Turns an inbound request into a [`BatchPayload`]. Problems with the request
//! itself surface as [`GatewayError::MalformedRequest`] carrying the status
//! and message to send back; anything else is an internal error.

use crate::core::batch::BatchPayload;
use crate::utils::error::{GatewayError, Result};
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, web};
use bytes::BytesMut;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::error::Category;

/// Read and decode a batch payload, enforcing `max_body_size`
pub async fn decode_batch_request(
    req: &HttpRequest,
    mut body: web::Payload,
    max_body_size: usize,
) -> Result<BatchPayload> {
    check_content_type(req)?;

    let mut bytes = BytesMut::new();
    while let Some(chunk) = body.next().await {
        let chunk =
            chunk.map_err(|e| GatewayError::internal(format!("Failed to read request body: {}", e)))?;
        if bytes.len() + chunk.len() > max_body_size {
            return Err(GatewayError::malformed(
                StatusCode::PAYLOAD_TOO_LARGE.as_u16(),
                format!("Request body must not be larger than {} bytes", max_body_size),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }

    decode_payload(&bytes)
}

/// Decode a complete request body
pub fn decode_payload(bytes: &[u8]) -> Result<BatchPayload> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(bad_request("Request body must not be empty"));
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let payload = BatchPayload::deserialize(&mut deserializer).map_err(classify)?;

    deserializer
        .end()
        .map_err(|_| bad_request("Request body must only contain a single JSON object"))?;

    Ok(payload)
}

fn check_content_type(req: &HttpRequest) -> Result<()> {
    let Some(value) = req.headers().get(header::CONTENT_TYPE) else {
        return Ok(());
    };

    let media_type = value
        .to_str()
        .ok()
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase());

    if media_type.as_deref() != Some("application/json") {
        return Err(GatewayError::malformed(
            StatusCode::UNSUPPORTED_MEDIA_TYPE.as_u16(),
            "Content-Type header is not application/json",
        ));
    }
    Ok(())
}

fn classify(err: serde_json::Error) -> GatewayError {
    match err.classify() {
        Category::Syntax => bad_request(format!(
            "Request body contains badly-formed JSON (at line {} column {})",
            err.line(),
            err.column()
        )),
        Category::Eof => bad_request("Request body contains badly-formed JSON"),
        Category::Data => bad_request(format!("Request body contains an invalid value: {}", err)),
        Category::Io => GatewayError::internal(format!("Failed to decode request body: {}", err)),
    }
}

fn bad_request(message: impl Into<String>) -> GatewayError {
    GatewayError::malformed(StatusCode::BAD_REQUEST.as_u16(), message)
}
