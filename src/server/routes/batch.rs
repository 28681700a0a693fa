//! Batch endpoint
//!
//! Accepts a batch envelope, replays its operations against the configured
//! backend and answers with the collected results.

use crate::core::batch::{BatchError, BatchPayload, ExecutionContext};
use crate::server::decode::decode_batch_request;
use crate::server::state::AppState;
use crate::utils::error::{ErrorDetail, GatewayError};
use crate::utils::generate_request_id;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

/// Header carrying the request id in and out of the gateway
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Configure the batch route at `path`
pub fn configure_routes(cfg: &mut web::ServiceConfig, path: &str) {
    cfg.route(path, web::post().to(process_batch));
}

/// Reply envelope: the result payload plus the abort reason, if any
#[derive(Debug, Serialize)]
pub struct BatchReply {
    #[serde(flatten)]
    pub payload: BatchPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// Batch endpoint handler
pub async fn process_batch(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Payload,
) -> HttpResponse {
    let request_id = request_id(&req);
    let server = state.config.server();

    let payload = match decode_batch_request(&req, body, server.max_body_size).await {
        Ok(payload) => payload,
        Err(e) if e.is_malformed_request() => {
            debug!(request_id = %request_id, "Rejected batch request: {}", e);
            return e.to_response(Some(request_id));
        }
        Err(e) => {
            error!(request_id = %request_id, "Failed to decode batch request: {}", e);
            return GatewayError::internal("Failed to decode batch request")
                .to_response(Some(request_id));
        }
    };

    let ctx = ExecutionContext::background()
        .with_timeout(Duration::from_secs(server.timeout))
        .with_request_id(request_id.clone());

    let outcome = state.executor.process(&ctx, payload).await;

    match outcome.error {
        None => HttpResponse::Ok()
            .insert_header((REQUEST_ID_HEADER, request_id))
            .json(BatchReply {
                payload: outcome.payload,
                error: None,
            }),
        Some(err @ BatchError::TooManyOperations { .. }) => {
            let mut response = GatewayError::Batch(err).to_response(Some(request_id.clone()));
            if let Ok(value) = request_id.parse() {
                response.headers_mut().insert(
                    actix_web::http::header::HeaderName::from_static(REQUEST_ID_HEADER),
                    value,
                );
            }
            response
        }
        Some(err @ BatchError::Aborted { .. }) => {
            let detail = ErrorDetail::new(
                "BATCH_ABORTED",
                err.to_string(),
                Some(request_id.clone()),
            );
            HttpResponse::Ok()
                .insert_header((REQUEST_ID_HEADER, request_id))
                .json(BatchReply {
                    payload: outcome.payload,
                    error: Some(detail),
                })
        }
    }
}

/// Request id supplied by the caller, or a fresh one
fn request_id(req: &HttpRequest) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_request_id)
}
