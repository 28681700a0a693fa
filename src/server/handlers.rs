//! HTTP route handlers
//!
//! This module provides HTTP route handler functions.

use crate::build_info;
use actix_web::HttpResponse;
use serde_json::json;

/// Health check endpoint handler
pub async fn health_check() -> HttpResponse {
    let info = build_info();
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": info.version,
        "git_hash": info.git_hash,
    }))
}
