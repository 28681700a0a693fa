//! Network utilities
//!
//! This module provides outbound HTTP client construction.

pub mod http;

pub use http::create_client;
