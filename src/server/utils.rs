//! HTTP server utility methods

use crate::server::server::HttpServer;
use crate::utils::error::GatewayError;
use std::io::ErrorKind;

impl HttpServer {
    /// Turn a bind failure into an actionable error message
    pub(crate) fn format_bind_error(
        error: std::io::Error,
        bind_addr: &str,
        port: u16,
    ) -> GatewayError {
        let error_str = error.to_string();

        if error.kind() == ErrorKind::AddrInUse
            || error_str.contains("os error 48")
            || error_str.contains("os error 98")
        {
            GatewayError::server(format!(
                "Port {} is already in use. Stop the process holding it (lsof -i:{}) \
                 or start the gateway with --port {}",
                port,
                port,
                port.saturating_add(1)
            ))
        } else if error.kind() == ErrorKind::PermissionDenied || error_str.contains("os error 13") {
            GatewayError::server(format!(
                "Permission denied for port {}. Use a port >= 1024, e.g. --port 8000",
                port
            ))
        } else {
            GatewayError::server(format!("Failed to bind to {}: {}", bind_addr, error))
        }
    }
}
