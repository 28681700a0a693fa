//! Logging and tracing capabilities injected into the batch executor

use super::context::ExecutionContext;
use reqwest::header::HeaderMap;
use std::fmt::{Display, Write};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Structured key/value fields attached to a log call
pub type LogFields<'a> = &'a [(&'a str, &'a dyn Display)];

/// Leveled structured logger used by the executor
pub trait BatchLogger: Send + Sync {
    fn info(&self, message: &str, fields: LogFields<'_>);
    fn warn(&self, message: &str, fields: LogFields<'_>);
    fn error(&self, message: &str, fields: LogFields<'_>);
}

/// Hook invoked with the outgoing headers right before each sub-call is sent
pub type TraceHook = Arc<dyn Fn(&ExecutionContext, &mut HeaderMap) + Send + Sync>;

/// Logger forwarding to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl BatchLogger for TracingLogger {
    fn info(&self, message: &str, fields: LogFields<'_>) {
        info!(target: "batch", fields = %render_fields(fields), "{}", message);
    }

    fn warn(&self, message: &str, fields: LogFields<'_>) {
        warn!(target: "batch", fields = %render_fields(fields), "{}", message);
    }

    fn error(&self, message: &str, fields: LogFields<'_>) {
        error!(target: "batch", fields = %render_fields(fields), "{}", message);
    }
}

/// Logger that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl BatchLogger for NoopLogger {
    fn info(&self, _message: &str, _fields: LogFields<'_>) {}
    fn warn(&self, _message: &str, _fields: LogFields<'_>) {}
    fn error(&self, _message: &str, _fields: LogFields<'_>) {}
}

/// Render fields as `key=value` pairs separated by spaces
pub fn render_fields(fields: LogFields<'_>) -> String {
    let mut rendered = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            rendered.push(' ');
        }
        let _ = write!(rendered, "{}={}", key, value);
    }
    rendered
}

/// Trace hook copying the context request id into `x-request-id`
pub fn request_id_propagation() -> TraceHook {
    Arc::new(|ctx: &ExecutionContext, headers: &mut HeaderMap| {
        let Some(request_id) = ctx.request_id() else {
            return;
        };
        if headers.contains_key("x-request-id") {
            return;
        }
        if let Ok(value) = request_id.parse() {
            headers.insert("x-request-id", value);
        }
    })
}
