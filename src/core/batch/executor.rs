//! Batch executor
//!
//! Replays every operation of a [`BatchPayload`] against the backing service,
//! one at a time and in order, applying the payload's error tolerance.

use super::context::ExecutionContext;
use super::error::{BatchError, OperationError};
use super::logger::{BatchLogger, TraceHook, TracingLogger};
use super::types::{BatchPayload, Header, MAX_OPERATIONS, Operation, Status};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Result of processing a batch
///
/// `payload` always holds the operations processed so far; `error` is set when
/// the batch was rejected or aborted.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub payload: BatchPayload,
    pub error: Option<BatchError>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<BatchPayload, BatchError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.payload),
        }
    }
}

/// Outcome of a single dispatch; the operation keeps whatever was received
/// before a failure
struct Dispatched {
    operation: Operation,
    error: Option<OperationError>,
}

impl Dispatched {
    fn failed(operation: Operation, error: OperationError) -> Self {
        Self {
            operation,
            error: Some(error),
        }
    }

    fn is_failure(&self) -> bool {
        self.error.is_some() || self.operation.status.as_ref().is_some_and(Status::is_error)
    }
}

/// Sequential batch executor bound to one backing service
#[derive(Clone)]
pub struct BatchExecutor {
    base_path: String,
    logger: Arc<dyn BatchLogger>,
    trace: Option<TraceHook>,
    client: Client,
    max_operations: usize,
}

impl fmt::Debug for BatchExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchExecutor")
            .field("base_path", &self.base_path)
            .field("trace", &self.trace.is_some())
            .field("max_operations", &self.max_operations)
            .finish()
    }
}

impl BatchExecutor {
    /// Create an executor resolving every operation path against `base_path`
    pub fn new(base_path: impl Into<String>, logger: Arc<dyn BatchLogger>) -> Self {
        Self {
            base_path: base_path.into(),
            logger,
            trace: None,
            client: default_client(),
            max_operations: MAX_OPERATIONS,
        }
    }

    /// Attach a trace hook invoked before each sub-call
    pub fn with_trace(mut self, trace: TraceHook) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Override the operation cap
    pub fn with_max_operations(mut self, max_operations: usize) -> Self {
        self.max_operations = max_operations;
        self
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn max_operations(&self) -> usize {
        self.max_operations
    }

    /// Process a batch payload
    pub async fn process(&self, ctx: &ExecutionContext, payload: BatchPayload) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        let count = payload.operations.len();
        if count > self.max_operations {
            outcome.error = Some(BatchError::TooManyOperations {
                count,
                limit: self.max_operations,
            });
            return outcome;
        }

        let tolerance = payload.fail_on_errors.unwrap_or(u32::MAX);
        let mut failures: u32 = 0;
        outcome.payload.operations.reserve(count);

        for (index, operation) in payload.operations.into_iter().enumerate() {
            let dispatched = self.dispatch(ctx, operation).await;

            if dispatched.is_failure() {
                failures = failures.saturating_add(1);
                let Dispatched { operation, error } = dispatched;
                let error = error.unwrap_or_else(|| {
                    OperationError::UnsuccessfulStatus(operation.status_code().unwrap_or_default())
                });

                if failures >= tolerance {
                    self.logger.error(
                        "Batch aborted",
                        &[
                            ("index", &index),
                            ("failures", &failures),
                            ("error", &error),
                        ],
                    );
                    outcome.payload.operations.push(operation);
                    outcome.error = Some(BatchError::Aborted {
                        index,
                        failures,
                        source: error,
                    });
                    return outcome;
                }

                self.logger.warn(
                    "Operation failed",
                    &[("index", &index), ("failures", &failures), ("error", &error)],
                );
                outcome.payload.operations.push(operation);
                continue;
            }

            outcome.payload.operations.push(dispatched.operation);
        }

        outcome
    }

    async fn dispatch(&self, ctx: &ExecutionContext, operation: Operation) -> Dispatched {
        let mut result = Operation {
            bulk_id: operation.bulk_id.clone(),
            ..Default::default()
        };

        let target = format!("{}{}", self.base_path, operation.path);
        let request = match self.build_request(ctx, &operation, &target) {
            Ok(request) => request,
            Err(e) => return Dispatched::failed(result, e),
        };

        self.logger.info(
            "Sending request",
            &[("path", &target), ("method", &operation.method)],
        );

        let response = tokio::select! {
            response = self.client.execute(request) => response.map_err(OperationError::Transport),
            reason = ctx.done() => Err(reason),
        };
        let response = match response {
            Ok(response) => response,
            Err(e) => return Dispatched::failed(result, e),
        };

        let status = response.status().as_u16();
        result.status = Some(Status::from_code(status));
        result.headers = collect_headers(response.headers());

        let bytes = tokio::select! {
            bytes = response.bytes() => bytes.map_err(|source| OperationError::PartialResponse { status, source }),
            reason = ctx.done() => Err(reason),
        };
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => return Dispatched::failed(result, e),
        };

        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(body) => {
                result.body = Some(body);
                Dispatched {
                    operation: result,
                    error: None,
                }
            }
            Err(source) => Dispatched::failed(result, OperationError::BodyParse { status, source }),
        }
    }

    fn build_request(
        &self,
        ctx: &ExecutionContext,
        operation: &Operation,
        target: &str,
    ) -> Result<reqwest::Request, OperationError> {
        if let Some(reason) = ctx.err() {
            return Err(reason);
        }

        let method = Method::from_bytes(operation.method.as_bytes()).map_err(|_| {
            OperationError::InvalidMethod {
                method: operation.method.clone(),
            }
        })?;
        let url = Url::parse(target).map_err(|source| OperationError::InvalidUrl {
            url: target.to_string(),
            source,
        })?;

        let mut request = reqwest::Request::new(method, url);

        let headers = request.headers_mut();
        for header in &operation.headers {
            let (name, value) = parse_header(header)?;
            headers.append(name, value);
        }

        if let Some(body) = &operation.body {
            let raw = serde_json::to_vec(body).map_err(OperationError::Serialization)?;
            *request.body_mut() = Some(raw.into());
        }

        if let Some(trace) = &self.trace {
            trace(ctx, request.headers_mut());
        }

        Ok(request)
    }
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new(String::new(), Arc::new(TracingLogger))
    }
}

/// Client that reports redirects instead of following them
fn default_client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build batch HTTP client, falling back to default: {}", e);
            Client::new()
        })
}

fn parse_header(header: &Header) -> Result<(HeaderName, HeaderValue), OperationError> {
    let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(|e| {
        OperationError::InvalidHeader {
            name: header.name.clone(),
            message: e.to_string(),
        }
    })?;
    let value = HeaderValue::from_str(&header.value).map_err(|e| OperationError::InvalidHeader {
        name: header.name.clone(),
        message: e.to_string(),
    })?;
    Ok((name, value))
}

/// Flatten a header map, joining repeated names with a comma
fn collect_headers(map: &HeaderMap) -> Vec<Header> {
    map.keys()
        .map(|name| {
            let value = map
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            Header::new(canonical_header_name(name.as_str()), value)
        })
        .collect()
}

/// `content-type` -> `Content-Type`
fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}
