//! Batch payload types
//!
//! Wire schema shared by inbound batch requests and their aggregated results.

use serde::{Deserialize, Serialize};

/// Default maximum number of operations accepted in a single batch
pub const MAX_OPERATIONS: usize = 1024;

/// Batch request/response envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload {
    /// Number of failed operations tolerated before the batch aborts.
    /// `None` means the batch never aborts.
    #[serde(rename = "failOnErrors", default, skip_serializing)]
    pub fail_on_errors: Option<u32>,
    /// Ordered operations
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl BatchPayload {
    /// Create a payload with unbounded error tolerance
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            fail_on_errors: None,
            operations,
        }
    }

    /// Set the error tolerance
    pub fn fail_on_errors(mut self, tolerance: u32) -> Self {
        self.fail_on_errors = Some(tolerance);
        self
    }

    /// Number of operations in the payload
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the payload carries no operations
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// One logical sub-call within a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// HTTP method
    pub method: String,
    /// Path appended verbatim to the executor base path
    #[serde(default)]
    pub path: String,
    /// Request headers on input, response headers on output
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Caller supplied correlation token
    #[serde(rename = "bulk_id", default)]
    pub bulk_id: String,
    /// JSON body; `None` (or JSON null) sends no body
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    /// Response status, only set on result operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Operation {
    /// Create an operation for the given method and path
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Append a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Set the correlation token
    pub fn with_bulk_id(mut self, bulk_id: impl Into<String>) -> Self {
        self.bulk_id = bulk_id.into();
        self
    }

    /// Set the JSON body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Numeric status of a result operation
    pub fn status_code(&self) -> Option<u16> {
        self.status.as_ref().map(|s| s.code_int)
    }

    /// All values recorded for a header name, compared case-insensitively
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Header name/value pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// HTTP status of a dispatched operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Status code in string form
    #[serde(default)]
    pub code: String,
    /// Numeric status code, used for failure classification only
    #[serde(skip)]
    pub code_int: u16,
}

impl Status {
    pub fn from_code(code: u16) -> Self {
        Self {
            code: code.to_string(),
            code_int: code,
        }
    }

    /// Anything outside the 2xx class counts as a failed operation, redirects included
    pub fn is_error(&self) -> bool {
        self.code_int > 299
    }
}
