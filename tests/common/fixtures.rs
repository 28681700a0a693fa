//! Test fixtures and data factories

use batch_gateway::{BatchPayload, Operation};
use serde_json::{Value, json};

/// Factory for batch operations
pub struct OperationFactory;

impl OperationFactory {
    /// GET without body
    pub fn get(path: &str, bulk_id: &str) -> Operation {
        Operation::new("GET", path).with_bulk_id(bulk_id)
    }

    /// POST with a JSON body
    pub fn post(path: &str, bulk_id: &str, body: Value) -> Operation {
        Operation::new("POST", path)
            .with_header("Content-Type", "application/json")
            .with_bulk_id(bulk_id)
            .with_body(body)
    }

    /// `count` GETs against `/items/<n>`
    pub fn many(count: usize) -> Vec<Operation> {
        (0..count)
            .map(|i| Self::get(&format!("/items/{}", i), &i.to_string()))
            .collect()
    }
}

/// Payload with `count` operations and no tolerance
pub fn payload_of(count: usize) -> BatchPayload {
    BatchPayload::new(OperationFactory::many(count))
}

/// Nested JSON document used as a request/response body
pub fn sample_document() -> Value {
    json!({
        "abc": "value1",
        "def": {"a1": 1, "a2": "dfsfs", "list": [1, 2, {"deep": null}]},
        "flag": true
    })
}
