//! Batch execution
//!
//! Collapses many HTTP calls against one backing service into a single
//! request. Operations are dispatched sequentially and in order; the
//! payload's `failOnErrors` tolerance decides when the batch aborts.

mod context;
mod error;
mod executor;
mod logger;
mod types;


pub use context::{CancelHandle, ExecutionContext};
pub use error::{BatchError, OperationError};
pub use executor::{BatchExecutor, BatchOutcome};
pub use logger::{
    BatchLogger, LogFields, NoopLogger, TraceHook, TracingLogger, render_fields,
    request_id_propagation,
};
pub use types::{BatchPayload, Header, MAX_OPERATIONS, Operation, Status};
