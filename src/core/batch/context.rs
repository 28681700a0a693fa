//! Execution context for batch processing
//!
//! Carries the cancellation signal, deadline and request id shared by every
//! sub-call of a single `process` invocation.

use super::error::OperationError;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation and deadline scope for one batch
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
    request_id: Option<String>,
}

/// Handle that cancels every context derived from it
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // send_replace never fails, even once all receivers are gone
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl ExecutionContext {
    /// Context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Attach a cancellation signal
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        self.cancel = Some(receiver);
        (self, CancelHandle { sender })
    }

    /// Set an absolute deadline, keeping an earlier one if present
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Set a deadline relative to now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Error describing why the context is done, or `None` while it is live
    pub fn err(&self) -> Option<OperationError> {
        if self.is_cancelled() {
            return Some(OperationError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(OperationError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) -> OperationError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.cancelled() => OperationError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => OperationError::DeadlineExceeded,
            },
            None => {
                self.cancelled().await;
                OperationError::Cancelled
            }
        }
    }

    async fn cancelled(&self) {
        let Some(mut receiver) = self.cancel.clone() else {
            return std::future::pending().await;
        };
        // A dropped handle can no longer cancel
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
