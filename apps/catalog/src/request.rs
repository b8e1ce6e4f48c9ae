//! Per-request scope threaded explicitly through every catalog call.
//!
//! Carries the request id used in log fields and the caller's cancellation
//! signal (a token plus an optional deadline). Store calls made on behalf of
//! a request go through [`RequestCtx::guard`] so they stop as soon as the
//! caller gives up.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::errors::domain::{CatalogError, InternalKind};

#[derive(Debug, Clone)]
pub struct RequestCtx {
    request_id: String,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestCtx {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Context with a fresh random request id (CLI, tests, startup work).
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Run one store call under this request's cancellation and deadline.
    ///
    /// The inner future is dropped (and with it any open transaction, which
    /// rolls back) as soon as the token fires or the deadline passes.
    pub async fn guard<F>(&self, op: &'static str, fut: F) -> Result<F::Output, CatalogError>
    where
        F: Future,
    {
        if self.cancel.is_cancelled() {
            return Err(self.cancelled(op));
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(self.cancelled(op)),
            _ = deadline => {
                debug!(request_id = %self.request_id, op, "deadline exceeded");
                Err(CatalogError::internal(
                    InternalKind::Timeout,
                    format!("{op} timed out"),
                ))
            }
            out = fut => Ok(out),
        }
    }

    fn cancelled(&self, op: &'static str) -> CatalogError {
        debug!(request_id = %self.request_id, op, "request cancelled");
        CatalogError::internal(InternalKind::Cancelled, format!("{op} cancelled"))
    }
}
