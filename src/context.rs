//! Cancellation and timeout for blocking database round trips

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a guarded round trip did not complete
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),
}

/// Caller-supplied cancellation signal and per-round-trip timeout
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl ExecContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every round trip by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abort round trips when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run one round trip, giving up on cancellation or timeout.
    ///
    /// The future is dropped when interrupted, which releases whatever it
    /// held (pooled connections go back, open transactions roll back).
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T>,
    {
        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }

        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, fut)
                    .await
                    .map_err(|_| Interrupted::TimedOut(limit)),
                None => Ok(fut.await),
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            result = bounded => result,
        }
    }
}
