//! Bounded retry with fixed backoff, shared by embedding and generation
//! calls.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::warn;

use super::error::ProviderError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Cooperative cancellation signal, checked before every attempt so an
/// abandoned evaluation stops waiting instead of leaking a pending call.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Bounded-retry policy: `max_attempts` tries, a fixed `backoff` between
/// retryable failures, and a per-call `call_timeout`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Runs `op` under the policy.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancelFlag,
        label: &str,
        op: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        self.run_with(cancel, label, op, |_, _| {}).await
    }

    /// Runs `op` under the policy, invoking `on_backoff(attempt, wait)`
    /// before each backoff sleep (used to surface "waiting" progress).
    pub async fn run_with<T, F, Fut, H>(
        &self,
        cancel: &CancelFlag,
        label: &str,
        mut op: F,
        mut on_backoff: H,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
        H: FnMut(u32, Duration),
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }

            let result = match tokio::time::timeout(self.call_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout {
                    timeout: self.call_timeout,
                }),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < attempts => {
                    warn!(
                        label,
                        attempt,
                        backoff = ?self.backoff,
                        error = %error,
                        "retryable provider failure, backing off"
                    );
                    on_backoff(attempt, self.backoff);
                    tokio::time::sleep(self.backoff).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
