//! Provider error taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Failure reported by an embedding or generation provider.
///
/// `RateLimited`, `Unavailable` and `Timeout` are retryable under a
/// [`RetryPolicy`](super::RetryPolicy); `Auth` is fatal and surfaced to the
/// caller immediately.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Invalid or rejected credentials.
    #[error("provider rejected the credentials: {message}")]
    Auth { message: String },

    #[error("provider rate limit reached: {message}")]
    RateLimited { message: String },

    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("provider call timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The evaluation owning this call was cancelled.
    #[error("provider call cancelled")]
    Cancelled,

    #[error("provider request failed: {message}")]
    Other { message: String },
}

impl ProviderError {
    /// Whether the bounded-retry policy should try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Unavailable { .. }
                | ProviderError::Timeout { .. }
        )
    }

    /// Maps an HTTP status from the provider API onto the taxonomy.
    ///
    /// 404 is retryable alongside 429: transient model-endpoint outages
    /// surface as not-found on this API.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        let message = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };

        match status {
            401 | 403 => ProviderError::Auth { message },
            429 => ProviderError::RateLimited { message },
            404 | 500..=599 => ProviderError::Unavailable { message },
            _ => ProviderError::Other { message },
        }
    }
}
