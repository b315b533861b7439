//! Retrieval error types.

use thiserror::Error;

use crate::provider::ProviderError;

/// Failure while building or querying the knowledge base.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding provider error: {0}")]
    Provider(#[from] ProviderError),
}
