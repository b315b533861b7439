//! RAG evaluation error types.

use thiserror::Error;

use crate::model::ValidationError;
use crate::provider::ProviderError;
use crate::retrieval::RetrievalError;

use super::parser::ParseError;

/// Failure of a single retrieval-augmented evaluation.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("invalid profile: {0}")]
    Validation(#[from] ValidationError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("generation provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("malformed generation response: {0}")]
    Parse(#[from] ParseError),
}
