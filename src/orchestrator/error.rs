//! Orchestration error types.

use thiserror::Error;

use crate::audit::LedgerError;
use crate::model::ValidationError;
use crate::rag::RagError;

/// Failure of one orchestrated evaluation.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("invalid profile: {0}")]
    Validation(#[from] ValidationError),

    #[error("rag evaluation failed: {0}")]
    Rag(#[from] RagError),

    #[error("audit logging failed: {0}")]
    Ledger(#[from] LedgerError),
}
