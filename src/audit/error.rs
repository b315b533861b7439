//! Ledger error types.

use thiserror::Error;

/// Persistence failure in the store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("audit store I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit store contains malformed data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Ledger operation failure, reported as an explicit result so the caller
/// can retry or report instead of crashing.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("audit entry '{id}' not found")]
    NotFound { id: String },

    /// The analyst decision transitions exactly once; a second submission
    /// is rejected and leaves the entry unchanged.
    #[error("audit entry '{id}' already has an analyst decision")]
    AlreadyDecided { id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("statistics serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}
