//! Profile validation errors.

use thiserror::Error;

/// Malformed or out-of-range profile input.
///
/// Surfaced before any scoring occurs; never downgraded to a default value.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Income of zero would make the debt ratio undefined.
    #[error("monthly income must be greater than 0, got {value}")]
    NonPositiveIncome { value: f64 },

    #[error("total debt cannot be negative, got {value}")]
    NegativeDebt { value: f64 },

    #[error("requested amount must be greater than 0, got {value}")]
    NonPositiveAmount { value: f64 },

    #[error("term must be at least 1 month")]
    ZeroTerm,
}
