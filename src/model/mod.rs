//! Shared domain types for both evaluation engines and the audit ledger.

pub mod error;
pub mod finance;


pub use error::ValidationError;

use serde::{Deserialize, Serialize};

/// Credit history category reported for an applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditHistory {
    Good,
    Fair,
    Poor,
}

impl CreditHistory {
    /// Human-readable label (used in explanations and exports).
    pub fn label(&self) -> &'static str {
        match self {
            CreditHistory::Good => "Good",
            CreditHistory::Fair => "Fair",
            CreditHistory::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for CreditHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a single evaluation (either engine) or of the analyst's call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Loan applicant profile. Immutable once an evaluation starts.
///
/// The core consumes already-structured profiles; parsing raw input is the
/// caller's concern. [`ClientProfile::validate`] is still the first thing
/// every engine runs, so malformed values fail fast instead of leaking into
/// scores as `0` or `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub age: u32,
    pub monthly_income: f64,
    pub total_debt: f64,
    pub credit_history: CreditHistory,
    pub stable_employment: bool,
    pub requested_amount: f64,
    pub term_months: u32,
}

impl ClientProfile {
    /// Checks numeric sanity. Values outside a scoring table are a scoring
    /// concern (explicit 0-point fallback), not a validation failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("monthly_income", self.monthly_income),
            ("total_debt", self.total_debt),
            ("requested_amount", self.requested_amount),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field, value });
            }
        }

        if self.monthly_income <= 0.0 {
            return Err(ValidationError::NonPositiveIncome {
                value: self.monthly_income,
            });
        }
        if self.total_debt < 0.0 {
            return Err(ValidationError::NegativeDebt {
                value: self.total_debt,
            });
        }
        if self.requested_amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount {
                value: self.requested_amount,
            });
        }
        if self.term_months == 0 {
            return Err(ValidationError::ZeroTerm);
        }

        Ok(())
    }

    /// Debt-to-income ratio. Guarded by [`validate`](Self::validate), which
    /// rejects a zero income before the division can become undefined.
    pub fn debt_ratio(&self) -> Result<f64, ValidationError> {
        self.validate()?;
        Ok(self.total_debt / self.monthly_income)
    }

    /// Deterministic one-line description, used as the retrieval query text.
    pub fn description(&self) -> String {
        format!(
            "Age: {}, Monthly income: {}, Total debt: {}, Credit history: {}, \
             Stable employment: {}, Requested amount: {}, Term: {} months",
            self.age,
            self.monthly_income,
            self.total_debt,
            self.credit_history,
            if self.stable_employment { "Yes" } else { "No" },
            self.requested_amount,
            self.term_months,
        )
    }
}

/// Score detail for one factor of the scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorDetail {
    /// The evaluated value, as displayed (e.g. `"30"`, `"0.33"`, `"Good"`).
    pub value: String,
    /// Sub-score in [0,100].
    pub points: f64,
    /// Weight in the total (percent).
    pub weight: f64,
    /// `points * weight / 100`.
    pub contribution: f64,
}

/// Per-factor breakdown attached to scorecard results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub age: FactorDetail,
    pub income: FactorDetail,
    pub debt_ratio: FactorDetail,
    pub history: FactorDetail,
    pub employment: FactorDetail,
}

/// Historical case retrieved for a RAG evaluation, with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCase {
    pub text: String,
    pub fields: Vec<(String, String)>,
    pub similarity: f32,
}

/// Result of one engine evaluating one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub decision: Decision,
    /// Total risk score in [0,100].
    pub total_score: f64,
    /// Assigned annual rate as a fraction (`0.12` = 12%).
    pub annual_rate: f64,
    /// Rate band label (scorecard results only).
    pub band: Option<String>,
    pub monthly_payment: f64,
    /// Projected post-loan debt ratio, percent, 1 decimal.
    pub debt_ratio_pct: f64,
    pub explanation: String,
    /// Per-factor breakdown (scorecard results only).
    pub factors: Option<FactorBreakdown>,
    /// Key factors cited by the generative engine (RAG results only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_factors: Vec<String>,
    pub latency_ms: u64,
    /// Retrieved historical cases (RAG results only).
    pub similar_cases: Option<Vec<SimilarCase>>,
}

impl EvaluationResult {
    /// Annual rate in percent.
    pub fn rate_pct(&self) -> f64 {
        self.annual_rate * 100.0
    }
}
