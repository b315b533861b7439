//! Quantifies disagreement between the two engines.


use serde::{Deserialize, Serialize};

use crate::model::EvaluationResult;

/// Deltas between the RAG and scorecard results, each as a signed number
/// plus a formatted signed string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// RAG score minus scorecard score, in points.
    pub score_delta: f64,
    pub score_delta_label: String,
    /// Rate difference in percentage points.
    pub rate_delta_pct: f64,
    pub rate_delta_label: String,
    /// Latency difference in milliseconds.
    pub latency_delta_ms: i64,
    pub latency_delta_label: String,
}

/// Pure arithmetic: `delta = rag.metric - scorecard.metric` for score, rate
/// and latency. No side effects, no failure modes.
pub fn compare(rag: &EvaluationResult, scorecard: &EvaluationResult) -> ComparisonResult {
    let score_delta = rag.total_score - scorecard.total_score;
    let rate_delta_pct = (rag.annual_rate - scorecard.annual_rate) * 100.0;
    let latency_delta_ms = rag.latency_ms as i64 - scorecard.latency_ms as i64;

    ComparisonResult {
        score_delta,
        score_delta_label: format!("{score_delta:+.1} points"),
        rate_delta_pct,
        rate_delta_label: format!("{rate_delta_pct:+.1}%"),
        latency_delta_ms,
        latency_delta_label: format!("{latency_delta_ms:+} ms"),
    }
}
