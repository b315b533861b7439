//! Ledger entry types, filters and the statistics snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compare::ComparisonResult;
use crate::model::{ClientProfile, Decision, EvaluationResult};

/// Lifecycle state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Logged, awaiting the analyst's call.
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "Pending",
            EntryStatus::Approved => "Approved",
            EntryStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which engine's recommendation the analyst followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionMethod {
    /// Followed the retrieval-augmented engine.
    Rag,
    /// Followed the deterministic scorecard.
    Scorecard,
    /// Overrode both with adjusted terms.
    Adjusted,
}

impl DecisionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionMethod::Rag => "RAG",
            DecisionMethod::Scorecard => "Scorecard",
            DecisionMethod::Adjusted => "Adjusted",
        }
    }
}

impl std::fmt::Display for DecisionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Loan terms the analyst changed when overriding the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustments {
    pub amount: Option<f64>,
    pub term_months: Option<u32>,
    pub annual_rate: Option<f64>,
}

/// The analyst's final call on an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystDecision {
    pub method: DecisionMethod,
    pub decision: Decision,
    pub justification: String,
    pub adjustments: Option<Adjustments>,
    pub timestamp: DateTime<Utc>,
}

impl AnalystDecision {
    /// Stamps the decision with the current time.
    pub fn new(
        method: DecisionMethod,
        decision: Decision,
        justification: impl Into<String>,
        adjustments: Option<Adjustments>,
    ) -> Self {
        Self {
            method,
            decision,
            justification: justification.into(),
            adjustments,
            timestamp: Utc::now(),
        }
    }
}

/// One evaluation and its eventual human decision.
///
/// Created once per evaluation. The `analyst` field transitions exactly once
/// from `None` to `Some`; every other field is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub profile: ClientProfile,
    pub rag: EvaluationResult,
    pub scorecard: EvaluationResult,
    pub comparison: ComparisonResult,
    pub analyst: Option<AnalystDecision>,
    pub status: EntryStatus,
}

/// AND-combination of optional predicates; an absent criterion is always
/// true.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub status: Option<EntryStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub method: Option<DecisionMethod>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if let Some(status) = self.status
            && entry.status != status
        {
            return false;
        }
        if let Some(from) = self.from
            && entry.timestamp < from
        {
            return false;
        }
        if let Some(to) = self.to
            && entry.timestamp > to
        {
            return false;
        }
        if let Some(method) = self.method {
            match &entry.analyst {
                Some(analyst) if analyst.method == method => {}
                _ => return false,
            }
        }

        true
    }
}

/// Aggregated view over the full log. Percentages carry 1 decimal,
/// latencies are rounded to whole milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStats {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    pub approval_rate_pct: f64,
    /// How often the two engines' raw decisions agree.
    pub agreement_rate_pct: f64,
    pub decisions_rag: usize,
    pub decisions_scorecard: usize,
    pub decisions_adjusted: usize,
    pub avg_latency_rag_ms: f64,
    pub avg_latency_scorecard_ms: f64,
}
