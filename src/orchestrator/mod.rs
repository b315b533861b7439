//! Evaluation orchestrator.
//!
//! Coordinates one evaluation request: both engines run concurrently over
//! the same immutable profile (they share no mutable state, so no locking
//! sits between them), their results feed the comparator, and the bundle is
//! written to the audit ledger. A failed evaluation logs nothing.

pub mod error;


pub use error::EvaluationError;

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::audit::AuditLedger;
use crate::compare::{ComparisonResult, compare};
use crate::model::{ClientProfile, EvaluationResult};
use crate::provider::CancelFlag;
use crate::rag::RagEvaluator;
use crate::scorecard::ScorecardEngine;

/// Outcome of one orchestrated evaluation, as logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    /// Ledger id of the logged entry.
    pub id: String,
    pub rag: EvaluationResult,
    pub scorecard: EvaluationResult,
    pub comparison: ComparisonResult,
}

/// Service object wiring the engines and the ledger together.
///
/// Constructed once and passed by handle; there is no process-global
/// engine state.
pub struct Evaluator {
    scorecard: Arc<ScorecardEngine>,
    rag: Arc<RagEvaluator>,
    ledger: Arc<AuditLedger>,
}

impl Evaluator {
    pub fn new(
        scorecard: Arc<ScorecardEngine>,
        rag: Arc<RagEvaluator>,
        ledger: Arc<AuditLedger>,
    ) -> Self {
        Self {
            scorecard,
            rag,
            ledger,
        }
    }

    pub fn scorecard(&self) -> &ScorecardEngine {
        &self.scorecard
    }

    pub fn rag(&self) -> &RagEvaluator {
        &self.rag
    }

    pub fn ledger(&self) -> &AuditLedger {
        &self.ledger
    }

    /// Evaluates a profile through both engines and logs the outcome.
    pub async fn evaluate(
        &self,
        user: Option<&str>,
        profile: &ClientProfile,
    ) -> Result<EvaluationRecord, EvaluationError> {
        self.evaluate_with_cancel(user, profile, &CancelFlag::new())
            .await
    }

    /// Like [`evaluate`](Self::evaluate), with a caller-owned cancellation
    /// flag: cancelling stops the RAG path before its next provider retry.
    pub async fn evaluate_with_cancel(
        &self,
        user: Option<&str>,
        profile: &ClientProfile,
        cancel: &CancelFlag,
    ) -> Result<EvaluationRecord, EvaluationError> {
        profile.validate()?;

        let (scorecard_result, rag_result) = tokio::join!(
            async { self.scorecard.evaluate(profile) },
            self.rag.evaluate(profile, cancel),
        );

        let scorecard = scorecard_result?;
        let rag = rag_result?;
        let comparison = compare(&rag, &scorecard);

        let id = self
            .ledger
            .log_evaluation(user, profile, &rag, &scorecard, &comparison)
            .await?;

        info!(
            id = %id,
            rag_decision = %rag.decision,
            scorecard_decision = %scorecard.decision,
            score_delta = comparison.score_delta,
            "evaluation complete"
        );

        Ok(EvaluationRecord {
            id,
            rag,
            scorecard,
            comparison,
        })
    }
}
