//! Retrieval-augmented evaluation.
//!
//! Grounds a generative decision in the most similar historical cases:
//! search the knowledge base, assemble a prompt with the applicant profile,
//! a financial pre-analysis and the retrieved context, call the generation
//! provider, and parse the response strictly — a malformed response fails
//! that evaluation only, it never degrades into a partially-populated
//! result.

pub mod error;
pub mod parser;

#[cfg(test)]
mod tests;

pub use error::RagError;
pub use parser::{ParseError, RagDecision};

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::model::finance::{amortized_monthly_payment, post_loan_debt_ratio_pct};
use crate::model::{ClientProfile, EvaluationResult, SimilarCase};
use crate::provider::{CancelFlag, EmbeddingProvider, GenerationProvider, RetryPolicy};
use crate::retrieval::{DEFAULT_TOP_K, RetrievalIndex, SearchHit};

/// Reference annual rate used for the payment estimate that feeds the
/// prompt; the generated response assigns the actual rate.
pub const REFERENCE_ANNUAL_RATE: f64 = 0.15;

/// Retrieval-augmented evaluator.
pub struct RagEvaluator {
    index: Arc<RetrievalIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    policy: RetryPolicy,
    top_k: usize,
}

impl RagEvaluator {
    pub fn new(
        index: Arc<RetrievalIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            index,
            embedder,
            generator,
            policy: RetryPolicy::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn index(&self) -> &RetrievalIndex {
        &self.index
    }

    /// Evaluates a profile through retrieval + generation.
    pub async fn evaluate(
        &self,
        profile: &ClientProfile,
        cancel: &CancelFlag,
    ) -> Result<EvaluationResult, RagError> {
        let started = Instant::now();
        profile.validate()?;

        let query = profile.description();
        let hits = self
            .index
            .search(self.embedder.as_ref(), &query, self.top_k, cancel)
            .await?;

        // the generated response assigns the rate; the payment estimate in
        // the prompt uses the reference rate
        let estimated_payment = amortized_monthly_payment(
            profile.requested_amount,
            REFERENCE_ANNUAL_RATE,
            profile.term_months,
        );
        let estimated_ratio_pct = post_loan_debt_ratio_pct(
            estimated_payment,
            profile.total_debt,
            profile.term_months,
            profile.monthly_income,
        );

        let prompt = build_prompt(&query, estimated_payment, estimated_ratio_pct, &hits);

        let raw = self
            .policy
            .run(cancel, "generate", || self.generator.generate(&prompt))
            .await?;

        let parsed = parser::parse_decision(&raw)?;

        // the locally computed figures are authoritative; the generated
        // ones were only validated for presence
        let monthly_payment = amortized_monthly_payment(
            profile.requested_amount,
            parsed.annual_rate,
            profile.term_months,
        );
        let debt_ratio_pct = post_loan_debt_ratio_pct(
            monthly_payment,
            profile.total_debt,
            profile.term_months,
            profile.monthly_income,
        );

        let similar_cases: Vec<SimilarCase> = hits
            .into_iter()
            .map(|hit| SimilarCase {
                text: hit.record.text,
                fields: hit.record.fields,
                similarity: hit.similarity,
            })
            .collect();

        let latency_ms = started.elapsed().as_millis() as u64;

        debug!(
            score = parsed.score,
            decision = %parsed.decision,
            cases = similar_cases.len(),
            latency_ms,
            "rag evaluation complete"
        );

        Ok(EvaluationResult {
            decision: parsed.decision,
            total_score: parsed.score,
            annual_rate: parsed.annual_rate,
            band: None,
            monthly_payment,
            debt_ratio_pct,
            explanation: parsed.explanation,
            factors: None,
            key_factors: parsed.key_factors,
            latency_ms,
            similar_cases: Some(similar_cases),
        })
    }
}

fn build_prompt(
    client_desc: &str,
    estimated_payment: f64,
    estimated_ratio_pct: f64,
    hits: &[SearchHit],
) -> String {
    let context = if hits.is_empty() {
        "- (no similar historical cases indexed)".to_string()
    } else {
        hits.iter()
            .map(|hit| format!("- Similar case: {}", hit.record.text))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are an expert credit risk analyst. Evaluate the following loan \
         applicant based on their profile and the similar historical cases \
         below.\n\n\
         APPLICANT:\n{client_desc}\n\n\
         FINANCIAL ANALYSIS:\n\
         - Estimated monthly payment: {estimated_payment:.2} (at the {ref_rate:.1}% annual reference rate)\n\
         - Projected debt ratio: {estimated_ratio_pct:.1}% of monthly income\n\n\
         HISTORICAL CONTEXT:\n{context}\n\n\
         IMPORTANT: respond ONLY with a valid JSON object. Do not use \
         markdown code fences. Consider the requested term and the monthly \
         payment in your analysis. Include an estimated overall risk score \
         from 0 to 100.\n\
         Format:\n\
         {{\n\
             \"decision\": \"Approved\" or \"Rejected\",\n\
             \"score\": 75.0,\n\
             \"annual_rate\": 15.0,\n\
             \"explanation\": \"Detailed justification citing key factors such as age, income, debt, history and employment.\",\n\
             \"monthly_payment\": {estimated_payment:.2},\n\
             \"debt_ratio\": {estimated_ratio_pct:.1},\n\
             \"key_factors\": [\"factor 1\", \"factor 2\", \"factor 3\"]\n\
         }}\n",
        ref_rate = REFERENCE_ANNUAL_RATE * 100.0,
    )
}
