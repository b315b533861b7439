//! Test fixtures for integration tests.

use std::sync::Arc;

use credo::audit::MemoryStore;
use credo::{
    AuditLedger, ClientProfile, CreditHistory, Evaluator, MockAiProvider, RagEvaluator,
    RetrievalIndex, ScorecardEngine,
};

/// The reference applicant: scores 88.5 on the default scorecard.
pub fn reference_profile() -> ClientProfile {
    ClientProfile {
        age: 30,
        monthly_income: 3000.0,
        total_debt: 1000.0,
        credit_history: CreditHistory::Good,
        stable_employment: true,
        requested_amount: 5000.0,
        term_months: 12,
    }
}

/// A profile the default scorecard rejects.
pub fn weak_profile() -> ClientProfile {
    ClientProfile {
        age: 70,
        credit_history: CreditHistory::Poor,
        stable_employment: false,
        ..reference_profile()
    }
}

/// Historical rows for the knowledge base.
pub fn knowledge_rows() -> Vec<Vec<(String, String)>> {
    [
        [("age", "29"), ("income", "3200"), ("outcome", "paid")],
        [("age", "64"), ("income", "1100"), ("outcome", "defaulted")],
        [("age", "41"), ("income", "4800"), ("outcome", "paid")],
    ]
    .into_iter()
    .map(|row| {
        row.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    })
    .collect()
}

/// A well-formed generation response.
pub fn rag_response(decision: &str, score: f64) -> String {
    format!(
        r#"{{
            "decision": "{decision}",
            "score": {score},
            "annual_rate": 14.0,
            "explanation": "Decision grounded in the retrieved historical cases.",
            "monthly_payment": 450.00,
            "debt_ratio": 18.0,
            "key_factors": ["income", "credit history"]
        }}"#
    )
}

pub struct TestStack {
    pub provider: Arc<MockAiProvider>,
    pub index: Arc<RetrievalIndex>,
    pub store: Arc<MemoryStore>,
    pub evaluator: Evaluator,
}

/// Wires mock providers, an ingested index, an in-memory store and the
/// orchestrator together.
pub async fn build_stack() -> TestStack {
    let provider = Arc::new(MockAiProvider::new());

    let index = Arc::new(RetrievalIndex::new());
    index.ingest(knowledge_rows());

    let store = Arc::new(MemoryStore::new());
    let ledger = Arc::new(
        AuditLedger::open(store.clone())
            .await
            .expect("empty store loads"),
    );

    let scorecard = Arc::new(ScorecardEngine::with_defaults());
    let rag = Arc::new(RagEvaluator::new(
        index.clone(),
        provider.clone(),
        provider.clone(),
    ));

    let evaluator = Evaluator::new(scorecard, rag, ledger);

    TestStack {
        provider,
        index,
        store,
        evaluator,
    }
}
