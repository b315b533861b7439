//! Credo library crate: dual-engine credit risk evaluation core.
//!
//! Two independent engines evaluate every loan applicant:
//!
//! - the deterministic **scorecard** ([`ScorecardEngine`]) — a pure
//!   weighted-factor function of the profile and a validated
//!   [`ScoringConfig`];
//! - the **retrieval-augmented** path ([`RagEvaluator`]) — grounds a
//!   generative decision in the most similar historical cases served by the
//!   in-memory [`RetrievalIndex`].
//!
//! The [`Evaluator`] orchestrator runs both concurrently, quantifies their
//! disagreement ([`compare`](compare::compare)) and records everything in
//! the [`AuditLedger`], where the analyst's final call lands exactly once.
//!
//! The crate is a library: callers construct the service objects once and
//! pass them by handle. Transport, UI and profile parsing are external
//! collaborators. Mock providers and an in-memory store are available
//! behind the `mock` feature for integration testing.

pub mod audit;
pub mod compare;
pub mod config;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod rag;
pub mod retrieval;
pub mod scorecard;

#[cfg(any(test, feature = "mock"))]
pub use audit::MemoryStore;
pub use audit::{
    Adjustments, AnalystDecision, AuditFilter, AuditLedger, AuditLogEntry, AuditStore,
    DecisionMethod, EntryStatus, JsonFileStore, LedgerError, LedgerStats, StoreError,
};

pub use compare::{ComparisonResult, compare};
pub use config::{ConfigError, FactorWeights, RateBand, ScoreRange, ScoringConfig};
pub use model::{
    ClientProfile, CreditHistory, Decision, EvaluationResult, FactorBreakdown, FactorDetail,
    SimilarCase, ValidationError,
};
pub use orchestrator::{EvaluationError, EvaluationRecord, Evaluator};

#[cfg(any(test, feature = "mock"))]
pub use provider::MockAiProvider;
pub use provider::{
    CancelFlag, EmbeddingProvider, GeminiClient, GeminiConfig, GenerationProvider, ProviderError,
    RetryPolicy,
};

pub use rag::{ParseError, RagError, RagEvaluator};
pub use retrieval::{
    DEFAULT_BATCH_SIZE, DEFAULT_TOP_K, IndexProgress, KnowledgeRecord, RetrievalError,
    RetrievalIndex, SearchHit, cosine_similarity,
};
pub use scorecard::ScorecardEngine;
