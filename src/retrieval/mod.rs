//! In-memory knowledge base with rate-limited batch embedding and cosine
//! nearest-neighbor search.
//!
//! The record set is replaced atomically on re-ingestion: readers clone an
//! `Arc` snapshot, writers swap it, so an in-flight search sees either the
//! old or the new base entirely, never a mix. The batch-embedding loop is
//! strictly sequential — that is the system's only backpressure mechanism
//! toward the embedding provider, not an incidental limitation.

pub mod error;


pub use error::RetrievalError;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::provider::{CancelFlag, EmbeddingProvider, ProviderError, RetryPolicy};

/// Default number of records embedded per provider call.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default number of similar cases returned by a search.
pub const DEFAULT_TOP_K: usize = 3;

/// Fixed pause between successful batches.
const BATCH_PACING: Duration = Duration::from_secs(1);

/// One historical case in the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Original row, order preserved.
    pub fields: Vec<(String, String)>,
    /// Deterministic text form: `"key: value"` pairs joined with `", "`.
    pub text: String,
    /// Present only after successful indexing.
    pub embedding: Option<Vec<f32>>,
}

impl KnowledgeRecord {
    pub fn from_row(fields: Vec<(String, String)>) -> Self {
        let text = fields
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            fields,
            text,
            embedding: None,
        }
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// Search result: a record and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub record: KnowledgeRecord,
    pub similarity: f32,
}

/// Progress events emitted while building the index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexProgress {
    /// A batch was embedded; `processed` records done out of `total`.
    BatchEmbedded { processed: usize, total: usize },
    /// A retryable failure; waiting `wait` before attempt `attempt + 1`.
    Backoff { attempt: u32, wait: Duration },
    /// A batch exhausted its retries and was skipped.
    BatchSkipped { offset: usize, len: usize },
    /// The build finished; `embedded` of `total` records carry vectors.
    Completed { embedded: usize, total: usize },
}

/// Knowledge base owning the historical records.
pub struct RetrievalIndex {
    records: RwLock<Arc<Vec<KnowledgeRecord>>>,
    policy: RetryPolicy,
}

impl Default for RetrievalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RetrievalIndex {
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            records: RwLock::new(Arc::new(Vec::new())),
            policy,
        }
    }

    /// Replaces the entire knowledge base with one record per row.
    /// Idempotent: a re-ingestion discards the prior base, embeddings
    /// included.
    pub fn ingest(&self, rows: Vec<Vec<(String, String)>>) -> usize {
        let records: Vec<KnowledgeRecord> =
            rows.into_iter().map(KnowledgeRecord::from_row).collect();
        let count = records.len();

        *self.records.write() = Arc::new(records);

        info!(count, "knowledge base replaced");
        count
    }

    /// Consistent snapshot of the current base.
    pub fn snapshot(&self) -> Arc<Vec<KnowledgeRecord>> {
        Arc::clone(&self.records.read())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Records left without an embedding (skipped batches).
    pub fn unembedded_count(&self) -> usize {
        self.records
            .read()
            .iter()
            .filter(|r| !r.has_embedding())
            .count()
    }

    /// Embeds the knowledge base in strictly sequential batches.
    ///
    /// Each batch is retried under the index's [`RetryPolicy`] on a
    /// retryable failure; an exhausted batch is skipped (its records stay
    /// unembedded) and reported through `progress`, and the build continues
    /// with subsequent batches. Only a fatal failure (auth, cancellation)
    /// aborts the build. The rebuilt set is published atomically on
    /// completion; searches running meanwhile see the pre-build base.
    ///
    /// Returns the number of records that carry an embedding.
    pub async fn build_index(
        &self,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
        cancel: &CancelFlag,
        mut progress: impl FnMut(IndexProgress),
    ) -> Result<usize, RetrievalError> {
        let base = self.snapshot();
        let total = base.len();
        if total == 0 {
            progress(IndexProgress::Completed {
                embedded: 0,
                total: 0,
            });
            return Ok(0);
        }

        let mut records: Vec<KnowledgeRecord> = base.as_ref().clone();
        let batch_size = batch_size.max(1);
        let mut embedded = 0usize;
        let mut offset = 0usize;

        while offset < total {
            let end = (offset + batch_size).min(total);
            let texts: Vec<String> = records[offset..end]
                .iter()
                .map(|r| r.text.clone())
                .collect();

            let outcome = self
                .policy
                .run_with(
                    cancel,
                    "embed_batch",
                    || provider.embed_batch(&texts),
                    |attempt, wait| progress(IndexProgress::Backoff { attempt, wait }),
                )
                .await;

            match outcome {
                Ok(vectors) => {
                    for (record, vector) in records[offset..end].iter_mut().zip(vectors) {
                        record.embedding = Some(vector);
                        embedded += 1;
                    }
                    debug!(processed = end, total, "batch embedded");
                    progress(IndexProgress::BatchEmbedded {
                        processed: end,
                        total,
                    });

                    if end < total {
                        tokio::time::sleep(BATCH_PACING).await;
                    }
                }
                Err(error @ (ProviderError::Auth { .. } | ProviderError::Cancelled)) => {
                    // fatal: no point embedding further batches
                    return Err(RetrievalError::Provider(error));
                }
                Err(error) => {
                    warn!(
                        offset,
                        len = end - offset,
                        error = %error,
                        "batch skipped after exhausting retries"
                    );
                    progress(IndexProgress::BatchSkipped {
                        offset,
                        len: end - offset,
                    });
                }
            }

            offset = end;
        }

        *self.records.write() = Arc::new(records);

        info!(embedded, total, "index build complete");
        progress(IndexProgress::Completed { embedded, total });
        Ok(embedded)
    }

    /// Embeds `query` and returns the top `k` most similar records.
    ///
    /// Only records with an embedding participate; zero-magnitude vectors
    /// (query or record) are excluded from ranking rather than producing an
    /// undefined similarity. Descending by similarity, ties keep insertion
    /// order.
    pub async fn search(
        &self,
        provider: &dyn EmbeddingProvider,
        query: &str,
        k: usize,
        cancel: &CancelFlag,
    ) -> Result<Vec<SearchHit>, RetrievalError> {
        let query_vector = self
            .policy
            .run(cancel, "embed_query", || provider.embed(query))
            .await?;

        let base = self.snapshot();
        let mut hits: Vec<SearchHit> = base
            .iter()
            .filter_map(|record| {
                let embedding = record.embedding.as_ref()?;
                let similarity = cosine_similarity(&query_vector, embedding)?;
                Some(SearchHit {
                    record: record.clone(),
                    similarity,
                })
            })
            .collect();

        // stable sort: equal similarities keep insertion order
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        debug!(hits = hits.len(), k, "similarity search complete");
        Ok(hits)
    }
}

/// Cosine similarity `dot(a,b) / (|a|*|b|)`.
///
/// Returns `None` for mismatched lengths, empty vectors, or a
/// zero-magnitude operand — those cannot be ranked.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        None
    } else {
        Some(dot / (norm_a * norm_b))
    }
}
