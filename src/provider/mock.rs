//! Scriptable in-memory providers for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::error::ProviderError;
use super::{EmbeddingProvider, GenerationProvider};

const PSEUDO_EMBEDDING_DIM: usize = 8;

/// Mock provider implementing both traits.
///
/// Embeddings can be canned per text; texts without a canned vector get a
/// deterministic pseudo-embedding derived from their bytes, so similarity
/// stays stable across runs. Failures and generation responses are scripted
/// FIFO queues.
#[derive(Default)]
pub struct MockAiProvider {
    canned_embeddings: Mutex<HashMap<String, Vec<f32>>>,
    embed_failures: Mutex<VecDeque<ProviderError>>,
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    embed_calls: AtomicUsize,
    embed_batch_calls: AtomicUsize,
    generate_calls: AtomicUsize,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cans the embedding returned for an exact text.
    pub fn set_embedding(&self, text: &str, vector: Vec<f32>) {
        self.canned_embeddings
            .lock()
            .expect("lock poisoned")
            .insert(text.to_string(), vector);
    }

    /// Queues a failure consumed by the next `embed`/`embed_batch` call.
    pub fn push_embed_failure(&self, error: ProviderError) {
        self.embed_failures
            .lock()
            .expect("lock poisoned")
            .push_back(error);
    }

    /// Queues a generation response (or failure).
    pub fn push_response(&self, response: Result<String, ProviderError>) {
        self.responses
            .lock()
            .expect("lock poisoned")
            .push_back(response);
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn embed_batch_calls(&self) -> usize {
        self.embed_batch_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    fn take_embed_failure(&self) -> Option<ProviderError> {
        self.embed_failures
            .lock()
            .expect("lock poisoned")
            .pop_front()
    }

    fn embedding_for(&self, text: &str) -> Vec<f32> {
        if let Some(vector) = self
            .canned_embeddings
            .lock()
            .expect("lock poisoned")
            .get(text)
        {
            return vector.clone();
        }
        pseudo_embedding(text)
    }
}

/// Folds the text bytes into a small deterministic vector.
pub fn pseudo_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; PSEUDO_EMBEDDING_DIM];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % PSEUDO_EMBEDDING_DIM] += f32::from(byte) / 255.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for MockAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.take_embed_failure() {
            return Err(error);
        }

        Ok(self.embedding_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.embed_batch_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.take_embed_failure() {
            return Err(error);
        }

        Ok(texts.iter().map(|t| self.embedding_for(t)).collect())
    }
}

#[async_trait]
impl GenerationProvider for MockAiProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);

        self.responses
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::Other {
                    message: "no scripted response".to_string(),
                })
            })
    }
}
