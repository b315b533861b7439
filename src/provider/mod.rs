//! External AI provider collaborators.
//!
//! The core never talks to a model directly; it goes through the
//! [`EmbeddingProvider`] and [`GenerationProvider`] traits. [`GeminiClient`]
//! is the production implementation (Gemini REST API over reqwest); mocks
//! live behind the `mock` feature. Provider calls are the only operations in
//! the system that suspend on an external resource, and every call site
//! wraps them in a [`RetryPolicy`].

pub mod error;
pub mod gemini;
pub mod retry;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::ProviderError;
pub use gemini::{GeminiClient, GeminiConfig};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockAiProvider;
pub use retry::{CancelFlag, RetryPolicy};

use async_trait::async_trait;

/// Turns text into embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Embeds a batch of texts; the result has one vector per input, in
    /// order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// Generates free text from a prompt.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
