//! Gemini REST API client (embeddings + generation).

use std::env;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use async_trait::async_trait;

use super::error::ProviderError;
use super::{EmbeddingProvider, GenerationProvider};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMBED_MODEL: &str = "gemini-embedding-001";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini client configuration.
///
/// Use [`GeminiConfig::from_env`] to read `CREDO_GEMINI_*` overrides on top
/// of the defaults. The base URL is overridable for tests.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embed_model: String,
    pub chat_model: String,
}

impl GeminiConfig {
    const ENV_API_KEY: &'static str = "CREDO_GEMINI_API_KEY";
    const ENV_BASE_URL: &'static str = "CREDO_GEMINI_BASE_URL";
    const ENV_EMBED_MODEL: &'static str = "CREDO_GEMINI_EMBED_MODEL";
    const ENV_CHAT_MODEL: &'static str = "CREDO_GEMINI_CHAT_MODEL";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    /// Loads the configuration from environment variables. A missing API key
    /// is an auth failure: there is no anonymous access to the API.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = env::var(Self::ENV_API_KEY).map_err(|_| ProviderError::Auth {
            message: format!("{} is not set", Self::ENV_API_KEY),
        })?;

        let mut config = Self::new(api_key);
        if let Ok(url) = env::var(Self::ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Ok(model) = env::var(Self::ENV_EMBED_MODEL) {
            config.embed_model = model;
        }
        if let Ok(model) = env::var(Self::ENV_CHAT_MODEL) {
            config.chat_model = model;
        }

        Ok(config)
    }
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct BatchEmbedContentsResponse {
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini REST client implementing both provider traits.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Other {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str, verb: &str) -> String {
        format!("{}/models/{}:{}", self.config.base_url, model, verb)
    }

    async fn post(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable {
                message: format!("transport failure: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        response.json().await.map_err(|e| ProviderError::Other {
            message: format!("malformed provider response: {e}"),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = self.endpoint(&self.config.embed_model, "embedContent");
        let body = json!({
            "content": { "parts": [ { "text": text } ] }
        });

        let response = self.post(&url, body).await?;
        let decoded: EmbedContentResponse = Self::decode(response).await?;

        debug!(dim = decoded.embedding.values.len(), "embedded query text");
        Ok(decoded.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = self.endpoint(&self.config.embed_model, "batchEmbedContents");
        let model_ref = format!("models/{}", self.config.embed_model);
        let requests: Vec<serde_json::Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": model_ref,
                    "content": { "parts": [ { "text": text } ] }
                })
            })
            .collect();

        let response = self.post(&url, json!({ "requests": requests })).await?;
        let decoded: BatchEmbedContentsResponse = Self::decode(response).await?;

        if decoded.embeddings.len() != texts.len() {
            return Err(ProviderError::Other {
                message: format!(
                    "batch embedding count mismatch: sent {}, got {}",
                    texts.len(),
                    decoded.embeddings.len()
                ),
            });
        }

        Ok(decoded.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = self.endpoint(&self.config.chat_model, "generateContent");
        let body = json!({
            "contents": [ { "parts": [ { "text": prompt } ] } ]
        });

        let response = self.post(&url, body).await?;
        let decoded: GenerateContentResponse = Self::decode(response).await?;

        let text: String = decoded
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::Other {
                message: "provider returned an empty response".to_string(),
            });
        }

        Ok(text)
    }
}
