//! Ollama embedding client
//!
//! Endpoint: POST /api/embed with a batch of inputs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::embedding::{Embedder, Embedding};
use crate::errors::RetrievalError;

/// Default embedding model
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

/// Embedder backed by a running Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaEmbedder {
    /// Create a client for `model` on the server at `base_url`
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_error(&self, err: reqwest::Error) -> RetrievalError {
        if err.is_timeout() {
            RetrievalError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }
        } else {
            RetrievalError::Unavailable(format!("Failed to reach Ollama embeddings: {}", err))
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Embedding>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RetrievalError::Embedding(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| self.request_error(e))?;
        parse_embeddings(&body, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Embedding>,
}

/// Decode an `/api/embed` body, checking one vector came back per input
fn parse_embeddings(body: &str, expected: usize) -> Result<Vec<Embedding>, RetrievalError> {
    let parsed: EmbedResponse = serde_json::from_str(body)
        .map_err(|e| RetrievalError::MalformedResponse(format!("embed response: {}", e)))?;

    if parsed.embeddings.len() != expected {
        return Err(RetrievalError::MalformedResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            parsed.embeddings.len()
        )));
    }

    Ok(parsed.embeddings)
}
