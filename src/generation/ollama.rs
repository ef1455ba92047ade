//! Ollama API generation client
//!
//! Provides single-shot completions from Ollama:
//! - Endpoint: POST /api/generate with `stream: false`
//! - Temperature fixed at construction
//! - No retries; every failure is reported to the caller

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::GenerationError;
use crate::generation::Generator;

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama generation client
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OllamaGenerator {
    /// Create a generator with default endpoint, model and timeout
    pub fn new(temperature: f32) -> Result<Self, GenerationError> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_MODEL, temperature, DEFAULT_TIMEOUT)
    }

    /// Create a generator with custom configuration
    pub fn with_config(
        base_url: &str,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
            timeout,
        })
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// List installed models
    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(GenerationError::Rejected {
                status: response.status().as_u16(),
                message: "Failed to retrieve model list".to_string(),
            });
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(format!("model list: {}", e)))?;

        Ok(models.models.into_iter().map(|m| m.name).collect())
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sampling temperature sent with every request
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    fn request_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }
        } else {
            GenerationError::Unavailable(format!("Failed to send request: {}", err))
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
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
            return Err(GenerationError::Rejected {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await.map_err(|e| self.request_error(e))?;
        extract_text(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Non-streaming generate response; only the text matters here
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

/// Pull the answer text out of a generate response envelope
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    match parsed.response {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::EmptyResponse),
    }
}
