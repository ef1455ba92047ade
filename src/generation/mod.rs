//! Text generation
//!
//! [`Generator`] wraps one call to a language model. Decoding parameters are
//! fixed when the generator is built; callers only hand over a prompt.

pub mod ollama;

pub use ollama::OllamaGenerator;

use async_trait::async_trait;

use crate::errors::GenerationError;

/// Trait for text generation models
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate the model's plain-text reply to `prompt`
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}
