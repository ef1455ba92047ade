//! Text embedding backends
//!
//! Retrievers turn the question into a vector through an [`Embedder`] before
//! searching. Two backends exist: Ollama's `/api/embed` endpoint and an
//! in-process BERT sentence model run with candle.

pub mod local;
pub mod ollama;

pub use local::LocalEmbedder;
pub use ollama::OllamaEmbedder;

use async_trait::async_trait;

use crate::errors::RetrievalError;

/// A vector embedding
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed several passages, one vector per input, in input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Embedding>, RetrievalError>;

    /// Embed a single search query
    async fn embed_query(&self, text: &str) -> Result<Embedding, RetrievalError> {
        self.embed_documents(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| RetrievalError::Embedding("no embedding returned for query".to_string()))
    }

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Cosine similarity; zero when either vector has no magnitude or lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
