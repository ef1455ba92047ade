//! In-memory passage store
//!
//! Loads a plain-text biography, splits it into blank-line separated passages,
//! embeds each one once and answers searches by cosine similarity. Meant for
//! small biographies and for running without a vector database.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::embedding::{cosine_similarity, Embedder, Embedding};
use crate::errors::RetrievalError;
use crate::rag::retrieval::{Passage, Retriever};

/// Retriever over passages held in process memory
pub struct MemoryRetriever {
    embedder: Arc<dyn Embedder>,
    entries: Vec<(Passage, Embedding)>,
    /// Length shared by every indexed vector; 0 for an empty store
    dimension: usize,
}

impl MemoryRetriever {
    /// Embed `passages` and keep them for searching
    pub async fn from_passages(
        embedder: Arc<dyn Embedder>,
        passages: Vec<Passage>,
    ) -> Result<Self, RetrievalError> {
        if passages.is_empty() {
            return Ok(Self {
                embedder,
                entries: Vec::new(),
                dimension: 0,
            });
        }

        let texts: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();
        let embeddings = embedder.embed_documents(&texts).await?;

        if embeddings.len() != passages.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} embeddings, got {}",
                passages.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 || embeddings.iter().any(|e| e.len() != dimension) {
            return Err(RetrievalError::MalformedResponse(format!(
                "passage embeddings have inconsistent dimensions (first is {})",
                dimension
            )));
        }

        Ok(Self {
            embedder,
            entries: passages.into_iter().zip(embeddings).collect(),
            dimension,
        })
    }

    /// Read a biography file and index its paragraphs
    pub async fn from_file(
        embedder: Arc<dyn Embedder>,
        path: &Path,
    ) -> Result<Self, RetrievalError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            RetrievalError::Store(format!("Failed to read passages file {}: {}", path.display(), e))
        })?;

        let passages = split_passages(&text, &path.display().to_string());
        tracing::debug!(path = %path.display(), passages = passages.len(), "loaded biography");

        Self::from_passages(embedder, passages).await
    }

    /// Number of indexed passages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split text on blank lines; each non-empty paragraph becomes a passage.
///
/// Lines inside a paragraph are kept as written. Metadata records the source
/// and the 0-based paragraph index.
pub fn split_passages(text: &str, source: &str) -> Vec<Passage> {
    let mut passages = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let flush = |current: &mut Vec<&str>, passages: &mut Vec<Passage>| {
        if !current.is_empty() {
            let index = passages.len();
            passages.push(
                Passage::new(current.join("\n"))
                    .with_metadata("source", serde_json::json!(source))
                    .with_metadata("paragraph", serde_json::json!(index)),
            );
            current.clear();
        }
    };

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut passages);
        } else {
            current.push(line.trim_end());
        }
    }
    flush(&mut current, &mut passages);

    passages
}

#[async_trait]
impl Retriever for MemoryRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query).await?;
        if query_embedding.len() != self.dimension {
            return Err(RetrievalError::MalformedResponse(format!(
                "query embedding has {} dimensions, index has {}",
                query_embedding.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(f32, &Passage)> = self
            .entries
            .iter()
            .map(|(passage, embedding)| (cosine_similarity(&query_embedding, embedding), passage))
            .collect();

        // Stable sort keeps file order among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, passage)| {
                passage.clone().with_metadata("score", serde_json::json!(score))
            })
            .collect())
    }
}
