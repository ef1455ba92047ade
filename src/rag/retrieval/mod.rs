//! Passage retrieval
//!
//! [`Retriever`] is the seam between the answer pipeline and whatever holds the
//! biography passages. Results come back in relevance order and the pipeline
//! never reorders them.

pub mod memory;
pub mod qdrant;

pub use memory::MemoryRetriever;
pub use qdrant::QdrantRetriever;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RetrievalError;

/// Metadata attached to a passage by the store
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A retrieved unit of biographical text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Passage {
    /// Passage without metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attach one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Similarity search over a passage store
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return at most `k` passages, most similar to `query` first.
    ///
    /// An empty vector means nothing matched; an unreachable or misbehaving
    /// store is an error.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError>;
}
