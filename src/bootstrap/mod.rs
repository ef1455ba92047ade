//! Bootstrap for BioBuddy
//!
//! Builds the embedder, retriever and generator named in the configuration
//! and wires them into an [`AnswerPipeline`].

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, EmbeddingProvider, StoreProvider};
use crate::embedding::{Embedder, LocalEmbedder, OllamaEmbedder};
use crate::generation::{Generator, OllamaGenerator};
use crate::rag::retrieval::{MemoryRetriever, QdrantRetriever, Retriever};
use crate::rag::AnswerPipeline;

/// Build the configured embedding backend
pub async fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.embedding.provider {
        EmbeddingProvider::Ollama => {
            let embedder = OllamaEmbedder::new(
                &config.ollama.base_url,
                &config.embedding.model,
                Duration::from_secs(config.ollama.request_timeout_secs),
            )?;
            Ok(Arc::new(embedder))
        }
        EmbeddingProvider::Local => {
            let model_id = config.embedding.local_model.clone();
            // Weight download and loading block
            let embedder = tokio::task::spawn_blocking(move || LocalEmbedder::new(&model_id))
                .await
                .context("Embedding model loader panicked")??;
            Ok(Arc::new(embedder))
        }
    }
}

/// Build the configured passage retriever
pub async fn build_retriever(
    config: &Config,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn Retriever>> {
    match config.store.provider {
        StoreProvider::Qdrant => Ok(Arc::new(QdrantRetriever::new(&config.store, embedder)?)),
        StoreProvider::Memory => {
            let path = config
                .store
                .passages_path
                .as_deref()
                .context("store.passages_path is required for the memory store")?;
            let retriever = MemoryRetriever::from_file(embedder, path).await?;
            tracing::info!(passages = retriever.len(), path = %path.display(), "indexed biography in memory");
            Ok(Arc::new(retriever))
        }
    }
}

/// Build the Ollama generator with the configured temperature
pub fn build_generator(config: &Config) -> Result<OllamaGenerator> {
    Ok(OllamaGenerator::with_config(
        &config.ollama.base_url,
        &config.ollama.model,
        config.pipeline.generation_temperature,
        Duration::from_secs(config.ollama.request_timeout_secs),
    )?)
}

/// Validate the configuration and assemble the full pipeline
pub async fn build_pipeline(config: &Config) -> Result<AnswerPipeline> {
    config.validate()?;

    let embedder = build_embedder(config).await?;
    tracing::debug!(model = embedder.model_name(), "embedder ready");

    let retriever = build_retriever(config, embedder).await?;
    let generator: Arc<dyn Generator> = Arc::new(build_generator(config)?);

    Ok(AnswerPipeline::new(retriever, generator, &config.pipeline)?)
}
