//! BioBuddy - Biography Question Answering
//!
//! Answers natural-language questions about a single person by retrieving
//! biography passages from a vector store and asking a local Ollama model to
//! answer from them, always in a favorable or neutral voice.
//!
//! # Architecture
//!
//! - **Retrieval**: [`rag::Retriever`] over Qdrant or an in-memory index
//! - **Context**: numbered `Source N:` block from the retrieved passages
//! - **Prompt**: fixed guidelines plus context and question
//! - **Generation**: [`generation::Generator`] backed by Ollama
//! - **Surfaces**: one-shot CLI, REPL and an HTTP `/ask` endpoint

pub mod errors;
pub mod config;
pub mod logging;

// Capabilities
pub mod embedding;
pub mod generation;

// Answer pipeline
pub mod rag;

// Wiring and surfaces
pub mod bootstrap;
pub mod cli;
pub mod doctor;
pub mod repl;
pub mod server;

// Re-export commonly used types
pub use config::{Config, PipelineConfig};
pub use errors::{ConfigError, GenerationError, PipelineError, Result, RetrievalError};
pub use generation::Generator;
pub use rag::{AnswerPipeline, AnswerTrace, Passage, Retriever};
