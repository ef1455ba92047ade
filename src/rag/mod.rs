// Retrieval-augmented answering
//
// Components:
// - Retrieval: similarity search over stored biography passages
// - Context: labeled "Source N:" block built from retrieved passages
// - Prompt: fixed template binding tone and the "don't know" fallback
// - Pipeline: query -> retrieve -> assemble -> prompt -> generate

pub mod context;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;

// Re-export key types
pub use context::{ContextAssembler, ContextConfig};
pub use pipeline::{AnswerPipeline, AnswerTrace, PipelineStage};
pub use prompt::PromptBuilder;
pub use retrieval::{Passage, Retriever};
