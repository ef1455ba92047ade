// End-to-end answer pipeline: retrieve -> assemble -> prompt -> generate
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::errors::{ConfigError, PipelineError, Result};
use crate::generation::Generator;
use crate::rag::context::{ContextAssembler, ContextConfig};
use crate::rag::prompt::PromptBuilder;
use crate::rag::retrieval::{Passage, Retriever};

/// Stages a single request moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Received,
    Retrieved,
    ContextBuilt,
    PromptBuilt,
    Done,
    Failed,
}

impl PipelineStage {
    /// Check if this is a terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Retrieved => "retrieved",
            PipelineStage::ContextBuilt => "context_built",
            PipelineStage::PromptBuilt => "prompt_built",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything one successful request produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerTrace {
    /// Query exactly as received
    pub query: String,
    /// Passages in retriever order
    pub passages: Vec<Passage>,
    /// Assembled context block
    pub context: String,
    /// Prompt sent to the generator
    pub prompt: String,
    /// Generator output, unmodified
    pub answer: String,
}

/// Retrieval-augmented answer pipeline.
///
/// Holds no per-request state; share one instance across tasks behind an `Arc`.
pub struct AnswerPipeline {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
    assembler: ContextAssembler,
    prompt_builder: PromptBuilder,
    retrieval_k: usize,
}

impl AnswerPipeline {
    /// Create a pipeline from its capabilities and configuration
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
        config: &PipelineConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let prompt_builder = match &config.prompt_template {
            Some(template) => PromptBuilder::with_template(config.subject.clone(), template.clone())?,
            None => PromptBuilder::new(config.subject.clone()),
        };

        Ok(Self {
            retriever,
            generator,
            assembler: ContextAssembler::with_config(ContextConfig {
                max_context_chars: config.max_context_chars,
            }),
            prompt_builder,
            retrieval_k: config.retrieval_k,
        })
    }

    /// Answer a question, returning the generator's text verbatim
    pub async fn answer(&self, query: &str) -> Result<String> {
        self.run(query).await.map(|trace| trace.answer)
    }

    /// Answer a question and keep the intermediate artifacts
    pub async fn run(&self, query: &str) -> Result<AnswerTrace> {
        let started = Instant::now();
        tracing::debug!(stage = %PipelineStage::Received, query_chars = query.chars().count());

        let passages = match self.retriever.search(query, self.retrieval_k).await {
            Ok(passages) => passages,
            Err(e) => return Err(self.fail(PipelineStage::Received, e.into())),
        };
        tracing::debug!(stage = %PipelineStage::Retrieved, passages = passages.len());

        let context = self.assembler.assemble(&passages);
        tracing::debug!(stage = %PipelineStage::ContextBuilt, context_chars = context.chars().count());

        let prompt = self.prompt_builder.build(&context, query);
        tracing::debug!(stage = %PipelineStage::PromptBuilt, prompt_chars = prompt.chars().count());

        let answer = match self.generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => return Err(self.fail(PipelineStage::PromptBuilt, e.into())),
        };

        tracing::info!(
            stage = %PipelineStage::Done,
            passages = passages.len(),
            model = self.generator.model_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "answered question"
        );

        Ok(AnswerTrace {
            query: query.to_string(),
            passages,
            context,
            prompt,
            answer,
        })
    }

    fn fail(&self, from: PipelineStage, err: PipelineError) -> PipelineError {
        tracing::warn!(
            stage = %PipelineStage::Failed,
            from = %from,
            kind = err.kind(),
            error = %err,
            "answer pipeline failed"
        );
        err
    }

    /// Passages requested per question
    pub fn retrieval_k(&self) -> usize {
        self.retrieval_k
    }

    /// Prompt builder in use
    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.prompt_builder
    }

    /// Generator model answering questions
    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }
}
