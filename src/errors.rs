//! Error types for BioBuddy
//!
//! The answer pipeline fails in exactly two places, retrieval and generation,
//! and each has its own error type so callers can tell them apart.

use thiserror::Error;

/// Failure of the passage store, search service, or embedding backend
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Store or embedding service could not be reached
    #[error("Retrieval service unavailable: {0}")]
    Unavailable(String),

    /// Request to the store or embedding service timed out
    #[error("Retrieval timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Embedding the query or passages failed
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Service answered with something we could not interpret
    #[error("Malformed retrieval response: {0}")]
    MalformedResponse(String),

    /// Store-side failure (missing collection, bad passages file, ...)
    #[error("Passage store error: {0}")]
    Store(String),
}

/// Failure of the text-generation service
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Generation service could not be reached
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    /// Generation request timed out
    #[error("Generation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Provider refused the request
    #[error("Generation rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Provider envelope could not be parsed
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    /// Provider answered without any usable text
    #[error("Generation returned no usable text")]
    EmptyResponse,
}

/// Error returned by [`crate::rag::AnswerPipeline`]
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl PipelineError {
    /// Stage that failed, as a stable lowercase tag
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Retrieval(_) => "retrieval",
            PipelineError::Generation(_) => "generation",
        }
    }
}

/// Invalid configuration detected while constructing components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Prompt template override is missing a required placeholder
    #[error("Invalid prompt template: {0}")]
    InvalidTemplate(String),

    /// Any other out-of-range or inconsistent setting
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenerationError::Rejected {
            status: 400,
            message: "prompt too long".to_string(),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("prompt too long"));
    }

    #[test]
    fn test_pipeline_error_kind() {
        let err: PipelineError = RetrievalError::Unavailable("down".to_string()).into();
        assert_eq!(err.kind(), "retrieval");
        assert!(matches!(err, PipelineError::Retrieval(_)));

        let err: PipelineError = GenerationError::EmptyResponse.into();
        assert_eq!(err.kind(), "generation");
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let err: PipelineError = RetrievalError::Timeout { duration_ms: 1500 }.into();
        assert_eq!(err.to_string(), "Retrieval timed out after 1500ms");
    }
}
