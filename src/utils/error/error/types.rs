//! Error types for the pipeline

use crate::core::normalizer::NormalizationError;
use thiserror::Error;

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound request could not be normalized
    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Buffer unavailable, throttled or rejecting the operation
    #[error("Buffer error: {0}")]
    Buffer(String),

    /// Store write or read failed
    #[error("Store error: {0}")]
    Store(String),

    /// Processing step failed for a record
    #[error("Processing error: {0}")]
    Processing(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body larger than the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Whether the caller should retry the operation that produced this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::Buffer(_)
                | PipelineError::Store(_)
                | PipelineError::Timeout(_)
                | PipelineError::Io(_)
        )
    }
}
