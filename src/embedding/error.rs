use std::path::PathBuf;
use thiserror::Error;

/// Failures of an [`EmbeddingProvider`](super::EmbeddingProvider) or of validating its output.
///
/// Any of these aborts the whole resolve call that triggered it; the embedding cache is never
/// partially updated from a failed batch.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load embedding model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid encoder configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("embedding provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    #[error("provider returned {actual} embeddings for {expected} texts")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("embedding {index} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("embedding {index} is malformed: {reason}")]
    MalformedVector { index: usize, reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
