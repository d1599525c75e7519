//! Dataset error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a dataset or writing predictions.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid row on line {line}: {source}")]
    InvalidRow {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate row_id '{row_id}'")]
    DuplicateRowId { row_id: String },

    #[error("row '{row_id}' has an empty rule")]
    EmptyRule { row_id: String },

    #[error("failed to serialize prediction: {0}")]
    Serialize(#[from] serde_json::Error),
}
