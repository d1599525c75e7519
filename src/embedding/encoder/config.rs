use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default encoder output dimension.
pub const ENCODER_EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default encoder max sequence length.
pub const ENCODER_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEncoder`](super::SentenceEncoder).
pub struct EncoderConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_path: PathBuf,
    /// Max tokens per text; longer inputs are truncated.
    pub max_seq_len: usize,
    /// Output embedding dimension (leading components of the pooled vector).
    pub embedding_dim: usize,
    /// Load weights in half precision when a GPU is available.
    pub use_fp16: bool,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            max_seq_len: ENCODER_MAX_SEQ_LEN,
            embedding_dim: ENCODER_EMBEDDING_DIM,
            use_fp16: true,
            testing_stub: false,
        }
    }
}

impl EncoderConfig {
    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Builds the encoder config described by the service/CLI configuration.
    ///
    /// Without a model path the encoder runs in stub mode.
    pub fn from_config(config: &crate::config::Config) -> Self {
        let base = match &config.model_path {
            Some(path) => Self::new(path.clone()),
            None => Self::stub(),
        };

        base.with_embedding_dim(config.embedding_dim)
            .with_max_seq_len(config.max_seq_len)
            .with_fp16(config.use_fp16)
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn with_fp16(mut self, use_fp16: bool) -> Self {
        self.use_fp16 = use_fp16;
        self
    }

    /// Validates dimensions, and the model directory layout for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be greater than zero".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_path is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_path.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_path.clone(),
            });
        }

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !self.model_path.join(required).exists() {
                return Err(EmbeddingError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, self.model_path.display()),
                });
            }
        }

        Ok(())
    }

    /// Returns `true` if the model directory exists.
    pub fn model_available(&self) -> bool {
        !self.model_path.as_os_str().is_empty() && self.model_path.is_dir()
    }
}
