//! Sentence encoder (BERT + mean pooling) implementing [`EmbeddingProvider`].
//!
//! Use [`EncoderConfig::stub`] for tests and local runs without model files.

/// Encoder configuration.
pub mod config;
pub(crate) mod model;

#[cfg(test)]
mod tests;

pub use config::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig};

use candle_core::{DType, Device, Tensor};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info, warn};

use crate::embedding::device::{select_device, select_dtype};
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_batch_tokenizer;
use crate::embedding::{Embedding, EmbeddingProvider};
use crate::hashing::hash_to_u64;
use crate::vector::normalize_in_place;

use model::MeanPooledBert;

enum EncoderBackend {
    Model {
        model: MeanPooledBert,
        tokenizer: Tokenizer,
        device: Device,
        dtype: DType,
    },
    Stub {
        device: Device,
    },
}

/// Unit-normalized sentence embeddings from a BERT-family checkpoint (supports stub mode).
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, dtype, .. } => {
                        format!("Model({:?}, {:?})", device, dtype)
                    }
                    EncoderBackend::Stub { device } => format!("Stub({:?})", device),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEncoder {
    /// Loads the encoder from a config (stub mode is supported).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let device = select_device()?;
        debug!(?device, "Selected compute device for sentence encoder");

        if config.testing_stub {
            warn!("Sentence encoder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EncoderBackend::Stub { device },
                config,
            });
        }

        let dtype = select_dtype(&device, config.use_fp16);

        let model = MeanPooledBert::load(&config.model_path, &device, dtype).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        if config.embedding_dim > model.hidden_size() {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) exceeds model hidden_size ({})",
                    config.embedding_dim,
                    model.hidden_size()
                ),
            });
        }

        let tokenizer = load_batch_tokenizer(&config.model_path, config.max_seq_len).map_err(
            |e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            },
        )?;

        info!(
            model_path = %config.model_path.display(),
            embedding_dim = config.embedding_dim,
            hidden_size = model.hidden_size(),
            max_seq_len = config.max_seq_len,
            ?dtype,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
                dtype,
            },
            config,
        })
    }

    /// Shorthand for `SentenceEncoder::load(EncoderConfig::stub())`.
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EncoderConfig::stub())
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub { .. })
    }

    /// Returns `true` if a model is loaded.
    pub fn has_model(&self) -> bool {
        matches!(self.backend, EncoderBackend::Model { .. })
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn encode_chunk_with_model(
        &self,
        texts: &[&str],
        model: &MeanPooledBert,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        let encodings = tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        let batch = encodings.len();
        let seq_len = encodings.first().map(Encoding::len).unwrap_or(0);

        debug!(batch, seq_len, "Encoding chunk (transformer forward pass)");

        let input_ids = stack_field(&encodings, device, seq_len, Encoding::get_ids)?;
        let type_ids = stack_field(&encodings, device, seq_len, Encoding::get_type_ids)?;
        let attention_mask =
            stack_field(&encodings, device, seq_len, Encoding::get_attention_mask)?;

        let pooled = model
            .forward(&input_ids, &type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Transformer forward pass failed: {}", e),
            })?
            .narrow(1, 0, self.config.embedding_dim)?
            .to_vec2::<f32>()?;

        Ok(pooled.into_iter().map(unit_or_zero).collect())
    }

    fn encode_stub(&self, text: &str) -> Embedding {
        let mut state = hash_to_u64(text.as_bytes());
        let mut embedding = Vec::with_capacity(self.config.embedding_dim);

        for _ in 0..self.config.embedding_dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        unit_or_zero(embedding)
    }
}

impl EmbeddingProvider for SentenceEncoder {
    fn encode(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
                ..
            } => {
                let mut results = Vec::with_capacity(texts.len());
                for chunk in texts.chunks(batch_size.max(1)) {
                    results.extend(self.encode_chunk_with_model(chunk, model, tokenizer, device)?);
                }
                info!(count = results.len(), batch_size, "Encoded texts");
                Ok(results)
            }
            EncoderBackend::Stub { .. } => {
                debug!(count = texts.len(), "Generating stub embeddings");
                Ok(texts.iter().map(|text| self.encode_stub(text)).collect())
            }
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn is_stub(&self) -> bool {
        SentenceEncoder::is_stub(self)
    }
}

fn stack_field(
    encodings: &[Encoding],
    device: &Device,
    seq_len: usize,
    field: fn(&Encoding) -> &[u32],
) -> Result<Tensor, EmbeddingError> {
    let mut flat = Vec::with_capacity(encodings.len() * seq_len);
    for encoding in encodings {
        let values = field(encoding);
        if values.len() != seq_len {
            return Err(EmbeddingError::TokenizationFailed {
                reason: format!(
                    "ragged batch: expected {} tokens, got {}",
                    seq_len,
                    values.len()
                ),
            });
        }
        flat.extend_from_slice(values);
    }
    Ok(Tensor::from_vec(flat, (encodings.len(), seq_len), device)?)
}

fn unit_or_zero(mut embedding: Vec<f32>) -> Embedding {
    normalize_in_place(&mut embedding);
    embedding
}
