//! Embedding provider contract and implementations.
//!
//! - [`EmbeddingProvider`] is the only capability the scoring pipeline needs.
//! - [`encoder`] provides the candle-backed sentence encoder (and its stub mode).
//! - `mock` provides a table-driven provider for tests (`mock` feature).

/// Device selection (CPU / Metal / CUDA) and dtype policy.
pub mod device;
/// Sentence encoder (BERT + mean pooling).
pub mod encoder;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
/// Tokenizer loading helpers.
pub mod utils;

use std::sync::Arc;

pub use encoder::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig, SentenceEncoder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbeddingProvider, MockFailure};

/// A fixed-width, L2-normalized embedding vector.
pub type Embedding = Vec<f32>;

/// Turns a batch of strings into embeddings.
///
/// Implementations must be length- and order-preserving (one vector per input, same order),
/// return unit-normalized vectors of [`embedding_dim`](EmbeddingProvider::embedding_dim)
/// components, and may split the batch internally into chunks of `batch_size`.
pub trait EmbeddingProvider: Send + Sync {
    /// Encodes `texts` into embeddings.
    fn encode(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Width of every vector this provider returns.
    fn embedding_dim(&self) -> usize;

    /// Returns `true` when vectors are synthetic rather than model output.
    fn is_stub(&self) -> bool {
        false
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    fn encode(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Embedding>, EmbeddingError> {
        (**self).encode(texts, batch_size)
    }

    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }

    fn is_stub(&self) -> bool {
        (**self).is_stub()
    }
}
