//! Cross-cutting, shared constants.
//!
//! Every embedding compared by the pipeline (examples, bodies, rule names, centroids) must
//! share one dimension. The provider is configured with it, and the embedding cache rejects
//! any vector of another length before anything is stored.

/// Default sentence-encoder output width (MiniLM/BERT-small class models).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Default token budget per text before truncation.
pub const DEFAULT_MAX_SEQ_LEN: usize = 128;

/// Default number of texts per encoder forward pass.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Default number of embeddings kept by the service-wide cache.
pub const DEFAULT_CACHE_CAPACITY: u64 = 100_000;
