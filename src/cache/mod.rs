//! Embedding caches.
//!
//! - [`EmbeddingCache`]: run-scoped normalized text → embedding map; the deduplication point
//!   between the dataset and the embedding provider.
//! - [`SharedEmbeddingCache`]: bounded cache reused across service requests.

mod shared;
mod store;


pub use shared::SharedEmbeddingCache;
pub use store::{EmbeddingCache, RuleEmbeddings};
