//! Service-wide embedding cache shared across requests.
//!
//! Requests never resolve against this cache directly. Each one checks out a request-scoped
//! [`EmbeddingCache`] seeded with the hits, resolves the misses through the provider, and
//! publishes the new entries back. Two concurrent requests missing the same text may both
//! encode it; the later publish is a no-op overwrite of an identical vector.

use moka::sync::Cache;
use std::sync::Arc;

use super::store::EmbeddingCache;
use crate::constants::DEFAULT_CACHE_CAPACITY;
use crate::hashing::hash_text;

/// Bounded, concurrent text → embedding cache keyed by the BLAKE3 hash of the normalized text.
#[derive(Clone)]
pub struct SharedEmbeddingCache {
    entries: Cache<[u8; 32], Arc<[f32]>>,
}

impl SharedEmbeddingCache {
    /// Creates a cache with the default capacity.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` embeddings (least-recently-used eviction).
    #[inline]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Looks up one normalized text.
    #[inline]
    pub fn get(&self, text: &str) -> Option<Arc<[f32]>> {
        self.entries.get(&hash_text(text))
    }

    /// Builds a request-scoped cache holding every `texts` entry already known here.
    pub fn checkout<I, S>(&self, texts: I) -> EmbeddingCache
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut local = EmbeddingCache::new();
        for text in texts {
            let text = text.as_ref();
            if text.is_empty() || local.contains(text) {
                continue;
            }
            if let Some(embedding) = self.get(text) {
                local.insert(text, embedding.to_vec());
            }
        }
        local
    }

    /// Copies every entry of `local` into the shared cache.
    pub fn publish(&self, local: &EmbeddingCache) {
        for (text, embedding) in local.iter() {
            let key = hash_text(text);
            if !self.entries.contains_key(&key) {
                self.entries.insert(key, Arc::from(embedding));
            }
        }
    }

    /// Approximate number of cached embeddings.
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Returns `true` if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    /// Clears all entries.
    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl Default for SharedEmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEmbeddingCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
