use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Embedding, EmbeddingError, EmbeddingProvider};
use crate::hashing::hash_to_u64;
use crate::vector::normalize_in_place;

/// Failure modes a [`MockEmbeddingProvider`] can be told to exhibit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Every call fails as if the backend were down.
    Unavailable,
    /// Every call returns one vector fewer than requested.
    ShortBatch,
    /// Every call returns vectors one component too wide.
    WrongDimension,
}

/// Table-driven provider that records every call.
///
/// Texts registered with [`with_embedding`](Self::with_embedding) return their vector
/// (normalized); anything else gets a deterministic hash-seeded unit vector.
pub struct MockEmbeddingProvider {
    dim: usize,
    table: HashMap<String, Embedding>,
    failure: Option<MockFailure>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<String>>>,
}

impl MockEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            table: HashMap::new(),
            failure: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Registers the vector returned for `text`; it is normalized on the way in.
    pub fn with_embedding(mut self, text: &str, vector: &[f32]) -> Self {
        assert_eq!(vector.len(), self.dim, "mock vector has wrong dimension");
        let mut vector = vector.to_vec();
        normalize_in_place(&mut vector);
        self.table.insert(text.to_string(), vector);
        self
    }

    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Number of `encode` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts requested by each call, in call order.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Total number of times `text` was sent to the provider.
    pub fn times_requested(&self, text: &str) -> usize {
        self.requests()
            .iter()
            .flatten()
            .filter(|requested| requested.as_str() == text)
            .count()
    }

    fn vector_for(&self, text: &str) -> Embedding {
        if let Some(vector) = self.table.get(text) {
            return vector.clone();
        }

        let mut state = hash_to_u64(text.as_bytes());
        let mut vector: Embedding = (0..self.dim)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();
        normalize_in_place(&mut vector);
        vector
    }
}

impl EmbeddingProvider for MockEmbeddingProvider {
    fn encode(&self, texts: &[&str], _batch_size: usize) -> Result<Vec<Embedding>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(texts.iter().map(|t| t.to_string()).collect());
        }

        let mut vectors: Vec<Embedding> = texts.iter().map(|t| self.vector_for(t)).collect();

        match self.failure {
            None => {}
            Some(MockFailure::Unavailable) => {
                return Err(EmbeddingError::ProviderUnavailable {
                    reason: "mock provider configured to fail".to_string(),
                });
            }
            Some(MockFailure::ShortBatch) => {
                vectors.pop();
            }
            Some(MockFailure::WrongDimension) => {
                for vector in &mut vectors {
                    vector.push(0.0);
                }
            }
        }

        Ok(vectors)
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }

    fn is_stub(&self) -> bool {
        true
    }
}
