//! Run-scoped embedding cache.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::embedding::{Embedding, EmbeddingError, EmbeddingProvider};
use crate::text::normalize;
use crate::vector::is_finite;

/// Rule id → embedding of the rule's normalized text.
pub type RuleEmbeddings = HashMap<String, Embedding>;

/// Normalized text → embedding.
///
/// Grows monotonically: entries are only ever added, and an existing key is never replaced.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingCache {
    entries: HashMap<String, Embedding>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a text that is already in normalized form.
    #[inline]
    pub fn get(&self, text: &str) -> Option<&[f32]> {
        self.entries.get(text).map(Vec::as_slice)
    }

    #[inline]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds an entry unless `text` is already cached. Returns `true` if it was added.
    ///
    /// No validation happens here; [`resolve`](Self::resolve) is the checked path.
    pub fn insert(&mut self, text: impl Into<String>, embedding: Embedding) -> bool {
        match self.entries.entry(text.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(embedding);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries
            .iter()
            .map(|(text, embedding)| (text.as_str(), embedding.as_slice()))
    }

    /// Ensures every non-empty text in `texts` is cached, returning how many were added.
    ///
    /// Texts must already be normalized. Missing texts are deduplicated and sent to the
    /// provider in a single call; when nothing is missing the provider is not called at all.
    /// The reply is fully validated (count, dimension, finiteness) before anything is
    /// inserted, so a failed call leaves the cache exactly as it was.
    pub fn resolve<I, S, P>(
        &mut self,
        texts: I,
        provider: &P,
        batch_size: usize,
    ) -> Result<usize, EmbeddingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        P: EmbeddingProvider + ?Sized,
    {
        let mut seen = HashSet::new();
        let unresolved: Vec<String> = texts
            .into_iter()
            .filter_map(|text| {
                let text = text.as_ref();
                if text.is_empty() || self.entries.contains_key(text) || !seen.insert(text.to_string())
                {
                    None
                } else {
                    Some(text.to_string())
                }
            })
            .collect();

        if unresolved.is_empty() {
            debug!(cached = self.entries.len(), "All texts already embedded");
            return Ok(0);
        }

        info!(count = unresolved.len(), "Encoding unique texts");

        let batch: Vec<&str> = unresolved.iter().map(String::as_str).collect();
        let embeddings = provider.encode(&batch, batch_size)?;

        if embeddings.len() != unresolved.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: unresolved.len(),
                actual: embeddings.len(),
            });
        }

        let expected_dim = provider.embedding_dim();
        for (index, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != expected_dim {
                return Err(EmbeddingError::DimensionMismatch {
                    index,
                    expected: expected_dim,
                    actual: embedding.len(),
                });
            }
            if !is_finite(embedding) {
                return Err(EmbeddingError::MalformedVector {
                    index,
                    reason: "non-finite component".to_string(),
                });
            }
        }

        let added = unresolved.len();
        self.entries.extend(unresolved.into_iter().zip(embeddings));
        Ok(added)
    }

    /// Embeds everything a dataset references: first bodies and examples, then rule names.
    ///
    /// Rule names are normalized like any other text and resolved in a second pass; the
    /// returned map is keyed by the raw rule id.
    pub fn resolve_dataset<P>(
        &mut self,
        dataset: &Dataset,
        provider: &P,
        batch_size: usize,
    ) -> Result<RuleEmbeddings, EmbeddingError>
    where
        P: EmbeddingProvider + ?Sized,
    {
        if dataset.is_empty() {
            return Ok(RuleEmbeddings::new());
        }

        let texts = dataset.collect_unique_texts();
        self.resolve(&texts, provider, batch_size)?;

        let rule_texts: Vec<(&str, String)> = dataset
            .rules()
            .into_iter()
            .map(|rule| (rule, normalize(rule)))
            .collect();
        self.resolve(
            rule_texts.iter().map(|(_, text)| text.as_str()),
            provider,
            batch_size,
        )?;

        Ok(rule_texts
            .into_iter()
            .filter_map(|(rule, text)| {
                self.entries
                    .get(&text)
                    .map(|embedding| (rule.to_string(), embedding.clone()))
            })
            .collect())
    }
}
