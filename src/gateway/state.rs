use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::error::GatewayError;
use crate::cache::SharedEmbeddingCache;
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::pipeline::{RequestOutcome, ViolationRequest, score_request};
use crate::scoring::ViolationPredictor;
use crate::text::normalize;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn EmbeddingProvider>,

    pub cache: SharedEmbeddingCache,

    pub predictor: ViolationPredictor,

    pub config: Arc<Config>,

    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: Config) -> Self {
        Self {
            provider,
            cache: SharedEmbeddingCache::with_capacity(config.cache_capacity),
            predictor: ViolationPredictor::new(config.distance_metric),
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }

    /// Scores one request against the shared cache. Blocks on the provider.
    ///
    /// Only provider failures are errors; sparse requests come back as a non-scored outcome.
    pub fn score(&self, request: &ViolationRequest) -> Result<RequestOutcome, GatewayError> {
        let texts: Vec<String> = std::iter::once(&request.text)
            .chain(&request.positive_examples)
            .chain(&request.negative_examples)
            .map(|text| normalize(text.as_str()))
            .collect();

        let mut local = self.cache.checkout(&texts);
        let hits = local.len();

        let outcome = score_request(
            request,
            &mut local,
            &*self.provider,
            self.config.batch_size,
            &self.predictor,
        );

        self.cache.publish(&local);
        debug!(hits, cached = local.len(), "Request embeddings resolved");

        Ok(outcome?)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("embedding_dim", &self.provider.embedding_dim())
            .field("cache", &self.cache)
            .field("predictor", &self.predictor)
            .field("started_at", &self.started_at)
            .finish()
    }
}
