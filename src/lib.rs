//! Sentinel library crate (used by the `sentinel` binary and integration tests).
//!
//! Scores how likely a text violates a rule, given a handful of violating (positive) and
//! compliant (negative) examples of that rule. Examples are embedded, averaged into a unit
//! centroid per class, and a text is scored by how much closer it sits to the violating
//! centroid than to the compliant one.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`normalize`] - URL-masking text normalization (cache keys)
//! - [`EmbeddingCache`], [`SharedEmbeddingCache`] - Deduplicated text embeddings
//! - [`build_rule_centroids`], [`RuleCentroid`] - Per-rule centroids
//! - [`ViolationPredictor`], [`ViolationScore`] - Scoring
//! - [`run_batch`], [`score_request`] - End-to-end entry points
//!
//! ## Embedding
//! - [`EmbeddingProvider`] - The provider contract
//! - [`SentenceEncoder`], [`EncoderConfig`] - Candle BERT encoder with a stub mode
//!
//! ## Data & Configuration
//! - [`Dataset`], [`DatasetRow`], [`write_submission`] - JSONL datasets and submissions
//! - [`Config`], [`ConfigError`] - Environment configuration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod centroid;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod pipeline;
pub mod scoring;
pub mod text;
pub mod vector;

pub use cache::{EmbeddingCache, RuleEmbeddings, SharedEmbeddingCache};
pub use centroid::{CentroidError, ExampleClass, RuleCentroid, RuleCentroids, build_rule_centroids};
pub use config::{Config, ConfigError};
pub use dataset::{Dataset, DatasetError, DatasetRow, write_submission};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockEmbeddingProvider, MockFailure};
pub use embedding::{
    ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, Embedding, EmbeddingError, EmbeddingProvider,
    EncoderConfig, SentenceEncoder,
};
pub use gateway::{AppState, GatewayError, create_router};
pub use hashing::{hash_text, hash_to_u64};
pub use pipeline::{
    BatchOutcome, CentroidModel, RequestOutcome, ViolationRequest, build_centroids, run_batch,
    score_request,
};
pub use scoring::{
    DistanceMetric, PredictionRecord, ScoringError, ViolationPredictor, ViolationScore,
    omitted_row_ids,
};
pub use text::normalize;
