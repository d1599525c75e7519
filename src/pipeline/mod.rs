//! End-to-end entry points: dataset → centroids → predictions, and ad-hoc requests.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{EmbeddingCache, RuleEmbeddings};
use crate::centroid::{RuleCentroid, RuleCentroids, build_rule_centroids};
use crate::dataset::Dataset;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::scoring::{PredictionRecord, ViolationPredictor, ViolationScore, omitted_row_ids};
use crate::text::normalize;

/// Centroids for every usable rule of a dataset, plus the rule-name embeddings.
#[derive(Debug, Clone, Default)]
pub struct CentroidModel {
    pub centroids: RuleCentroids,
    pub rule_embeddings: RuleEmbeddings,
}

/// Embeds everything `dataset` references into `cache`, then builds the rule centroids.
pub fn build_centroids<P>(
    dataset: &Dataset,
    cache: &mut EmbeddingCache,
    provider: &P,
    batch_size: usize,
) -> Result<CentroidModel, EmbeddingError>
where
    P: EmbeddingProvider + ?Sized,
{
    let rule_embeddings = cache.resolve_dataset(dataset, provider, batch_size)?;
    let centroids = build_rule_centroids(dataset, cache, &rule_embeddings);
    Ok(CentroidModel {
        centroids,
        rule_embeddings,
    })
}

/// Result of scoring a whole dataset.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub records: Vec<PredictionRecord>,
    /// Rows that produced no record (no centroid for their rule, or no body embedding).
    pub omitted: Vec<String>,
    pub rules_with_centroids: usize,
    pub embedded_texts: usize,
}

/// Runs the full offline pipeline over `dataset` with a fresh cache.
pub fn run_batch<P>(
    dataset: &Dataset,
    provider: &P,
    batch_size: usize,
    predictor: &ViolationPredictor,
) -> Result<BatchOutcome, EmbeddingError>
where
    P: EmbeddingProvider + ?Sized,
{
    let mut cache = EmbeddingCache::new();
    let model = build_centroids(dataset, &mut cache, provider, batch_size)?;
    let records = predictor.predict(dataset, &cache, &model.centroids);
    let omitted: Vec<String> = omitted_row_ids(dataset, &records)
        .into_iter()
        .map(str::to_string)
        .collect();

    info!(
        records = records.len(),
        omitted = omitted.len(),
        rules_with_centroids = model.centroids.len(),
        "Batch inference complete"
    );

    Ok(BatchOutcome {
        records,
        omitted,
        rules_with_centroids: model.centroids.len(),
        embedded_texts: cache.len(),
    })
}

/// A single text checked against a rule described inline by its examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRequest {
    pub text: String,
    pub rule: String,
    pub positive_examples: Vec<String>,
    pub negative_examples: Vec<String>,
}

/// What scoring an ad-hoc request produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestOutcome {
    Scored(ViolationScore),
    /// The normalized text is empty, so there is nothing to score.
    EmptyText,
    /// No embedded positive or no embedded negative example.
    InsufficientExamples,
}

impl RequestOutcome {
    pub fn score(&self) -> Option<&ViolationScore> {
        match self {
            RequestOutcome::Scored(score) => Some(score),
            _ => None,
        }
    }
}

/// Scores one ad-hoc request.
///
/// The text and all examples are normalized and resolved through `cache` in one provider call.
/// Only provider failures are errors; sparse input yields a non-scored [`RequestOutcome`].
pub fn score_request<P>(
    request: &ViolationRequest,
    cache: &mut EmbeddingCache,
    provider: &P,
    batch_size: usize,
    predictor: &ViolationPredictor,
) -> Result<RequestOutcome, EmbeddingError>
where
    P: EmbeddingProvider + ?Sized,
{
    let text = normalize(request.text.as_str());
    let positives: Vec<String> = request
        .positive_examples
        .iter()
        .map(|ex| normalize(ex.as_str()))
        .collect();
    let negatives: Vec<String> = request
        .negative_examples
        .iter()
        .map(|ex| normalize(ex.as_str()))
        .collect();

    cache.resolve(
        std::iter::once(&text).chain(&positives).chain(&negatives),
        provider,
        batch_size,
    )?;

    let Some(query) = cache.get(&text) else {
        debug!(rule = %request.rule, "Request text is empty, nothing to score");
        return Ok(RequestOutcome::EmptyText);
    };

    let positive_vectors: Vec<&[f32]> = positives.iter().filter_map(|t| cache.get(t)).collect();
    let negative_vectors: Vec<&[f32]> = negatives.iter().filter_map(|t| cache.get(t)).collect();

    match RuleCentroid::from_examples(&positive_vectors, &negative_vectors) {
        Ok(centroid) => Ok(RequestOutcome::Scored(predictor.score(query, &centroid))),
        Err(reason) => {
            debug!(rule = %request.rule, %reason, "Cannot build centroid for request");
            Ok(RequestOutcome::InsufficientExamples)
        }
    }
}
