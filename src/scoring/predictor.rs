use std::collections::HashSet;

use tracing::{debug, info};

use super::types::{DistanceMetric, PredictionRecord, ViolationScore};
use crate::cache::EmbeddingCache;
use crate::centroid::{RuleCentroid, RuleCentroids};
use crate::dataset::Dataset;

/// Scores queries against rule centroids with a fixed distance metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViolationPredictor {
    metric: DistanceMetric,
}

impl ViolationPredictor {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Scores one query embedding against one rule's centroid pair.
    pub fn score(&self, query: &[f32], centroid: &RuleCentroid) -> ViolationScore {
        let distance_to_positive = self.metric.distance(query, centroid.positive());
        let distance_to_negative = self.metric.distance(query, centroid.negative());
        ViolationScore::from_distances(distance_to_positive, distance_to_negative)
    }

    /// Scores every dataset row that has both a centroid for its rule and a cached body.
    ///
    /// Records are grouped by rule (dataset order of first appearance), then by row order.
    /// Rows that cannot be scored are skipped silently.
    pub fn predict(
        &self,
        dataset: &Dataset,
        cache: &EmbeddingCache,
        centroids: &RuleCentroids,
    ) -> Vec<PredictionRecord> {
        let mut records = Vec::with_capacity(dataset.len());

        for rule in dataset.rules() {
            let Some(centroid) = centroids.get(rule) else {
                debug!(rule, "No centroid for rule, skipping its rows");
                continue;
            };

            let before = records.len();
            for row in dataset.rows_for_rule(rule) {
                let body = row.normalized_body();
                let Some(query) = cache.get(&body) else {
                    continue;
                };
                records.push(PredictionRecord::new(
                    row.row_id.clone(),
                    &self.score(query, centroid),
                ));
            }

            debug!(rule, scored = records.len() - before, "Scored rule");
        }

        info!(
            predictions = records.len(),
            rows = dataset.len(),
            "Made predictions"
        );
        records
    }
}

/// Row ids present in `dataset` but absent from `records`, in dataset order.
pub fn omitted_row_ids<'a>(dataset: &'a Dataset, records: &[PredictionRecord]) -> Vec<&'a str> {
    let emitted: HashSet<&str> = records.iter().map(|r| r.row_id.as_str()).collect();
    dataset
        .rows()
        .iter()
        .map(|row| row.row_id.as_str())
        .filter(|id| !emitted.contains(id))
        .collect()
}
