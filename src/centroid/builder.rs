use tracing::{debug, info, warn};

use super::types::{CentroidError, RuleCentroid, RuleCentroids};
use crate::cache::{EmbeddingCache, RuleEmbeddings};
use crate::dataset::Dataset;
use crate::text::normalize;

/// Builds one [`RuleCentroid`] per dataset rule with at least one embedded example per class.
///
/// Every row of a rule contributes its examples. Examples whose normalized text is not in
/// `cache` are dropped; rules left without positives or negatives are omitted from the result.
pub fn build_rule_centroids(
    dataset: &Dataset,
    cache: &EmbeddingCache,
    rule_embeddings: &RuleEmbeddings,
) -> RuleCentroids {
    let rules = dataset.rules();
    info!(rules = rules.len(), "Building rule centroids");

    let mut centroids = RuleCentroids::new();

    for rule in rules {
        let mut positives: Vec<&[f32]> = Vec::new();
        let mut negatives: Vec<&[f32]> = Vec::new();

        for row in dataset.rows_for_rule(rule) {
            positives.extend(row.positive_examples().filter_map(|ex| cache.get(&normalize(ex))));
            negatives.extend(row.negative_examples().filter_map(|ex| cache.get(&normalize(ex))));
        }

        match RuleCentroid::from_examples(&positives, &negatives) {
            Ok(centroid) => {
                debug!(
                    rule,
                    positive_count = centroid.positive_count(),
                    negative_count = centroid.negative_count(),
                    "Built centroid"
                );
                let rule_embedding = rule_embeddings.get(rule).cloned();
                centroids.insert(rule, centroid.with_rule_embedding(rule_embedding));
            }
            Err(reason @ CentroidError::NoExamples(_)) => {
                debug!(rule, %reason, "Skipping rule");
            }
            Err(reason) => {
                warn!(rule, %reason, "Skipping rule");
            }
        }
    }

    info!(centroids = centroids.len(), "Created centroids");
    centroids
}
