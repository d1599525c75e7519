//! Per-rule centroids of labeled example embeddings.
//!
//! For each rule, the embeddings of its violating examples and of its compliant examples are
//! averaged separately and each mean is rescaled to unit length, so distances to centroids of
//! different rules are on a common scale. Building is a pure function of the dataset and the
//! embedding cache.

pub mod builder;
pub mod types;


pub use builder::build_rule_centroids;
pub use types::{CentroidError, ExampleClass, RuleCentroid, RuleCentroids};
