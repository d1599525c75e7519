//! Violation scoring by relative distance to a rule's centroids.
//!
//! A query is scored against a [`RuleCentroid`](crate::centroid::RuleCentroid) as
//! `distance(query, negative) - distance(query, positive)`: positive scores mean the query sits
//! closer to the rule's violating examples than to its compliant ones. The score is relative,
//! not a calibrated probability, and the confidence is a heuristic in `[0, 1]`.
//!
//! Batch prediction is best-effort: rows whose rule has no centroid, or whose body has no
//! embedding, are left out of the output rather than failing the run.
//! [`omitted_row_ids`] reports which rows were skipped.

pub mod error;
pub mod predictor;
pub mod types;


pub use error::ScoringError;
pub use predictor::{ViolationPredictor, omitted_row_ids};
pub use types::{DistanceMetric, PredictionRecord, ViolationScore};
