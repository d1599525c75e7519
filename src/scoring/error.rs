use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("unsupported distance metric '{name}' (supported: euclidean)")]
    UnsupportedMetric { name: String },
}
