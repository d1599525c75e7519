use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ScoringError;
use crate::vector::euclidean_distance;

/// Distance used to compare a query against the two centroids of a rule.
///
/// Euclidean is the default and the only validated metric; new metrics are added as variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
}

impl DistanceMetric {
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Euclidean => euclidean_distance(a, b),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            _ => Err(ScoringError::UnsupportedMetric {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one query against one rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViolationScore {
    /// `distance_to_negative - distance_to_positive`; positive means closer to violations.
    pub violation_score: f32,
    /// `violation_score > 0`. Ties classify as compliant.
    pub is_violation: bool,
    /// `|violation_score| / max(distance_to_positive, distance_to_negative)`, or `0.0` when
    /// both distances are zero.
    pub confidence: f32,
    pub distance_to_positive: f32,
    pub distance_to_negative: f32,
}

impl ViolationScore {
    pub fn from_distances(distance_to_positive: f32, distance_to_negative: f32) -> Self {
        let violation_score = distance_to_negative - distance_to_positive;
        let max_distance = distance_to_positive.max(distance_to_negative);
        let confidence = if max_distance > 0.0 {
            violation_score.abs() / max_distance
        } else {
            0.0
        };

        Self {
            violation_score,
            is_violation: violation_score > 0.0,
            confidence,
            distance_to_positive,
            distance_to_negative,
        }
    }
}

impl fmt::Display for ViolationScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (score: {:.4}, confidence: {:.4})",
            if self.is_violation {
                "VIOLATION"
            } else {
                "COMPLIANT"
            },
            self.violation_score,
            self.confidence
        )
    }
}

/// One scored dataset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub row_id: String,
    pub violation_score: f32,
    pub is_violation: bool,
    pub confidence: f32,
}

impl PredictionRecord {
    pub fn new(row_id: impl Into<String>, score: &ViolationScore) -> Self {
        Self {
            row_id: row_id.into(),
            violation_score: score.violation_score,
            is_violation: score.is_violation,
            confidence: score.confidence,
        }
    }
}
