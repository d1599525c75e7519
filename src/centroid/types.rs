use std::collections::BTreeMap;

use thiserror::Error;

use crate::embedding::Embedding;
use crate::vector::{mean, normalize_in_place};

/// Which example class a centroid summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleClass {
    /// Violating examples.
    Positive,
    /// Compliant examples.
    Negative,
}

impl std::fmt::Display for ExampleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExampleClass::Positive => f.write_str("positive"),
            ExampleClass::Negative => f.write_str("negative"),
        }
    }
}

/// Why a centroid could not be built. The builder treats all of these as "skip the rule".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CentroidError {
    #[error("no embedded {0} examples")]
    NoExamples(ExampleClass),

    #[error("{0} examples disagree on embedding dimension")]
    DimensionMismatch(ExampleClass),

    #[error("{0} examples average to the zero vector")]
    DegenerateMean(ExampleClass),
}

/// Per-rule violation and compliance centroids.
///
/// Both centroids have unit length and both counts are at least one; the only constructor,
/// [`RuleCentroid::from_examples`], refuses inputs that would break either property.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCentroid {
    positive: Embedding,
    negative: Embedding,
    positive_count: usize,
    negative_count: usize,
    rule_embedding: Option<Embedding>,
}

impl RuleCentroid {
    /// Averages each example set and normalizes the means to unit length.
    pub fn from_examples(positives: &[&[f32]], negatives: &[&[f32]]) -> Result<Self, CentroidError> {
        let positive = unit_centroid(positives, ExampleClass::Positive)?;
        let negative = unit_centroid(negatives, ExampleClass::Negative)?;

        if positive.len() != negative.len() {
            return Err(CentroidError::DimensionMismatch(ExampleClass::Negative));
        }

        Ok(Self {
            positive,
            negative,
            positive_count: positives.len(),
            negative_count: negatives.len(),
            rule_embedding: None,
        })
    }

    /// Attaches the embedding of the rule's own text.
    pub fn with_rule_embedding(mut self, rule_embedding: Option<Embedding>) -> Self {
        self.rule_embedding = rule_embedding;
        self
    }

    /// Unit-length mean of the violating examples.
    pub fn positive(&self) -> &[f32] {
        &self.positive
    }

    /// Unit-length mean of the compliant examples.
    pub fn negative(&self) -> &[f32] {
        &self.negative
    }

    pub fn positive_count(&self) -> usize {
        self.positive_count
    }

    pub fn negative_count(&self) -> usize {
        self.negative_count
    }

    pub fn rule_embedding(&self) -> Option<&[f32]> {
        self.rule_embedding.as_deref()
    }

    pub fn dim(&self) -> usize {
        self.positive.len()
    }
}

fn unit_centroid(examples: &[&[f32]], class: ExampleClass) -> Result<Embedding, CentroidError> {
    if examples.is_empty() {
        return Err(CentroidError::NoExamples(class));
    }
    let mut centroid = mean(examples).ok_or(CentroidError::DimensionMismatch(class))?;
    if !normalize_in_place(&mut centroid) {
        return Err(CentroidError::DegenerateMean(class));
    }
    Ok(centroid)
}

/// Rule id → centroid, iterated in rule-id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCentroids {
    entries: BTreeMap<String, RuleCentroid>,
}

impl RuleCentroids {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule: impl Into<String>, centroid: RuleCentroid) {
        self.entries.insert(rule.into(), centroid);
    }

    pub fn get(&self, rule: &str) -> Option<&RuleCentroid> {
        self.entries.get(rule)
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.entries.contains_key(rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleCentroid)> {
        self.entries.iter().map(|(rule, c)| (rule.as_str(), c))
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
