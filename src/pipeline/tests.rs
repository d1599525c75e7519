use super::*;
use crate::dataset::DatasetRow;
use crate::embedding::{MockEmbeddingProvider, MockFailure};

fn clustered_provider() -> MockEmbeddingProvider {
    MockEmbeddingProvider::new(3)
        .with_embedding("spam link", &[1.0, 0.05, 0.0])
        .with_embedding("buy now", &[1.0, -0.05, 0.0])
        .with_embedding("hello friend", &[0.05, 1.0, 0.0])
        .with_embedding("nice weather", &[-0.05, 1.0, 0.0])
        .with_embedding("cheap pills here", &[0.9, 0.1, 0.0])
        .with_embedding("good morning", &[0.1, 0.9, 0.0])
        .with_embedding("R", &[0.0, 0.0, 1.0])
}

fn scenario_dataset() -> Dataset {
    Dataset::new(vec![
        DatasetRow::new("1", "R")
            .with_body("cheap pills here")
            .with_positives(&["spam link", "buy now"])
            .with_negatives(&["hello friend", "nice weather"]),
        DatasetRow::new("2", "R")
            .with_body("good morning")
            .with_positives(&["spam link", "buy now"])
            .with_negatives(&["hello friend", "nice weather"]),
    ])
    .unwrap()
}

#[test]
fn test_run_batch_scenario() {
    let provider = clustered_provider();

    let outcome = run_batch(
        &scenario_dataset(),
        &provider,
        8,
        &ViolationPredictor::default(),
    )
    .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert!(outcome.omitted.is_empty());
    assert_eq!(outcome.rules_with_centroids, 1);
    assert_eq!(outcome.embedded_texts, 7);

    let spam = &outcome.records[0];
    assert_eq!(spam.row_id, "1");
    assert!(spam.is_violation);
    assert!(spam.violation_score > 0.0);

    let greeting = &outcome.records[1];
    assert!(!greeting.is_violation);
    assert!(greeting.violation_score < 0.0);
}

#[test]
fn test_run_batch_is_deterministic() {
    let dataset = scenario_dataset();
    let predictor = ViolationPredictor::default();

    let first = run_batch(&dataset, &clustered_provider(), 8, &predictor).unwrap();
    let second = run_batch(&dataset, &clustered_provider(), 8, &predictor).unwrap();

    assert_eq!(first.records, second.records);
}

#[test]
fn test_run_batch_reports_omitted_rows() {
    let dataset = Dataset::new(vec![
        DatasetRow::new("a", "R")
            .with_body("cheap pills here")
            .with_positives(&["spam link"])
            .with_negatives(&["hello friend"]),
        DatasetRow::new("b", "NoNegatives")
            .with_body("good morning")
            .with_positives(&["buy now"]),
        DatasetRow::new("c", "R"),
    ])
    .unwrap();

    let outcome = run_batch(
        &dataset,
        &clustered_provider(),
        8,
        &ViolationPredictor::default(),
    )
    .unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.omitted, vec!["b".to_string(), "c".to_string()]);
    assert!(outcome.records.len() + outcome.omitted.len() == dataset.len());
}

#[test]
fn test_run_batch_propagates_provider_failure() {
    let provider = MockEmbeddingProvider::new(3).with_failure(MockFailure::Unavailable);

    let result = run_batch(
        &scenario_dataset(),
        &provider,
        8,
        &ViolationPredictor::default(),
    );

    assert!(matches!(
        result,
        Err(EmbeddingError::ProviderUnavailable { .. })
    ));
}

#[test]
fn test_build_centroids_reuses_cache() {
    let provider = clustered_provider();
    let dataset = scenario_dataset();
    let mut cache = EmbeddingCache::new();

    let first = build_centroids(&dataset, &mut cache, &provider, 8).unwrap();
    let calls = provider.call_count();
    let second = build_centroids(&dataset, &mut cache, &provider, 8).unwrap();

    assert_eq!(provider.call_count(), calls);
    assert_eq!(first.centroids, second.centroids);
    assert!(first.rule_embeddings.contains_key("R"));
    assert!(first.centroids.get("R").unwrap().rule_embedding().is_some());
}

fn request(text: &str, positives: &[&str], negatives: &[&str]) -> ViolationRequest {
    ViolationRequest {
        text: text.to_string(),
        rule: "R".to_string(),
        positive_examples: positives.iter().map(|s| s.to_string()).collect(),
        negative_examples: negatives.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn test_score_request_violation() {
    let provider = clustered_provider();
    let mut cache = EmbeddingCache::new();

    let outcome = score_request(
        &request(
            "cheap pills here",
            &["spam link", "buy now"],
            &["hello friend", "nice weather"],
        ),
        &mut cache,
        &provider,
        8,
        &ViolationPredictor::default(),
    )
    .unwrap();

    let RequestOutcome::Scored(score) = outcome else {
        panic!("expected a score, got {outcome:?}");
    };
    assert!(score.is_violation);
    assert!(score.confidence > 0.0);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(cache.len(), 5);
}

#[test]
fn test_score_request_missing_class() {
    let provider = clustered_provider();
    let mut cache = EmbeddingCache::new();

    let outcome = score_request(
        &request("cheap pills here", &["spam link"], &["", ""]),
        &mut cache,
        &provider,
        8,
        &ViolationPredictor::default(),
    )
    .unwrap();

    assert_eq!(outcome, RequestOutcome::InsufficientExamples);
    assert!(outcome.score().is_none());
}

#[test]
fn test_score_request_empty_text() {
    let provider = clustered_provider();
    let mut cache = EmbeddingCache::new();

    let outcome = score_request(
        &request("", &["spam link"], &["hello friend"]),
        &mut cache,
        &provider,
        8,
        &ViolationPredictor::default(),
    )
    .unwrap();

    assert_eq!(outcome, RequestOutcome::EmptyText);
}

#[test]
fn test_score_request_normalizes_urls() {
    let provider = MockEmbeddingProvider::new(3);
    let mut cache = EmbeddingCache::new();

    score_request(
        &request(
            "visit https://www.example.com/a/b/c?x=1",
            &["spam link"],
            &["hello friend"],
        ),
        &mut cache,
        &provider,
        8,
        &ViolationPredictor::default(),
    )
    .unwrap();

    assert_eq!(
        provider.times_requested("visit <url>: (example.com/a/b)"),
        1
    );
}
