//! End-to-end batch pipeline tests: dataset file in, submission file out.

mod common;

use common::fixtures::{
    RULE_ADS, RULE_LEGAL, ads_dataset, clustered_provider, jsonl_row, write_jsonl,
};
use sentinel::dataset::{Dataset, write_submission};
use sentinel::embedding::SentenceEncoder;
use sentinel::pipeline::run_batch;
use sentinel::scoring::ViolationPredictor;
use tempfile::TempDir;

#[test]
fn test_batch_scores_every_row() {
    let provider = clustered_provider();
    let outcome = run_batch(&ads_dataset(), &provider, 2, &ViolationPredictor::default())
        .expect("batch should succeed");

    assert_eq!(outcome.records.len(), 3);
    assert!(outcome.omitted.is_empty());

    let by_id = |id: &str| {
        outcome
            .records
            .iter()
            .find(|r| r.row_id == id)
            .expect("record present")
    };
    assert!(by_id("100").is_violation);
    assert!(!by_id("101").is_violation);
    assert!(by_id("102").is_violation, "masked URL body should score as an ad");
}

#[test]
fn test_batch_sends_each_text_once() {
    let provider = clustered_provider();
    run_batch(&ads_dataset(), &provider, 2, &ViolationPredictor::default()).unwrap();

    for text in ["spam link", "buy now", "hello friend", "nice weather"] {
        assert_eq!(provider.times_requested(text), 1, "{text} requested more than once");
    }
    assert_eq!(provider.call_count(), 2);
}

#[test]
fn test_jsonl_to_csv_submission() {
    let dir = TempDir::new().unwrap();
    let input = write_jsonl(
        dir.path(),
        "test.jsonl",
        &[
            jsonl_row(serde_json::json!(1), RULE_ADS, "cheap pills"),
            jsonl_row(serde_json::json!("2"), RULE_ADS, "good morning"),
            serde_json::json!({
                "row_id": 3,
                "body": "you should sue them",
                "rule": RULE_LEGAL,
                "positive_example_1": "file a lawsuit",
            }),
        ],
    );

    let dataset = Dataset::load_jsonl(&input).unwrap();
    let outcome = run_batch(
        &dataset,
        &clustered_provider(),
        8,
        &ViolationPredictor::default(),
    )
    .unwrap();
    assert_eq!(outcome.omitted, vec!["3".to_string()]);

    let output = dir.path().join("submission.csv");
    write_submission(&output, &outcome.records).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "row_id,rule_violation");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("1,"));
    assert!(lines[2].starts_with("2,"));

    let score: f32 = lines[1].split(',').nth(1).unwrap().parse().unwrap();
    assert!(score > 0.0);
}

#[test]
fn test_jsonl_submission_keeps_full_records() {
    let dir = TempDir::new().unwrap();
    let outcome = run_batch(
        &ads_dataset(),
        &clustered_provider(),
        8,
        &ViolationPredictor::default(),
    )
    .unwrap();

    let output = dir.path().join("predictions.jsonl");
    write_submission(&output, &outcome.records).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    let first: serde_json::Value = serde_json::from_str(written.lines().next().unwrap()).unwrap();
    assert_eq!(first["row_id"], "100");
    assert_eq!(first["is_violation"], true);
    assert!(first["confidence"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_stub_encoder_runs_whole_pipeline() {
    let encoder = SentenceEncoder::stub().unwrap();
    assert!(encoder.is_stub());

    let predictor = ViolationPredictor::default();
    let first = run_batch(&ads_dataset(), &encoder, 2, &predictor).unwrap();
    let second = run_batch(&ads_dataset(), &encoder, 2, &predictor).unwrap();

    assert_eq!(first.records.len(), 3);
    assert_eq!(first.records, second.records);
    for record in &first.records {
        assert!((0.0..=1.0).contains(&record.confidence));
    }
}
