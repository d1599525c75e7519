//! Shared datasets and providers for integration tests.

use std::path::{Path, PathBuf};

use sentinel::dataset::{Dataset, DatasetRow};
use sentinel::embedding::MockEmbeddingProvider;

pub const RULE_ADS: &str = "No advertising";
pub const RULE_LEGAL: &str = "No legal advice";

/// Three-dimensional provider: ad-like texts near the x axis, friendly texts near the y axis.
pub fn clustered_provider() -> MockEmbeddingProvider {
    MockEmbeddingProvider::new(3)
        .with_embedding("spam link", &[1.0, 0.05, 0.0])
        .with_embedding("buy now", &[1.0, -0.05, 0.0])
        .with_embedding("hello friend", &[0.05, 1.0, 0.0])
        .with_embedding("nice weather", &[-0.05, 1.0, 0.0])
        .with_embedding("cheap pills", &[0.9, 0.1, 0.0])
        .with_embedding("good morning", &[0.1, 0.9, 0.0])
        .with_embedding("check <url>: (deals.example.com/promo/summer)", &[0.95, 0.0, 0.1])
}

pub fn ads_row(row_id: &str, body: &str) -> DatasetRow {
    DatasetRow::new(row_id, RULE_ADS)
        .with_body(body)
        .with_positives(&["spam link", "buy now"])
        .with_negatives(&["hello friend", "nice weather"])
}

pub fn ads_dataset() -> Dataset {
    Dataset::new(vec![
        ads_row("100", "cheap pills"),
        ads_row("101", "good morning"),
        ads_row(
            "102",
            "check https://www.deals.example.com/promo/summer/sale?id=7",
        ),
    ])
    .expect("fixture dataset is valid")
}

/// Writes `lines` as a JSONL file inside `dir`.
pub fn write_jsonl(dir: &Path, name: &str, lines: &[serde_json::Value]) -> PathBuf {
    let path = dir.join(name);
    let body: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
    std::fs::write(&path, body.join("\n")).expect("write fixture");
    path
}

pub fn jsonl_row(row_id: serde_json::Value, rule: &str, body: &str) -> serde_json::Value {
    serde_json::json!({
        "row_id": row_id,
        "body": body,
        "rule": rule,
        "positive_example_1": "spam link",
        "positive_example_2": "buy now",
        "negative_example_1": "hello friend",
        "negative_example_2": null,
    })
}
