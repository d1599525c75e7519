//! HTTP tests against a live listener.

mod common;

use common::fixtures::{RULE_ADS, clustered_provider};
use common::harness::spawn_test_server;

fn predict_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "text": text,
        "rule": RULE_ADS,
        "positive_examples": ["spam link", "buy now"],
        "negative_examples": ["hello friend", "nice weather"],
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = spawn_test_server(clustered_provider())
        .await
        .expect("Server should start");

    let response = reqwest::get(format!("{}/healthz", server.url()))
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["x-sentinel-status"].to_str().unwrap(),
        "healthy"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_predict_round_trip() {
    let server = spawn_test_server(clustered_provider()).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/predict", server.url()))
        .json(&predict_body("cheap pills"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["rule"], RULE_ADS);
    assert_eq!(body["is_violation"], true);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = spawn_test_server(clustered_provider()).await.unwrap();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/predict", server.url()))
        .json(&serde_json::json!({ "text": "missing everything else" }))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_batch_then_metrics() {
    let server = spawn_test_server(clustered_provider()).await.unwrap();
    let client = reqwest::Client::new();

    let items: Vec<serde_json::Value> = client
        .post(format!("{}/batch_predict", server.url()))
        .json(&vec![predict_body("cheap pills"), predict_body("good morning")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["is_violation"], true);
    assert_eq!(items[1]["is_violation"], false);

    let metrics: serde_json::Value = client
        .get(format!("{}/metrics", server.url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(metrics["cached_embeddings"], 6);
    assert_eq!(metrics["distance_metric"], "euclidean");
    assert_eq!(metrics["embedding_dim"], 3);
}
