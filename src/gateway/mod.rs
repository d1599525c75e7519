//! HTTP gateway (Axum) for online violation scoring.
//!
//! This module is primarily used by the `sentinel serve` command.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{BatchItem, PredictResponse, PredictStatus, batch_predict_handler, predict_handler};
pub use state::AppState;

use crate::embedding::EmbeddingProvider;

/// Response header carrying the outcome of a request.
pub const SENTINEL_STATUS_HEADER: &str = "x-sentinel-status";
pub const SENTINEL_STATUS_HEALTHY: &str = "healthy";

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/healthz", get(health_handler))
        .route("/predict", post(predict_handler))
        .route("/batch_predict", post(batch_predict_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub version: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct MetricsResponse {
    pub model_path: Option<String>,
    pub model_loaded: bool,
    pub max_seq_length: usize,
    pub embedding_dim: usize,
    pub distance_metric: String,
    pub batch_size: usize,
    pub cached_embeddings: u64,
    pub started_at: DateTime<Utc>,
}

#[tracing::instrument(skip(state))]
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        SENTINEL_STATUS_HEADER,
        HeaderValue::from_static(SENTINEL_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: SENTINEL_STATUS_HEALTHY.to_string(),
            model_loaded: !state.provider.is_stub(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsResponse> {
    state.cache.run_pending_tasks();
    let config = &state.config;

    Json(MetricsResponse {
        model_path: config
            .model_path
            .as_ref()
            .map(|path| path.display().to_string()),
        model_loaded: !state.provider.is_stub(),
        max_seq_length: config.max_seq_len,
        embedding_dim: state.provider.embedding_dim(),
        distance_metric: state.predictor.metric().to_string(),
        batch_size: config.batch_size,
        cached_embeddings: state.cache.len(),
        started_at: state.started_at,
    })
}
