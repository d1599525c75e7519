use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::error::GatewayError;
use super::state::AppState;
use super::SENTINEL_STATUS_HEADER;
use crate::pipeline::{RequestOutcome, ViolationRequest};

/// Whether a prediction carries a score, and why not when it doesn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictStatus {
    Scored,
    InsufficientExamples,
    EmptyText,
}

impl PredictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictStatus::Scored => "scored",
            PredictStatus::InsufficientExamples => "insufficient_examples",
            PredictStatus::EmptyText => "empty_text",
        }
    }
}

/// Body returned by `/predict` and by each non-failed `/batch_predict` entry.
///
/// The score fields are `null` unless `status` is `scored`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub text: String,
    pub rule: String,
    pub status: PredictStatus,
    pub violation_score: Option<f32>,
    pub is_violation: Option<bool>,
    pub confidence: Option<f32>,
}

impl PredictResponse {
    fn new(request: ViolationRequest, outcome: &RequestOutcome) -> Self {
        let status = match outcome {
            RequestOutcome::Scored(_) => PredictStatus::Scored,
            RequestOutcome::InsufficientExamples => PredictStatus::InsufficientExamples,
            RequestOutcome::EmptyText => PredictStatus::EmptyText,
        };
        let score = outcome.score();

        Self {
            text: request.text,
            rule: request.rule,
            status,
            violation_score: score.map(|s| s.violation_score),
            is_violation: score.map(|s| s.is_violation),
            confidence: score.map(|s| s.confidence),
        }
    }
}

/// One `/batch_predict` entry: a prediction, or the provider error that stopped this item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Predicted(PredictResponse),
    Failed { error: String },
}

#[instrument(skip(state, request), fields(request_id = %Uuid::new_v4(), rule = %request.rule))]
pub async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<ViolationRequest>,
) -> Result<Response, GatewayError> {
    if request.rule.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("rule must not be empty".to_string()));
    }

    let (request, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = state.score(&request);
        (request, outcome)
    })
    .await
    .map_err(|e| GatewayError::InternalError(e.to_string()))?;
    let outcome = outcome?;

    let prediction = PredictResponse::new(request, &outcome);
    match outcome.score() {
        Some(score) => info!(
            violation_score = score.violation_score,
            is_violation = score.is_violation,
            "Scored request"
        ),
        None => info!(status = prediction.status.as_str(), "Request not scored"),
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        SENTINEL_STATUS_HEADER,
        HeaderValue::from_static(prediction.status.as_str()),
    );

    Ok((headers, Json(prediction)).into_response())
}

/// Scores every entry independently; a provider failure becomes `{"error": ...}` in place.
#[instrument(skip(state, requests), fields(request_id = %Uuid::new_v4(), count = requests.len()))]
pub async fn batch_predict_handler(
    State(state): State<AppState>,
    Json(requests): Json<Vec<ViolationRequest>>,
) -> Result<Json<Vec<BatchItem>>, GatewayError> {
    let items = tokio::task::spawn_blocking(move || {
        requests
            .into_iter()
            .map(|request| match state.score(&request) {
                Ok(outcome) => BatchItem::Predicted(PredictResponse::new(request, &outcome)),
                Err(e) => {
                    debug!(rule = %request.rule, error = %e, "Batch item failed");
                    BatchItem::Failed {
                        error: e.to_string(),
                    }
                }
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| GatewayError::InternalError(e.to_string()))?;

    let failed = items
        .iter()
        .filter(|item| matches!(item, BatchItem::Failed { .. }))
        .count();
    info!(total = items.len(), failed, "Scored batch");

    Ok(Json(items))
}
