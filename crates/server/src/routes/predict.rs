use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use nertag::Prediction;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Response for a successful prediction
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Input tokens after lowercasing
    pub tokens: Vec<String>,
    /// One tag per token, in input order
    pub tags: Vec<String>,
    /// Same as `tags`, kept for older clients
    pub predictions: Vec<String>,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            predictions: prediction.tags.clone(),
            tokens: prediction.tokens,
            tags: prediction.tags,
        }
    }
}

/// Tag every token in the request body.
///
/// The body is read raw and parsed by the pipeline so malformed JSON, a
/// non-object body, or a bad `tokens` field all come back as the same
/// structured 400. A body over the configured limit is a structured 413.
/// Scoring runs on the blocking pool.
///
/// # Example
/// ```json
/// // Request
/// { "tokens": ["Bob", "Ross", "was", "an", "artist", "."] }
///
/// // Response
/// {
///   "tokens": ["bob", "ross", "was", "an", "artist", "."],
///   "tags": ["B-O", "B-AC", "B-LF", "I-LF", "B-O", "B-O"],
///   "predictions": ["B-O", "B-AC", "B-LF", "I-LF", "B-O", "B-O"]
/// }
/// ```
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Json<PredictResponse>> {
    if !state.is_model_healthy() {
        record_outcome("unavailable");
        return Err(ServerError::ModelUnavailable);
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            record_outcome("payload_too_large");
            return Err(ServerError::PayloadTooLarge {
                limit_mb: state.config.max_body_size_mb,
            });
        }
        Err(rejection) => {
            record_outcome("invalid_input");
            return Err(ServerError::InvalidInput(rejection.body_text()));
        }
    };

    let start = Instant::now();
    let service = Arc::clone(&state.service);
    let result = tokio::task::spawn_blocking(move || service.predict_json(&body)).await?;
    metrics::histogram!("nertag_predict_duration_seconds").record(start.elapsed().as_secs_f64());

    match result {
        Ok(prediction) => {
            record_outcome("ok");
            metrics::counter!("nertag_tokens_total").increment(prediction.tokens.len() as u64);
            if prediction.unknown_labels > 0 {
                metrics::counter!("nertag_unknown_labels_total")
                    .increment(prediction.unknown_labels as u64);
            }
            Ok(Json(prediction.into()))
        }
        Err(err) if err.is_resource_failure() => {
            record_outcome("inference_error");
            state.mark_model_unhealthy();
            Err(err.into())
        }
        Err(err) => {
            record_outcome("invalid_input");
            Err(err.into())
        }
    }
}

/// 405 for any non-POST method on the predict paths.
pub async fn method_not_allowed() -> ServerError {
    record_outcome("method_not_allowed");
    ServerError::MethodNotAllowed
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("nertag_requests_total", "outcome" => outcome).increment(1);
}
