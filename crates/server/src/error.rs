use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nertag::PipelineError;
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("input shape mismatch: model expects {expected} features per token, got {found}")]
    InputShape { expected: usize, found: usize },

    #[error("method not allowed; use POST")]
    MethodNotAllowed,

    #[error("request body exceeds the {limit_mb} MB limit")]
    PayloadTooLarge { limit_mb: usize },

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The model failed at runtime. The cause is logged, not returned.
    #[error("model inference failed")]
    Inference,

    #[error("model is unavailable after an inference failure")]
    ModelUnavailable,

    #[error("Internal server error")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidInput(_) | ServerError::InputShape { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Inference | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::InvalidInput(_) => "INVALID_INPUT",
            ServerError::InputShape { .. } => "INPUT_SHAPE",
            ServerError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ServerError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ServerError::Timeout { .. } => "REQUEST_TIMEOUT",
            ServerError::Inference => "INFERENCE_ERROR",
            ServerError::ModelUnavailable => "MODEL_UNAVAILABLE",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let ServerError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "internal error");
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(message) => ServerError::InvalidInput(message),
            PipelineError::InputShape { expected, found } => {
                ServerError::InputShape { expected, found }
            }
            PipelineError::Inference(source) => {
                tracing::error!(error = %source, "inference failed");
                ServerError::Inference
            }
        }
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("prediction task failed: {err}"))
    }
}
