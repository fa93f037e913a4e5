use crate::state::ServerState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Pin the uptime origin. Called before the listener is bound so uptime
/// counts from startup, not from the first health check.
pub fn mark_started() -> SystemTime {
    *once_cell::sync::Lazy::force(&SERVER_START_TIME)
}

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "nertag-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// 200 with a summary of the loaded resources while the model is healthy,
/// 503 once an inference failure has taken it out of rotation.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let healthy = state.is_model_healthy();
    let (status, label) = if healthy {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    let body = Json(json!({
        "status": label,
        "service": "nertag-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "resources": state.service.summary(),
    }));

    (status, body)
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    match (&state.metrics, state.config.metrics_enabled) {
        (Some(handle), true) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        _ => (
            StatusCode::OK,
            Json(json!({ "uptime_seconds": uptime_seconds() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_time_is_fixed_before_first_request() {
        let started = mark_started();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let _ = health_check().await;
        assert_eq!(mark_started(), started);
        assert!(started.elapsed().unwrap() >= std::time::Duration::from_millis(20));
    }
}
