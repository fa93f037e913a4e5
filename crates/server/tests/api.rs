//! HTTP-level tests for the prediction endpoint
//!
//! The router is driven in-process with `oneshot`; the embedding store and
//! model are counting doubles so tests can assert the pipeline was or was not
//! reached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use nertag::{
    EmbeddingLookup, FeatureTensor, InferenceEngine, LabelCodec, PredictionService, TagModel,
    TaggerError,
};
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

const DIM: usize = 3;

struct CountingStore {
    zero: Vec<f32>,
    unit: Vec<f32>,
    calls: AtomicUsize,
}

impl EmbeddingLookup for CountingStore {
    fn dimension(&self) -> usize {
        DIM
    }

    fn lookup(&self, token: &str) -> &[f32] {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if token == "bob" {
            &self.unit
        } else {
            &self.zero
        }
    }

    fn vocab_size(&self) -> usize {
        1
    }
}

/// Class for row `i` is `script[i % len]`.
struct ScriptedModel {
    script: Vec<usize>,
    fail: bool,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl TagModel for ScriptedModel {
    fn input_dim(&self) -> usize {
        DIM
    }

    fn num_classes(&self) -> usize {
        100
    }

    fn forward(&self, features: &FeatureTensor) -> Result<Vec<Vec<f32>>, TaggerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        if self.fail {
            return Err(TaggerError::Inference("runtime detail 0xdeadbeef".into()));
        }
        Ok((0..features.rows())
            .map(|i| {
                let mut row = vec![0.0; 100];
                row[self.script[i % self.script.len()]] = 1.0;
                row
            })
            .collect())
    }
}

struct TestApp {
    router: Router,
    store: Arc<CountingStore>,
    model_calls: Arc<AtomicUsize>,
}

fn app_with(script: Vec<usize>, fail: bool) -> TestApp {
    app_with_config(ServerConfig::default(), script, fail, Duration::ZERO)
}

fn app_with_config(
    config: ServerConfig,
    script: Vec<usize>,
    fail: bool,
    delay: Duration,
) -> TestApp {
    let store = Arc::new(CountingStore {
        zero: vec![0.0; DIM],
        unit: vec![1.0; DIM],
        calls: AtomicUsize::new(0),
    });
    let model_calls = Arc::new(AtomicUsize::new(0));
    let engine = InferenceEngine::new(ScriptedModel {
        script,
        fail,
        delay,
        calls: Arc::clone(&model_calls),
    });
    let service = PredictionService::new(
        store.clone(),
        Arc::new(engine),
        Arc::new(LabelCodec::default()),
    );
    let state = ServerState::new(config, service);

    TestApp {
        router: build_router(Arc::new(state)),
        store,
        model_calls,
    }
}

fn app() -> TestApp {
    app_with(vec![1, 2, 3, 4], false)
}

async fn send(router: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(router: &Router, body: &str) -> (StatusCode, Value) {
    send(router, Method::POST, "/predict", body).await
}

#[tokio::test]
async fn bob_ross_sentence() {
    let app = app();
    let (status, body) = post(
        &app.router,
        r#"{"tokens": ["Bob", "Ross", "was", "an", "artist", "."]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["tokens"],
        json!(["bob", "ross", "was", "an", "artist", "."])
    );
    assert_eq!(
        body["tags"],
        json!(["B-O", "B-AC", "B-LF", "I-LF", "B-O", "B-AC"])
    );
    assert_eq!(body["predictions"], body["tags"]);
    assert_eq!(app.store.calls.load(Ordering::SeqCst), 6);
    assert_eq!(app.model_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn trailing_slash_path() {
    let app = app();
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/predict/",
        r#"{"tokens": ["bob"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!(["B-O"]));
}

#[tokio::test]
async fn empty_tokens_returns_empty_lists() {
    let app = app();
    let (status, body) = post(&app.router, r#"{"tokens": []}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokens"], json!([]));
    assert_eq!(body["tags"], json!([]));
    assert_eq!(app.model_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_tokens_is_400() {
    let app = app();
    let (status, body) = post(&app.router, "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(app.store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let app = app();
    for body in [
        "",
        "not json",
        r#"["bob"]"#,
        r#"{"tokens": "bob"}"#,
        r#"{"tokens": [1, 2]}"#,
        r#"{"tokens": null}"#,
    ] {
        let (status, response) = post(&app.router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(response["code"], "INVALID_INPUT", "body {body:?}");
    }
    assert_eq!(app.model_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn get_is_405_and_skips_pipeline() {
    let app = app();
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let (status, body) = send(&app.router, method.clone(), "/predict", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert!(body["error"].is_string());
        assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    }
    assert_eq!(app.store.calls.load(Ordering::SeqCst), 0);
    assert_eq!(app.model_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_body_is_structured_413() {
    let config = ServerConfig {
        max_body_size_mb: 1,
        ..ServerConfig::default()
    };
    let app = app_with_config(config, vec![1], false, Duration::ZERO);

    let filler = "x".repeat(2 * 1024 * 1024);
    let body = format!(r#"{{"tokens": ["{filler}"]}}"#);
    let (status, response) = post(&app.router, &body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response["error"].as_str().unwrap().contains("1 MB"));
    assert_eq!(response["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.store.calls.load(Ordering::SeqCst), 0);

    let (status, _) = post(&app.router, r#"{"tokens": ["bob"]}"#).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn slow_model_is_structured_408() {
    let config = ServerConfig {
        timeout_secs: 1,
        ..ServerConfig::default()
    };
    let app = app_with_config(config, vec![1], false, Duration::from_millis(1500));

    let (status, body) = post(&app.router, r#"{"tokens": ["bob"]}"#).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert!(body["error"].is_string());
    assert_eq!(body["code"], "REQUEST_TIMEOUT");
}

#[tokio::test]
async fn unknown_class_index_is_sentinel() {
    let app = app_with(vec![99], false);
    let (status, body) = post(&app.router, r#"{"tokens": ["bob", "ross"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!(["Unknown", "Unknown"]));
}

#[tokio::test]
async fn inference_failure_is_500_and_flips_readiness() {
    let app = app_with(vec![1], true);

    let (status, _) = send(&app.router, Method::GET, "/ready", "").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app.router, r#"{"tokens": ["bob"]}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INFERENCE_ERROR");
    assert!(!body["error"].as_str().unwrap().contains("deadbeef"));

    let (status, body) = send(&app.router, Method::GET, "/ready", "").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");

    let (status, body) = post(&app.router, r#"{"tokens": ["bob"]}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "MODEL_UNAVAILABLE");
    assert_eq!(app.model_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn bad_request_does_not_poison_later_requests() {
    let app = app();
    let (status, _) = post(&app.router, "{").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&app.router, r#"{"tokens": ["bob"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!(["B-O"]));

    let (status, _) = send(&app.router, Method::GET, "/ready", "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn readiness_reports_resources() {
    let app = app();
    let (status, body) = send(&app.router, Method::GET, "/ready", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["resources"]["embeddings"]["dimension"], DIM);
    assert_eq!(body["resources"]["embeddings"]["vocab_size"], 1);
    assert_eq!(body["resources"]["num_classes"], 100);
    assert_eq!(
        body["resources"]["tags"],
        json!(["B-O", "B-AC", "B-LF", "I-LF"])
    );
}

#[tokio::test]
async fn health_and_info() {
    let app = app();
    let (status, body) = send(&app.router, Method::GET, "/health", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app.router, Method::GET, "/", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "nertag");
}

#[tokio::test]
async fn metrics_without_recorder_falls_back_to_json() {
    let app = app();
    let (status, body) = send(&app.router, Method::GET, "/metrics", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = app();
    let (status, body) = send(&app.router, Method::GET, "/nope", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn concurrent_requests() {
    let app = app();
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let router = app.router.clone();
            tokio::spawn(async move {
                post(&router, r#"{"tokens": ["Bob", "Ross"]}"#).await
            })
        })
        .collect();

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tags"], json!(["B-O", "B-AC"]));
    }
    assert_eq!(app.model_calls.load(Ordering::SeqCst), 16);
}
