use crate::config::ServerConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use nertag::PredictionService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Embedding store, model and label codec (shared across requests)
    pub service: Arc<PredictionService>,

    /// Cleared after a resource-level inference failure
    model_healthy: Arc<AtomicBool>,

    /// Renders `/metrics`; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(config: ServerConfig, service: PredictionService) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            model_healthy: Arc::new(AtomicBool::new(true)),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn is_model_healthy(&self) -> bool {
        self.model_healthy.load(Ordering::Acquire)
    }

    /// Take the model out of rotation. Readiness reports 503 from here on.
    pub fn mark_model_unhealthy(&self) {
        if self.model_healthy.swap(false, Ordering::AcqRel) {
            tracing::error!("model marked unhealthy; readiness will report unavailable");
        }
    }
}
