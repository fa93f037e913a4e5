use std::fmt;
use std::sync::Arc;

use embedding::{EmbeddingLookup, EmbeddingStats, EmbeddingStore};
use serde::Serialize;
use serde_json::Value;
use tagger::{InferenceEngine, LabelCodec};

use crate::config::PipelineConfig;
use crate::interaction::{Interaction, InteractionSink, JsonLinesSink, TracingSink};
use crate::tokens::{self, TokenSequence};
use crate::vectorize::vectorize;
use crate::{PipelineError, ResourceLoadError};

/// Request lifecycle. `Error` is reachable from every other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Vectorized,
    Scored,
    Decoded,
    Responded,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Vectorized => "vectorized",
            Stage::Scored => "scored",
            Stage::Decoded => "decoded",
            Stage::Responded => "responded",
            Stage::Error => "error",
        };
        f.write_str(name)
    }
}

/// Tokens echoed back with one tag per token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub tokens: Vec<String>,
    pub tags: Vec<String>,
    /// Tokens whose class index had no tag and got the sentinel instead.
    #[serde(skip)]
    pub unknown_labels: usize,
}

/// Static description of the loaded resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub embeddings: EmbeddingStats,
    pub model_input_dim: usize,
    pub num_classes: usize,
    pub tags: Vec<String>,
}

/// Runs one request through normalize → vectorize → score → decode.
///
/// Holds the process-wide, read-only resources. Cloning is cheap and shares
/// them, so one instance can serve any number of concurrent requests.
#[derive(Clone)]
pub struct PredictionService {
    store: Arc<dyn EmbeddingLookup>,
    engine: Arc<InferenceEngine>,
    codec: Arc<LabelCodec>,
    sink: Arc<dyn InteractionSink>,
}

impl fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionService")
            .field("embedding_dimension", &self.store.dimension())
            .field("engine", &self.engine)
            .field("labels", &self.codec.len())
            .finish()
    }
}

impl PredictionService {
    /// Assemble a service from already-loaded resources. Interactions go to
    /// [`TracingSink`] until [`with_sink`](Self::with_sink) says otherwise.
    pub fn new(
        store: Arc<dyn EmbeddingLookup>,
        engine: Arc<InferenceEngine>,
        codec: Arc<LabelCodec>,
    ) -> Self {
        Self {
            store,
            engine,
            codec,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn InteractionSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Load every resource named in `config`.
    ///
    /// Fails if anything is missing, corrupt, or if the embedding width
    /// disagrees with the model input width.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ResourceLoadError> {
        config.validate()?;

        let codec = config
            .labels
            .build_codec()
            .map_err(ResourceLoadError::Labels)?;
        let store = EmbeddingStore::load(&config.embeddings.path, config.embeddings.dimension)?;
        let engine = InferenceEngine::load(&config.model.path).map_err(ResourceLoadError::Model)?;

        if store.dimension() != engine.input_dim() {
            return Err(ResourceLoadError::DimensionMismatch {
                embedding: store.dimension(),
                model: engine.input_dim(),
            });
        }
        if engine.num_classes() <= codec.entries().iter().map(|e| e.index).max().unwrap_or(0) {
            tracing::warn!(
                num_classes = engine.num_classes(),
                labels = codec.len(),
                "label table references class indices the model never emits"
            );
        }

        let sink: Arc<dyn InteractionSink> = match &config.interaction_log {
            Some(path) => Arc::new(JsonLinesSink::open(path)?),
            None => Arc::new(TracingSink),
        };

        tracing::info!(
            vocab_size = store.len(),
            dimension = store.dimension(),
            num_classes = engine.num_classes(),
            labels = codec.len(),
            "prediction service ready"
        );

        Ok(Self::new(Arc::new(store), Arc::new(engine), Arc::new(codec)).with_sink(sink))
    }

    /// Handle a raw request body: parse, validate, predict.
    pub fn predict_json(&self, body: &[u8]) -> Result<Prediction, PipelineError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| PipelineError::InvalidInput(format!("malformed JSON body: {err}")))
            .inspect_err(|err| log_failure(Stage::Received, err))?;
        self.predict_value(&value)
    }

    /// Handle an already-parsed request body.
    pub fn predict_value(&self, body: &Value) -> Result<Prediction, PipelineError> {
        let object = body
            .as_object()
            .ok_or_else(|| {
                PipelineError::InvalidInput("request body must be a JSON object".to_string())
            })
            .inspect_err(|err| log_failure(Stage::Received, err))?;
        let tokens = tokens::normalize(object.get("tokens"))
            .inspect_err(|err| log_failure(Stage::Received, err))?;
        self.run(tokens)
    }

    /// Predict for typed tokens; they are lowercased first.
    pub fn predict<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Prediction, PipelineError> {
        self.run(tokens::normalize_strs(tokens))
    }

    /// Run a validated token sequence to completion.
    pub fn run(&self, tokens: TokenSequence) -> Result<Prediction, PipelineError> {
        tracing::trace!(stage = %Stage::Validated, tokens = tokens.len());

        let features = vectorize(&tokens, self.store.as_ref(), self.engine.input_dim())
            .inspect_err(|err| log_failure(Stage::Validated, err))?;
        tracing::trace!(stage = %Stage::Vectorized, shape = ?features.shape());

        let classes = self
            .engine
            .classify(&features)
            .map_err(PipelineError::from)
            .inspect_err(|err| log_failure(Stage::Vectorized, err))?;
        tracing::trace!(stage = %Stage::Scored, rows = classes.len());

        let decoded = self.codec.decode_all(classes);
        tracing::trace!(stage = %Stage::Decoded, unknown = decoded.unknown);

        let prediction = Prediction {
            tokens: tokens.into_inner(),
            tags: decoded.tags,
            unknown_labels: decoded.unknown,
        };

        let entry = Interaction::new(prediction.tokens.clone(), prediction.tags.clone());
        if let Err(err) = self.sink.record(&entry) {
            tracing::warn!(error = %err, "failed to record interaction");
        }
        tracing::trace!(stage = %Stage::Responded);

        Ok(prediction)
    }

    pub fn summary(&self) -> ServiceSummary {
        ServiceSummary {
            embeddings: self.store.stats(),
            model_input_dim: self.engine.input_dim(),
            num_classes: self.engine.num_classes(),
            tags: self.codec.tags().map(str::to_string).collect(),
        }
    }

    pub fn codec(&self) -> &LabelCodec {
        &self.codec
    }
}

fn log_failure(from: Stage, err: &PipelineError) {
    if err.is_resource_failure() {
        tracing::error!(from = %from, to = %Stage::Error, error = %err, "model resource failure");
    } else {
        tracing::debug!(from = %from, to = %Stage::Error, error = %err, "request rejected");
    }
}
