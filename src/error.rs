use embedding::EmbeddingError;
use tagger::TaggerError;
use thiserror::Error;

use crate::config::ConfigLoadError;

/// Per-request failures raised while running the pipeline.
///
/// Everything here is caught at the service boundary and turned into a
/// structured response; none of it leaves shared state behind.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Body missing, not JSON, or `tokens` absent or not a list of strings.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The feature tensor does not have the width the model expects.
    #[error("input shape mismatch: model expects {expected} features per token, got {found}")]
    InputShape { expected: usize, found: usize },
    /// The model failed at runtime or returned malformed output.
    #[error("inference failed: {0}")]
    Inference(#[source] TaggerError),
}

impl PipelineError {
    /// True when the model resource is unusable rather than the request bad.
    pub fn is_resource_failure(&self) -> bool {
        matches!(self, PipelineError::Inference(_))
    }
}

impl From<TaggerError> for PipelineError {
    fn from(err: TaggerError) -> Self {
        match err {
            TaggerError::InputShape { expected, found } => {
                PipelineError::InputShape { expected, found }
            }
            other => PipelineError::Inference(other),
        }
    }
}

/// Startup failures. Any of these means the process must not serve traffic.
#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[error("embedding table: {0}")]
    Embeddings(#[from] EmbeddingError),
    #[error("model artifact: {0}")]
    Model(#[source] TaggerError),
    #[error("label table: {0}")]
    Labels(#[source] TaggerError),
    #[error("configuration: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("interaction log: {0}")]
    InteractionLog(#[from] std::io::Error),
    /// The embedding width and the model input width disagree.
    #[error("embedding dimension {embedding} does not match model input dimension {model}")]
    DimensionMismatch { embedding: usize, model: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_errors_stay_request_level() {
        let err: PipelineError = TaggerError::InputShape {
            expected: 50,
            found: 3,
        }
        .into();
        assert!(matches!(
            err,
            PipelineError::InputShape {
                expected: 50,
                found: 3
            }
        ));
        assert!(!err.is_resource_failure());
    }

    #[test]
    fn runtime_errors_are_resource_failures() {
        let err: PipelineError = TaggerError::Inference("session died".into()).into();
        assert!(err.is_resource_failure());
        assert!(err.to_string().contains("session died"));
    }

    #[test]
    fn dimension_mismatch_message() {
        let err = ResourceLoadError::DimensionMismatch {
            embedding: 50,
            model: 100,
        };
        assert!(err.to_string().contains("50"));
        assert!(err.to_string().contains("100"));
    }
}
