use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the label codec and the inference engine.
#[derive(Debug, Error)]
pub enum TaggerError {
    /// The model artifact does not exist at the configured path.
    #[error("model file not found: {0}")]
    ModelNotFound(PathBuf),
    /// The artifact exists but could not be parsed or initialised.
    #[error("failed to load model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    /// Model parameters are internally inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// The artifact extension maps to no compiled-in backend.
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
    /// The label table has duplicate indices or tags, or is empty.
    #[error("invalid label table: {0}")]
    InvalidLabelTable(String),
    /// A feature tensor does not match the width the model was built for.
    #[error("input shape mismatch: model expects {expected} features per token, got {found}")]
    InputShape { expected: usize, found: usize },
    /// Runtime failure or malformed output from the model.
    #[error("inference failure: {0}")]
    Inference(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl TaggerError {
    /// Whether this error means the model itself is unusable, as opposed to a
    /// bad request.
    pub fn is_resource_failure(&self) -> bool {
        !matches!(self, TaggerError::InputShape { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_shape_is_not_a_resource_failure() {
        let err = TaggerError::InputShape {
            expected: 50,
            found: 25,
        };
        assert!(!err.is_resource_failure());
        assert!(err.to_string().contains("expects 50"));
    }

    #[test]
    fn inference_is_a_resource_failure() {
        assert!(TaggerError::Inference("boom".into()).is_resource_failure());
    }

    #[test]
    fn model_not_found_mentions_path() {
        let err = TaggerError::ModelNotFound(PathBuf::from("models/ner.json"));
        assert!(err.to_string().contains("models/ner.json"));
    }
}
