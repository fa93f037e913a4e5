//! Pipeline resource configuration.
//!
//! Tells the service where its startup resources live and which label table
//! the model was trained with. Paths are resolved relative to the working
//! directory; nothing is tied to a particular machine.
//!
//! ## Example YAML
//!
//! ```yaml
//! embeddings:
//!   path: "models/glove.6B.50d.txt"
//!   dimension: 50
//! model:
//!   path: "models/ner.json"
//! labels:
//!   unknown: "Unknown"
//!   table:
//!     - { index: 1, tag: "B-O" }
//!     - { index: 2, tag: "B-AC" }
//!     - { index: 3, tag: "B-LF" }
//!     - { index: 4, tag: "I-LF" }
//! interaction_log: "logs/interactions.jsonl"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tagger::{default_label_table, LabelCodec, LabelEntry, TaggerError, UNKNOWN_TAG};
use thiserror::Error;

/// Errors that can occur when loading pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Everything the prediction service needs at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub labels: LabelsConfig,

    /// JSON-lines file for interaction records. `None` logs them through
    /// `tracing` instead.
    #[serde(default)]
    pub interaction_log: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_embeddings_path")]
    pub path: PathBuf,

    /// Expected vector width. Inferred from the file when absent.
    #[serde(default)]
    pub dimension: Option<usize>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            path: default_embeddings_path(),
            dimension: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_label_table")]
    pub table: Vec<LabelEntry>,

    /// Tag substituted for class indices missing from `table`.
    #[serde(default = "default_unknown_tag")]
    pub unknown: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            table: default_label_table(),
            unknown: default_unknown_tag(),
        }
    }
}

impl LabelsConfig {
    pub fn build_codec(&self) -> Result<LabelCodec, TaggerError> {
        LabelCodec::new(self.table.iter().cloned(), self.unknown.clone())
    }
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.embeddings.path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "embeddings.path must not be empty".into(),
            ));
        }
        if self.embeddings.dimension == Some(0) {
            return Err(ConfigLoadError::Validation(
                "embeddings.dimension must be >= 1".into(),
            ));
        }
        if self.model.path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "model.path must not be empty".into(),
            ));
        }
        if self.labels.unknown.is_empty() {
            return Err(ConfigLoadError::Validation(
                "labels.unknown must not be empty".into(),
            ));
        }
        self.labels
            .build_codec()
            .map_err(|err| ConfigLoadError::Validation(format!("labels: {err}")))?;
        Ok(())
    }
}

fn default_embeddings_path() -> PathBuf {
    PathBuf::from("models/glove.6B.50d.txt")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/ner.json")
}

fn default_unknown_tag() -> String {
    UNKNOWN_TAG.to_string()
}
