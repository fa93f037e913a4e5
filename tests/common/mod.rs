//! On-disk fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use nertag::PipelineConfig;
use tempfile::TempDir;

/// Four-dimensional vectors, one axis per known tag class.
pub const EMBEDDINGS: &str = "\
bob 1.0 0.0 0.0 0.0
ross 0.0 1.0 0.0 0.0
was 0.0 0.0 1.0 0.0
an 0.0 0.0 0.0 1.0
. 1.0 0.0 0.0 0.0
";

/// Class `k` fires on axis `k - 1`; class 0 wins only for the zero vector,
/// which is what out-of-vocabulary tokens receive.
pub const MODEL: &str = r#"{
  "input_dim": 4,
  "weights": [
    [0.0, 0.0, 0.0, 0.0],
    [5.0, 0.0, 0.0, 0.0],
    [0.0, 5.0, 0.0, 0.0],
    [0.0, 0.0, 5.0, 0.0],
    [0.0, 0.0, 0.0, 5.0]
  ],
  "bias": [0.1, 0.0, 0.0, 0.0, 0.0]
}"#;

pub const SENTENCE: [&str; 6] = ["Bob", "Ross", "was", "an", "artist", "."];

pub struct Fixture {
    pub dir: TempDir,
    pub config: PipelineConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_files(EMBEDDINGS, MODEL)
    }

    pub fn with_files(embeddings: &str, model: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "vectors.txt", embeddings);
        write(dir.path(), "model.json", model);

        let mut config = PipelineConfig::default();
        config.embeddings.path = dir.path().join("vectors.txt");
        config.model.path = dir.path().join("model.json");
        Self { dir, config }
    }

    pub fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write fixture");
}
