//! Interaction log.
//!
//! Every successful prediction produces one [`Interaction`] record. Sinks must
//! accept concurrent calls and write each record whole; the service ignores
//! sink failures apart from a warning.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// What the model was asked and what it answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub timestamp: DateTime<Utc>,
    pub tokens: Vec<String>,
    pub tags: Vec<String>,
}

impl Interaction {
    pub fn new(tokens: Vec<String>, tags: Vec<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            tokens,
            tags,
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write interaction: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode interaction: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("interaction sink lock poisoned")]
    Poisoned,
}

/// Destination for interaction records.
pub trait InteractionSink: Send + Sync {
    fn record(&self, entry: &Interaction) -> Result<(), SinkError>;
}

/// Emits each interaction as a `debug` event on target `nertag::interaction`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl InteractionSink for TracingSink {
    fn record(&self, entry: &Interaction) -> Result<(), SinkError> {
        tracing::debug!(
            target: "nertag::interaction",
            timestamp = %entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            tokens = ?entry.tokens,
            tags = ?entry.tags,
            "interaction"
        );
        Ok(())
    }
}

/// Appends one JSON object per line to a file.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InteractionSink for JsonLinesSink {
    fn record(&self, entry: &Interaction) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        let mut file = self.file.lock().map_err(|_| SinkError::Poisoned)?;
        file.write_all(&line)?;
        Ok(())
    }
}
