use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building an [`EmbeddingStore`](crate::EmbeddingStore).
///
/// Every variant is a resource-load failure: a process that hits one of these
/// at startup must not begin serving requests.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The embedding source could not be opened or read.
    #[error("failed to read embedding source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A line did not split into a word followed by `expected` numeric fields.
    #[error("line {line}: expected {expected} vector components, found {found}")]
    DimensionMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A vector component is not a finite float.
    #[error("line {line}: component {column} is not a finite number: {value:?}")]
    InvalidComponent {
        line: usize,
        column: usize,
        value: String,
    },
    /// A non-blank line carried a word but no vector at all.
    #[error("line {0}: missing vector components")]
    MissingVector(usize),
    /// The source held no usable vectors.
    #[error("embedding source contains no vectors")]
    Empty,
    /// A zero dimension was requested.
    #[error("embedding dimension must be >= 1")]
    ZeroDimension,
}
