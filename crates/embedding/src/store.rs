use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use fxhash::FxHashMap;
use serde::Serialize;

use crate::EmbeddingError;

/// Read-only access to word vectors.
///
/// The pipeline only talks to this trait, so tests can swap in a double that
/// counts lookups.
pub trait EmbeddingLookup: Send + Sync {
    /// Width `D` of every vector this source returns.
    fn dimension(&self) -> usize;

    /// Vector for `token`, or the all-zero vector of width `D` when unknown.
    fn lookup(&self, token: &str) -> &[f32];

    /// Number of distinct words with a stored vector.
    fn vocab_size(&self) -> usize;

    fn stats(&self) -> EmbeddingStats {
        EmbeddingStats {
            vocab_size: self.vocab_size(),
            dimension: self.dimension(),
        }
    }
}

/// Immutable word → vector table loaded from a GloVe-style text file.
///
/// Vectors live in one contiguous row-major buffer; the map only stores row
/// offsets. Unknown words resolve to a shared zero row.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    dimension: usize,
    rows: FxHashMap<String, usize>,
    data: Vec<f32>,
    zero: Box<[f32]>,
}

/// Summary surfaced by the readiness check and startup logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmbeddingStats {
    pub vocab_size: usize,
    pub dimension: usize,
}

impl EmbeddingStore {
    /// Load a whitespace-separated embedding file (`word f1 ... fD` per line).
    ///
    /// When `dimension` is `None` the width of the first vector line is used.
    pub fn load<P: AsRef<Path>>(
        path: P,
        dimension: Option<usize>,
    ) -> Result<Self, EmbeddingError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EmbeddingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(BufReader::new(file), dimension).map_err(|err| match err {
            EmbeddingError::Io { source, .. } => EmbeddingError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            vocab_size = store.len(),
            dimension = store.dimension(),
            "embedding table loaded"
        );
        Ok(store)
    }

    /// Parse an embedding table from any buffered reader.
    pub fn from_reader<R: BufRead>(
        reader: R,
        dimension: Option<usize>,
    ) -> Result<Self, EmbeddingError> {
        if dimension == Some(0) {
            return Err(EmbeddingError::ZeroDimension);
        }

        let mut dim = dimension;
        let mut rows = FxHashMap::default();
        let mut data: Vec<f32> = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|source| EmbeddingError::Io {
                path: Default::default(),
                source,
            })?;

            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };

            let start = data.len();
            for (column, raw) in fields.enumerate() {
                // `nan`, `inf` and overflowing literals parse but would poison scoring
                let value = raw
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| EmbeddingError::InvalidComponent {
                        line: line_no,
                        column: column + 1,
                        value: raw.to_string(),
                    })?;
                data.push(value);
            }

            let found = data.len() - start;
            if found == 0 {
                return Err(EmbeddingError::MissingVector(line_no));
            }
            let expected = *dim.get_or_insert(found);
            if found != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    line: line_no,
                    expected,
                    found,
                });
            }

            // Repeated words keep the last vector; the earlier row stays as dead space.
            rows.insert(word.to_string(), start);
        }

        let dimension = match dim {
            Some(d) if !rows.is_empty() => d,
            _ => return Err(EmbeddingError::Empty),
        };

        Ok(Self {
            dimension,
            rows,
            data,
            zero: vec![0.0; dimension].into_boxed_slice(),
        })
    }

    /// Number of distinct words in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.rows.contains_key(token)
    }
}

impl EmbeddingLookup for EmbeddingStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn lookup(&self, token: &str) -> &[f32] {
        match self.rows.get(token) {
            Some(&start) => &self.data[start..start + self.dimension],
            None => &self.zero[..],
        }
    }

    fn vocab_size(&self) -> usize {
        self.len()
    }
}
