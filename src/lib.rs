//! Token-level named-entity tagging pipeline.
//!
//! Wires the workspace crates into a single request path:
//!
//! 1. [`tokens`] validates the untyped `tokens` field and lowercases it.
//! 2. [`vectorize`] turns the sequence into an `(n, D)` [`FeatureTensor`]
//!    through an [`EmbeddingLookup`]; unknown tokens get a zero vector.
//! 3. The [`InferenceEngine`] scores every row and reduces it to a class
//!    index by argmax.
//! 4. The [`LabelCodec`] maps indices back to tags, substituting its
//!    sentinel for anything outside the table.
//!
//! [`PredictionService`] owns the shared, read-only resources and runs the
//! steps above for each request. The HTTP surface lives in the
//! `nertag-server` crate.
//!
//! ```
//! use std::sync::Arc;
//! use nertag::{DenseModel, EmbeddingStore, InferenceEngine, LabelCodec, PredictionService};
//!
//! let store = EmbeddingStore::from_reader("bob 1.0 0.0\nross 0.0 1.0\n".as_bytes(), None).unwrap();
//! let model = DenseModel::new(
//!     2,
//!     vec![vec![0.0, 0.0], vec![5.0, 0.0], vec![0.0, 5.0]],
//!     vec![0.0, 0.0, 0.0],
//! )
//! .unwrap();
//!
//! let service = PredictionService::new(
//!     Arc::new(store),
//!     Arc::new(InferenceEngine::new(model)),
//!     Arc::new(LabelCodec::default()),
//! );
//!
//! let prediction = service.predict(&["Bob", "Ross"]).unwrap();
//! assert_eq!(prediction.tokens, vec!["bob", "ross"]);
//! assert_eq!(prediction.tags, vec!["B-O", "B-AC"]);
//! ```

pub mod config;
pub mod error;
pub mod interaction;
pub mod service;
pub mod tokens;
pub mod vectorize;

pub use config::{ConfigLoadError, EmbeddingsConfig, LabelsConfig, ModelConfig, PipelineConfig};
pub use error::{PipelineError, ResourceLoadError};
pub use interaction::{Interaction, InteractionSink, JsonLinesSink, SinkError, TracingSink};
pub use service::{Prediction, PredictionService, ServiceSummary, Stage};
pub use tokens::{normalize, normalize_strs, TokenSequence};
pub use vectorize::vectorize;

pub use embedding::{EmbeddingError, EmbeddingLookup, EmbeddingStats, EmbeddingStore};
pub use tagger::{
    argmax, default_label_table, ClassProbabilities, DecodedTags, DenseModel, FeatureTensor,
    InferenceEngine, LabelCodec, LabelEntry, TagModel, TaggerError, UNKNOWN_TAG,
};
