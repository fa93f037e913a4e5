//! Token-level NER inference.
//!
//! Two pieces live here:
//!
//! - [`LabelCodec`] maps model class indices to tag strings and back. It is
//!   built once from a fixed table; unknown indices decode to a sentinel
//!   (`"Unknown"`) with a warning instead of failing the request.
//! - [`InferenceEngine`] owns the loaded model and guards its contract: input
//!   width must match, one probability row comes back per token, and an empty
//!   batch never reaches the runtime.
//!
//! ## Backends
//!
//! - `*.json` — [`DenseModel`], a softmax classifier over per-token features.
//! - `*.onnx` — ONNX Runtime, behind the `onnx` cargo feature.
//!
//! Anything else implementing [`TagModel`] can be wrapped with
//! [`InferenceEngine::new`], which is how tests substitute doubles.
//!
//! ## Decoding
//!
//! The final tag for a token is `argmax` over its class probabilities, ties
//! going to the lowest index so results are reproducible.
//!
//! ```
//! use tagger::{DenseModel, FeatureTensor, InferenceEngine, LabelCodec};
//!
//! let model = DenseModel::new(2, vec![vec![0.0; 2], vec![1.0, 0.0], vec![0.0, 1.0]], vec![0.0; 3]).unwrap();
//! let engine = InferenceEngine::new(model);
//! let codec = LabelCodec::default();
//!
//! let features = FeatureTensor::new(1, 2, vec![4.0, 0.0]).unwrap();
//! let classes = engine.classify(&features).unwrap();
//! assert_eq!(codec.decode(classes[0]), "B-O");
//! ```

mod codec;
mod dense;
mod error;
mod model;
#[cfg(feature = "onnx")]
mod onnx;

pub use crate::codec::{default_label_table, DecodedTags, LabelCodec, LabelEntry, UNKNOWN_TAG};
pub use crate::dense::DenseModel;
pub use crate::error::TaggerError;
pub use crate::model::{argmax, ClassProbabilities, FeatureTensor, InferenceEngine, TagModel};
#[cfg(feature = "onnx")]
pub use crate::onnx::OnnxModel;
