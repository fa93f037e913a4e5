use std::path::Path;

use crate::dense::DenseModel;
use crate::TaggerError;

/// Row-major `(rows, cols)` batch of token feature vectors.
///
/// One row per token, in input order. `rows == 0` is a valid, empty batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTensor {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FeatureTensor {
    /// Wrap `data` as a `(rows, cols)` tensor; the length must match exactly.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, TaggerError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(TaggerError::Inference(format!(
                "tensor buffer of {} values cannot be shaped ({rows}, {cols})",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn empty(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.rows).map(move |idx| &self.data[idx * self.cols..(idx + 1) * self.cols])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Probability distribution over the `K` classes for one token.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities(Vec<f32>);

impl ClassProbabilities {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most probable class; see [`argmax`].
    pub fn argmax(&self) -> usize {
        argmax(&self.0)
    }
}

/// Index of the largest value.
///
/// Ties go to the lowest index and NaN never wins, so identical input always
/// decodes to the same class. An empty or all-NaN row yields `0`.
pub fn argmax(values: &[f32]) -> usize {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx).unwrap_or(0)
}

/// A loaded token classifier.
///
/// Implementations receive a batch already validated against
/// [`input_dim`](Self::input_dim) and return one row of `num_classes`
/// probabilities per input row.
pub trait TagModel: Send + Sync {
    /// Features per token the model was trained on.
    fn input_dim(&self) -> usize;

    /// Number of classes `K` in each output row.
    fn num_classes(&self) -> usize;

    fn forward(&self, features: &FeatureTensor) -> Result<Vec<Vec<f32>>, TaggerError>;
}

/// Owns the model artifact and guards its input/output contract.
pub struct InferenceEngine {
    model: Box<dyn TagModel>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("input_dim", &self.input_dim())
            .field("num_classes", &self.num_classes())
            .finish()
    }
}

impl InferenceEngine {
    pub fn new(model: impl TagModel + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    /// Load the artifact at `path`, picking the backend from its extension.
    ///
    /// `.json` loads a [`DenseModel`]; `.onnx` needs the `onnx` feature.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TaggerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TaggerError::ModelNotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let engine = match extension.as_str() {
            "json" => Self::new(DenseModel::load(path)?),
            #[cfg(feature = "onnx")]
            "onnx" => Self::new(crate::onnx::OnnxModel::load(path)?),
            other => {
                return Err(TaggerError::UnsupportedFormat(format!(
                    "{} (extension {other:?})",
                    path.display()
                )))
            }
        };

        tracing::info!(
            path = %path.display(),
            input_dim = engine.input_dim(),
            num_classes = engine.num_classes(),
            "model loaded"
        );
        Ok(engine)
    }

    pub fn input_dim(&self) -> usize {
        self.model.input_dim()
    }

    pub fn num_classes(&self) -> usize {
        self.model.num_classes()
    }

    /// Score every row of `features`, preserving order.
    ///
    /// An empty batch returns immediately without touching the model.
    pub fn predict(&self, features: &FeatureTensor) -> Result<Vec<ClassProbabilities>, TaggerError> {
        if features.cols() != self.input_dim() {
            return Err(TaggerError::InputShape {
                expected: self.input_dim(),
                found: features.cols(),
            });
        }
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let output = self.model.forward(features)?;
        if output.len() != features.rows() {
            return Err(TaggerError::Inference(format!(
                "model returned {} rows for {} tokens",
                output.len(),
                features.rows()
            )));
        }

        let classes = self.num_classes();
        output
            .into_iter()
            .enumerate()
            .map(|(row, values)| {
                if values.len() != classes {
                    return Err(TaggerError::Inference(format!(
                        "row {row} has {} class scores, expected {classes}",
                        values.len()
                    )));
                }
                Ok(ClassProbabilities::new(values))
            })
            .collect()
    }

    /// Score `features` and reduce each row to its most probable class.
    pub fn classify(&self, features: &FeatureTensor) -> Result<Vec<usize>, TaggerError> {
        Ok(self
            .predict(features)?
            .iter()
            .map(ClassProbabilities::argmax)
            .collect())
    }
}
