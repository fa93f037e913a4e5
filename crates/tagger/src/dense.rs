use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{FeatureTensor, TagModel};
use crate::TaggerError;

/// Softmax token classifier stored as JSON.
///
/// Scores each token independently as `softmax(W·x + b)`, where `W` has one
/// row of `input_dim` weights per class.
///
/// ```json
/// { "input_dim": 3, "weights": [[0.1, 0.0, 0.2], [0.0, 1.0, 0.0]], "bias": [0.0, 0.1] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseModel {
    input_dim: usize,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl DenseModel {
    pub fn new(
        input_dim: usize,
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
    ) -> Result<Self, TaggerError> {
        let model = Self {
            input_dim,
            weights,
            bias,
        };
        model.validate().map_err(TaggerError::InvalidModel)?;
        Ok(model)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TaggerError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| TaggerError::ModelLoad {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let model: DenseModel = serde_json::from_str(&raw).map_err(|err| TaggerError::ModelLoad {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        model.validate().map_err(|reason| TaggerError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), String> {
        if self.input_dim == 0 {
            return Err("input_dim must be >= 1".into());
        }
        if self.weights.is_empty() {
            return Err("model has no classes".into());
        }
        if self.bias.len() != self.weights.len() {
            return Err(format!(
                "bias has {} entries for {} classes",
                self.bias.len(),
                self.weights.len()
            ));
        }
        if let Some((class, row)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.input_dim)
        {
            return Err(format!(
                "weight row {class} has {} values, expected {}",
                row.len(),
                self.input_dim
            ));
        }
        if self
            .weights
            .iter()
            .flatten()
            .chain(self.bias.iter())
            .any(|v| !v.is_finite())
        {
            return Err("weights must be finite".into());
        }
        Ok(())
    }

    fn score(&self, features: &[f32]) -> Vec<f32> {
        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f32>() + bias)
            .collect();
        softmax(&logits)
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

impl TagModel for DenseModel {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn num_classes(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, features: &FeatureTensor) -> Result<Vec<Vec<f32>>, TaggerError> {
        Ok(features.iter_rows().map(|row| self.score(row)).collect())
    }
}
