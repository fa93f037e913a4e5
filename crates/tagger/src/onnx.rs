//! ONNX Runtime backend.
//!
//! Expects a graph with one `f32` input of shape `[N, D]` and one output of
//! per-token class probabilities, either `[N, K]` or `[1, N, K]`. `D` and `K`
//! must be static in the graph; `N` may be dynamic.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::{Tensor, ValueType};

use crate::model::{FeatureTensor, TagModel};
use crate::TaggerError;

pub struct OnnxModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_dim: usize,
    num_classes: usize,
}

impl OnnxModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TaggerError> {
        let path = path.as_ref();
        let load_err = |reason: String| TaggerError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| load_err(e.to_string()))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| load_err("graph declares no inputs".into()))?;
        let output = session
            .outputs
            .first()
            .ok_or_else(|| load_err("graph declares no outputs".into()))?;

        let input_dim = static_last_dim(&input.input_type)
            .ok_or_else(|| load_err(format!("input {:?} has no static feature width", input.name)))?;
        let num_classes = static_last_dim(&output.output_type)
            .ok_or_else(|| load_err(format!("output {:?} has no static class count", output.name)))?;

        Ok(Self {
            input_name: input.name.clone(),
            output_name: output.name.clone(),
            input_dim,
            num_classes,
            session: Mutex::new(session),
        })
    }
}

fn static_last_dim(value_type: &ValueType) -> Option<usize> {
    match value_type {
        ValueType::Tensor { shape, .. } => shape
            .iter()
            .last()
            .copied()
            .filter(|&dim| dim > 0)
            .map(|dim| dim as usize),
        _ => None,
    }
}

impl TagModel for OnnxModel {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn forward(&self, features: &FeatureTensor) -> Result<Vec<Vec<f32>>, TaggerError> {
        let (rows, cols) = features.shape();
        let input = Tensor::from_array(([rows, cols], features.as_slice().to_vec()))
            .map_err(|e| TaggerError::Inference(format!("failed to build input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| TaggerError::Inference("ONNX session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| TaggerError::Inference(format!("ONNX inference failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            TaggerError::Inference(format!("output {:?} missing", self.output_name))
        })?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| TaggerError::Inference(format!("failed to read output: {e}")))?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        let (out_rows, out_classes) = match dims.as_slice() {
            [n, k] | [1, n, k] => (*n as usize, *k as usize),
            other => {
                return Err(TaggerError::Inference(format!(
                    "unexpected output shape {other:?}"
                )))
            }
        };
        if out_rows != rows || out_classes == 0 {
            return Err(TaggerError::Inference(format!(
                "output shape {dims:?} does not match {rows} tokens"
            )));
        }

        Ok(data
            .chunks(out_classes)
            .map(|chunk| chunk.to_vec())
            .collect())
    }
}
