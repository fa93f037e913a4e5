use embedding::EmbeddingLookup;
use tagger::FeatureTensor;

use crate::{PipelineError, TokenSequence};

/// Stack one embedding row per token into a `(N, D)` tensor.
///
/// `expected_dim` is the feature width the inference engine was built for.
/// The check happens here, before any lookup, so a mismatched deployment
/// surfaces as [`PipelineError::InputShape`] rather than a numeric failure
/// inside the model. `N == 0` yields an empty `(0, D)` tensor.
pub fn vectorize(
    tokens: &TokenSequence,
    store: &dyn EmbeddingLookup,
    expected_dim: usize,
) -> Result<FeatureTensor, PipelineError> {
    let dim = store.dimension();
    if dim != expected_dim {
        return Err(PipelineError::InputShape {
            expected: expected_dim,
            found: dim,
        });
    }
    if tokens.is_empty() {
        return Ok(FeatureTensor::empty(dim));
    }

    let mut data = Vec::with_capacity(tokens.len() * dim);
    for token in tokens.iter() {
        let vector = store.lookup(token);
        if vector.len() != dim {
            return Err(PipelineError::InputShape {
                expected: dim,
                found: vector.len(),
            });
        }
        data.extend_from_slice(vector);
    }

    Ok(FeatureTensor::new(tokens.len(), dim, data)?)
}
