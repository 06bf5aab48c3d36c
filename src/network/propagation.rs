use crate::activation::sigmoid;
use crate::error::{NetError, NetResult};
use crate::math::matrix::Matrix;
use crate::network::activations::ActivationStore;
use crate::network::weights::WeightStore;

/// Activations of the target layer given the source activations and the
/// connecting weights: `sigmoid(Σ_i source[i] * weights[i][j])` for each
/// target neuron `j`. No bias term.
pub fn propagate(source: &[f64], weights: &Matrix) -> Vec<f64> {
    let z = &Matrix::row_vector(source) * weights;
    let a = z.map(sigmoid);
    a.data.into_iter().next().unwrap_or_default()
}

/// Runs transition `k`: reads layer `k`, overwrites layer `k + 1`.
///
/// The source layer is never written. `k` must name an existing transition,
/// so the last layer is never used as a source.
pub fn step(weights: &WeightStore, activations: &mut ActivationStore, k: usize) -> NetResult<()> {
    let matrix = weights.matrix(k)?;
    let target_len = activations.layer(k + 1)?.len();
    let source = activations.layer(k)?;
    if (source.len(), target_len) != matrix.shape() {
        return Err(NetError::ShapeMismatch {
            transition: k,
            rows: source.len(),
            cols: target_len,
            found_rows: matrix.rows,
            found_cols: matrix.cols,
        });
    }

    let target = propagate(source, matrix);
    for (j, value) in target.into_iter().enumerate() {
        activations.set(k + 1, j, value)?;
    }
    Ok(())
}
