//! Cross-entropy objective (diagnostic).
//!
//! The backward pass derives its starting gradient directly from
//! `preds - targets`; this objective exists for logging and for finite
//! difference gradient checks.

use crate::model::params::ModelParams;
use crate::sparse::SparseRowMatrix;

/// Guard against log(0) on zero-probability predictions.
const LOG_EPSILON: f32 = 1e-20;

/// Mean cross-entropy between predicted distributions and sparse targets.
///
/// Computes `-(1/batch) * sum(target ⊙ ln(pred + 1e-20))`. This is the one
/// place the sparse targets are densified.
///
/// # Panics
///
/// Panics if `preds` does not have `targets.num_rows() * targets.num_cols()`
/// entries.
pub fn cross_entropy(preds: &[f32], targets: &SparseRowMatrix) -> f32 {
    let batch = targets.num_rows();
    let cols = targets.num_cols();
    assert_eq!(preds.len(), batch * cols, "predictions do not match target shape");

    let dense = targets.to_dense();
    let mut total = 0.0f32;
    for (&target, &pred) in dense.iter().zip(preds.iter()) {
        total -= target * (pred + LOG_EPSILON).ln();
    }
    total / batch as f32
}

impl ModelParams {
    /// Run an inference-mode forward pass and return the objective.
    pub fn compute_objective(
        &self,
        contexts: &[usize],
        images: &[f32],
        batch: usize,
        dropout: f32,
        targets: &SparseRowMatrix,
    ) -> f32 {
        let fwd = self.forward_infer(contexts, images, batch, dropout);
        cross_entropy(&fwd.preds, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_prediction_has_near_zero_loss() {
        let preds = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let targets = SparseRowMatrix::from_one_hot(&[0, 1], 3);
        let loss = cross_entropy(&preds, &targets);
        assert_relative_eq!(loss, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_uniform_prediction_loss() {
        let preds = vec![0.25; 8];
        let targets = SparseRowMatrix::from_one_hot(&[3, 0], 4);
        let loss = cross_entropy(&preds, &targets);
        assert_relative_eq!(loss, 4.0f32.ln(), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_probability_is_finite() {
        let preds = vec![0.0, 1.0];
        let targets = SparseRowMatrix::from_one_hot(&[0], 2);
        let loss = cross_entropy(&preds, &targets);
        assert!(loss.is_finite());
        assert!(loss > 10.0);
    }
}
