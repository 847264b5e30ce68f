//! Manual backward pass: the full chain rule through the tied-weight
//! bilinear architecture.
//!
//! The tied word matrix R receives gradient from two distinct paths, the
//! output projection and the per-position embedding lookups. Both are
//! accumulated into the single `Gradients::r` buffer before any update is
//! applied. Targets stay sparse here: they are subtracted from the prediction
//! buffer by scattering, never densified.

use crate::model::forward::ForwardActivations;
use crate::model::params::{Gradients, ModelParams};
use crate::sparse::SparseRowMatrix;
use crate::utils::{sgemm_wrapper, sum_rows};

impl ModelParams {
    /// Compute gradients for every parameter from one forward pass.
    ///
    /// `fwd` must come from a forward pass over the same `contexts` and
    /// `images`. `gamma_r` and `gamma_c` are the L2 weight decay coefficients
    /// for R and for C/M/J respectively; biases are excluded from decay.
    /// Parameters are not mutated.
    ///
    /// # Panics
    ///
    /// Panics if the inputs disagree on the batch size.
    pub fn backward(
        &self,
        fwd: &ForwardActivations,
        contexts: &[usize],
        images: &[f32],
        targets: &SparseRowMatrix,
        gamma_r: f32,
        gamma_c: f32,
    ) -> Gradients {
        let v = self.vocab_size;
        let k = self.embed_dim;
        let d = self.image_dim;
        let h = self.hidden_dim;
        let ctx = self.context_length;
        let batch = targets.num_rows();

        assert_eq!(targets.num_cols(), v, "target width must match vocabulary size");
        assert_eq!(fwd.preds.len(), batch * v, "predictions do not match batch size");
        assert_eq!(contexts.len(), batch * ctx, "context indices do not match batch size");
        assert_eq!(images.len(), batch * d, "image features do not match batch size");

        let mut grads = Gradients::zeros_like(self);
        let inv_batch = 1.0 / batch as f32;

        // Output error: Ix = (preds - targets) / batch, targets scattered.
        let mut ix = vec![0.0f32; batch * v];
        for (out, &p) in ix.iter_mut().zip(fwd.preds.iter()) {
            *out = p * inv_batch;
        }
        for (b, row) in targets.rows().enumerate() {
            let offset = b * v;
            for (&col, &val) in row.cols.iter().zip(&row.vals) {
                ix[offset + col] -= val * inv_batch;
            }
        }

        // Output-projection path into the tied matrix: dR = acts^T * Ix.
        sgemm_wrapper(
            k, v, batch, &fwd.acts, k, &ix, v, &mut grads.r, v, true, false, 1.0, 0.0,
        );
        sum_rows(&ix, batch, v, &mut grads.bw);

        // Propagate into the hidden space: Ix2 = Ix * R^T.
        let mut ix2 = vec![0.0f32; batch * k];
        sgemm_wrapper(
            batch, k, v, &ix, v, &self.r, v, &mut ix2, k, false, true, 1.0, 0.0,
        );

        // Context path: dC[p] = words_p^T * Ix2, and the embedding-lookup
        // contributions delta_p = Ix2 * C[p]^T scattered into dR columns.
        let block_size = k * k;
        let mut delta = vec![0.0f32; batch * k];
        for p in 0..ctx {
            let words_p = &fwd.words[p * batch * k..(p + 1) * batch * k];
            let dc_block = &mut grads.c[p * block_size..(p + 1) * block_size];
            sgemm_wrapper(
                k, k, batch, words_p, k, &ix2, k, dc_block, k, true, false, 1.0, 0.0,
            );

            sgemm_wrapper(
                batch,
                k,
                k,
                &ix2,
                k,
                self.context_block(p),
                k,
                &mut delta,
                k,
                false,
                true,
                1.0,
                0.0,
            );
            for b in 0..batch {
                let index = contexts[b * ctx + p];
                for row in 0..k {
                    grads.r[row * v + index] += delta[b * k + row];
                }
            }
        }

        // Image path: dM = IF^T * Ix2, then back through M and the ReLU.
        sgemm_wrapper(
            h,
            k,
            batch,
            &fwd.image_hidden,
            h,
            &ix2,
            k,
            &mut grads.m,
            k,
            true,
            false,
            1.0,
            0.0,
        );
        let mut ix3 = vec![0.0f32; batch * h];
        sgemm_wrapper(
            batch, h, k, &ix2, k, &self.m, k, &mut ix3, h, false, true, 1.0, 0.0,
        );
        for (grad, &unit) in ix3.iter_mut().zip(fwd.image_hidden.iter()) {
            if unit <= 0.0 {
                *grad = 0.0;
            }
        }
        sgemm_wrapper(
            d, h, batch, images, d, &ix3, h, &mut grads.j, h, true, false, 1.0, 0.0,
        );
        sum_rows(&ix3, batch, h, &mut grads.bj);

        // L2 weight decay; bias terms excluded.
        if gamma_r != 0.0 {
            for (g, &w) in grads.r.iter_mut().zip(&self.r) {
                *g += gamma_r * w;
            }
        }
        if gamma_c != 0.0 {
            for (g, &w) in grads.c.iter_mut().zip(&self.c) {
                *g += gamma_c * w;
            }
            for (g, &w) in grads.m.iter_mut().zip(&self.m) {
                *g += gamma_c * w;
            }
            for (g, &w) in grads.j.iter_mut().zip(&self.j) {
                *g += gamma_c * w;
            }
        }

        grads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::utils::SimpleRng;
    use approx::assert_relative_eq;

    fn tiny_setup() -> (ModelParams, Vec<usize>, Vec<f32>, SparseRowMatrix) {
        let cfg = TrainingConfig::with_dims(5, 3, 2, 2, 2);
        let mut rng = SimpleRng::new(cfg.seed);
        let params = ModelParams::init(&cfg, &mut rng);
        let contexts = vec![0, 1, 2, 3, 4, 0, 1, 2];
        let images = vec![0.5, -0.25, 1.0, 0.75, -0.5, 0.3, 0.2, 0.9];
        let targets = SparseRowMatrix::from_one_hot(&[1, 2, 3, 4], 5);
        (params, contexts, images, targets)
    }

    #[test]
    fn test_gradient_shapes_match_params() {
        let (params, contexts, images, targets) = tiny_setup();
        let fwd = params.forward_infer(&contexts, &images, 4, 0.0);
        let grads = params.backward(&fwd, &contexts, &images, &targets, 0.0, 0.0);
        assert_eq!(grads.r.len(), params.r.len());
        assert_eq!(grads.c.len(), params.c.len());
        assert_eq!(grads.bw.len(), params.bw.len());
        assert_eq!(grads.m.len(), params.m.len());
        assert_eq!(grads.j.len(), params.j.len());
        assert_eq!(grads.bj.len(), params.bj.len());
    }

    #[test]
    fn test_output_bias_gradient_rows_sum_to_zero() {
        // Each Ix row is a distribution minus a distribution, so dbw sums
        // to ~0 over the vocabulary.
        let (params, contexts, images, targets) = tiny_setup();
        let fwd = params.forward_infer(&contexts, &images, 4, 0.0);
        let grads = params.backward(&fwd, &contexts, &images, &targets, 0.0, 0.0);
        let total: f32 = grads.bw.iter().sum();
        assert_relative_eq!(total, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_backward_does_not_mutate_params() {
        let (params, contexts, images, targets) = tiny_setup();
        let snapshot = params.clone();
        let fwd = params.forward_infer(&contexts, &images, 4, 0.0);
        let _ = params.backward(&fwd, &contexts, &images, &targets, 0.01, 0.01);
        assert_eq!(params.r, snapshot.r);
        assert_eq!(params.c, snapshot.c);
        assert_eq!(params.m, snapshot.m);
        assert_eq!(params.j, snapshot.j);
    }

    #[test]
    fn test_weight_decay_adds_scaled_params() {
        let (params, contexts, images, targets) = tiny_setup();
        let fwd = params.forward_infer(&contexts, &images, 4, 0.0);
        let plain = params.backward(&fwd, &contexts, &images, &targets, 0.0, 0.0);
        let decayed = params.backward(&fwd, &contexts, &images, &targets, 0.1, 0.2);
        for i in 0..params.r.len() {
            assert_relative_eq!(decayed.r[i], plain.r[i] + 0.1 * params.r[i], epsilon = 1e-5);
        }
        for i in 0..params.m.len() {
            assert_relative_eq!(decayed.m[i], plain.m[i] + 0.2 * params.m[i], epsilon = 1e-5);
        }
        // Biases are excluded from decay.
        assert_eq!(plain.bw, decayed.bw);
        assert_eq!(plain.bj, decayed.bj);
    }
}
