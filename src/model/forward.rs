//! Forward pass through the multimodal log-bilinear model.
//!
//! The image features are projected through a ReLU hidden layer, the context
//! words are gathered from the tied word matrix and transformed per position,
//! and the resulting hidden activation is projected back through R (tied
//! weights) into a softmax over the vocabulary.
//!
//! Everything the backward pass needs (per-position embeddings, the hidden
//! activation, the post-dropout image hidden layer, and the predictions) is
//! returned, since gradients are computed by hand.

use crate::model::params::ModelParams;
use crate::utils::{add_bias, relu_inplace, sgemm_wrapper, softmax_rows, SimpleRng};

/// Intermediates produced by one forward pass over a minibatch.
#[derive(Debug, Clone)]
pub struct ForwardActivations {
    /// Gathered context embeddings: one contiguous batch×K block per context
    /// position (`context_length * batch * embed_dim` total).
    pub words: Vec<f32>,
    /// Hidden activation (predicted next-word representation), batch×K.
    pub acts: Vec<f32>,
    /// Image hidden layer after ReLU and, in training mode, dropout; batch×h.
    pub image_hidden: Vec<f32>,
    /// Predicted next-word distribution, batch×V; each row sums to 1.
    pub preds: Vec<f32>,
}

impl ModelParams {
    /// Training-mode forward pass.
    ///
    /// Applies an independent Bernoulli keep mask (keep probability
    /// `1 - dropout`) to the image hidden layer, drawing from `rng`.
    ///
    /// `contexts` is batch×context_length word indices (row-major), `images`
    /// is batch×D features.
    ///
    /// # Panics
    ///
    /// Panics if the input slices do not match the declared batch size or any
    /// word index is out of vocabulary range.
    pub fn forward_train(
        &self,
        contexts: &[usize],
        images: &[f32],
        batch: usize,
        dropout: f32,
        rng: &mut SimpleRng,
    ) -> ForwardActivations {
        self.forward_impl(contexts, images, batch, dropout, Some(rng))
    }

    /// Inference-mode forward pass.
    ///
    /// No mask is applied; instead the image-context term is scaled by
    /// `1 - dropout` to match the training-time expectation.
    pub fn forward_infer(
        &self,
        contexts: &[usize],
        images: &[f32],
        batch: usize,
        dropout: f32,
    ) -> ForwardActivations {
        self.forward_impl(contexts, images, batch, dropout, None)
    }

    fn forward_impl(
        &self,
        contexts: &[usize],
        images: &[f32],
        batch: usize,
        dropout: f32,
        dropout_rng: Option<&mut SimpleRng>,
    ) -> ForwardActivations {
        let v = self.vocab_size;
        let k = self.embed_dim;
        let d = self.image_dim;
        let h = self.hidden_dim;
        let ctx = self.context_length;

        assert_eq!(
            contexts.len(),
            batch * ctx,
            "context indices must be batch x context_length"
        );
        assert_eq!(images.len(), batch * d, "image features must be batch x image_dim");

        // Image hidden layer: IF = ReLU(Im * J + bj).
        let mut image_hidden = vec![0.0f32; batch * h];
        sgemm_wrapper(
            batch, h, d, images, d, &self.j, h, &mut image_hidden, h, false, false, 1.0, 0.0,
        );
        add_bias(&mut image_hidden, batch, h, &self.bj);
        relu_inplace(&mut image_hidden);

        let training = dropout_rng.is_some();
        if let Some(rng) = dropout_rng {
            if dropout > 0.0 {
                for value in image_hidden.iter_mut() {
                    if !rng.gen_bool(1.0 - dropout) {
                        *value = 0.0;
                    }
                }
            }
        }

        // Gather context embeddings: column x[b][p] of R for each position.
        let mut words = vec![0.0f32; ctx * batch * k];
        for p in 0..ctx {
            let block = &mut words[p * batch * k..(p + 1) * batch * k];
            for b in 0..batch {
                let index = contexts[b * ctx + p];
                assert!(index < v, "word index {} out of vocabulary range {}", index, v);
                for row in 0..k {
                    block[b * k + row] = self.r[row * v + index];
                }
            }
        }

        // Hidden activation: sum over positions of words_p * C[p], plus the
        // image term IF * M (scaled by the keep probability at test time).
        let mut acts = vec![0.0f32; batch * k];
        for p in 0..ctx {
            let block = &words[p * batch * k..(p + 1) * batch * k];
            sgemm_wrapper(
                batch,
                k,
                k,
                block,
                k,
                self.context_block(p),
                k,
                &mut acts,
                k,
                false,
                false,
                1.0,
                1.0,
            );
        }
        let image_scale = if training { 1.0 } else { 1.0 - dropout };
        sgemm_wrapper(
            batch,
            k,
            h,
            &image_hidden,
            h,
            &self.m,
            k,
            &mut acts,
            k,
            false,
            false,
            image_scale,
            1.0,
        );

        // Output scores through the tied word matrix, then stable softmax.
        let mut preds = vec![0.0f32; batch * v];
        sgemm_wrapper(
            batch, v, k, &acts, k, &self.r, v, &mut preds, v, false, false, 1.0, 0.0,
        );
        add_bias(&mut preds, batch, v, &self.bw);
        softmax_rows(&mut preds, batch, v);

        ForwardActivations {
            words,
            acts,
            image_hidden,
            preds,
        }
    }
}
