//! Training and validation set containers and minibatch assembly.
//!
//! A caption set holds context-index rows, sparse target distributions, a
//! per-example auxiliary image index, and the image feature matrix. Several
//! consecutive captions describe the same image, so the auxiliary index is
//! divided by the configured captions-per-image ratio to find the feature row.
//!
//! Minibatches are striped: epoch index order is shuffled once, then
//! minibatch m takes positions {m, m + numbatches, m + 2*numbatches, ...}
//! rather than a contiguous block.

use crate::config::TrainingConfig;
use crate::error::TrainError;
use crate::sparse::SparseRowMatrix;

/// A split of the caption dataset (training or validation).
#[derive(Debug, Clone)]
pub struct CaptionSet {
    /// Context word indices, N×context_length row-major.
    pub contexts: Vec<usize>,
    /// Target next-word distributions, N×V sparse.
    pub targets: SparseRowMatrix,
    /// Auxiliary per-example image index (caption number, before the
    /// captions-per-image division).
    pub image_index: Vec<usize>,
    /// Image feature matrix, num_images×D row-major.
    pub images: Vec<f32>,
    /// Context window length of `contexts`.
    pub context_length: usize,
    /// Feature dimensionality of `images`.
    pub image_dim: usize,
}

impl CaptionSet {
    /// Number of text examples.
    pub fn len(&self) -> usize {
        self.targets.num_rows()
    }

    /// Whether the split is empty.
    pub fn is_empty(&self) -> bool {
        self.targets.num_rows() == 0
    }

    /// Number of image feature rows.
    pub fn num_images(&self) -> usize {
        if self.image_dim == 0 {
            0
        } else {
            self.images.len() / self.image_dim
        }
    }

    /// Check this split against the configuration, failing fast on any
    /// dimension mismatch.
    pub fn validate_against(&self, config: &TrainingConfig) -> Result<(), TrainError> {
        let n = self.len();
        if self.context_length != config.context_length {
            return Err(TrainError::config(format!(
                "data context_length {} does not match configured {}",
                self.context_length, config.context_length
            )));
        }
        if self.image_dim != config.image_dim {
            return Err(TrainError::config(format!(
                "data image_dim {} does not match configured {}",
                self.image_dim, config.image_dim
            )));
        }
        if self.targets.num_cols() != config.vocab_size {
            return Err(TrainError::config(format!(
                "target width {} does not match vocab_size {}",
                self.targets.num_cols(),
                config.vocab_size
            )));
        }
        if self.contexts.len() != n * self.context_length {
            return Err(TrainError::config(format!(
                "context indices length {} does not match {} examples of {} words",
                self.contexts.len(),
                n,
                self.context_length
            )));
        }
        if self.image_index.len() != n {
            return Err(TrainError::config(format!(
                "image index length {} does not match {} examples",
                self.image_index.len(),
                n
            )));
        }
        if self.images.len() % self.image_dim != 0 {
            return Err(TrainError::config(
                "image matrix length is not a multiple of image_dim",
            ));
        }
        if let Some(&max_index) = self.image_index.iter().max() {
            let needed = max_index / config.captions_per_image + 1;
            if needed > self.num_images() {
                return Err(TrainError::config(format!(
                    "image index {} needs {} feature rows but only {} are present",
                    max_index,
                    needed,
                    self.num_images()
                )));
            }
        }
        if self.contexts.iter().any(|&w| w >= config.vocab_size) {
            return Err(TrainError::config("context word index out of vocabulary range"));
        }
        Ok(())
    }

    /// Gather the selected examples into a dense minibatch, resolving each
    /// example's image feature row via floor division by `captions_per_image`.
    pub fn gather_minibatch(&self, selected: &[usize], captions_per_image: usize) -> Minibatch {
        let ctx = self.context_length;
        let d = self.image_dim;
        let batch = selected.len();

        let mut contexts = Vec::with_capacity(batch * ctx);
        let mut images = Vec::with_capacity(batch * d);
        for &example in selected {
            contexts.extend_from_slice(&self.contexts[example * ctx..(example + 1) * ctx]);
            let image_row = self.image_index[example] / captions_per_image;
            images.extend_from_slice(&self.images[image_row * d..(image_row + 1) * d]);
        }

        Minibatch {
            contexts,
            targets: self.targets.gather(selected),
            images,
            batch,
        }
    }
}

/// One dense minibatch ready for the forward pass.
#[derive(Debug, Clone)]
pub struct Minibatch {
    /// Context word indices, batch×context_length.
    pub contexts: Vec<usize>,
    /// Sparse target distributions, batch×V.
    pub targets: SparseRowMatrix,
    /// Image features, batch×D (one row per example, shared rows duplicated).
    pub images: Vec<f32>,
    /// Number of examples.
    pub batch: usize,
}

/// Striped minibatch assignment over a shuffled index order.
///
/// Minibatch `m` of `numbatches` takes positions m, m + numbatches,
/// m + 2*numbatches, ... of `order`. All minibatches have the same size when
/// `order.len()` is a multiple of `numbatches`; trailing examples beyond
/// `numbatches * batchsize` are visited by the earlier stripes.
pub fn striped_indices(order: &[usize], minibatch: usize, numbatches: usize) -> Vec<usize> {
    order
        .iter()
        .skip(minibatch)
        .step_by(numbatches)
        .copied()
        .collect()
}
