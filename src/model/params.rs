//! Model parameters and seeded initialization.
//!
//! All tensors are row-major flat `Vec<f32>` buffers:
//!
//! - `r`: K×V tied word matrix (column i is the embedding of vocabulary
//!   index i; the matrix also serves as the output projection)
//! - `c`: context_length contiguous K×K context transforms
//! - `bw`: V output bias
//! - `m`: h×K image-context matrix
//! - `j`: D×h image projection
//! - `bj`: h image-hidden bias

use crate::config::TrainingConfig;
use crate::error::TrainError;
use crate::utils::SimpleRng;
use crate::vocab::{EmbeddingMap, Vocabulary, UNKNOWN_TOKEN};

/// Trainable parameters of the multimodal log-bilinear model.
#[derive(Debug, Clone)]
pub struct ModelParams {
    /// Vocabulary size (V).
    pub vocab_size: usize,
    /// Word embedding dimensionality (K).
    pub embed_dim: usize,
    /// Image feature dimensionality (D).
    pub image_dim: usize,
    /// Image-hidden layer dimensionality (h).
    pub hidden_dim: usize,
    /// Context window length.
    pub context_length: usize,

    /// Tied word matrix, K×V.
    pub r: Vec<f32>,
    /// Context transforms, context_length blocks of K×K.
    pub c: Vec<f32>,
    /// Output bias, length V.
    pub bw: Vec<f32>,
    /// Image-context matrix, h×K.
    pub m: Vec<f32>,
    /// Image projection, D×h.
    pub j: Vec<f32>,
    /// Image-hidden bias, length h.
    pub bj: Vec<f32>,
}

impl ModelParams {
    /// Initialize with the seeded generator.
    ///
    /// R and J use Xavier-style uniform draws in ±√6/√(fan_in + fan_out + 1);
    /// C and M are zero-mean gaussians scaled by 0.01; biases start at zero.
    /// Identical seed and dimensions produce bit-identical parameters. The
    /// generator is consumed in the fixed order R, C, M, J.
    pub fn init(config: &TrainingConfig, rng: &mut SimpleRng) -> Self {
        let mut params = Self::zero_shaped(config);
        let limit =
            6.0f32.sqrt() / ((config.embed_dim + config.vocab_size + 1) as f32).sqrt();
        for value in &mut params.r {
            *value = rng.gen_range_f32(-limit, limit);
        }
        params.fill_non_word_tensors(config, rng);
        params
    }

    /// Initialize with pretrained word embeddings for R and seeded draws for
    /// everything else.
    ///
    /// For each vocabulary index the word's vector is copied into the
    /// matching column of R, substituting the vector bound to the reserved
    /// unknown-token key when the word is absent.
    ///
    /// # Errors
    ///
    /// `TrainError::MissingEmbedding` if neither the word nor the fallback is
    /// present; `TrainError::Config` if the vocabulary is smaller than the
    /// configured size or a pretrained vector has the wrong dimensionality.
    pub fn init_pretrained(
        config: &TrainingConfig,
        vocab: &Vocabulary,
        embeddings: &EmbeddingMap,
        rng: &mut SimpleRng,
    ) -> Result<Self, TrainError> {
        let mut params = Self::zero_shaped(config);
        let k = config.embed_dim;
        let v = config.vocab_size;

        for i in 0..v {
            let word = vocab.word(i).ok_or_else(|| {
                TrainError::config(format!(
                    "vocabulary has {} words but vocab_size is {}",
                    vocab.len(),
                    v
                ))
            })?;
            let vector =
                embeddings
                    .get_or_unknown(word)
                    .ok_or_else(|| TrainError::MissingEmbedding {
                        word: word.to_string(),
                        index: i,
                        fallback: UNKNOWN_TOKEN.to_string(),
                    })?;
            if vector.len() != k {
                return Err(TrainError::config(format!(
                    "pretrained vector for '{}' has length {} but embed_dim is {}",
                    word,
                    vector.len(),
                    k
                )));
            }
            for (row, &value) in vector.iter().enumerate() {
                params.r[row * v + i] = value;
            }
        }

        params.fill_non_word_tensors(config, rng);
        Ok(params)
    }

    fn zero_shaped(config: &TrainingConfig) -> Self {
        let v = config.vocab_size;
        let k = config.embed_dim;
        let d = config.image_dim;
        let h = config.hidden_dim;
        let ctx = config.context_length;
        Self {
            vocab_size: v,
            embed_dim: k,
            image_dim: d,
            hidden_dim: h,
            context_length: ctx,
            r: vec![0.0; k * v],
            c: vec![0.0; ctx * k * k],
            bw: vec![0.0; v],
            m: vec![0.0; h * k],
            j: vec![0.0; d * h],
            bj: vec![0.0; h],
        }
    }

    fn fill_non_word_tensors(&mut self, config: &TrainingConfig, rng: &mut SimpleRng) {
        for value in &mut self.c {
            *value = 0.01 * rng.next_gaussian();
        }
        for value in &mut self.m {
            *value = 0.01 * rng.next_gaussian();
        }
        let limit =
            6.0f32.sqrt() / ((config.image_dim + config.hidden_dim + 1) as f32).sqrt();
        for value in &mut self.j {
            *value = rng.gen_range_f32(-limit, limit);
        }
    }

    /// The K×K context transform for position `p`.
    pub fn context_block(&self, p: usize) -> &[f32] {
        let size = self.embed_dim * self.embed_dim;
        &self.c[p * size..(p + 1) * size]
    }

    /// Total number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.r.len()
            + self.c.len()
            + self.bw.len()
            + self.m.len()
            + self.j.len()
            + self.bj.len()
    }
}

/// Gradient buffers, one per parameter tensor, same shapes.
///
/// The tied word matrix receives contributions from two distinct paths
/// (output projection and embedding lookup); both accumulate into the single
/// `r` buffer here before any update is applied.
#[derive(Debug, Clone)]
pub struct Gradients {
    /// Gradient for the tied word matrix R.
    pub r: Vec<f32>,
    /// Gradient for the context transforms C.
    pub c: Vec<f32>,
    /// Gradient for the output bias bw.
    pub bw: Vec<f32>,
    /// Gradient for the image-context matrix M.
    pub m: Vec<f32>,
    /// Gradient for the image projection J.
    pub j: Vec<f32>,
    /// Gradient for the image-hidden bias bj.
    pub bj: Vec<f32>,
}

impl Gradients {
    /// Zero gradients shaped like the given parameters.
    pub fn zeros_like(params: &ModelParams) -> Self {
        Self {
            r: vec![0.0; params.r.len()],
            c: vec![0.0; params.c.len()],
            bw: vec![0.0; params.bw.len()],
            m: vec![0.0; params.m.len()],
            j: vec![0.0; params.j.len()],
            bj: vec![0.0; params.bj.len()],
        }
    }
}
