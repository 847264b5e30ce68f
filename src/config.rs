//! Configuration structures for training
//!
//! This module provides the configuration record consumed by the trainer:
//! model dimensions, optimization hyperparameters, and the four named cadence
//! thresholds that gate periodic side effects. Configurations can be parsed
//! from JSON files; every hyperparameter carries a default, so a config file
//! only needs to name what it overrides.

use crate::error::TrainError;
use serde::Deserialize;
use std::fs;

/// Training configuration for the multimodal log-bilinear model.
///
/// Cadence thresholds are measured in cumulative points (training examples)
/// processed within the current epoch, not in minibatches, so they behave
/// consistently across batch sizes.
///
/// # Example
///
/// ```json
/// {
///   "vocab_size": 10364,
///   "embed_dim": 50,
///   "image_dim": 4096,
///   "hidden_dim": 256,
///   "context_length": 5,
///   "dropout": 0.5,
///   "eta": 0.2,
///   "validate_every": 25000
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Vocabulary size (V).
    pub vocab_size: usize,
    /// Word embedding dimensionality (K).
    pub embed_dim: usize,
    /// Image feature dimensionality (D).
    pub image_dim: usize,
    /// Intermediate image-hidden layer dimensionality (h).
    pub hidden_dim: usize,
    /// Number of context words conditioning each prediction.
    pub context_length: usize,

    /// Base random seed for initialization, dropout, and per-epoch shuffles.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Probability of dropping each image-hidden unit during training.
    #[serde(default)]
    pub dropout: f32,
    /// Minibatch size.
    #[serde(default = "default_batchsize")]
    pub batchsize: usize,
    /// Maximum number of training epochs.
    #[serde(default = "default_maxepoch")]
    pub maxepoch: usize,

    /// Initial learning rate.
    #[serde(default = "default_eta")]
    pub eta: f32,
    /// Multiplicative learning rate decay applied on each schedule step.
    #[serde(default = "default_decay")]
    pub decay: f32,
    /// Initial momentum coefficient.
    #[serde(default = "default_momentum")]
    pub momentum_initial: f32,
    /// Final momentum coefficient reached after `anneal_steps` schedule steps.
    #[serde(default = "default_momentum")]
    pub momentum_final: f32,
    /// Number of schedule steps over which momentum is linearly annealed.
    #[serde(default = "default_anneal_steps")]
    pub anneal_steps: usize,
    /// L2 weight decay coefficient for the word matrix R.
    #[serde(default)]
    pub gamma_r: f32,
    /// L2 weight decay coefficient for the context, image-context, and image
    /// projection matrices (C, M, J).
    #[serde(default)]
    pub gamma_c: f32,

    /// Consecutive non-improving validations tolerated before stopping.
    #[serde(default = "default_patience")]
    pub patience: usize,
    /// Number of consecutive text examples sharing one image feature row.
    #[serde(default = "default_captions_per_image")]
    pub captions_per_image: usize,

    /// Points processed between progress log lines.
    #[serde(default = "default_log_every")]
    pub log_every: usize,
    /// Points processed between qualitative sample generations.
    #[serde(default = "default_sample_every")]
    pub sample_every: usize,
    /// Points processed between interval-triggered schedule steps.
    #[serde(default = "default_schedule_every")]
    pub schedule_every: usize,
    /// Points processed between validation-metric evaluations.
    #[serde(default = "default_validate_every")]
    pub validate_every: usize,
}

fn default_seed() -> u64 {
    1234
}

fn default_batchsize() -> usize {
    20
}

fn default_maxepoch() -> usize {
    10
}

fn default_eta() -> f32 {
    0.2
}

fn default_decay() -> f32 {
    0.995
}

fn default_momentum() -> f32 {
    0.5
}

fn default_anneal_steps() -> usize {
    20
}

fn default_patience() -> usize {
    10
}

fn default_captions_per_image() -> usize {
    5
}

fn default_log_every() -> usize {
    2000
}

fn default_sample_every() -> usize {
    10000
}

fn default_schedule_every() -> usize {
    10000
}

fn default_validate_every() -> usize {
    25000
}

impl TrainingConfig {
    /// Construct a configuration from the five model dimensions, taking
    /// defaults for every hyperparameter.
    pub fn with_dims(
        vocab_size: usize,
        embed_dim: usize,
        image_dim: usize,
        hidden_dim: usize,
        context_length: usize,
    ) -> Self {
        Self {
            vocab_size,
            embed_dim,
            image_dim,
            hidden_dim,
            context_length,
            seed: default_seed(),
            dropout: 0.0,
            batchsize: default_batchsize(),
            maxepoch: default_maxepoch(),
            eta: default_eta(),
            decay: default_decay(),
            momentum_initial: default_momentum(),
            momentum_final: default_momentum(),
            anneal_steps: default_anneal_steps(),
            gamma_r: 0.0,
            gamma_c: 0.0,
            patience: default_patience(),
            captions_per_image: default_captions_per_image(),
            log_every: default_log_every(),
            sample_every: default_sample_every(),
            schedule_every: default_schedule_every(),
            validate_every: default_validate_every(),
        }
    }

    /// Validate the configuration, failing fast before any training step.
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.vocab_size == 0
            || self.embed_dim == 0
            || self.image_dim == 0
            || self.hidden_dim == 0
            || self.context_length == 0
        {
            return Err(TrainError::config(
                "model dimensions (vocab_size, embed_dim, image_dim, hidden_dim, context_length) must all be positive",
            ));
        }
        if self.batchsize == 0 {
            return Err(TrainError::config("batchsize must be positive"));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(TrainError::config("dropout must be in [0.0, 1.0)"));
        }
        if self.eta < 0.0 || !self.eta.is_finite() {
            return Err(TrainError::config("eta must be finite and non-negative"));
        }
        if self.decay <= 0.0 || self.decay > 1.0 {
            return Err(TrainError::config("decay must be in (0.0, 1.0]"));
        }
        if !(0.0..1.0).contains(&self.momentum_initial)
            || !(0.0..1.0).contains(&self.momentum_final)
        {
            return Err(TrainError::config(
                "momentum coefficients must be in [0.0, 1.0)",
            ));
        }
        if self.anneal_steps == 0 {
            return Err(TrainError::config("anneal_steps must be positive"));
        }
        if self.gamma_r < 0.0 || self.gamma_c < 0.0 {
            return Err(TrainError::config(
                "weight decay coefficients must be non-negative",
            ));
        }
        if self.patience == 0 {
            return Err(TrainError::config("patience must be positive"));
        }
        if self.captions_per_image == 0 {
            return Err(TrainError::config("captions_per_image must be positive"));
        }
        if self.log_every == 0
            || self.sample_every == 0
            || self.schedule_every == 0
            || self.validate_every == 0
        {
            return Err(TrainError::config("cadence thresholds must be positive"));
        }
        Ok(())
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents, and validates
/// the result.
///
/// # Returns
///
/// `Ok(TrainingConfig)` on success, or an error if the file cannot be read,
/// the JSON is invalid, or validation fails.
pub fn load_config(path: &str) -> Result<TrainingConfig, TrainError> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
