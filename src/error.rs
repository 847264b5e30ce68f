//! Error types for model construction and training.
//!
//! Configuration problems and missing pretrained embeddings fail fast, before
//! any training step runs. Numerical divergence during training is deliberately
//! not represented here: the training loop handles it by transitioning to a
//! terminal state and still returns the best validation score observed.

use thiserror::Error;

/// Errors raised while building or configuring the trainer.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Invalid configuration: dimension mismatches between the configured
    /// model shape and supplied tensors, or out-of-range hyperparameters.
    #[error("configuration error: {detail}")]
    Config {
        /// Description of the configuration issue.
        detail: String,
    },

    /// The pretrained embedding map contains neither the requested word nor
    /// the reserved unknown-token fallback.
    #[error("no pretrained embedding for '{word}' (vocabulary index {index}) and no '{fallback}' fallback")]
    MissingEmbedding {
        /// Word looked up in the embedding map.
        word: String,
        /// Vocabulary index of the word.
        index: usize,
        /// Reserved fallback key that was also absent.
        fallback: String,
    },

    /// Reading a configuration file or writing a checkpoint failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for `TrainingConfig`.
    #[error("failed to parse configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrainError {
    /// Shorthand for a configuration error with a formatted detail message.
    pub fn config(detail: impl Into<String>) -> Self {
        TrainError::Config {
            detail: detail.into(),
        }
    }
}
