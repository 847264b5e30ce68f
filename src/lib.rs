//! Multimodal log-bilinear language model trainer
//!
//! This library trains an additive multimodal log-bilinear (MLBL) language
//! model: the next word of a caption is predicted from a fixed-length word
//! context together with an image feature vector. The word matrix is tied,
//! serving both as the embedding table and the output projection.
//!
//! All gradients are computed by hand (no autodiff), parameters are updated
//! with momentum SGD, and the training loop drives per-epoch shuffling,
//! striped minibatches, hyperparameter scheduling, periodic validation,
//! checkpointing, and early stopping.
//!
//! # Modules
//!
//! - `model`: parameters, forward pass, backward pass, objective
//! - `optimizers`: Optimizer trait and momentum SGD implementation
//! - `trainer`: training-loop state machine
//! - `cadence`: points-processed event dispatcher
//! - `callbacks`: checkpoint/sample/metric collaborator traits
//! - `config`: training configuration structures
//! - `data`: training/validation set containers and minibatch gathering
//! - `sparse`: sparse row matrix for target distributions
//! - `utils`: RNG, BLAS matrix helpers, hyperparameter schedule
//! - `vocab`: vocabulary and pretrained embedding map types
//! - `error`: error taxonomy

extern crate blas_src;

pub mod cadence;
pub mod callbacks;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod optimizers;
pub mod sparse;
pub mod trainer;
pub mod utils;
pub mod vocab;
