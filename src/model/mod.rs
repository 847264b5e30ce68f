//! Multimodal log-bilinear model: parameters, forward pass, backward pass,
//! and the cross-entropy objective.
//!
//! The word matrix R is tied: its columns are the input embeddings and the
//! whole matrix doubles as the output projection. Gradients are computed by
//! hand in `backward`; nothing here mutates parameters.

pub mod backward;
pub mod forward;
pub mod objective;
pub mod params;

pub use forward::ForwardActivations;
pub use objective::cross_entropy;
pub use params::{Gradients, ModelParams};
