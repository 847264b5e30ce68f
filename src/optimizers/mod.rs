//! Optimizer abstractions for parameter updates
//!
//! This module provides the Optimizer trait and the momentum SGD
//! implementation used to update the model parameters during training.
//!
//! Optimizers operate on flat `f32` slices so the same code path updates the
//! word matrix, the context transforms, and every bias vector.

pub mod momentum;

pub use momentum::{ModelUpdater, MomentumSgd};

/// Core trait for parameter optimizers.
///
/// Implementations may keep internal state across updates (momentum SGD keeps
/// one velocity buffer per parameter tensor, persisted across minibatches).
pub trait Optimizer {
    /// Update parameters in-place using gradients.
    ///
    /// # Panics
    ///
    /// Implementations panic if `parameters` and `gradients` have different
    /// lengths.
    fn update(&mut self, parameters: &mut [f32], gradients: &[f32]);

    /// Reset internal state (velocity buffers, counters).
    fn reset(&mut self);

    /// Get the current learning rate.
    fn learning_rate(&self) -> f32;

    /// Set a new learning rate.
    ///
    /// Useful for implementing learning rate schedules or decay strategies.
    fn set_learning_rate(&mut self, lr: f32);

    /// Set the momentum coefficient.
    ///
    /// A no-op for optimizers without momentum.
    fn set_momentum(&mut self, momentum: f32);
}
