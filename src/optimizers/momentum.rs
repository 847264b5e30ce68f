//! Momentum SGD optimizer.
//!
//! Implements the update rule
//!
//! ```text
//! v = p * v - (1 - p) * lr * grad
//! w = w + v
//! ```
//!
//! where p is the momentum coefficient and lr already includes the 1/batch
//! normalizer (the trainer sets `lr = eta / batchsize` each minibatch). The
//! velocity buffer persists across minibatches and is never reset per batch.

use crate::model::params::{Gradients, ModelParams};
use crate::optimizers::Optimizer;

/// Momentum SGD for a single parameter tensor.
///
/// The velocity buffer is sized lazily on the first update and must keep the
/// same length afterwards.
///
/// # Example
///
/// ```
/// use mlbl::optimizers::{MomentumSgd, Optimizer};
///
/// let mut opt = MomentumSgd::new(0.1, 0.5);
/// let mut weights = vec![1.0, 2.0];
/// opt.update(&mut weights, &[1.0, -1.0]);
/// // v = -(1 - 0.5) * 0.1 * grad = [-0.05, 0.05]
/// assert!((weights[0] - 0.95).abs() < 1e-6);
/// assert!((weights[1] - 2.05).abs() < 1e-6);
/// ```
pub struct MomentumSgd {
    learning_rate: f32,
    momentum: f32,
    velocity: Vec<f32>,
}

impl MomentumSgd {
    /// Creates a new momentum SGD optimizer.
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - Step size, including any batch normalizer
    /// * `momentum` - Momentum coefficient p in [0, 1)
    pub fn new(learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: Vec::new(),
        }
    }

    /// Current momentum coefficient.
    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    /// Borrow the velocity buffer (empty until the first update).
    pub fn velocity(&self) -> &[f32] {
        &self.velocity
    }
}

impl Optimizer for MomentumSgd {
    fn update(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        assert_eq!(
            parameters.len(),
            gradients.len(),
            "Parameters and gradients must have the same length"
        );
        if self.velocity.is_empty() {
            self.velocity = vec![0.0; parameters.len()];
        }
        assert_eq!(
            self.velocity.len(),
            parameters.len(),
            "Velocity buffer does not match parameter length"
        );

        let p = self.momentum;
        let scale = (1.0 - p) * self.learning_rate;
        for ((param, grad), vel) in parameters
            .iter_mut()
            .zip(gradients.iter())
            .zip(self.velocity.iter_mut())
        {
            *vel = p * *vel - scale * grad;
            *param += *vel;
        }
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }

    fn set_momentum(&mut self, momentum: f32) {
        self.momentum = momentum;
    }
}

/// One momentum optimizer per model tensor.
///
/// Keeps the six velocity buffers alive across minibatches and applies the
/// identical update rule to R, C, bw, M, J, and bj.
pub struct ModelUpdater {
    r: MomentumSgd,
    c: MomentumSgd,
    bw: MomentumSgd,
    m: MomentumSgd,
    j: MomentumSgd,
    bj: MomentumSgd,
}

impl ModelUpdater {
    /// Create an updater with zeroed velocities.
    pub fn new() -> Self {
        Self {
            r: MomentumSgd::new(0.0, 0.0),
            c: MomentumSgd::new(0.0, 0.0),
            bw: MomentumSgd::new(0.0, 0.0),
            m: MomentumSgd::new(0.0, 0.0),
            j: MomentumSgd::new(0.0, 0.0),
            bj: MomentumSgd::new(0.0, 0.0),
        }
    }

    /// Apply one momentum SGD step to every parameter tensor.
    ///
    /// `eta` and `momentum` come from the hyperparameter schedule; the batch
    /// normalizer is folded into the effective learning rate here.
    pub fn apply(
        &mut self,
        params: &mut ModelParams,
        grads: &Gradients,
        eta: f32,
        momentum: f32,
        batchsize: usize,
    ) {
        let lr = eta / batchsize as f32;
        for (opt, (param, grad)) in [
            (&mut self.r, (&mut params.r, &grads.r)),
            (&mut self.c, (&mut params.c, &grads.c)),
            (&mut self.bw, (&mut params.bw, &grads.bw)),
            (&mut self.m, (&mut params.m, &grads.m)),
            (&mut self.j, (&mut params.j, &grads.j)),
            (&mut self.bj, (&mut params.bj, &grads.bj)),
        ] {
            opt.set_learning_rate(lr);
            opt.set_momentum(momentum);
            opt.update(param, grad);
        }
    }

    /// Clear all velocity buffers.
    pub fn reset(&mut self) {
        for opt in [
            &mut self.r, &mut self.c, &mut self.bw, &mut self.m, &mut self.j, &mut self.bj,
        ] {
            opt.reset();
        }
    }
}

impl Default for ModelUpdater {
    fn default() -> Self {
        Self::new()
    }
}
