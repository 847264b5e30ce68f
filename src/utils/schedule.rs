//! Hyperparameter schedule: learning rate decay and momentum annealing.
//!
//! The learning rate decays geometrically on every schedule step, and the
//! momentum coefficient is annealed linearly from its initial to its final
//! value over a fixed number of steps. One shared step counter advances on
//! both interval-triggered steps and the unconditional end-of-epoch step.

/// Learning rate and momentum schedule.
///
/// Stepping applies `eta <- eta * decay` and recomputes the momentum
/// coefficient as a linear blend of the initial and final values:
/// `p = (1 - s/T) * p_i + (s/T) * p_f` while `s < T`, then `p_f` forever.
/// The starting momentum already sits one fraction along the anneal
/// (`s = 1`), not at the raw initial value.
///
/// # Example
///
/// ```
/// use mlbl::utils::schedule::HyperSchedule;
///
/// let mut schedule = HyperSchedule::new(0.2, 0.995, 0.5, 0.9, 20);
/// let eta0 = schedule.eta();
/// schedule.step();
/// assert!((schedule.eta() - eta0 * 0.995).abs() < 1e-7);
/// ```
#[derive(Debug, Clone)]
pub struct HyperSchedule {
    initial_eta: f32,
    decay: f32,
    momentum_initial: f32,
    momentum_final: f32,
    anneal_steps: usize,
    eta: f32,
    momentum: f32,
    step: usize,
}

impl HyperSchedule {
    /// Creates a new schedule.
    ///
    /// # Arguments
    ///
    /// * `eta` - Initial learning rate
    /// * `decay` - Multiplicative learning rate decay per step (0 < decay <= 1)
    /// * `momentum_initial` - Momentum coefficient at the start of training
    /// * `momentum_final` - Momentum coefficient after `anneal_steps` steps
    /// * `anneal_steps` - Number of steps over which momentum is annealed
    pub fn new(
        eta: f32,
        decay: f32,
        momentum_initial: f32,
        momentum_final: f32,
        anneal_steps: usize,
    ) -> Self {
        let t = anneal_steps as f32;
        let momentum = (1.0 - 1.0 / t) * momentum_initial + (1.0 / t) * momentum_final;
        Self {
            initial_eta: eta,
            decay,
            momentum_initial,
            momentum_final,
            anneal_steps,
            eta,
            momentum,
            step: 0,
        }
    }

    /// Current learning rate.
    pub fn eta(&self) -> f32 {
        self.eta
    }

    /// Current momentum coefficient.
    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    /// Number of schedule steps taken so far.
    pub fn step_count(&self) -> usize {
        self.step
    }

    /// Advance the schedule by one step.
    ///
    /// Decays the learning rate, moves the momentum coefficient one fraction
    /// further along the linear anneal (clamped at the final value), and
    /// increments the shared step counter.
    pub fn step(&mut self) {
        self.eta *= self.decay;
        if self.step < self.anneal_steps {
            let frac = (self.step + 1) as f32 / self.anneal_steps as f32;
            self.momentum = (1.0 - frac) * self.momentum_initial + frac * self.momentum_final;
        } else {
            self.momentum = self.momentum_final;
        }
        self.step += 1;
    }

    /// Reset the schedule to its initial state.
    pub fn reset(&mut self) {
        self.eta = self.initial_eta;
        let t = self.anneal_steps as f32;
        self.momentum =
            (1.0 - 1.0 / t) * self.momentum_initial + (1.0 / t) * self.momentum_final;
        self.step = 0;
    }
}
