//! Simple random number generator for reproducibility.
//!
//! This module provides a lightweight xorshift-based PRNG so that every
//! stochastic choice in training (initialization, per-epoch shuffling,
//! dropout masking) is reproducible given a seed.

/// Simple RNG for reproducibility without global state.
///
/// Uses the xorshift algorithm for fast, deterministic random number
/// generation. One generator seeded with the base seed drives initialization
/// and dropout; a fresh generator seeded with `base + epoch + 1` drives each
/// epoch's shuffle.
pub struct SimpleRng {
    state: u64,
    /// Cached second value from the last Box-Muller draw.
    spare_gaussian: Option<f32>,
}

impl SimpleRng {
    /// Create a new RNG with explicit seed (if zero, use a fixed value).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self {
            state,
            spare_gaussian: None,
        }
    }

    /// Basic xorshift to generate u32.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Convert to [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / (u32::MAX as f32 + 1.0)
    }

    /// Uniform sample in [low, high).
    pub fn gen_range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32()
    }

    /// Standard normal sample via the Box-Muller transform.
    pub fn next_gaussian(&mut self) -> f32 {
        if let Some(z) = self.spare_gaussian.take() {
            return z;
        }
        // Reject u1 == 0 so the logarithm stays finite.
        let mut u1 = self.next_f32();
        while u1 <= f32::EPSILON {
            u1 = self.next_f32();
        }
        let u2 = self.next_f32();
        let radius = (-2.0 * u1.ln()).sqrt();
        let angle = 2.0 * std::f32::consts::PI * u2;
        self.spare_gaussian = Some(radius * angle.sin());
        radius * angle.cos()
    }

    /// Bernoulli trial: true with probability `keep`.
    pub fn gen_bool(&mut self, keep: f32) -> bool {
        self.next_f32() < keep
    }

    /// Integer sample in [0, upper).
    pub fn gen_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            0
        } else {
            (self.next_u32() as usize) % upper
        }
    }

    /// Fisher-Yates shuffle for usize slices.
    pub fn shuffle_usize(&mut self, data: &mut [usize]) {
        if data.len() <= 1 {
            return;
        }
        for i in (1..data.len()).rev() {
            let j = self.gen_usize(i + 1);
            data.swap(i, j);
        }
    }
}
