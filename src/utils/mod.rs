//! Shared utilities for the trainer
//!
//! This module provides the seeded random number generator, BLAS-backed
//! matrix helpers, and the hyperparameter schedule.

pub mod matrix;
pub mod rng;
pub mod schedule;

pub use matrix::{add_bias, has_nonfinite, relu_inplace, sgemm_wrapper, softmax_rows, sum_rows};
pub use rng::SimpleRng;
pub use schedule::HyperSchedule;
