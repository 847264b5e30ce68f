//! Collaborator traits for the training loop.
//!
//! Checkpoint persistence, qualitative sample generation, and validation
//! scoring are external concerns. The trainer calls through these traits at
//! its configured cadence and otherwise knows nothing about file formats,
//! decoding strategies, or metric definitions.

use crate::model::params::ModelParams;
use crate::vocab::Vocabulary;

/// Persists the full current parameter set to durable storage.
///
/// Invoked whenever validation improves on the best score so far.
pub trait CheckpointWriter {
    /// Write a snapshot of the parameters.
    fn save(&mut self, params: &ModelParams) -> std::io::Result<()>;
}

/// Produces qualitative text samples from the current parameters.
///
/// The trainer discards the result; generation exists for operator display.
pub trait SampleGenerator {
    /// Generate and display samples conditioned on validation images.
    fn generate(&mut self, params: &ModelParams, vocab: &Vocabulary, valid_images: &[f32]);
}

/// Scores the current parameters against the validation split.
///
/// Returns up to four scores ordered by increasing n-gram granularity; the
/// trainer's improve/patience decision uses only the last one.
pub trait MetricEvaluator {
    /// Evaluate the model and return the metric scores.
    fn evaluate(
        &mut self,
        params: &ModelParams,
        vocab: &Vocabulary,
        valid_images: &[f32],
    ) -> Vec<f32>;
}

/// Checkpoint writer that drops snapshots on the floor.
///
/// Useful for smoke tests and dry runs.
#[derive(Debug, Default)]
pub struct NullCheckpointWriter;

impl CheckpointWriter for NullCheckpointWriter {
    fn save(&mut self, _params: &ModelParams) -> std::io::Result<()> {
        Ok(())
    }
}

/// Sample generator that produces nothing.
#[derive(Debug, Default)]
pub struct NullSampleGenerator;

impl SampleGenerator for NullSampleGenerator {
    fn generate(&mut self, _params: &ModelParams, _vocab: &Vocabulary, _valid_images: &[f32]) {}
}
