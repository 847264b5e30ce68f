//! Training-loop state machine.
//!
//! Drives epochs and striped minibatches through the manual
//! forward/backward/update sequence, polls the cadence dispatcher for
//! periodic side effects, and manages the early-stopping state. The loop is
//! single-threaded and fully synchronous: one context owns the parameters
//! and mutates them exclusively between stages.
//!
//! Terminal states are patience exhaustion, numerical divergence, and
//! reaching the configured epoch limit. A diverged run is not an error: the
//! loop stops and still reports the best validation score observed.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cadence::{Cadence, CadenceEvent};
use crate::callbacks::{CheckpointWriter, MetricEvaluator, SampleGenerator};
use crate::config::TrainingConfig;
use crate::data::{striped_indices, CaptionSet};
use crate::error::TrainError;
use crate::model::params::ModelParams;
use crate::optimizers::ModelUpdater;
use crate::utils::{has_nonfinite, HyperSchedule, SimpleRng};
use crate::vocab::{EmbeddingMap, Vocabulary};

/// Why the training loop stopped. All variants are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured maximum epoch count was exhausted.
    MaxEpoch,
    /// Validation failed to improve for the configured patience.
    Patience,
    /// A non-finite value appeared in the hidden activation.
    Diverged,
}

/// Early-stopping bookkeeping.
#[derive(Debug, Clone)]
pub struct TrainingState {
    /// Best validation score observed so far.
    pub best_score: f32,
    /// Consecutive non-improving validations.
    pub patience_count: usize,
    /// Terminal state, once reached.
    pub stop: Option<StopReason>,
}

impl TrainingState {
    fn new() -> Self {
        Self {
            best_score: 0.0,
            patience_count: 0,
            stop: None,
        }
    }
}

/// Result of a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOutcome {
    /// Best validation score observed over the run.
    pub best_score: f32,
    /// The terminal state that ended the run.
    pub stop: StopReason,
}

/// Trainer for the multimodal log-bilinear model.
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    /// Create a trainer, validating the configuration up front.
    pub fn new(config: TrainingConfig) -> Result<Self, TrainError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The trainer's configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train a freshly initialized model and return the outcome together
    /// with the final parameters.
    ///
    /// Parameters are initialized from the configured seed, or from
    /// `embeddings` when given. Every stochastic choice is seeded: the base
    /// seed drives initialization and dropout, and each epoch's shuffle uses
    /// `seed + epoch + 1`, so identical inputs reproduce identical
    /// trajectories.
    ///
    /// # Errors
    ///
    /// Fails fast with `TrainError::Config` on any dimension mismatch
    /// between the configuration and the supplied data, with
    /// `TrainError::MissingEmbedding` if a pretrained vector cannot be
    /// resolved, and with `TrainError::Io` if a checkpoint write fails.
    #[allow(clippy::too_many_arguments)]
    pub fn train(
        &self,
        train: &CaptionSet,
        valid: &CaptionSet,
        vocab: &Vocabulary,
        embeddings: Option<&EmbeddingMap>,
        checkpoint: &mut dyn CheckpointWriter,
        sampler: &mut dyn SampleGenerator,
        evaluator: &mut dyn MetricEvaluator,
    ) -> Result<(TrainOutcome, ModelParams), TrainError> {
        let config = &self.config;
        train.validate_against(config)?;
        valid.validate_against(config)?;
        if vocab.len() != config.vocab_size {
            return Err(TrainError::config(format!(
                "vocabulary has {} words but vocab_size is {}",
                vocab.len(),
                config.vocab_size
            )));
        }
        let numbatches = train.len() / config.batchsize;
        if numbatches == 0 {
            return Err(TrainError::config(format!(
                "batchsize {} exceeds the {} training examples",
                config.batchsize,
                train.len()
            )));
        }

        let mut rng = SimpleRng::new(config.seed);
        let mut params = match embeddings {
            Some(map) => ModelParams::init_pretrained(config, vocab, map, &mut rng)?,
            None => ModelParams::init(config, &mut rng),
        };

        let mut schedule = HyperSchedule::new(
            config.eta,
            config.decay,
            config.momentum_initial,
            config.momentum_final,
            config.anneal_steps,
        );
        let mut updater = ModelUpdater::new();
        let mut cadence = Cadence::new(
            config.log_every,
            config.sample_every,
            config.schedule_every,
            config.validate_every,
        );
        let mut state = TrainingState::new();
        let mut order: Vec<usize> = (0..train.len()).collect();
        let started = Instant::now();

        info!(
            examples = train.len(),
            numbatches,
            parameters = params.parameter_count(),
            "starting training"
        );

        'epochs: for epoch in 0..config.maxepoch {
            let mut shuffle_rng = SimpleRng::new(config.seed + epoch as u64 + 1);
            shuffle_rng.shuffle_usize(&mut order);
            cadence.reset();

            for minibatch in 0..numbatches {
                let selected = striped_indices(&order, minibatch, numbatches);
                let batch = train.gather_minibatch(&selected, config.captions_per_image);

                let fwd = params.forward_train(
                    &batch.contexts,
                    &batch.images,
                    batch.batch,
                    config.dropout,
                    &mut rng,
                );
                let grads = params.backward(
                    &fwd,
                    &batch.contexts,
                    &batch.images,
                    &batch.targets,
                    config.gamma_r,
                    config.gamma_c,
                );
                updater.apply(
                    &mut params,
                    &grads,
                    schedule.eta(),
                    schedule.momentum(),
                    batch.batch,
                );

                if has_nonfinite(&fwd.acts) {
                    warn!(epoch, minibatch, "non-finite hidden activation, stopping");
                    state.stop = Some(StopReason::Diverged);
                    break 'epochs;
                }

                let points = (minibatch + 1) * config.batchsize;
                for event in cadence.poll(points) {
                    match event {
                        CadenceEvent::Log => {
                            info!(
                                epoch,
                                points,
                                minutes = started.elapsed().as_secs_f64() / 60.0,
                                "progress"
                            );
                        }
                        CadenceEvent::Sample => {
                            debug!(best = state.best_score, "generating samples");
                            sampler.generate(&params, vocab, &valid.images);
                        }
                        CadenceEvent::Schedule => {
                            schedule.step();
                            info!(
                                eta = schedule.eta(),
                                momentum = schedule.momentum(),
                                "schedule step"
                            );
                        }
                        CadenceEvent::Validate => {
                            let scores = evaluator.evaluate(&params, vocab, &valid.images);
                            let Some(&score) = scores.last() else {
                                continue;
                            };
                            if score >= state.best_score {
                                state.patience_count = 0;
                                state.best_score = score;
                                info!(?scores, best = score, "validation improved");
                                checkpoint.save(&params)?;
                            } else {
                                state.patience_count += 1;
                                debug!(
                                    ?scores,
                                    best = state.best_score,
                                    patience = state.patience_count,
                                    "validation did not improve"
                                );
                                if state.patience_count == config.patience {
                                    info!(best = state.best_score, "patience exhausted");
                                    state.stop = Some(StopReason::Patience);
                                    break 'epochs;
                                }
                            }
                        }
                    }
                }
            }

            // End-of-epoch schedule step, independent of the interval one.
            schedule.step();
            debug!(
                epoch,
                eta = schedule.eta(),
                momentum = schedule.momentum(),
                "epoch finished"
            );
        }

        let stop = state.stop.unwrap_or(StopReason::MaxEpoch);
        info!(?stop, best = state.best_score, "training finished");
        Ok((
            TrainOutcome {
                best_score: state.best_score,
                stop,
            },
            params,
        ))
    }
}
