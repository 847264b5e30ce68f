// Hyperparameter schedule driving the momentum optimizer.

use approx::assert_relative_eq;
use mlbl::optimizers::{MomentumSgd, Optimizer};
use mlbl::utils::schedule::HyperSchedule;

#[test]
fn test_eta_follows_geometric_decay() {
    let mut schedule = HyperSchedule::new(0.43, 0.998, 0.5, 0.9, 20);
    let mut expected = 0.43f32;
    for _ in 0..100 {
        schedule.step();
        expected *= 0.998;
        assert_relative_eq!(schedule.eta(), expected, epsilon = 1e-6);
    }
}

#[test]
fn test_momentum_anneal_is_linear_then_flat() {
    let mut schedule = HyperSchedule::new(0.2, 1.0, 0.5, 0.9, 4);
    // Starts one fraction along the anneal.
    assert_relative_eq!(schedule.momentum(), 0.6, epsilon = 1e-6);
    schedule.step();
    assert_relative_eq!(schedule.momentum(), 0.6, epsilon = 1e-6);
    schedule.step();
    assert_relative_eq!(schedule.momentum(), 0.7, epsilon = 1e-6);
    schedule.step();
    assert_relative_eq!(schedule.momentum(), 0.8, epsilon = 1e-6);
    schedule.step();
    assert_relative_eq!(schedule.momentum(), 0.9, epsilon = 1e-6);
    for _ in 0..10 {
        schedule.step();
        assert_relative_eq!(schedule.momentum(), 0.9, epsilon = 1e-6);
    }
}

#[test]
fn test_schedule_feeds_optimizer_between_steps() {
    // The trainer pushes the current eta and momentum into the optimizer on
    // every minibatch; the velocity history must survive those pushes.
    let mut schedule = HyperSchedule::new(0.1, 0.5, 0.5, 0.5, 20);
    let mut opt = MomentumSgd::new(schedule.eta(), schedule.momentum());
    let mut weights = vec![0.0f32];

    opt.update(&mut weights, &[1.0]);
    let v1 = opt.velocity()[0];
    assert_relative_eq!(v1, -0.05, epsilon = 1e-6);

    schedule.step();
    opt.set_learning_rate(schedule.eta());
    opt.set_momentum(schedule.momentum());
    opt.update(&mut weights, &[1.0]);
    // v2 = 0.5 * v1 - (1 - 0.5) * 0.05 * 1.0
    assert_relative_eq!(opt.velocity()[0], 0.5 * v1 - 0.025, epsilon = 1e-6);
}

#[test]
fn test_reset_restores_initial_state() {
    let mut schedule = HyperSchedule::new(0.2, 0.9, 0.5, 0.9, 10);
    let eta0 = schedule.eta();
    let momentum0 = schedule.momentum();
    for _ in 0..25 {
        schedule.step();
    }
    assert_eq!(schedule.step_count(), 25);
    schedule.reset();
    assert_eq!(schedule.step_count(), 0);
    assert_relative_eq!(schedule.eta(), eta0, epsilon = 1e-7);
    assert_relative_eq!(schedule.momentum(), momentum0, epsilon = 1e-7);
}
