// Numerical gradient checking with central finite differences.
// On a small synthetic configuration (V=5, K=3, D=2, h=2, context=2,
// batch=4) the analytic gradients from the manual backward pass must match
// finite-difference estimates of the cross-entropy objective for every
// parameter tensor, including the two accumulation paths into the tied
// word matrix.

use mlbl::config::TrainingConfig;
use mlbl::model::{Gradients, ModelParams};
use mlbl::sparse::SparseRowMatrix;
use mlbl::utils::SimpleRng;

const EPSILON: f32 = 1e-2;
const ABS_TOL: f32 = 1e-3;
const REL_TOL: f32 = 2e-2;

struct Setup {
    params: ModelParams,
    contexts: Vec<usize>,
    images: Vec<f32>,
    targets: SparseRowMatrix,
    batch: usize,
}

fn setup() -> Setup {
    let cfg = TrainingConfig::with_dims(5, 3, 2, 2, 2);
    let mut rng = SimpleRng::new(4242);
    let mut params = ModelParams::init(&cfg, &mut rng);
    // Fixed image projection and bias keep every ReLU preactivation well
    // away from zero, where finite differences would straddle the kink.
    params.j = vec![0.8, -0.3, 0.2, 0.6];
    params.bj = vec![0.3, -0.2];
    let contexts = vec![0, 1, 2, 3, 4, 0, 1, 2];
    let images = vec![0.6, -0.4, 1.2, 0.8, -0.9, 0.3, 0.5, 1.1];
    let targets = SparseRowMatrix::from_one_hot(&[1, 2, 3, 4], 5);
    Setup {
        params,
        contexts,
        images,
        targets,
        batch: 4,
    }
}

fn loss(setup: &Setup, params: &ModelParams) -> f32 {
    params.compute_objective(&setup.contexts, &setup.images, setup.batch, 0.0, &setup.targets)
}

/// Which parameter tensor to perturb.
#[derive(Clone, Copy)]
enum Tensor {
    R,
    C,
    Bw,
    M,
    J,
    Bj,
}

fn tensor_mut(params: &mut ModelParams, tensor: Tensor) -> &mut Vec<f32> {
    match tensor {
        Tensor::R => &mut params.r,
        Tensor::C => &mut params.c,
        Tensor::Bw => &mut params.bw,
        Tensor::M => &mut params.m,
        Tensor::J => &mut params.j,
        Tensor::Bj => &mut params.bj,
    }
}

fn analytic(grads: &Gradients, tensor: Tensor) -> &[f32] {
    match tensor {
        Tensor::R => &grads.r,
        Tensor::C => &grads.c,
        Tensor::Bw => &grads.bw,
        Tensor::M => &grads.m,
        Tensor::J => &grads.j,
        Tensor::Bj => &grads.bj,
    }
}

fn check_tensor(setup: &Setup, grads: &Gradients, tensor: Tensor, name: &str) {
    let count = analytic(grads, tensor).len();
    for i in 0..count {
        let mut plus = setup.params.clone();
        tensor_mut(&mut plus, tensor)[i] += EPSILON;
        let mut minus = setup.params.clone();
        tensor_mut(&mut minus, tensor)[i] -= EPSILON;

        let numeric = (loss(setup, &plus) - loss(setup, &minus)) / (2.0 * EPSILON);
        let exact = analytic(grads, tensor)[i];
        let tolerance = ABS_TOL + REL_TOL * exact.abs();
        assert!(
            (numeric - exact).abs() < tolerance,
            "{}[{}]: analytic {} vs numeric {} (tolerance {})",
            name,
            i,
            exact,
            numeric,
            tolerance
        );
    }
}

fn backward(setup: &Setup) -> Gradients {
    let fwd = setup
        .params
        .forward_infer(&setup.contexts, &setup.images, setup.batch, 0.0);
    setup.params.backward(
        &fwd,
        &setup.contexts,
        &setup.images,
        &setup.targets,
        0.0,
        0.0,
    )
}

#[test]
fn test_word_matrix_gradient() {
    let setup = setup();
    let grads = backward(&setup);
    check_tensor(&setup, &grads, Tensor::R, "R");
}

#[test]
fn test_context_tensor_gradient() {
    let setup = setup();
    let grads = backward(&setup);
    check_tensor(&setup, &grads, Tensor::C, "C");
}

#[test]
fn test_output_bias_gradient() {
    let setup = setup();
    let grads = backward(&setup);
    check_tensor(&setup, &grads, Tensor::Bw, "bw");
}

#[test]
fn test_image_context_gradient() {
    let setup = setup();
    let grads = backward(&setup);
    check_tensor(&setup, &grads, Tensor::M, "M");
}

#[test]
fn test_image_projection_gradient() {
    let setup = setup();
    let grads = backward(&setup);
    check_tensor(&setup, &grads, Tensor::J, "J");
}

#[test]
fn test_image_bias_gradient() {
    let setup = setup();
    let grads = backward(&setup);
    check_tensor(&setup, &grads, Tensor::Bj, "bj");
}

#[test]
fn test_repeated_context_word_accumulates_both_positions() {
    // The same word in both context positions routes two embedding-path
    // contributions plus the output-path contribution into one column of dR.
    let cfg = TrainingConfig::with_dims(5, 3, 2, 2, 2);
    let mut rng = SimpleRng::new(17);
    let mut params = ModelParams::init(&cfg, &mut rng);
    params.j = vec![0.8, -0.3, 0.2, 0.6];
    params.bj = vec![0.3, -0.2];
    let contexts = vec![2, 2];
    let images = vec![0.4, 0.7];
    let targets = SparseRowMatrix::from_one_hot(&[0], 5);

    let setup = Setup {
        params,
        contexts,
        images,
        targets,
        batch: 1,
    };
    let grads = backward(&setup);
    check_tensor(&setup, &grads, Tensor::R, "R (repeated word)");
}
