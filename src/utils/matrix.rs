//! Matrix helpers over flat row-major buffers.
//!
//! All model tensors are stored as row-major `Vec<f32>` and multiplied with
//! BLAS `sgemm`. This module wraps the unsafe call once and provides the small
//! elementwise helpers (bias add, column sums, ReLU, stable softmax) used by
//! the forward and backward passes.

use cblas::{sgemm, Layout, Transpose};

/// GEMM wrapper: `c = alpha * op(a) * op(b) + beta * c` for row-major slices.
///
/// `m`, `n`, `k` are the dimensions after any transposition: op(a) is m×k,
/// op(b) is k×n, c is m×n. Leading dimensions are those of the stored
/// (untransposed) matrices.
///
/// # Panics
///
/// Panics if any slice is shorter than its declared shape requires.
#[allow(clippy::too_many_arguments)]
pub fn sgemm_wrapper(
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    c: &mut [f32],
    ldc: usize,
    transpose_a: bool,
    transpose_b: bool,
    alpha: f32,
    beta: f32,
) {
    let trans_a = if transpose_a {
        Transpose::Ordinary
    } else {
        Transpose::None
    };
    let trans_b = if transpose_b {
        Transpose::Ordinary
    } else {
        Transpose::None
    };

    unsafe {
        sgemm(
            Layout::RowMajor,
            trans_a,
            trans_b,
            m as i32,
            n as i32,
            k as i32,
            alpha,
            a,
            lda as i32,
            b,
            ldb as i32,
            beta,
            c,
            ldc as i32,
        );
    }
}

/// Add a bias vector to each row of a row-major matrix.
pub fn add_bias(data: &mut [f32], rows: usize, cols: usize, bias: &[f32]) {
    for row in data.chunks_exact_mut(cols).take(rows) {
        for (value, b) in row.iter_mut().zip(bias) {
            *value += *b;
        }
    }
}

/// Sum the rows of a row-major matrix into `out` (length `cols`).
pub fn sum_rows(data: &[f32], rows: usize, cols: usize, out: &mut [f32]) {
    for value in out.iter_mut().take(cols) {
        *value = 0.0;
    }

    for row in data.chunks_exact(cols).take(rows) {
        for (value, sum) in row.iter().zip(out.iter_mut()) {
            *sum += *value;
        }
    }
}

/// ReLU applied in-place.
pub fn relu_inplace(data: &mut [f32]) {
    for value in data.iter_mut() {
        if *value < 0.0 {
            *value = 0.0;
        }
    }
}

/// Row-wise softmax with the max-subtraction trick for numerical stability.
///
/// Each row of the `rows`×`cols` matrix is converted to a probability
/// distribution summing to 1.
pub fn softmax_rows(outputs: &mut [f32], rows: usize, cols: usize) {
    if cols == 0 {
        return;
    }
    assert_eq!(
        outputs.len(),
        rows * cols,
        "outputs length mismatch in softmax_rows"
    );

    for row in outputs.chunks_exact_mut(cols).take(rows) {
        let mut max_value = row[0];
        for &value in row.iter().skip(1) {
            if value > max_value {
                max_value = value;
            }
        }

        let mut sum = 0.0f32;
        for value in row.iter_mut() {
            *value = (*value - max_value).exp();
            sum += *value;
        }

        let inv_sum = 1.0f32 / sum;
        for value in row.iter_mut() {
            *value *= inv_sum;
        }
    }
}

/// Whether any element is NaN or infinite.
pub fn has_nonfinite(data: &[f32]) -> bool {
    data.iter().any(|v| !v.is_finite())
}
