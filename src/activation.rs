//! Activation functions over column vectors.
//!
//! Hidden layers use ReLU; the output layer uses softmax so the final
//! activations form a probability distribution over the labels.

use crate::matrix::Matrix;

/// Elementwise `max(x, 0)`.
pub fn relu(m: &Matrix) -> Matrix {
    m.map(|x| if x > 0.0 { x } else { 0.0 })
}

/// ReLU derivative: 1 for `x > 0`, otherwise 0. Exactly 0 maps to 0.
pub fn relu_prime(m: &Matrix) -> Matrix {
    m.map(|x| if x > 0.0 { 1.0 } else { 0.0 })
}

/// Softmax over a column vector.
///
/// The max logit is subtracted before exponentiating so large logits do not
/// overflow `exp`; the result is unchanged mathematically.
pub fn softmax(m: &Matrix) -> Matrix {
    let max = m
        .data()
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = m.data().iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    Matrix::column(exps.into_iter().map(|e| e / sum).collect())
}
