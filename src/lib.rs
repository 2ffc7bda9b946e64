//! From-scratch fully-connected neural network trainer and classifier.
//!
//! Dense-matrix forward propagation, backpropagation, and mini-batch SGD,
//! with He-initialized weights drawn from a Box–Muller Gaussian sampler.
//! CPU-only and single-threaded in the training path; scoring may fan out
//! across examples because it is read-only.

pub mod activation;
pub mod dataset;
pub mod error;
pub mod gaussian;
pub mod matrix;
pub mod network;

pub use dataset::{DataSet, Mnist};
pub use error::{Error, Result};
pub use gaussian::Gaussian;
pub use matrix::Matrix;
pub use network::{ForwardPass, Gradients, Layer, NeuralNetwork, Prediction};
