//! Fully-connected feed-forward classifier trained with mini-batch SGD.
//!
//! The network owns one weight matrix and one bias column vector per layer
//! (hidden layers plus the output layer). Hidden layers activate with ReLU,
//! the output layer with softmax, and training uses the combined
//! softmax-cross-entropy output gradient `a_L - y`.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;

use crate::activation::{relu, relu_prime, softmax};
use crate::error::{Error, Result};
use crate::gaussian::Gaussian;
use crate::matrix::Matrix;

// Keeps the shuffle stream distinct from the per-layer init streams that are
// derived from the same resolved seed.
const SHUFFLE_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// One dense layer: weights of shape `[out, in]` and an `out`×1 bias.
#[derive(Debug, Clone)]
pub struct Layer {
    pub weights: Matrix,
    pub bias: Matrix,
}

/// Everything a forward pass computes, kept for backpropagation.
///
/// `activations` holds `a_0..a_L` (the input included), `pre_activations`
/// holds `z_1..z_L`.
#[derive(Debug)]
pub struct ForwardPass {
    pub pre_activations: Vec<Matrix>,
    pub activations: Vec<Matrix>,
}

impl ForwardPass {
    /// Final layer activation (the softmax output).
    pub fn output(&self) -> &Matrix {
        &self.activations[self.activations.len() - 1]
    }
}

/// Per-layer weight and bias gradients, paired explicitly.
#[derive(Debug)]
pub struct Gradients {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

impl Gradients {
    fn zeros_like(layers: &[Layer]) -> Gradients {
        Gradients {
            weights: layers
                .iter()
                .map(|l| Matrix::zeros(l.weights.rows(), l.weights.cols()))
                .collect(),
            biases: layers
                .iter()
                .map(|l| Matrix::zeros(l.bias.rows(), 1))
                .collect(),
        }
    }

    fn accumulate(&mut self, other: &Gradients) -> Result<()> {
        for i in 0..self.weights.len() {
            self.weights[i] = self.weights[i].add(&other.weights[i])?;
            self.biases[i] = self.biases[i].add(&other.biases[i])?;
        }
        Ok(())
    }
}

/// Classification result: the winning label plus the raw output vector.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub label: String,
    pub output: Vec<f64>,
}

pub struct NeuralNetwork {
    input_size: usize,
    hidden_sizes: Vec<usize>,
    output_labels: Vec<String>,
    learning_rounds: usize,
    mini_batch_size: usize,
    learning_rate: f64,
    seed: u64,
    shuffle_rng: Pcg64,
    layers: Option<Vec<Layer>>,
}

impl NeuralNetwork {
    /// Build an untrained network from its topology and hyperparameters.
    ///
    /// An absent `seed` is resolved from entropy once, here; the resolved
    /// value drives both weight initialization and the per-round shuffle,
    /// so a fixed seed makes the whole training trajectory reproducible.
    pub fn new(
        input_size: usize,
        hidden_sizes: Vec<usize>,
        output_labels: Vec<String>,
        learning_rounds: usize,
        mini_batch_size: usize,
        learning_rate: f64,
        seed: Option<u64>,
    ) -> Result<NeuralNetwork> {
        if input_size == 0 {
            return Err(Error::Config("input size must be > 0".to_owned()));
        }
        if hidden_sizes.is_empty() || hidden_sizes.iter().any(|&h| h == 0) {
            return Err(Error::Config(
                "hidden layer sizes must be non-empty and > 0".to_owned(),
            ));
        }
        if output_labels.is_empty() {
            return Err(Error::Config("at least one output label required".to_owned()));
        }
        if mini_batch_size == 0 {
            return Err(Error::Config("mini batch size must be > 0".to_owned()));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::Config(format!(
                "learning rate must be finite and > 0, got {learning_rate}"
            )));
        }

        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        Ok(NeuralNetwork {
            input_size,
            hidden_sizes,
            output_labels,
            learning_rounds,
            mini_batch_size,
            learning_rate,
            seed,
            shuffle_rng: Pcg64::seed_from_u64(seed ^ SHUFFLE_STREAM),
            layers: None,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_labels(&self) -> &[String] {
        &self.output_labels
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current layers, empty until the network has been initialized.
    pub fn layers(&self) -> &[Layer] {
        self.layers.as_deref().unwrap_or(&[])
    }

    /// Exclusive access to the layers, for inspection and test setups.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        match &mut self.layers {
            Some(layers) => layers,
            None => &mut [],
        }
    }

    /// (Re)build the weight chain with He initialization: each weight entry
    /// is drawn from `Gaussian(0, sqrt(2 / fan_in))`, biases start at zero.
    ///
    /// `train` calls this when the weights are absent or an overwrite is
    /// requested; it is public as the explicit reset entry point.
    pub fn initialize(&mut self) -> Result<()> {
        let mut dims = Vec::with_capacity(self.hidden_sizes.len() + 1);
        let mut fan_in = self.input_size;
        for &h in &self.hidden_sizes {
            dims.push((h, fan_in));
            fan_in = h;
        }
        dims.push((self.output_labels.len(), fan_in));

        let mut layers = Vec::with_capacity(dims.len());
        for (i, (rows, cols)) in dims.into_iter().enumerate() {
            let sd = (2.0 / cols as f64).sqrt();
            let mut sampler = Gaussian::seeded(self.seed.wrapping_add(i as u64), 0.0, sd);
            let data = (0..rows * cols).map(|_| sampler.next()).collect();
            layers.push(Layer {
                weights: Matrix::from_vec(data, rows, cols)?,
                bias: Matrix::zeros(rows, 1),
            });
        }
        self.layers = Some(layers);
        Ok(())
    }

    /// Forward-propagate one input column vector through every layer.
    ///
    /// Returns the complete activation and pre-activation chains; backprop
    /// needs both.
    pub fn forward(&self, input: &Matrix) -> Result<ForwardPass> {
        let layers = self.layers.as_deref().ok_or(Error::Uninitialized)?;
        if input.rows() != self.input_size || input.cols() != 1 {
            return Err(Error::Shape(format!(
                "input must be {}x1, got {}x{}",
                self.input_size,
                input.rows(),
                input.cols()
            )));
        }

        let mut activations = Vec::with_capacity(layers.len() + 1);
        let mut pre_activations = Vec::with_capacity(layers.len());
        activations.push(input.clone());

        for (i, layer) in layers.iter().enumerate() {
            let z = layer.weights.matmul(&activations[i])?.add(&layer.bias)?;
            let a = if i + 1 == layers.len() {
                softmax(&z)
            } else {
                relu(&z)
            };
            pre_activations.push(z);
            activations.push(a);
        }

        Ok(ForwardPass {
            pre_activations,
            activations,
        })
    }

    /// Train in place for `learning_rounds` epochs of mini-batch SGD.
    ///
    /// Every round reshuffles all row indices and partitions them into
    /// `mini_batch_size` chunks; the final chunk keeps the remainder. Weights
    /// are initialized first when absent or when `overwrite` is set.
    pub fn train(&mut self, data: &Matrix, labels: &[String], overwrite: bool) -> Result<()> {
        if data.cols() != self.input_size {
            return Err(Error::Shape(format!(
                "training data has {} columns, network expects {}",
                data.cols(),
                self.input_size
            )));
        }
        if data.rows() != labels.len() {
            return Err(Error::Shape(format!(
                "{} training rows but {} labels",
                data.rows(),
                labels.len()
            )));
        }

        if overwrite || self.layers.is_none() {
            self.initialize()?;
        }

        let mut indices: Vec<usize> = (0..data.rows()).collect();
        for _ in 0..self.learning_rounds {
            indices.shuffle(&mut self.shuffle_rng);
            for chunk in indices.chunks(self.mini_batch_size) {
                let rows = chunk
                    .iter()
                    .map(|&i| data.row(i))
                    .collect::<Result<Vec<Matrix>>>()?;
                let batch = Matrix::stack_rows(&rows)?;
                let batch_labels: Vec<&str> =
                    chunk.iter().map(|&i| labels[i].as_str()).collect();
                self.update_network(&batch, &batch_labels)?;
            }
        }
        Ok(())
    }

    /// One SGD step: sum per-example gradients over the batch, then apply
    /// `W <- W - (lr / batch_len) * sum` (likewise for biases). The divisor
    /// is the actual batch length, so a short final chunk is not over-scaled.
    fn update_network(&mut self, batch: &Matrix, labels: &[&str]) -> Result<()> {
        let mut sums = {
            let layers = self.layers.as_deref().ok_or(Error::Uninitialized)?;
            Gradients::zeros_like(layers)
        };

        for i in 0..batch.rows() {
            let example = batch.row(i)?.transpose();
            let grads = self.backprop(&example, labels[i])?;
            sums.accumulate(&grads)?;
        }

        let step = self.learning_rate / batch.rows() as f64;
        let layers = self.layers.as_deref_mut().ok_or(Error::Uninitialized)?;
        for (layer, (dw, db)) in layers
            .iter_mut()
            .zip(sums.weights.iter().zip(sums.biases.iter()))
        {
            layer.weights = layer.weights.sub(&dw.scale(step))?;
            layer.bias = layer.bias.sub(&db.scale(step))?;
        }
        Ok(())
    }

    /// Gradients for a single example via backpropagation.
    ///
    /// The output delta is the combined softmax-cross-entropy gradient
    /// `a_L - y`; hidden deltas chain back through
    /// `(W_{i+1}^T d_{i+1}) .* ReLU'(z_i)`.
    fn backprop(&self, example: &Matrix, label: &str) -> Result<Gradients> {
        let pass = self.forward(example)?;
        let layers = self.layers.as_deref().ok_or(Error::Uninitialized)?;
        let last = layers.len() - 1;

        let target = self.one_hot(label)?;
        let mut grads = Gradients::zeros_like(layers);

        let mut delta = pass.output().sub(&target)?;
        grads.weights[last] = delta.matmul(&pass.activations[last].transpose())?;
        grads.biases[last] = delta.clone();

        for i in (0..last).rev() {
            let carried = layers[i + 1].weights.transpose().matmul(&delta)?;
            delta = carried.hadamard(&relu_prime(&pass.pre_activations[i]))?;
            grads.weights[i] = delta.matmul(&pass.activations[i].transpose())?;
            grads.biases[i] = delta.clone();
        }

        Ok(grads)
    }

    fn one_hot(&self, label: &str) -> Result<Matrix> {
        let index = self
            .output_labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| Error::UnknownLabel(label.to_owned()))?;
        let mut target = Matrix::zeros(self.output_labels.len(), 1);
        target.set(index, 0, 1.0)?;
        Ok(target)
    }

    /// Classify one example: the label with the largest softmax output plus
    /// the raw output vector.
    pub fn predict(&self, example: &[f64]) -> Result<Prediction> {
        if example.len() != self.input_size {
            return Err(Error::Shape(format!(
                "example has {} features, network expects {}",
                example.len(),
                self.input_size
            )));
        }

        let input = Matrix::column(example.to_vec());
        let pass = self.forward(&input)?;
        let output = pass.output().data();

        // Seed the max search from the first output, never from 0.0.
        let mut best = 0;
        let mut best_value = output[0];
        for (i, &value) in output.iter().enumerate().skip(1) {
            if value > best_value {
                best = i;
                best_value = value;
            }
        }

        Ok(Prediction {
            label: self.output_labels[best].clone(),
            output: output.to_vec(),
        })
    }

    /// Fraction of `data` rows whose predicted label matches `labels`.
    ///
    /// Examples are scored in parallel; scoring is read-only so this leaves
    /// the sequential training semantics untouched.
    pub fn score(&self, data: &Matrix, labels: &[String]) -> Result<f64> {
        if data.rows() != labels.len() {
            return Err(Error::Shape(format!(
                "{} test rows but {} labels",
                data.rows(),
                labels.len()
            )));
        }
        if data.rows() == 0 {
            return Err(Error::Shape("test set is empty".to_owned()));
        }

        let correct = (0..data.rows())
            .into_par_iter()
            .map(|i| {
                let row = data.row(i)?;
                let prediction = self.predict(row.data())?;
                Ok(usize::from(prediction.label == labels[i]))
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(correct.iter().sum::<usize>() as f64 / data.rows() as f64)
    }
}
