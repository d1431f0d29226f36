use rand::Rng;

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use crate::error::{NetError, Result};

#[derive(Debug, Clone)]
pub struct Layer{
    pub size: usize,
    pub input_size: usize,
    /// Shape `[size][input_size]`.
    pub weights: Matrix,
    /// `None` when the layer runs bias-free.
    pub biases: Option<Vec<f64>>,
    pub activator: ActivationFunction,
    input: Vec<f64>,    // input of the last forward pass
    neurons: Vec<f64>,  // output of the last forward pass, used for derivatives
    weight_velocity: Matrix,  // previous Δw, for momentum
    bias_velocity: Vec<f64>,
}

impl Layer {
    /// Xavier-initialized weights and zero biases.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        bias: bool,
        rng: &mut R,
    ) -> Layer {
        let weights = Matrix::xavier(size, input_size, rng);
        let biases = bias.then(|| vec![0.0; size]);
        Layer::assemble(weights, biases, activation)
    }

    /// Builds a layer from existing parameters after checking their shapes.
    pub fn from_parts(
        weights: Matrix,
        biases: Option<Vec<f64>>,
        activation: ActivationFunction,
    ) -> Result<Layer> {
        if weights.rows == 0 || weights.cols == 0 {
            return Err(NetError::Configuration("layer weights must not be empty".to_owned()));
        }
        if let Some(b) = &biases {
            if b.len() != weights.rows {
                return Err(NetError::Configuration(format!(
                    "bias has {} entries, expected {}", b.len(), weights.rows
                )));
            }
            if b.iter().any(|v| !v.is_finite()) {
                return Err(NetError::Configuration("bias must contain only finite values".to_owned()));
            }
        }
        activation.validate()?;
        Ok(Layer::assemble(weights, biases, activation))
    }

    fn assemble(weights: Matrix, biases: Option<Vec<f64>>, activator: ActivationFunction) -> Layer {
        let (size, input_size) = (weights.rows, weights.cols);
        Layer {
            size,
            input_size,
            weight_velocity: Matrix::zeros(size, input_size),
            bias_velocity: vec![0.0; size],
            input: vec![0.0; input_size],
            neurons: vec![0.0; size],
            weights,
            biases,
            activator,
        }
    }

    /// `a = f(W·x + b)`. Caches `x` and `a` for the backward pass.
    pub fn feed_from(&mut self, input: &[f64]) -> Vec<f64> {
        let mut z = self.weights.mul_vec(input);
        if let Some(b) = &self.biases {
            z.iter_mut().zip(b).for_each(|(v, b)| *v += b);
        }
        self.activator.apply(&mut z);

        self.input.clear();
        self.input.extend_from_slice(input);
        self.neurons.clone_from(&z);
        z
    }

    pub fn neurons(&self) -> &[f64] {
        &self.neurons
    }

    /// Computes gradients from `error = ∂L/∂a` for the cached forward pass.
    ///
    /// Returns `(weights_grad, delta)` where `delta = error ⊙ f'(a)` is both
    /// the bias gradient and the quantity propagated to the previous layer.
    pub fn compute_gradients(&self, error: &[f64]) -> (Matrix, Vec<f64>) {
        let delta: Vec<f64> = error.iter().zip(&self.neurons)
            .map(|(e, a)| e * self.activator.derivative(*a))
            .collect();
        let weights_grad = Matrix::outer(&delta, &self.input);
        (weights_grad, delta)
    }

    /// `∂L/∂x = Wᵀ·δ`, the error handed to the previous layer.
    pub fn backpropagate_error(&self, delta: &[f64]) -> Vec<f64> {
        self.weights.transpose_mul_vec(delta)
    }

    /// Applies `Δw_t = -lr·grad + momentum·Δw_{t-1}` and stores `Δw_t`.
    pub fn apply_gradients(&mut self, weights_grad: &Matrix, biases_grad: &[f64], lr: f64, momentum: f64) {
        for ((w_row, v_row), g_row) in self.weights.data.iter_mut()
            .zip(self.weight_velocity.data.iter_mut())
            .zip(&weights_grad.data)
        {
            for ((w, v), g) in w_row.iter_mut().zip(v_row.iter_mut()).zip(g_row) {
                *v = -lr * g + momentum * *v;
                *w += *v;
            }
        }

        if let Some(biases) = self.biases.as_mut() {
            for ((b, v), g) in biases.iter_mut().zip(self.bias_velocity.iter_mut()).zip(biases_grad) {
                *v = -lr * g + momentum * *v;
                *b += *v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_layer(activation: ActivationFunction) -> Layer {
        let w = Matrix::from_data(vec![vec![0.5, -0.5], vec![1.0, 1.0]]).unwrap();
        Layer::from_parts(w, Some(vec![0.0, -1.0]), activation).unwrap()
    }

    #[test]
    fn feed_from_applies_weights_bias_and_activation() {
        let mut layer = fixed_layer(ActivationFunction::Linear);
        assert_eq!(layer.feed_from(&[2.0, 1.0]), vec![0.5, 2.0]);
        assert_eq!(layer.neurons(), &[0.5, 2.0]);
    }

    #[test]
    fn from_parts_rejects_bias_length_mismatch() {
        let w = Matrix::zeros(2, 2);
        assert!(Layer::from_parts(w, Some(vec![0.0]), ActivationFunction::Sigmoid).is_err());
    }

    #[test]
    fn momentum_reuses_previous_delta() {
        let mut layer = fixed_layer(ActivationFunction::Linear);
        let grad = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 0.0]]).unwrap();
        let bias_grad = [0.0, 0.0];

        layer.apply_gradients(&grad, &bias_grad, 0.1, 0.9);
        assert!((layer.weights.data[0][0] - 0.4).abs() < 1e-12);

        // Second step: Δw = -0.1 + 0.9 * -0.1 = -0.19
        layer.apply_gradients(&grad, &bias_grad, 0.1, 0.9);
        assert!((layer.weights.data[0][0] - 0.21).abs() < 1e-12);
    }

    #[test]
    fn gradients_are_outer_product_of_delta_and_input() {
        let mut layer = fixed_layer(ActivationFunction::Linear);
        layer.feed_from(&[2.0, 1.0]);
        let (w_grad, delta) = layer.compute_gradients(&[1.0, -1.0]);
        assert_eq!(delta, vec![1.0, -1.0]);
        assert_eq!(w_grad.data, vec![vec![2.0, 1.0], vec![-2.0, -1.0]]);
        assert_eq!(layer.backpropagate_error(&delta), vec![-0.5, -1.5]);
    }
}
