use crate::{math::matrix::Matrix, layers::dense::Layer};
use crate::error::{NetError, Result};

/// Plain SGD with an optional momentum term.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate, momentum: 0.0 }
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, momentum }
    }

    /// Learning rate must be finite and positive, momentum in `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NetError::Configuration(format!(
                "learning_rate must be finite and > 0, got {}", self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(NetError::Configuration(format!(
                "momentum must be in [0, 1), got {}", self.momentum
            )));
        }
        Ok(())
    }

    /// Applies one weight update to a layer given its pre-computed gradients.
    pub fn step(&self, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &[f64]) {
        layer.apply_gradients(weights_grad, biases_grad, self.learning_rate, self.momentum);
    }
}
