use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};

/// Inputs to the sigmoid are clamped to this range to keep `exp` finite.
const SIGMOID_CLAMP: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
    Linear,
    /// Vector-valued; applied over the whole layer by [`ActivationFunction::apply`].
    Softmax,
}

impl Default for ActivationFunction {
    fn default() -> Self {
        ActivationFunction::Sigmoid
    }
}

/// Default slope for `leaky_relu` when it is selected by name.
pub const DEFAULT_LEAKY_ALPHA: f64 = 0.01;

impl ActivationFunction {
    /// Element-wise activation. `Softmax` has no element-wise form and is
    /// treated as the identity here; use [`ActivationFunction::apply`].
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => relu(x),
            ActivationFunction::LeakyReLU { alpha } => leaky_relu(x, *alpha),
            ActivationFunction::Linear | ActivationFunction::Softmax => x,
        }
    }

    /// Activates a whole pre-activation vector in place.
    pub fn apply(&self, z: &mut [f64]) {
        match self {
            ActivationFunction::Softmax => softmax(z),
            _ => z.iter_mut().for_each(|v| *v = self.function(*v)),
        }
    }

    /// Derivative expressed in terms of the activation's *output* `y`.
    ///
    /// For `Softmax` the loss already yields the gradient with respect to the
    /// logits (`predicted - expected` under cross-entropy), so this is `1.0`.
    pub fn derivative(&self, y: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => y * (1.0 - y),
            ActivationFunction::Tanh => 1.0 - y * y,
            ActivationFunction::ReLU => if y > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU { alpha } => if y > 0.0 { 1.0 } else { *alpha },
            ActivationFunction::Linear | ActivationFunction::Softmax => 1.0,
        }
    }

    /// Name used in the `funciones_activacion` field of weight snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::LeakyReLU { .. } => "leaky_relu",
            ActivationFunction::Linear => "linear",
            ActivationFunction::Softmax => "softmax",
        }
    }

    pub fn from_name(name: &str) -> Result<ActivationFunction> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(ActivationFunction::Sigmoid),
            "tanh" => Ok(ActivationFunction::Tanh),
            "relu" => Ok(ActivationFunction::ReLU),
            "leaky_relu" | "leakyrelu" => Ok(ActivationFunction::LeakyReLU { alpha: DEFAULT_LEAKY_ALPHA }),
            "linear" | "identity" => Ok(ActivationFunction::Linear),
            "softmax" => Ok(ActivationFunction::Softmax),
            other => Err(NetError::Configuration(format!("unknown activation function '{other}'"))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let ActivationFunction::LeakyReLU { alpha } = self {
            if !(alpha.is_finite() && *alpha >= 0.0) {
                return Err(NetError::Configuration(format!(
                    "leaky relu alpha must be finite and >= 0, got {alpha}"
                )));
            }
        }
        Ok(())
    }
}

pub fn sigmoid(x: f64) -> f64 {
    let x = x.clamp(-SIGMOID_CLAMP, SIGMOID_CLAMP);
    1.0 / (1.0 + (-x).exp())
}

pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

pub fn leaky_relu(x: f64, alpha: f64) -> f64 {
    if x > 0.0 { x } else { alpha * x }
}

/// Numerically stable softmax: subtracts the maximum before exponentiating.
pub fn softmax(z: &mut [f64]) {
    let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return;
    }
    let mut sum = 0.0;
    for v in z.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in z.iter_mut() {
        *v /= sum;
    }
}
