use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};
use crate::loss::{CrossEntropyLoss, MseLoss};

/// Selects which loss function the training loop uses.
///
/// - `Mse`         : half sum of squared errors; pair with Sigmoid, Tanh,
///   ReLU or Linear outputs.
/// - `CrossEntropy`: categorical cross-entropy; the only loss accepted for a
///   Softmax output, because its gradient `predicted - expected` is only
///   the logit gradient under this pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
}

impl LossType {
    /// Default loss for an output activation.
    pub fn for_output(activation: ActivationFunction) -> LossType {
        match activation {
            ActivationFunction::Softmax => LossType::CrossEntropy,
            _ => LossType::Mse,
        }
    }

    /// Rejects combinations whose gradient would be wrong.
    pub fn check_pairing(self, output: ActivationFunction) -> Result<()> {
        match (self, output) {
            (LossType::Mse, ActivationFunction::Softmax) => Err(NetError::Configuration(
                "softmax output must be trained with cross_entropy, not mse".to_owned(),
            )),
            (LossType::CrossEntropy, other) if other != ActivationFunction::Softmax => {
                Err(NetError::Configuration(format!(
                    "cross_entropy requires a softmax output, got {}", other.name()
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn loss(self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::Mse          => MseLoss::loss(predicted, expected),
            LossType::CrossEntropy => CrossEntropyLoss::loss(predicted, expected),
        }
    }

    pub fn derivative(self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        match self {
            LossType::Mse          => MseLoss::derivative(predicted, expected),
            LossType::CrossEntropy => CrossEntropyLoss::derivative(predicted, expected),
        }
    }
}
