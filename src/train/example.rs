use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::network::network::Network;

/// One `(input, target)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl TrainingExample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> TrainingExample {
        TrainingExample { input, target }
    }

    /// Classification example whose target is one-hot at `class` out of `classes`.
    pub fn one_hot(input: Vec<f64>, class: usize, classes: usize) -> TrainingExample {
        TrainingExample { input, target: one_hot(class, classes) }
    }
}

pub fn one_hot(class: usize, classes: usize) -> Vec<f64> {
    (0..classes).map(|i| if i == class { 1.0 } else { 0.0 }).collect()
}

/// Fails on an empty set or on the first example whose shape disagrees with
/// `network` or that holds a NaN or infinite value.
pub fn check_examples(network: &Network, examples: &[TrainingExample]) -> Result<()> {
    if examples.is_empty() {
        return Err(NetError::EmptyTrainingSet);
    }
    for (i, example) in examples.iter().enumerate() {
        network.check_input(&example.input)?;
        if example.target.len() != network.output_size() {
            return Err(NetError::TargetShape {
                expected: network.output_size(),
                actual: example.target.len(),
            });
        }
        if example.input.iter().chain(&example.target).any(|v| !v.is_finite()) {
            return Err(NetError::Configuration(format!(
                "example {i} contains a non-finite value"
            )));
        }
    }
    Ok(())
}
