use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};

/// Architecture of a one-hidden-layer network.
///
/// Fields:
/// - `input_size`       : length of every input vector
/// - `hidden_size`      : neurons in the hidden layer
/// - `output_size`      : neurons in the output layer (one per label)
/// - `hidden_activation`: activation after the hidden linear transform
/// - `output_activation`: activation after the output linear transform
/// - `bias`             : whether both layers carry a bias vector
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    #[serde(default)]
    pub hidden_activation: ActivationFunction,
    #[serde(default)]
    pub output_activation: ActivationFunction,
    #[serde(default = "default_bias")]
    pub bias: bool,
}

fn default_bias() -> bool {
    true
}

impl NetworkSpec {
    /// Sigmoid on both layers, with biases.
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> NetworkSpec {
        NetworkSpec {
            input_size,
            hidden_size,
            output_size,
            hidden_activation: ActivationFunction::Sigmoid,
            output_activation: ActivationFunction::Sigmoid,
            bias: true,
        }
    }

    pub fn with_activations(mut self, hidden: ActivationFunction, output: ActivationFunction) -> NetworkSpec {
        self.hidden_activation = hidden;
        self.output_activation = output;
        self
    }

    pub fn without_bias(mut self) -> NetworkSpec {
        self.bias = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 || self.hidden_size == 0 || self.output_size == 0 {
            return Err(NetError::Configuration(format!(
                "layer sizes must be > 0, got {}-{}-{}",
                self.input_size, self.hidden_size, self.output_size
            )));
        }
        if self.hidden_activation == ActivationFunction::Softmax {
            return Err(NetError::Configuration(
                "softmax is only supported on the output layer".to_owned(),
            ));
        }
        self.hidden_activation.validate()?;
        self.output_activation.validate()
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
