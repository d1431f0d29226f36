use rand::Rng;

use crate::{layers::dense::Layer, network::spec::NetworkSpec};
use crate::error::{NetError, Result};

/// A feed-forward network with one hidden layer.
///
/// `layers[0]` is the hidden layer and `layers[1]` the output layer. Each
/// forward pass caches per-layer activations for the backward pass, so an
/// instance must not be shared between threads while training.
#[derive(Debug, Clone)]
pub struct Network {
    pub layers: Vec<Layer>,
    spec: NetworkSpec,
    ready: bool,
}

impl Network {
    /// Builds a Xavier-initialized network using the thread RNG.
    pub fn new(spec: NetworkSpec) -> Result<Network> {
        Network::with_rng(spec, &mut rand::thread_rng())
    }

    /// Builds a Xavier-initialized network drawing weights from `rng`.
    ///
    /// The network is not ready for prediction until it has been trained for
    /// at least one epoch or had weights loaded.
    pub fn with_rng<R: Rng + ?Sized>(spec: NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;
        let layers = vec![
            Layer::new(spec.hidden_size, spec.input_size, spec.hidden_activation, spec.bias, rng),
            Layer::new(spec.output_size, spec.hidden_size, spec.output_activation, spec.bias, rng),
        ];
        Ok(Network { layers, spec, ready: false })
    }

    pub(crate) fn from_layers(layers: Vec<Layer>, spec: NetworkSpec) -> Network {
        Network { layers, spec, ready: true }
    }

    pub fn spec(&self) -> &NetworkSpec {
        &self.spec
    }

    pub fn input_size(&self) -> usize {
        self.spec.input_size
    }

    pub fn output_size(&self) -> usize {
        self.spec.output_size
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub(crate) fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub(crate) fn replace(&mut self, layers: Vec<Layer>, spec: NetworkSpec) {
        self.layers = layers;
        self.spec = spec;
        self.ready = true;
    }

    pub fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.spec.input_size {
            return Err(NetError::InputShape { expected: self.spec.input_size, actual: input.len() });
        }
        Ok(())
    }

    /// Forward pass for prediction. Fails before the network is ready and on
    /// a wrong input length. For fixed weights the output depends only on
    /// `input`.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if !self.ready {
            return Err(NetError::NotReady);
        }
        self.check_input(input)?;
        Ok(self.feed(input))
    }

    /// Forward pass without checks; stores activations in each layer for backprop.
    pub(crate) fn feed(&mut self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &mut self.layers {
            current = layer.feed_from(&current);
        }
        current
    }
}
