use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::train::example::TrainingExample;

/// A labelled prediction.
///
/// `confidence` is a heuristic gap measure, not a calibrated probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
    pub outputs: Vec<f64>,
}

/// Index of the maximum element. Ties resolve to the first occurrence and
/// NaN entries are never selected. Returns 0 for an empty slice.
pub fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, x) in v.iter().enumerate() {
        if *x > v[best] || v[best].is_nan() {
            best = i;
        }
    }
    best
}

/// `labels[argmax(outputs)]`.
pub fn predict_label<'a>(outputs: &[f64], labels: &'a [String]) -> Result<&'a str> {
    if outputs.is_empty() || outputs.len() != labels.len() {
        return Err(NetError::Configuration(format!(
            "{} outputs cannot be mapped onto {} labels", outputs.len(), labels.len()
        )));
    }
    Ok(&labels[argmax(outputs)])
}

/// `clamp(2 · (top1 − top2), 0, 1)` over the outputs sorted descending.
///
/// A single output is compared against 0. An empty vector, or one whose gap
/// is NaN (two equal infinities), has confidence 0.
pub fn confidence(outputs: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = outputs.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let gap = match sorted.as_slice() {
        [] => return 0.0,
        [top] => *top,
        [top, second, ..] => top - second,
    };
    if gap.is_nan() {
        return 0.0;
    }
    (2.0 * gap).clamp(0.0, 1.0)
}

/// A network paired with the label of each output unit.
#[derive(Debug, Clone)]
pub struct Classifier {
    network: Network,
    labels: Vec<String>,
}

impl Classifier {
    pub fn new<S: Into<String>>(network: Network, labels: impl IntoIterator<Item = S>) -> Result<Classifier> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != network.output_size() {
            return Err(NetError::Configuration(format!(
                "network has {} outputs but {} labels were given",
                network.output_size(), labels.len()
            )));
        }
        Ok(Classifier { network, labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// Index of `label` in the alphabet.
    pub fn class_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn predict(&mut self, input: &[f64]) -> Result<Prediction> {
        let outputs = self.network.forward(input)?;
        let label = predict_label(&outputs, &self.labels)?.to_owned();
        Ok(Prediction { label, confidence: confidence(&outputs), outputs })
    }
}

/// Fraction of `examples` whose predicted arg-max matches the target arg-max.
pub fn accuracy(network: &mut Network, examples: &[TrainingExample]) -> Result<f64> {
    if examples.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0;
    for ex in examples {
        if argmax(&network.forward(&ex.input)?) == argmax(&ex.target) {
            correct += 1;
        }
    }
    Ok(correct as f64 / examples.len() as f64)
}
