/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// L = -sum(expected[i] * log(predicted[i] + eps))
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| -e * (p + EPS).ln())
            .sum()
    }

    /// Gradient of softmax + cross-entropy with respect to the logits:
    /// `predicted[i] - expected[i]`. The softmax layer's own derivative is
    /// 1.0 so this is not applied twice.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| p - e)
            .collect()
    }
}
