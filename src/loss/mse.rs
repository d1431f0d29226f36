pub struct MseLoss;

impl MseLoss {
    /// Per-example squared error: Σ(expected - predicted)² / 2.
    ///
    /// Averaging this over the examples of an epoch gives the epoch error
    /// compared against the training precision.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (b - a).powi(2))
            .sum::<f64>() / 2.0
    }

    /// Per-output gradient: predicted - expected
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| a - b)
            .collect()
    }
}
