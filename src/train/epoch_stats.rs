use serde::{Serialize, Deserialize};

/// Training progress emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the loop
/// sends one `EpochStats` every `report_every` epochs and once more for the
/// final epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Epoch cap of this run.
    pub max_epochs: usize,
    /// Mean per-example loss over this epoch.
    pub error: f64,
    /// Fraction of examples whose arg-max matches the target arg-max.
    pub accuracy: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
