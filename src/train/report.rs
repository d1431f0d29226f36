use serde::{Serialize, Deserialize};

/// How a training run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainOutcome {
    /// The epoch error fell to or below the precision threshold.
    Converged,
    /// `max_epochs` ran out first. The network is still usable; inspect
    /// `final_error` to judge how well it fits.
    EpochLimitReached,
    /// The stop flag was raised or the progress receiver went away.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub outcome: TrainOutcome,
    /// Completed epochs.
    pub epochs: usize,
    /// Mean per-example loss of the last completed epoch, or of the untrained
    /// network when no epoch completed.
    pub final_error: f64,
    pub elapsed_ms: u64,
}

impl TrainReport {
    pub fn converged(&self) -> bool {
        self.outcome == TrainOutcome::Converged
    }
}
