use std::sync::mpsc;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::loss::loss_type::LossType;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;

/// Training hyperparameters, loadable from JSON. Missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparams {
    pub learning_rate: f64,
    /// Fraction of the previous weight delta added to each step; `0` disables momentum.
    pub momentum: f64,
    pub max_epochs: usize,
    /// Training stops once the mean epoch error is at or below this value.
    pub precision: f64,
    /// Shuffle the example order at the start of every epoch.
    pub shuffle: bool,
    /// Seed for the shuffle RNG; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Emit progress every this many epochs.
    pub report_every: usize,
    /// `None` picks the loss matching the output activation.
    pub loss: Option<LossType>,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Hyperparams {
            learning_rate: 0.1,
            momentum: 0.0,
            max_epochs: 100_000,
            precision: 0.01,
            shuffle: true,
            seed: None,
            report_every: 1000,
            loss: None,
        }
    }
}

impl Hyperparams {
    pub fn validate(&self) -> Result<()> {
        Sgd::with_momentum(self.learning_rate, self.momentum).validate()?;
        if self.max_epochs == 0 || self.report_every == 0 {
            return Err(NetError::Configuration(
                "max_epochs and report_every must be at least 1".to_owned(),
            ));
        }
        if !(self.precision.is_finite() && self.precision >= 0.0) {
            return Err(NetError::Configuration(format!(
                "precision must be finite and >= 0, got {}", self.precision
            )));
        }
        Ok(())
    }

    pub fn load_json(path: &str) -> Result<Hyperparams> {
        let file = std::fs::File::open(path)?;
        let hp: Hyperparams = serde_json::from_reader(std::io::BufReader::new(file))?;
        hp.validate()?;
        Ok(hp)
    }
}

/// Configuration for a `train_loop` run.
///
/// - `progress_tx`: optional channel sender for periodic `EpochStats`. If
///                   the receiver is dropped the loop stops early.
/// - `stop_flag`  : optional atomic flag; when set to `true` from another
///                   thread the loop stops before the next epoch.
#[derive(Default)]
pub struct TrainConfig {
    pub hyperparams: Hyperparams,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with no progress channel and no stop flag.
    pub fn new(hyperparams: Hyperparams) -> Self {
        TrainConfig {
            hyperparams,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop_flag.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
    }
}
