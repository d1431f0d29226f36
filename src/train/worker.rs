use std::sync::{Arc, atomic::{AtomicBool, Ordering}, mpsc};
use std::thread;

use log::info;

use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::example::TrainingExample;
use crate::train::loop_fn::train_loop;
use crate::train::report::TrainReport;
use crate::train::train_config::{Hyperparams, TrainConfig};

/// A training run on its own thread.
///
/// Progress arrives on [`TrainingWorker::progress`]; [`TrainingWorker::stop`]
/// asks the loop to finish after the current epoch, and
/// [`TrainingWorker::join`] hands back the network with its report.
/// Dropping a worker without joining it raises the stop flag.
pub struct TrainingWorker {
    name: String,
    stop_flag: Arc<AtomicBool>,
    progress_rx: mpsc::Receiver<EpochStats>,
    handle: Option<thread::JoinHandle<Result<(Network, TrainReport)>>>,
}

impl TrainingWorker {
    /// Moves `network` and `examples` onto a named thread and starts training.
    pub fn spawn(
        name: impl Into<String>,
        mut network: Network,
        examples: Vec<TrainingExample>,
        hyperparams: Hyperparams,
    ) -> Result<TrainingWorker> {
        let name = name.into();
        let (tx, rx) = mpsc::channel();
        let stop_flag = Arc::new(AtomicBool::new(false));

        let mut config = TrainConfig::new(hyperparams);
        config.progress_tx = Some(tx);
        config.stop_flag = Some(stop_flag.clone());

        info!("spawning training worker '{name}'");
        let handle = thread::Builder::new()
            .name(format!("train-{name}"))
            .spawn(move || {
                let report = train_loop(&mut network, &examples, &config)?;
                Ok((network, report))
            })?;

        Ok(TrainingWorker { name, stop_flag, progress_rx: rx, handle: Some(handle) })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn progress(&self) -> &mpsc::Receiver<EpochStats> {
        &self.progress_rx
    }

    /// Requests a stop; the loop checks the flag before every epoch.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Waits for the run to end. Progress not yet read is discarded.
    pub fn join(mut self) -> Result<(Network, TrainReport)> {
        // `self` keeps the receiver alive until the thread is done so the
        // loop does not mistake the join for a disconnect.
        let handle = self.handle.take().ok_or(NetError::WorkerPanicked)?;
        handle.join().map_err(|_| NetError::WorkerPanicked)?
    }
}

impl Drop for TrainingWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            info!("training worker '{}' dropped before join; stopping it", self.name);
            self.stop();
        }
    }
}
