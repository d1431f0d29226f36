pub mod epoch_stats;
pub mod example;
pub mod loop_fn;
pub mod report;
pub mod train_config;
pub mod trainer;
pub mod worker;

pub use epoch_stats::EpochStats;
pub use example::{one_hot, TrainingExample};
pub use loop_fn::train_loop;
pub use report::{TrainOutcome, TrainReport};
pub use train_config::{Hyperparams, TrainConfig};
pub use trainer::train_network;
pub use worker::TrainingWorker;
