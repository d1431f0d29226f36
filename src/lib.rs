pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod classify;
pub mod encode;
pub mod registry;

// Convenience re-exports
pub use error::{NetError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Network, NetworkSpec, WeightSnapshot};
pub use loss::loss_type::LossType;
pub use optim::sgd::Sgd;
pub use train::{train_loop, train_network, Hyperparams, TrainConfig, TrainOutcome, TrainReport, TrainingExample, TrainingWorker};
pub use classify::{confidence, predict_label, Classifier, Prediction};
pub use registry::{ModelRegistry, ModelStatus, StatusStore};
