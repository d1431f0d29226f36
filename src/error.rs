//! Error types shared by every module of the crate.

use thiserror::Error;

/// Failures raised while building, loading, training or querying a network.
///
/// Not converging within the epoch budget is *not* an error; it is reported
/// through [`crate::train::TrainOutcome::EpochLimitReached`].
#[derive(Debug, Error)]
pub enum NetError {
    /// Declared sizes, snapshot contents, labels or loss pairing disagree.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network is not ready: load weights or train it first")]
    NotReady,

    #[error("input has length {actual}, expected {expected}")]
    InputShape { expected: usize, actual: usize },

    #[error("target has length {actual}, expected {expected}")]
    TargetShape { expected: usize, actual: usize },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("malformed weight snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("training worker panicked")]
    WorkerPanicked,
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;
