pub mod network;
pub mod snapshot;
pub mod spec;

pub use network::Network;
pub use snapshot::{SnapshotConfig, WeightSnapshot};
pub use spec::NetworkSpec;
