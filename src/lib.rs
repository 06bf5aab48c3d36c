pub mod math;
pub mod activation;
pub mod error;
pub mod network;
pub mod animator;
pub mod classifier;
pub mod config;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::sigmoid::sigmoid;
pub use error::{NetError, NetResult};
pub use network::{ActivationStore, Topology, WeightFile, WeightStore};
pub use animator::{Animator, AnimatorEvent, AnimatorSnapshot, Session, SharedAnimator, TickOutcome, Ticker};
pub use classifier::{ClassifyError, Label, MockClassifier, Prediction};
pub use config::{load_config, ConfigError, ConfigOverrides, StudioConfig};
