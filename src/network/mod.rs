pub mod activations;
pub mod propagation;
pub mod topology;
pub mod weights;

pub use activations::{ActivationStore, RESTING_ACTIVATION};
pub use propagation::{propagate, step};
pub use topology::Topology;
pub use weights::{WeightFile, WeightStore};
