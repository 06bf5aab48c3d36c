use serde::{Deserialize, Serialize};

use crate::math::matrix::Matrix;

/// One state change of an `Animator`, sent to every subscriber.
///
/// Receivers (e.g. the studio SSE handler) use these to decide when to
/// re-render; the event carries just enough to log what happened; the full
/// picture comes from `Animator::snapshot()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimatorEvent {
    Initialized { layer_sizes: Vec<usize> },
    /// A timer tick. `propagated_layer` is the layer that was overwritten, or
    /// `None` for the wrap tick that only rewinds the cursor.
    Tick { cursor: usize, propagated_layer: Option<usize> },
    NeuronToggled { layer: usize, neuron: usize, value: f64 },
    EnabledChanged { enabled: bool },
    NeuronsReset,
    WeightsRandomized,
    WeightsImported,
}

/// Outcome of a single `Animator::tick()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Transition `cursor - 1 -> cursor` ran; the cursor now points at the new value.
    Propagated { target_layer: usize },
    /// The cursor was on the last layer and went back to 0. Nothing was computed.
    Wrapped,
    /// The animator is disabled; nothing changed.
    Paused,
}

/// Serializable copy of everything the presentation layer draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatorSnapshot {
    pub layer_sizes: Vec<usize>,
    pub activations: Vec<Vec<f64>>,
    pub weights: Vec<Matrix>,
    pub cursor: usize,
    pub enabled: bool,
}
