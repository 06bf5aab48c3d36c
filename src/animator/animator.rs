use std::sync::mpsc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::animator::event::{AnimatorEvent, AnimatorSnapshot, TickOutcome};
use crate::error::{NetError, NetResult};
use crate::network::activations::ActivationStore;
use crate::network::propagation;
use crate::network::topology::Topology;
use crate::network::weights::{WeightFile, WeightStore};

/// Owned state of one network visualization.
///
/// Holds the topology, both stores, the animation cursor and the `enabled`
/// flag. The cursor names the transition that runs on the next tick. Every
/// state change is pushed to the channels handed out by `subscribe()`.
///
/// Randomness comes from the injected `R`, so seeded animators reproduce the
/// same weights run after run.
pub struct Animator<R = ChaCha8Rng> {
    topology: Option<Topology>,
    weights: WeightStore,
    activations: ActivationStore,
    cursor: usize,
    enabled: bool,
    rng: R,
    subscribers: Vec<mpsc::Sender<AnimatorEvent>>,
}

impl Animator<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Animator::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Animator::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> Animator<R> {
    /// Creates an animator with no topology yet; call `initialize` before
    /// anything else.
    pub fn new(rng: R) -> Self {
        Animator {
            topology: None,
            weights: WeightStore::new(),
            activations: ActivationStore::new(),
            cursor: 0,
            enabled: true,
            rng,
            subscribers: Vec::new(),
        }
    }

    pub fn with_topology(topology: Topology, rng: R) -> Self {
        let mut animator = Animator::new(rng);
        animator.initialize(topology);
        animator
    }

    /// Draws fresh weights, sets every activation to 0.5, rewinds the cursor
    /// and enables the animation.
    pub fn initialize(&mut self, topology: Topology) {
        self.weights.initialize(&topology, &mut self.rng);
        self.activations.initialize(&topology);
        self.cursor = 0;
        self.enabled = true;

        let layer_sizes = topology.layer_sizes().to_vec();
        debug!(?layer_sizes, "animator initialized");
        self.topology = Some(topology);
        self.emit(AnimatorEvent::Initialized { layer_sizes });
    }

    pub fn topology(&self) -> NetResult<&Topology> {
        self.topology.as_ref().ok_or(NetError::NotInitialized)
    }

    pub fn get_activation(&self, layer_index: usize, neuron_index: usize) -> NetResult<f64> {
        self.activations.get(layer_index, neuron_index)
    }

    pub fn get_weight(&self, k: usize, i: usize, j: usize) -> NetResult<f64> {
        self.weights.get(k, i, j)
    }

    pub fn cursor(&self) -> NetResult<usize> {
        self.topology()?;
        Ok(self.cursor)
    }

    pub fn is_enabled(&self) -> NetResult<bool> {
        self.topology()?;
        Ok(self.enabled)
    }

    /// User override of a single neuron. Allowed whether or not the animation
    /// runs; the value holds until a tick overwrites that layer or a reset.
    pub fn toggle_neuron(&mut self, layer_index: usize, neuron_index: usize) -> NetResult<f64> {
        let value = self.activations.toggle(layer_index, neuron_index)?;
        debug!(layer = layer_index, neuron = neuron_index, value, "neuron toggled");
        self.emit(AnimatorEvent::NeuronToggled { layer: layer_index, neuron: neuron_index, value });
        Ok(value)
    }

    /// Flips `enabled` and returns the new value.
    pub fn toggle_enabled(&mut self) -> NetResult<bool> {
        self.topology()?;
        self.enabled = !self.enabled;
        debug!(enabled = self.enabled, "animation toggled");
        self.emit(AnimatorEvent::EnabledChanged { enabled: self.enabled });
        Ok(self.enabled)
    }

    /// Every activation back to 0.5 and the cursor back to 0. Weights stay.
    pub fn reset_neurons(&mut self) -> NetResult<()> {
        self.topology()?;
        self.activations.reset()?;
        self.cursor = 0;
        debug!("neurons reset");
        self.emit(AnimatorEvent::NeuronsReset);
        Ok(())
    }

    /// Redraws every weight. Activations and cursor stay.
    pub fn randomize_weights(&mut self) -> NetResult<()> {
        self.weights.randomize(&mut self.rng)?;
        debug!("weights randomized");
        self.emit(AnimatorEvent::WeightsRandomized);
        Ok(())
    }

    /// Advances the animation by one timer tick.
    ///
    /// With the cursor on layers `0..L-2` this runs the transition out of the
    /// cursor layer and moves the cursor forward. With the cursor on the last
    /// layer there is no transition to run: the tick only rewinds the cursor
    /// to 0.
    pub fn tick(&mut self) -> NetResult<TickOutcome> {
        let last_layer = self.topology()?.layer_count() - 1;
        if !self.enabled {
            return Ok(TickOutcome::Paused);
        }

        let outcome = if self.cursor >= last_layer {
            self.cursor = 0;
            TickOutcome::Wrapped
        } else {
            propagation::step(&self.weights, &mut self.activations, self.cursor)?;
            self.cursor += 1;
            TickOutcome::Propagated { target_layer: self.cursor }
        };

        let propagated_layer = match outcome {
            TickOutcome::Propagated { target_layer } => Some(target_layer),
            _ => None,
        };
        trace!(cursor = self.cursor, ?propagated_layer, "tick");
        self.emit(AnimatorEvent::Tick { cursor: self.cursor, propagated_layer });
        Ok(outcome)
    }

    pub fn snapshot(&self) -> NetResult<AnimatorSnapshot> {
        let topology = self.topology()?;
        Ok(AnimatorSnapshot {
            layer_sizes: topology.layer_sizes().to_vec(),
            activations: self.activations.layers()?.to_vec(),
            weights: self.weights.matrices()?.to_vec(),
            cursor: self.cursor,
            enabled: self.enabled,
        })
    }

    pub fn export_weights(&self) -> NetResult<WeightFile> {
        Ok(WeightFile {
            layer_sizes: self.topology()?.clone(),
            matrices: self.weights.matrices()?.to_vec(),
        })
    }

    /// Replaces all weights with the contents of `file`. The file must have
    /// been produced for the same topology. Activations and cursor stay.
    pub fn import_weights(&mut self, file: WeightFile) -> NetResult<()> {
        let topology = self.topology.as_ref().ok_or(NetError::NotInitialized)?;
        if file.layer_sizes != *topology {
            return Err(NetError::InvalidTopology(format!(
                "weights were saved for layers {:?}, network has {:?}",
                file.layer_sizes.layer_sizes(),
                topology.layer_sizes()
            )));
        }
        self.weights.replace(topology, file.matrices)?;
        debug!("weights imported");
        self.emit(AnimatorEvent::WeightsImported);
        Ok(())
    }

    /// Returns a channel that receives every subsequent state change.
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::Receiver<AnimatorEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn emit(&mut self, event: AnimatorEvent) {
        // A failed send means the receiver is gone.
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
