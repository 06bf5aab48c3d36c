use crate::error::{check_index, NetError, NetResult};
use crate::network::topology::Topology;

/// Value every neuron starts from and returns to on reset.
pub const RESTING_ACTIVATION: f64 = 0.5;

/// One activation vector per layer.
#[derive(Debug, Clone, Default)]
pub struct ActivationStore {
    layers: Option<Vec<Vec<f64>>>,
}

impl ActivationStore {
    pub fn new() -> ActivationStore {
        ActivationStore::default()
    }

    pub fn initialize(&mut self, topology: &Topology) {
        self.layers = Some(
            topology
                .layer_sizes()
                .iter()
                .map(|&size| vec![RESTING_ACTIVATION; size])
                .collect(),
        );
    }

    /// Puts every neuron of every layer back to 0.5.
    pub fn reset(&mut self) -> NetResult<()> {
        for layer in self.layers_mut()? {
            layer.fill(RESTING_ACTIVATION);
        }
        Ok(())
    }

    /// Flips a neuron: anything above 0.5 becomes 0, anything else becomes 1.
    /// Returns the new value.
    pub fn toggle(&mut self, layer_index: usize, neuron_index: usize) -> NetResult<f64> {
        let slot = self.slot_mut(layer_index, neuron_index)?;
        *slot = if *slot > RESTING_ACTIVATION { 0.0 } else { 1.0 };
        Ok(*slot)
    }

    pub fn set(&mut self, layer_index: usize, neuron_index: usize, value: f64) -> NetResult<()> {
        *self.slot_mut(layer_index, neuron_index)? = value;
        Ok(())
    }

    pub fn get(&self, layer_index: usize, neuron_index: usize) -> NetResult<f64> {
        let layer = self.layer(layer_index)?;
        check_index("neuron", neuron_index, layer.len())?;
        Ok(layer[neuron_index])
    }

    pub fn layer(&self, layer_index: usize) -> NetResult<&[f64]> {
        let layers = self.layers()?;
        check_index("layer", layer_index, layers.len())?;
        Ok(&layers[layer_index])
    }

    pub fn layers(&self) -> NetResult<&[Vec<f64>]> {
        self.layers.as_deref().ok_or(NetError::NotInitialized)
    }

    fn layers_mut(&mut self) -> NetResult<&mut [Vec<f64>]> {
        self.layers.as_deref_mut().ok_or(NetError::NotInitialized)
    }

    fn slot_mut(&mut self, layer_index: usize, neuron_index: usize) -> NetResult<&mut f64> {
        let layers = self.layers_mut()?;
        check_index("layer", layer_index, layers.len())?;
        let layer = &mut layers[layer_index];
        check_index("neuron", neuron_index, layer.len())?;
        Ok(&mut layer[neuron_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ActivationStore {
        let mut store = ActivationStore::new();
        store.initialize(&Topology::default());
        store
    }

    #[test]
    fn initialize_sets_every_neuron_to_half() {
        let store = store();
        let layers = store.layers().unwrap();
        assert_eq!(layers.iter().map(Vec::len).collect::<Vec<_>>(), vec![6, 8, 8, 4]);
        assert!(layers.iter().flatten().all(|&a| a == 0.5));
    }

    #[test]
    fn toggle_follows_threshold() {
        let mut store = store();
        assert_eq!(store.toggle(0, 0), Ok(1.0));
        assert_eq!(store.toggle(0, 0), Ok(0.0));
        assert_eq!(store.toggle(0, 0), Ok(1.0));

        store.set(1, 2, 0.9).unwrap();
        assert_eq!(store.toggle(1, 2), Ok(0.0));
    }

    #[test]
    fn out_of_range_is_reported_not_clamped() {
        let mut store = store();
        assert!(matches!(store.toggle(4, 0), Err(NetError::IndexOutOfRange { what: "layer", .. })));
        assert!(matches!(store.toggle(3, 4), Err(NetError::IndexOutOfRange { what: "neuron", .. })));
        assert!(matches!(store.get(0, 6), Err(NetError::IndexOutOfRange { what: "neuron", .. })));
    }

    #[test]
    fn reset_restores_resting_value() {
        let mut store = store();
        store.toggle(0, 1).unwrap();
        store.set(3, 3, 0.123).unwrap();
        store.reset().unwrap();
        assert!(store.layers().unwrap().iter().flatten().all(|&a| a == RESTING_ACTIVATION));
    }

    #[test]
    fn uninitialized_store_refuses_everything() {
        let mut store = ActivationStore::new();
        assert_eq!(store.reset(), Err(NetError::NotInitialized));
        assert_eq!(store.toggle(0, 0), Err(NetError::NotInitialized));
        assert_eq!(store.get(0, 0), Err(NetError::NotInitialized));
    }
}
