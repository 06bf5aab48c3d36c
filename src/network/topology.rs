use serde::{Deserialize, Serialize};

use crate::error::{check_index, NetError, NetResult};

/// Ordered layer sizes of a feed-forward network, input layer first.
///
/// Invariants: at least two layers, every layer holds at least one neuron.
/// Deserializes from a plain list such as `[6, 8, 8, 4]`, rejecting lists
/// that break the invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Topology {
    layer_sizes: Vec<usize>,
}

impl Topology {
    pub fn new(layer_sizes: Vec<usize>) -> NetResult<Topology> {
        if layer_sizes.len() < 2 {
            return Err(NetError::InvalidTopology(format!(
                "need at least 2 layers, got {}",
                layer_sizes.len()
            )));
        }
        if let Some(pos) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(NetError::InvalidTopology(format!("layer {pos} has no neurons")));
        }
        Ok(Topology { layer_sizes })
    }

    pub fn layer_count(&self) -> usize {
        self.layer_sizes.len()
    }

    /// Number of weight matrices, one per pair of adjacent layers.
    pub fn transition_count(&self) -> usize {
        self.layer_sizes.len() - 1
    }

    pub fn size_of(&self, layer_index: usize) -> NetResult<usize> {
        check_index("layer", layer_index, self.layer_sizes.len())?;
        Ok(self.layer_sizes[layer_index])
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// `(rows, cols)` of the weight matrix for transition `k`.
    pub fn transition_shape(&self, k: usize) -> NetResult<(usize, usize)> {
        check_index("transition", k, self.transition_count())?;
        Ok((self.layer_sizes[k], self.layer_sizes[k + 1]))
    }
}

impl Default for Topology {
    fn default() -> Self {
        Topology { layer_sizes: vec![6, 8, 8, 4] }
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = NetError;

    fn try_from(layer_sizes: Vec<usize>) -> NetResult<Topology> {
        Topology::new(layer_sizes)
    }
}

impl From<Topology> for Vec<usize> {
    fn from(topology: Topology) -> Vec<usize> {
        topology.layer_sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_six_eight_eight_four() {
        let t = Topology::default();
        assert_eq!(t.layer_sizes(), &[6, 8, 8, 4]);
        assert_eq!(t.layer_count(), 4);
        assert_eq!(t.transition_count(), 3);
        assert_eq!(t.transition_shape(1), Ok((8, 8)));
        assert_eq!(t.transition_shape(2), Ok((8, 4)));
    }

    #[test]
    fn rejects_single_layer_and_empty_layers() {
        assert!(matches!(Topology::new(vec![3]), Err(NetError::InvalidTopology(_))));
        assert!(matches!(Topology::new(vec![]), Err(NetError::InvalidTopology(_))));
        assert!(matches!(Topology::new(vec![2, 0, 1]), Err(NetError::InvalidTopology(_))));
    }

    #[test]
    fn size_of_checks_bounds() {
        let t = Topology::new(vec![2, 3]).unwrap();
        assert_eq!(t.size_of(1), Ok(3));
        assert_eq!(
            t.size_of(2),
            Err(NetError::IndexOutOfRange { what: "layer", index: 2, limit: 2 })
        );
    }

    #[test]
    fn deserializes_from_plain_list() {
        let t: Topology = serde_json::from_str("[4, 2, 1]").unwrap();
        assert_eq!(t.layer_sizes(), &[4, 2, 1]);
        assert!(serde_json::from_str::<Topology>("[4]").is_err());
        assert_eq!(serde_json::to_string(&t).unwrap(), "[4,2,1]");
    }
}
