use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{check_index, NetError, NetResult};
use crate::math::matrix::Matrix;
use crate::network::topology::Topology;

/// One weight matrix per layer transition.
///
/// Matrix `k` connects layer `k` to layer `k + 1` and is indexed `[i][j]`
/// with `i` a source neuron and `j` a target neuron.
#[derive(Debug, Clone, Default)]
pub struct WeightStore {
    matrices: Option<Vec<Matrix>>,
}

impl WeightStore {
    pub fn new() -> WeightStore {
        WeightStore::default()
    }

    /// Allocates every transition matrix and fills it with uniform values in [-1, 1].
    pub fn initialize<R: Rng + ?Sized>(&mut self, topology: &Topology, rng: &mut R) {
        let matrices = topology
            .layer_sizes()
            .windows(2)
            .map(|pair| Matrix::random(pair[0], pair[1], &mut *rng))
            .collect();
        self.matrices = Some(matrices);
    }

    /// Redraws every entry of every matrix; shapes are preserved.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> NetResult<()> {
        let matrices = self.matrices.as_mut().ok_or(NetError::NotInitialized)?;
        for matrix in matrices.iter_mut() {
            matrix.randomize(&mut *rng);
        }
        Ok(())
    }

    pub fn get(&self, k: usize, i: usize, j: usize) -> NetResult<f64> {
        let matrix = self.matrix(k)?;
        check_index("source neuron", i, matrix.rows)?;
        check_index("target neuron", j, matrix.cols)?;
        Ok(matrix.data[i][j])
    }

    pub fn matrix(&self, k: usize) -> NetResult<&Matrix> {
        let matrices = self.matrices()?;
        check_index("transition", k, matrices.len())?;
        Ok(&matrices[k])
    }

    pub fn matrices(&self) -> NetResult<&[Matrix]> {
        self.matrices.as_deref().ok_or(NetError::NotInitialized)
    }

    /// Installs externally supplied matrices. Every matrix must have the
    /// shape `topology` dictates and every entry must be a finite value in
    /// [-1, 1]; on any violation nothing is replaced.
    pub fn replace(&mut self, topology: &Topology, matrices: Vec<Matrix>) -> NetResult<()> {
        if matrices.len() != topology.transition_count() {
            return Err(NetError::InvalidTopology(format!(
                "expected {} weight matrices, got {}",
                topology.transition_count(),
                matrices.len()
            )));
        }
        for (k, matrix) in matrices.iter().enumerate() {
            let (rows, cols) = topology.transition_shape(k)?;
            if !matrix.is_well_formed() || matrix.shape() != (rows, cols) {
                return Err(NetError::ShapeMismatch {
                    transition: k,
                    rows,
                    cols,
                    found_rows: matrix.data.len(),
                    found_cols: matrix.data.first().map_or(0, |row| row.len()),
                });
            }
        }
        check_weight_range(&matrices)?;
        self.matrices = Some(matrices);
        Ok(())
    }
}

fn check_weight_range(matrices: &[Matrix]) -> NetResult<()> {
    for (transition, matrix) in matrices.iter().enumerate() {
        for (row, values) in matrix.data.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                // NaN fails the range test too.
                if !(-1.0..=1.0).contains(&value) {
                    return Err(NetError::WeightOutOfRange { transition, row, col, value });
                }
            }
        }
    }
    Ok(())
}

/// On-disk form of a network's weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightFile {
    pub layer_sizes: Topology,
    pub matrices: Vec<Matrix>,
}

impl WeightFile {
    /// Serializes the weights to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes weights from a JSON file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::io::Result<WeightFile> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
