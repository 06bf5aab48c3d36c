use thiserror::Error;

/// Contract violations raised by the network stores and the animator.
///
/// None of these are recoverable runtime conditions: they mean the caller
/// (usually the presentation layer) used an index or an operation the
/// configured topology does not allow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetError {
    #[error("network has not been initialized")]
    NotInitialized,

    #[error("{what} index {index} out of range (expected < {limit})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("weight matrix {transition} has shape {found_rows}x{found_cols}, expected {rows}x{cols}")]
    ShapeMismatch {
        transition: usize,
        rows: usize,
        cols: usize,
        found_rows: usize,
        found_cols: usize,
    },

    #[error("weight [{transition}][{row}][{col}] = {value} is outside [-1, 1]")]
    WeightOutOfRange {
        transition: usize,
        row: usize,
        col: usize,
        value: f64,
    },
}

impl NetError {
    pub(crate) fn out_of_range(what: &'static str, index: usize, limit: usize) -> NetError {
        NetError::IndexOutOfRange { what, index, limit }
    }
}

pub type NetResult<T> = Result<T, NetError>;

/// Returns `Ok(index)` when `index < limit`.
pub(crate) fn check_index(what: &'static str, index: usize, limit: usize) -> NetResult<usize> {
    if index < limit {
        Ok(index)
    } else {
        Err(NetError::out_of_range(what, index, limit))
    }
}
