use std::f64::consts::E;

/// Logistic function `1 / (1 + e^-x)`.
///
/// Output lies in (0, 1) for every finite input; `sigmoid(0.0) == 0.5`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}
