//! Numeric constants shared by the estimator and the simulator.

/// Default thresholds and limits
pub mod functional_constants {
    /// Largest imaginary component tolerated when a nominally real value is
    /// recovered from complex arithmetic.
    pub const DEFAULT_IMAGINARY_TOLERANCE: f64 = 1e-9;
    /// Allowed deviation of `sum(|a_k|^2)` from 1.0.
    pub const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;
    /// Register width cap for paths that allocate dense `2^n` storage.
    pub const MAX_QUBITS: usize = 24;
}
