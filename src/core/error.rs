//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Index of a qubit inside an `n`-qubit register.
///
/// Qubit `q` corresponds to bit `q` of a computational basis index, so
/// `QubitId(0)` is the least significant position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Failures raised while building, executing or recombining functional estimates.
///
/// Every operation in this crate is deterministic, so none of these are
/// transient: they signal an integration error at the call site.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FunctionalError {
    /// Results were not supplied as an ordered sequence.
    #[error("Input Format Error: {message}")]
    InputFormat {
        /// InputFormat failure message
        message: String,
    },

    /// A register width is unusable: zero qubits, or too wide for a dense path.
    #[error("Invalid Qubit Count: {requested} ({message})")]
    InvalidQubitCount {
        /// The qubit count that was requested
        requested: usize,
        /// InvalidQubitCount failure message
        message: String,
    },

    /// Two index-aligned collections disagree in length.
    #[error("Length Mismatch in {context}: expected {expected}, found {actual}")]
    LengthMismatch {
        /// What was being compared
        context: String,
        /// The length required
        expected: usize,
        /// The length supplied
        actual: usize,
    },

    /// A nominally real combination carried a significant imaginary part.
    #[error("Imaginary Residue: |im| = {imaginary:e} exceeds tolerance {tolerance:e}")]
    ImaginaryResidue {
        /// Imaginary component that was found
        imaginary: f64,
        /// Tolerance in effect
        tolerance: f64,
    },

    /// A coefficient, scaling factor or amplitude is NaN or infinite.
    #[error("Non-Finite Value: {message}")]
    NonFinite {
        /// NonFinite failure message
        message: String,
    },

    /// A finite scaling factor outside `(0, inf)`.
    #[error("Invalid Scaling: {scaling} (must be strictly positive)")]
    InvalidScaling {
        /// The rejected scaling factor
        scaling: f64,
    },

    /// A shot-based backend was configured to draw no samples.
    #[error("Invalid Shot Count: {shots} (at least one shot is required)")]
    InvalidShotCount {
        /// The rejected shot count
        shots: usize,
    },

    /// A circuit operation is inconsistent with the register it was added to.
    #[error("Invalid Operation: {message}")]
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// A state vector failed its normalization check.
    #[error("Incoherence Violation: {message}")]
    Incoherence {
        /// Incoherence failure message
        message: String,
    },
}

impl FunctionalError {
    /// Returns `true` for the domain-error family: bad qubit counts, length
    /// mismatches, imaginary residues and non-finite or out-of-range numeric
    /// parameters.
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            FunctionalError::InvalidQubitCount { .. }
                | FunctionalError::LengthMismatch { .. }
                | FunctionalError::ImaginaryResidue { .. }
                | FunctionalError::NonFinite { .. }
                | FunctionalError::InvalidScaling { .. }
                | FunctionalError::InvalidShotCount { .. }
        )
    }
}
