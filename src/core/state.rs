// src/core/state.rs

use num_complex::Complex;
use std::fmt;

use super::error::FunctionalError;

/// Amplitude vector of an `n`-qubit register.
///
/// Index `k` holds the amplitude of the computational basis state whose
/// bit `q` is the value of qubit `q`. The length is always `2^n`.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeState {
    amplitudes: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl AmplitudeState {
    /// Wraps a complex amplitude vector. The length must be a power of two.
    pub fn new(amplitudes: Vec<Complex<f64>>) -> Result<Self, FunctionalError> {
        let dim = amplitudes.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(FunctionalError::LengthMismatch {
                context: "amplitude vector (power of two)".to_string(),
                expected: dim.max(1).next_power_of_two(),
                actual: dim,
            });
        }
        Ok(Self { amplitudes, num_qubits: dim.trailing_zeros() as usize })
    }

    /// Builds a state from real amplitudes.
    pub fn from_real(values: &[f64]) -> Result<Self, FunctionalError> {
        Self::new(values.iter().map(|&v| Complex::new(v, 0.0)).collect())
    }

    /// The `|0...0>` state of an `n`-qubit register.
    pub(crate) fn zero(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Self { amplitudes, num_qubits }
    }

    /// Read-only access to the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub(crate) fn vector_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.amplitudes
    }

    /// Number of basis states (`2^n`).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Number of qubits `n`.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Outcome probabilities `|a_k|^2`.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Squared Euclidean norm of the amplitude vector.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }
}

impl fmt::Display for AmplitudeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amplitudes[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
