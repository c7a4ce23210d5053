// src/functional/mod.rs

//! Observables of a linear system solution and their estimation contract.
//!
//! A `LinearSystemObservable` describes a scalar property of the solution `x`
//! of `Ax = b` in three coordinated pieces: a list of observables, a list of
//! basis-change circuits aligned with it by index, and a post-processing step
//! that turns the measured values back into the scalar. `evaluate_classically`
//! gives the exact value for checking.

mod matrix;

pub use matrix::MatrixFunctional;

use crate::circuits::Circuit;
use crate::core::FunctionalError;
use crate::observables::Observable;
use num_complex::Complex;

/// Measured values handed to post-processing.
///
/// Measurements of a multi-term observable arrive as an ordered sequence.
/// `Single` exists so a lone scalar can be passed through the same entry
/// point and rejected explicitly by observables that need a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservableResult {
    /// One value.
    Single(Complex<f64>),
    /// Ordered values, index-aligned with the observable and circuit lists.
    Sequence(Vec<Complex<f64>>),
}

impl From<f64> for ObservableResult {
    fn from(value: f64) -> Self {
        ObservableResult::Single(Complex::new(value, 0.0))
    }
}

impl From<Complex<f64>> for ObservableResult {
    fn from(value: Complex<f64>) -> Self {
        ObservableResult::Single(value)
    }
}

impl From<Vec<f64>> for ObservableResult {
    fn from(values: Vec<f64>) -> Self {
        ObservableResult::Sequence(values.into_iter().map(|v| Complex::new(v, 0.0)).collect())
    }
}

impl From<&[f64]> for ObservableResult {
    fn from(values: &[f64]) -> Self {
        ObservableResult::Sequence(values.iter().map(|v| Complex::new(*v, 0.0)).collect())
    }
}

impl From<Vec<Complex<f64>>> for ObservableResult {
    fn from(values: Vec<Complex<f64>>) -> Self {
        ObservableResult::Sequence(values)
    }
}

/// A solution vector, either explicit or as the circuit that prepares it.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    /// Explicit real amplitudes.
    RawVector(Vec<f64>),
    /// A state-preparation circuit, resolved to amplitudes by simulation.
    PreparedState(Circuit),
}

impl From<Vec<f64>> for Solution {
    fn from(values: Vec<f64>) -> Self {
        Solution::RawVector(values)
    }
}

impl From<&[f64]> for Solution {
    fn from(values: &[f64]) -> Self {
        Solution::RawVector(values.to_vec())
    }
}

impl From<Circuit> for Solution {
    fn from(circuit: Circuit) -> Self {
        Solution::PreparedState(circuit)
    }
}

/// A scalar observable of a linear system solution.
pub trait LinearSystemObservable {
    /// Observables to measure on an `num_qubits` register, in order.
    fn observables(&self, num_qubits: usize) -> Result<Vec<Observable>, FunctionalError>;

    /// Basis-change circuits, index-aligned with `observables`.
    fn observable_circuits(&self, num_qubits: usize) -> Result<Vec<Circuit>, FunctionalError>;

    /// Combines measured values (ordered like `observables`) into the scalar.
    /// `scaling` is the factor the prepared state was multiplied by: the
    /// circuit loads `scaling * x`.
    fn post_processing(
        &self,
        results: &ObservableResult,
        num_qubits: usize,
        scaling: f64,
    ) -> Result<f64, FunctionalError>;

    /// Exact value of the observable for `solution`.
    fn evaluate_classically(&self, solution: &Solution) -> Result<f64, FunctionalError>;
}
