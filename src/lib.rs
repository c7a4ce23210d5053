// src/lib.rs

//! `matrix_functional` - estimation of `x^T A x` for a quantum-encoded solution `x`
//!
//! `A` is a symmetric tridiagonal Toeplitz matrix. The functional is split
//! into `2n + 1` terms, each measurable on a single basis-changed copy of the
//! `n`-qubit solution state. This crate builds the observables and circuits
//! for those terms, recombines measured values into the scalar, and provides
//! the exact classical value for validation. A small statevector simulator is
//! included to execute the circuits.
//!
//! Qubit `q` is bit `q` of a basis index; observables list their factors
//! most significant qubit first.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod observables;
pub mod functional;
pub mod simulation;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{AmplitudeState, FunctionalError, QubitId, Tolerances};
pub use operations::Operation;
pub use circuits::{Circuit, CircuitBuilder, state_preparation};
pub use observables::{Factor, Observable, PauliTerm};
pub use functional::{LinearSystemObservable, MatrixFunctional, ObservableResult, Solution};
pub use simulation::{SampleCounts, Simulator};
pub use validation::{
    check_normalization,
    check_qubit_count,
    check_real,
    check_result_length,
};

// Example 1: Estimating a functional from exact expectation values
// Loads a normalized vector, runs each basis-change circuit against its
// paired observable and recombines the results.
/// ```
/// use matrix_functional::{
///     LinearSystemObservable, MatrixFunctional, ObservableResult, Simulator, Solution,
///     state_preparation,
/// };
///
/// let vector = [1.0, -2.1, 3.2, -4.3];
/// let functional = MatrixFunctional::new(1.0, -1.0 / 3.0)?;
///
/// let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
/// let init_state: Vec<f64> = vector.iter().map(|v| v / norm).collect();
/// let (preparation, _) = state_preparation(&init_state)?;
/// let num_qubits = preparation.num_qubits();
///
/// let circuits = functional.observable_circuits(num_qubits)?;
/// let observables = functional.observables(num_qubits)?;
/// let results = Simulator::new().estimate(&preparation, &circuits, &observables)?;
///
/// let estimate = functional.post_processing(&ObservableResult::Sequence(results), num_qubits, 1.0)?;
/// let exact = functional.evaluate_classically(&Solution::RawVector(init_state))?;
/// println!("estimate = {}, exact = {}", estimate, exact);
/// assert!((estimate - exact).abs() < 1e-9);
/// # Ok::<(), matrix_functional::FunctionalError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 2: Shot-based estimation
// Replaces exact expectation values with frequencies from seeded sampling.
/// ```
/// use matrix_functional::{LinearSystemObservable, MatrixFunctional, Simulator, Solution};
///
/// let x = [0.5, 0.5, 0.5, 0.5];
/// let functional = MatrixFunctional::new(2.0, 1.0)?;
///
/// let sampled = functional.estimate(&Simulator::with_shots(50_000, 42)?, &x)?;
/// let exact = functional.evaluate_classically(&Solution::RawVector(x.to_vec()))?;
/// // Uniform state: 2 * 1 + 1 * 2 * (3 * 0.25) = 3.5
/// assert!((exact - 3.5).abs() < 1e-12);
/// assert!((sampled - exact).abs() < 0.1);
/// # Ok::<(), matrix_functional::FunctionalError>(())
/// ```
#[doc(hidden)]
const _: () = ();
