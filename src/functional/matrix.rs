// src/functional/matrix.rs

use super::{LinearSystemObservable, ObservableResult, Solution};
use crate::circuits::{Circuit, CircuitBuilder, state_preparation};
use crate::core::{FunctionalError, QubitId, Tolerances};
use crate::observables::{Factor, Observable};
use crate::operations::Operation;
use crate::simulation::Simulator;
use crate::validation::{check_finite, check_qubit_count, check_real, check_result_length, check_scaling};
use num_complex::Complex;
use num_traits::Zero;
use std::iter;
use tracing::{debug, trace};

/// The functional `x^T A x` for a symmetric tridiagonal Toeplitz matrix `A`
/// with constant `main_diag` on the diagonal and `off_diag` on both
/// neighbouring diagonals.
///
/// The off-diagonal part `2 * off_diag * sum_k x_k x_{k+1}` is split by the
/// position `i` of the carry in `k -> k+1`: pairs whose low `i` bits are all
/// one and whose bit `i` flips. Circuit `i` folds every such pair onto a
/// single qubit (CNOTs from qubit `i` onto the lower qubits, then a Hadamard
/// on `i`), after which `<P0_i ⊗ P1...P1> - <P1_i ⊗ P1...P1>` equals
/// `2 * sum x_k x_{k+1}` over those pairs.
///
/// ```
/// use matrix_functional::{LinearSystemObservable, MatrixFunctional, Solution};
///
/// let functional = MatrixFunctional::new(2.0, 1.0).unwrap();
/// let value = functional.evaluate_classically(&Solution::RawVector(vec![1.0, 1.0])).unwrap();
/// assert!((value - 6.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixFunctional {
    main_diag: f64,
    off_diag: f64,
    tolerances: Tolerances,
}

impl MatrixFunctional {
    /// Creates the functional for `Toeplitz(off_diag, main_diag, off_diag)`.
    ///
    /// # Errors
    /// `NonFinite` if either coefficient is NaN or infinite.
    pub fn new(main_diag: f64, off_diag: f64) -> Result<Self, FunctionalError> {
        check_finite("main_diag", main_diag)?;
        check_finite("off_diag", off_diag)?;
        Ok(Self { main_diag, off_diag, tolerances: Tolerances::default() })
    }

    /// Replaces the numerical tolerances.
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Main diagonal value.
    pub fn main_diag(&self) -> f64 {
        self.main_diag
    }

    /// Off diagonal value.
    pub fn off_diag(&self) -> f64 {
        self.off_diag
    }

    /// Tolerances in effect.
    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Dense `dim x dim` matrix `A`.
    pub fn tridiagonal_matrix(&self, dim: usize) -> Vec<Vec<f64>> {
        let mut matrix = vec![vec![0.0; dim]; dim];
        for (k, row) in matrix.iter_mut().enumerate() {
            row[k] = self.main_diag;
            if k > 0 {
                row[k - 1] = self.off_diag;
            }
            if k + 1 < dim {
                row[k + 1] = self.off_diag;
            }
        }
        matrix
    }

    /// Band product `A x` without building `A`.
    fn apply_matrix(&self, x: &[Complex<f64>]) -> Vec<Complex<f64>> {
        let dim = x.len();
        (0..dim)
            .map(|k| {
                let mut acc = x[k] * self.main_diag;
                if k > 0 {
                    acc += x[k - 1] * self.off_diag;
                }
                if k + 1 < dim {
                    acc += x[k + 1] * self.off_diag;
                }
                acc
            })
            .collect()
    }

    /// Runs the full estimation pipeline for an explicit vector: loads
    /// `x / |x|`, measures every term on `simulator` and recombines with the
    /// matching scaling, so the result approximates `x^T A x` of `x` itself.
    ///
    /// # Errors
    /// Any error from state preparation, execution or post-processing.
    pub fn estimate(&self, simulator: &Simulator, x: &[f64]) -> Result<f64, FunctionalError> {
        let (preparation, norm) = state_preparation(x)?;
        let num_qubits = preparation.num_qubits();
        let circuits = self.observable_circuits(num_qubits)?;
        let observables = self.observables(num_qubits)?;
        let results = simulator.estimate(&preparation, &circuits, &observables)?;
        self.post_processing(&ObservableResult::Sequence(results), num_qubits, 1.0 / norm)
    }
}

/// `prefix ⊗ middle ⊗ suffix`, where absent parts contribute no factors.
fn sandwich(prefix: Option<&Observable>, middle: Factor, suffix: Option<&Observable>) -> Observable {
    let core = Observable::single(middle);
    let left = match prefix {
        Some(p) => p.tensor(&core),
        None => core,
    };
    match suffix {
        Some(s) => left.tensor(s),
        None => left,
    }
}

impl LinearSystemObservable for MatrixFunctional {
    /// Term 0 is the identity (norm); then, for `i = 0..n`, the pair
    /// `I^j ⊗ P0 ⊗ P1^i` and `I^j ⊗ P1 ⊗ P1^i` with `j = n - i - 1`.
    fn observables(&self, num_qubits: usize) -> Result<Vec<Observable>, FunctionalError> {
        check_qubit_count(num_qubits)?;
        let mut observables = Vec::with_capacity(2 * num_qubits + 1);
        observables.push(Observable::identity(num_qubits));

        for i in 0..num_qubits {
            let j = num_qubits - i - 1;
            let prefix = (j > 0).then(|| Observable::identity(j));
            let suffix = if i > 0 {
                Some(Observable::product(iter::repeat_n(Factor::ProjectorOne, i))?)
            } else {
                None
            };

            let zero_case = sandwich(prefix.as_ref(), Factor::ProjectorZero, suffix.as_ref());
            let one_case = sandwich(prefix.as_ref(), Factor::ProjectorOne, suffix.as_ref());
            trace!(i, zero = %zero_case, one = %one_case, "built observable pair");
            observables.push(zero_case);
            observables.push(one_case);
        }

        debug!(num_qubits, terms = observables.len(), "built matrix functional observables");
        Ok(observables)
    }

    /// Circuit 0 is the identity; circuit `i` (emitted twice) applies
    /// `CNOT(i -> j)` for `j = 0..i`, then `H` on qubit `i`.
    fn observable_circuits(&self, num_qubits: usize) -> Result<Vec<Circuit>, FunctionalError> {
        check_qubit_count(num_qubits)?;
        let mut circuits = Vec::with_capacity(2 * num_qubits + 1);
        circuits.push(Circuit::new(num_qubits));

        for i in 0..num_qubits {
            let circuit = CircuitBuilder::new(num_qubits)
                .add_ops((0..i).map(|j| Operation::ControlledNot { control: QubitId(i), target: QubitId(j) }))
                .add_op(Operation::Hadamard { target: QubitId(i) })
                .build()?;
            circuits.push(circuit.clone());
            circuits.push(circuit);
        }

        debug!(num_qubits, circuits = circuits.len(), "built matrix functional circuits");
        Ok(circuits)
    }

    /// `main_diag * r0 / s^2 + off_diag * sum_k (r_{2k+1} - r_{2k+2}) / s^2`.
    ///
    /// # Errors
    /// * `InputFormat` for `ObservableResult::Single`.
    /// * `LengthMismatch` unless exactly `2n + 1` values are given.
    /// * `InvalidQubitCount` for `num_qubits == 0`.
    /// * `NonFinite` or `InvalidScaling` for a scaling that is not a finite positive number.
    /// * `ImaginaryResidue` if the combination is not real within tolerance.
    fn post_processing(
        &self,
        results: &ObservableResult,
        num_qubits: usize,
        scaling: f64,
    ) -> Result<f64, FunctionalError> {
        let values = match results {
            ObservableResult::Sequence(values) => values,
            ObservableResult::Single(_) => {
                return Err(FunctionalError::InputFormat {
                    message: "Solution probabilities must be given as an ordered sequence".to_string(),
                });
            }
        };
        check_qubit_count(num_qubits)?;
        check_scaling(scaling)?;
        check_result_length(values.len(), num_qubits)?;

        let scale_sq = scaling * scaling;
        let main_val = values[0] / scale_sq;
        let off_val = values[1..]
            .chunks_exact(2)
            .fold(Complex::zero(), |acc: Complex<f64>, pair| acc + (pair[0] - pair[1]) / scale_sq);

        let value = main_val * self.main_diag + off_val * self.off_diag;
        debug!(num_qubits, scaling, value = %value, "combined observable results");
        check_real(value, Some(self.tolerances.imaginary_residue))
    }

    /// `x^T A x` with no conjugation. Circuits are resolved with an exact
    /// statevector simulation first.
    fn evaluate_classically(&self, solution: &Solution) -> Result<f64, FunctionalError> {
        let x: Vec<Complex<f64>> = match solution {
            Solution::RawVector(values) => {
                for value in values {
                    check_finite("solution entry", *value)?;
                }
                values.iter().map(|v| Complex::new(*v, 0.0)).collect()
            }
            Solution::PreparedState(circuit) => Simulator::new().statevector(circuit)?.vector().to_vec(),
        };

        let ax = self.apply_matrix(&x);
        let value = x.iter().zip(ax.iter()).fold(Complex::zero(), |acc: Complex<f64>, (xk, axk)| acc + xk * axk);
        trace!(dim = x.len(), value = %value, "evaluated functional classically");
        check_real(value, Some(self.tolerances.imaginary_residue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn functional(main_diag: f64, off_diag: f64) -> MatrixFunctional {
        MatrixFunctional::new(main_diag, off_diag).unwrap()
    }

    fn seq(values: &[f64]) -> ObservableResult {
        ObservableResult::from(values)
    }

    #[test]
    fn test_rejects_non_finite_coefficients() {
        assert!(MatrixFunctional::new(f64::NAN, 0.0).is_err());
        assert!(MatrixFunctional::new(1.0, f64::INFINITY).is_err());
        assert!(MatrixFunctional::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_observable_layout_two_qubits() {
        let obs = functional(1.0, 1.0).observables(2).unwrap();
        let rendered: Vec<String> = obs.iter().map(|o| o.to_string()).collect();
        assert_eq!(rendered, vec!["I ⊗ I", "I ⊗ P0", "I ⊗ P1", "P0 ⊗ P1", "P1 ⊗ P1"]);
    }

    #[test]
    fn test_observable_layout_three_qubits() {
        let obs = functional(1.0, 1.0).observables(3).unwrap();
        assert_eq!(obs.len(), 7);
        assert!(obs.iter().all(|o| o.num_qubits() == 3));
        assert_eq!(obs[5].to_string(), "P0 ⊗ P1 ⊗ P1");
        assert_eq!(obs[4].factor_on(QubitId(1)), Some(Factor::ProjectorOne));
        assert_eq!(obs[4].factor_on(QubitId(0)), Some(Factor::ProjectorOne));
        assert_eq!(obs[4].factor_on(QubitId(2)), Some(Factor::Identity));
    }

    #[test]
    fn test_single_qubit_layout() {
        let f = functional(1.0, 1.0);
        let obs = f.observables(1).unwrap();
        assert_eq!(obs, vec![
            Observable::identity(1),
            Observable::single(Factor::ProjectorZero),
            Observable::single(Factor::ProjectorOne),
        ]);
        let circuits = f.observable_circuits(1).unwrap();
        assert_eq!(circuits[1].operations(), &[Operation::Hadamard { target: QubitId(0) }]);
    }

    #[test]
    fn test_circuit_structure() {
        let circuits = functional(1.0, 1.0).observable_circuits(3).unwrap();
        assert_eq!(circuits.len(), 7);
        assert!(circuits[0].is_empty());
        assert_eq!(
            circuits[5].operations(),
            &[
                Operation::ControlledNot { control: QubitId(2), target: QubitId(0) },
                Operation::ControlledNot { control: QubitId(2), target: QubitId(1) },
                Operation::Hadamard { target: QubitId(2) },
            ]
        );
        assert_eq!(circuits[5], circuits[6]);
    }

    #[test]
    fn test_zero_qubits_rejected() {
        let f = functional(1.0, 1.0);
        assert!(f.observables(0).unwrap_err().is_domain_error());
        assert!(f.observable_circuits(0).unwrap_err().is_domain_error());
    }

    #[test]
    fn test_post_processing_formula() {
        let f = functional(2.0, 0.5);
        let value = f.post_processing(&seq(&[1.0, 0.7, 0.1, 0.4, 0.2]), 2, 1.0).unwrap();
        // 2 * 1 + 0.5 * ((0.7 - 0.1) + (0.4 - 0.2))
        assert_abs_diff_eq!(value, 2.4, epsilon = TEST_TOLERANCE);
    }

    #[test]
    fn test_post_processing_rejects_scalar() {
        let err = functional(1.0, 1.0).post_processing(&ObservableResult::from(0.5_f64), 1, 1.0).unwrap_err();
        assert!(matches!(err, FunctionalError::InputFormat { .. }));
    }

    #[test]
    fn test_post_processing_rejects_length_mismatch() {
        let f = functional(1.0, 1.0);
        let err = f.post_processing(&seq(&[1.0, 0.5]), 1, 1.0).unwrap_err();
        assert!(matches!(err, FunctionalError::LengthMismatch { expected: 3, actual: 2, .. }));
        assert!(f.post_processing(&seq(&[1.0, 0.5, 0.5]), 1, 0.0).is_err());
    }

    #[test]
    fn test_post_processing_imaginary_residue() {
        let f = functional(1.0, 1.0);
        let results = ObservableResult::Sequence(vec![
            Complex::new(1.0, 0.0),
            Complex::new(0.5, 0.2),
            Complex::new(0.5, 0.0),
        ]);
        let err = f.post_processing(&results, 1, 1.0).unwrap_err();
        assert!(matches!(err, FunctionalError::ImaginaryResidue { .. }));

        let lenient = f.with_tolerances(Tolerances::default().with_imaginary_residue(0.5));
        assert_abs_diff_eq!(lenient.post_processing(&results, 1, 1.0).unwrap(), 1.0, epsilon = TEST_TOLERANCE);
    }

    #[test]
    fn test_classical_reference_unnormalized() {
        let value = functional(2.0, 1.0).evaluate_classically(&Solution::RawVector(vec![1.0, 1.0])).unwrap();
        assert_abs_diff_eq!(value, 6.0, epsilon = TEST_TOLERANCE);
    }

    #[test]
    fn test_classical_reference_matches_dense_matrix() {
        let f = functional(1.0, -1.0 / 3.0);
        let x = [1.0, -2.1, 3.2, -4.3, 0.5];
        let a = f.tridiagonal_matrix(x.len());
        let dense: f64 = (0..x.len()).map(|r| x[r] * (0..x.len()).map(|c| a[r][c] * x[c]).sum::<f64>()).sum();
        let value = f.evaluate_classically(&Solution::from(&x[..])).unwrap();
        assert_abs_diff_eq!(value, dense, epsilon = TEST_TOLERANCE);
    }

    #[test]
    fn test_tridiagonal_matrix_shape() {
        let a = functional(4.0, -1.0).tridiagonal_matrix(3);
        assert_eq!(a, vec![vec![4.0, -1.0, 0.0], vec![-1.0, 4.0, -1.0], vec![0.0, -1.0, 4.0]]);
    }

    #[test]
    fn test_classical_reference_from_circuit() {
        let f = functional(1.0, 0.5);
        let (prep, _) = state_preparation(&[1.0, 1.0]).unwrap();
        // x = [1/sqrt2, 1/sqrt2]: 1 * 1 + 0.5 * 2 * 0.5 = 1.5
        let value = f.evaluate_classically(&Solution::PreparedState(prep)).unwrap();
        assert_abs_diff_eq!(value, 1.5, epsilon = TEST_TOLERANCE);
    }

    #[test]
    fn test_estimate_recovers_unnormalized_functional() {
        let f = functional(3.0, -0.75);
        let x = [0.3, -1.2, 2.0, 0.9, -0.4, 1.1, 0.0, 2.5];
        let exact = f.evaluate_classically(&Solution::from(&x[..])).unwrap();
        let estimated = f.estimate(&Simulator::new(), &x).unwrap();
        assert_abs_diff_eq!(estimated, exact, epsilon = 1e-8);
    }
}
