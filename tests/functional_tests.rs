// tests/functional_tests.rs

use matrix_functional::{
    FunctionalError, LinearSystemObservable, MatrixFunctional, Observable, ObservableResult, Operation,
    QubitId, Simulator, Solution, state_preparation,
};

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

const TEST_TOLERANCE: f64 = 1e-9;

fn normalize(values: &[f64]) -> Vec<f64> {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    values.iter().map(|v| v / norm).collect()
}

/// Runs every term noiselessly on the exact preparation of `x` (already normalized).
fn quantum_estimate(functional: &MatrixFunctional, x: &[f64]) -> Result<f64, FunctionalError> {
    let (preparation, _) = state_preparation(x)?;
    let num_qubits = preparation.num_qubits();
    let circuits = functional.observable_circuits(num_qubits)?;
    let observables = functional.observables(num_qubits)?;
    let results = Simulator::new().estimate(&preparation, &circuits, &observables)?;
    functional.post_processing(&ObservableResult::Sequence(results), num_qubits, 1.0)
}

/// Explicit dense `x^T A x`.
fn dense_functional(functional: &MatrixFunctional, x: &[f64]) -> f64 {
    let a = functional.tridiagonal_matrix(x.len());
    (0..x.len())
        .map(|r| x[r] * (0..x.len()).map(|c| a[r][c] * x[c]).sum::<f64>())
        .sum()
}

#[test]
fn test_builders_emit_aligned_lists() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.0, 0.5)?;
    for n in 1..=4 {
        let observables = functional.observables(n)?;
        let circuits = functional.observable_circuits(n)?;
        assert_eq!(observables.len(), 2 * n + 1, "observable count for n = {}", n);
        assert_eq!(circuits.len(), 2 * n + 1, "circuit count for n = {}", n);
        assert!(observables.iter().all(|o| o.num_qubits() == n));
        assert!(circuits.iter().all(|c| c.num_qubits() == n));
    }
    Ok(())
}

#[test]
fn test_identity_circuit_first_and_pairs_repeat() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.0, 0.5)?;
    for n in 1..=4 {
        let circuits = functional.observable_circuits(n)?;
        assert!(circuits[0].is_empty());
        assert!(functional.observables(n)?[0].is_identity());
        for k in 0..n {
            assert_eq!(circuits[2 * k + 1], circuits[2 * k + 2], "pair {} for n = {}", k, n);
            // Circuit k rotates qubit k last
            assert_eq!(circuits[2 * k + 1].operations().last(), Some(&Operation::Hadamard { target: QubitId(k) }));
        }
    }
    Ok(())
}

#[test]
fn test_builders_are_idempotent() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(-2.0, 0.25)?;
    assert_eq!(functional.observables(3)?, functional.observables(3)?);
    assert_eq!(functional.observable_circuits(3)?, functional.observable_circuits(3)?);
    Ok(())
}

#[test]
fn test_basis_state_norm_only() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.0, 0.0)?;
    let estimate = quantum_estimate(&functional, &[1.0, 0.0, 0.0, 0.0])?;
    assert_abs_diff_eq!(estimate, 1.0, epsilon = TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_estimate_matches_explicit_matrix() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.0, -1.0 / 3.0)?;
    let x = normalize(&[1.0, -2.1, 3.2, -4.3]);
    let estimate = quantum_estimate(&functional, &x)?;
    let exact = functional.evaluate_classically(&Solution::RawVector(x.clone()))?;
    assert_abs_diff_eq!(exact, dense_functional(&functional, &x), epsilon = TEST_TOLERANCE);
    assert_abs_diff_eq!(estimate, exact, epsilon = TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_estimate_three_qubits() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(0.7, 1.9)?;
    let x = normalize(&[0.1, 0.9, -0.3, 0.4, 1.5, -2.0, 0.0, 0.25]);
    let estimate = quantum_estimate(&functional, &x)?;
    assert_abs_diff_eq!(estimate, dense_functional(&functional, &x), epsilon = TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_post_processing_rejects_scalar() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.0, 1.0)?;
    let err = functional.post_processing(&ObservableResult::from(0.75_f64), 1, 1.0).unwrap_err();
    assert!(matches!(err, FunctionalError::InputFormat { .. }));
    assert!(!err.is_domain_error());
    Ok(())
}

#[test]
fn test_scaling_is_divided_out() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.5, -0.5)?;
    let scaled = ObservableResult::from(vec![4.0, 2.0, 1.0, 1.0, 1.0]);
    let unscaled = ObservableResult::from(vec![1.0, 0.5, 0.25, 0.25, 0.25]);
    let a = functional.post_processing(&scaled, 2, 2.0)?;
    let b = functional.post_processing(&unscaled, 2, 1.0)?;
    assert_abs_diff_eq!(a, b, epsilon = TEST_TOLERANCE);
    // 1.5 * 1 - 0.5 * 0.25
    assert_abs_diff_eq!(a, 1.375, epsilon = TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_result_length_must_match_qubits() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.0, 1.0)?;
    let five = ObservableResult::from(vec![4.0, 2.0, 1.0, 1.0, 1.0]);
    let err = functional.post_processing(&five, 1, 2.0).unwrap_err();
    assert!(matches!(err, FunctionalError::LengthMismatch { expected: 3, actual: 5, .. }));
    assert!(err.is_domain_error());
    Ok(())
}

#[test]
fn test_classical_reference_unnormalized() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(2.0, 1.0)?;
    let value = functional.evaluate_classically(&Solution::RawVector(vec![1.0, 1.0]))?;
    assert_abs_diff_eq!(value, 6.0, epsilon = TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_classical_reference_accepts_circuit() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.0, -1.0 / 3.0)?;
    let x = normalize(&[1.0, -2.1, 3.2, -4.3]);
    let (preparation, _) = state_preparation(&x)?;
    let from_circuit = functional.evaluate_classically(&Solution::PreparedState(preparation))?;
    let from_vector = functional.evaluate_classically(&Solution::RawVector(x))?;
    assert_abs_diff_eq!(from_circuit, from_vector, epsilon = TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_estimate_pipeline_handles_unnormalized_input() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(2.0, 1.0)?;
    let estimate = functional.estimate(&Simulator::new(), &[1.0, 1.0])?;
    assert_abs_diff_eq!(estimate, 6.0, epsilon = TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_builders_and_combiner_accept_wide_registers() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(2.0, 0.5)?;
    let n = 30;
    let observables = functional.observables(n)?;
    let circuits = functional.observable_circuits(n)?;
    assert_eq!(observables.len(), 2 * n + 1);
    assert_eq!(circuits.len(), 2 * n + 1);
    assert!(observables.iter().all(|o| o.num_qubits() == n));
    assert_eq!(circuits[2 * n].len(), n);

    // Norm term 1, every (zero, one) pair differs by 0.25
    let mut values = vec![1.0];
    for _ in 0..n {
        values.extend([0.5, 0.25]);
    }
    let value = functional.post_processing(&ObservableResult::from(values), n, 1.0)?;
    assert_abs_diff_eq!(value, 2.0 + 0.5 * 0.25 * n as f64, epsilon = TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_dense_paths_keep_their_limit() {
    let observable = Observable::identity(30);
    assert!(matches!(observable.diagonal(), Err(FunctionalError::InvalidQubitCount { requested: 30, .. })));
}

#[test]
fn test_non_positive_scaling_rejected() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.0, 1.0)?;
    let results = ObservableResult::from(vec![1.0, 0.5, 0.5]);
    let err = functional.post_processing(&results, 1, -2.0).unwrap_err();
    assert_eq!(err, FunctionalError::InvalidScaling { scaling: -2.0 });
    assert!(err.is_domain_error());
    Ok(())
}

#[test]
fn test_classical_reference_empty_vector_is_zero() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(3.0, -1.0)?;
    let value = functional.evaluate_classically(&Solution::RawVector(Vec::new()))?;
    assert_eq!(value, 0.0);
    Ok(())
}

#[test]
fn test_classical_reference_rejects_nan_entry() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(3.0, -1.0)?;
    let err = functional.evaluate_classically(&Solution::RawVector(vec![1.0, f64::NAN, 0.5])).unwrap_err();
    assert!(matches!(err, FunctionalError::NonFinite { .. }));
    Ok(())
}

#[test]
fn test_shot_estimate_three_qubits() -> Result<(), FunctionalError> {
    let functional = MatrixFunctional::new(1.2, -0.8)?;
    let x = [0.4, 1.1, -0.3, 0.9, 1.5, 0.2, -0.6, 0.8];
    let exact = functional.evaluate_classically(&Solution::RawVector(x.to_vec()))?;
    let sampled = functional.estimate(&Simulator::with_shots(100_000, 2024)?, &x)?;
    // |x|^2 = 5.56 scales the roughly 1/sqrt(shots) noise of each sampled term
    assert_abs_diff_eq!(sampled, exact, epsilon = 0.25);
    Ok(())
}

#[test]
fn test_zero_shot_simulator_rejected() {
    let err = Simulator::with_shots(0, 1).unwrap_err();
    assert_eq!(err, FunctionalError::InvalidShotCount { shots: 0 });
    assert!(err.is_domain_error());
}

#[test]
fn test_trait_object_usage() -> Result<(), FunctionalError> {
    let observable: Box<dyn LinearSystemObservable> = Box::new(MatrixFunctional::new(1.0, 1.0)?);
    assert_eq!(observable.observables(2)?.len(), 5);
    assert!(observable.observable_circuits(0).is_err());
    Ok(())
}

proptest! {
    #[test]
    fn prop_noiseless_estimate_matches_classical(
        (n, values) in (1usize..=4).prop_flat_map(|n| (Just(n), prop::collection::vec(-5.0f64..5.0, 1 << n))),
        main_diag in -3.0f64..3.0,
        off_diag in -3.0f64..3.0,
    ) {
        let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        prop_assume!(norm > 1e-3);
        let functional = MatrixFunctional::new(main_diag, off_diag).unwrap();
        let x = normalize(&values);
        let estimate = quantum_estimate(&functional, &x).unwrap();
        let exact = functional.evaluate_classically(&Solution::RawVector(x)).unwrap();
        prop_assert!((estimate - exact).abs() < 1e-9, "n = {}, estimate = {}, exact = {}", n, estimate, exact);
    }

    #[test]
    fn prop_builder_lengths(n in 1usize..=8) {
        let functional = MatrixFunctional::new(1.0, 1.0).unwrap();
        prop_assert_eq!(functional.observables(n).unwrap().len(), 2 * n + 1);
        prop_assert_eq!(functional.observable_circuits(n).unwrap().len(), 2 * n + 1);
    }
}
