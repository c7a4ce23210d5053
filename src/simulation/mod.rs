// src/simulation/mod.rs

//! Executes circuits and evaluates observables on them.
//!
//! `Simulator` plays the role of the execution backend: it resolves a circuit
//! to its exact amplitude vector, evaluates paired (circuit, observable)
//! lists in order, and optionally replaces exact expectation values with
//! estimates drawn from a fixed number of seeded shots.

mod results;
pub(crate) mod engine;

pub use results::SampleCounts;

use crate::circuits::Circuit;
use crate::core::{AmplitudeState, FunctionalError};
use crate::observables::Observable;
use engine::StatevectorEngine;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing::{debug, trace};

/// Shot sampling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotConfig {
    /// Shots drawn per circuit.
    pub shots: usize,
    /// Base seed; circuit `i` of a batch is sampled with `seed + i`.
    pub seed: u64,
}

/// Statevector simulator with optional shot sampling.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    shots: Option<ShotConfig>,
}

impl Simulator {
    /// Creates an exact (noiseless, shot-free) simulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator that estimates expectation values from `shots`
    /// samples drawn with a PRNG seeded by `seed`.
    ///
    /// # Errors
    /// `InvalidShotCount` if `shots == 0`.
    pub fn with_shots(shots: usize, seed: u64) -> Result<Self, FunctionalError> {
        check_shots(shots)?;
        Ok(Self { shots: Some(ShotConfig { shots, seed }) })
    }

    /// The active sampling configuration, `None` when exact.
    pub fn shot_config(&self) -> Option<ShotConfig> {
        self.shots
    }

    /// Resolves a circuit to its exact amplitude vector.
    ///
    /// # Errors
    /// * `InvalidQubitCount` for zero-width or oversized registers.
    /// * Any error raised while applying an operation.
    pub fn statevector(&self, circuit: &Circuit) -> Result<AmplitudeState, FunctionalError> {
        let mut engine = StatevectorEngine::init(circuit.num_qubits())?;
        for op in circuit.operations() {
            engine.apply_operation(op)?;
        }
        trace!(num_qubits = circuit.num_qubits(), ops = circuit.len(), "resolved statevector");
        Ok(engine.into_state())
    }

    /// Draws `shots` computational basis outcomes from the circuit's final state.
    ///
    /// # Errors
    /// `InvalidShotCount` if `shots == 0`; `Incoherence` for an unsampleable state.
    pub fn sample(&self, circuit: &Circuit, shots: usize, seed: u64) -> Result<SampleCounts, FunctionalError> {
        check_shots(shots)?;
        let state = self.statevector(circuit)?;
        let probabilities = state.probabilities();
        let total: f64 = probabilities.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(FunctionalError::Incoherence {
                message: format!("cannot sample from a state with total probability {}", total),
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = SampleCounts::new(state.num_qubits());
        for _ in 0..shots {
            let p_sample: f64 = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            // Fall back to the last non-zero outcome if rounding leaves p_sample uncovered
            let mut chosen = probabilities.iter().rposition(|p| *p > 0.0).unwrap_or(0);
            for (k, p) in probabilities.iter().enumerate() {
                cumulative += p;
                if p_sample < cumulative {
                    chosen = k;
                    break;
                }
            }
            counts.record(chosen);
        }
        Ok(counts)
    }

    /// Expectation value of `observable` on the circuit's output state.
    ///
    /// Exact simulators return `<psi|O|psi>` (complex, with a negligible
    /// imaginary part). Shot simulators return the frequency-weighted
    /// diagonal, sampled with the configured seed.
    pub fn expectation(&self, circuit: &Circuit, observable: &Observable) -> Result<Complex<f64>, FunctionalError> {
        self.expectation_with_seed_offset(circuit, observable, 0)
    }

    fn expectation_with_seed_offset(
        &self,
        circuit: &Circuit,
        observable: &Observable,
        offset: u64,
    ) -> Result<Complex<f64>, FunctionalError> {
        if observable.num_qubits() != circuit.num_qubits() {
            return Err(FunctionalError::LengthMismatch {
                context: "observable width vs circuit qubits".to_string(),
                expected: circuit.num_qubits(),
                actual: observable.num_qubits(),
            });
        }
        match self.shots {
            None => observable.expectation(&self.statevector(circuit)?),
            Some(cfg) => {
                let counts = self.sample(circuit, cfg.shots, cfg.seed.wrapping_add(offset))?;
                let value = observable.expectation_from_probabilities(&counts.frequencies())?;
                Ok(Complex::new(value, 0.0))
            }
        }
    }

    /// Runs every basis-change circuit after `preparation` and evaluates the
    /// observable at the same index, returning results in that order.
    ///
    /// # Errors
    /// `LengthMismatch` if `circuits` and `observables` differ in length or a
    /// circuit's width differs from the preparation circuit's.
    pub fn estimate(
        &self,
        preparation: &Circuit,
        circuits: &[Circuit],
        observables: &[Observable],
    ) -> Result<Vec<Complex<f64>>, FunctionalError> {
        if circuits.len() != observables.len() {
            return Err(FunctionalError::LengthMismatch {
                context: "circuits vs observables".to_string(),
                expected: observables.len(),
                actual: circuits.len(),
            });
        }
        debug!(
            num_qubits = preparation.num_qubits(),
            terms = circuits.len(),
            shots = ?self.shots.map(|c| c.shots),
            "estimating observable terms"
        );
        circuits
            .iter()
            .zip(observables.iter())
            .enumerate()
            .map(|(i, (circuit, observable))| {
                let composed = preparation.compose(circuit)?;
                self.expectation_with_seed_offset(&composed, observable, i as u64)
            })
            .collect()
    }
}

fn check_shots(shots: usize) -> Result<(), FunctionalError> {
    if shots == 0 {
        return Err(FunctionalError::InvalidShotCount { shots });
    }
    Ok(())
}
