// src/observables/mod.rs

//! Observables kept in factored form: one elementary operator tag per qubit.
//!
//! Factors are stored in tensor order, most significant qubit first, so the
//! factor at position `p` of an `n`-factor observable acts on qubit `n-1-p`.
//! Every elementary factor is diagonal in the computational basis, which lets
//! expectation values be evaluated from outcome probabilities without ever
//! building the `2^n x 2^n` matrix. `to_dense_matrix` is there for backends
//! that insist on one.

use crate::core::constants::functional_constants::MAX_QUBITS;
use crate::core::{AmplitudeState, FunctionalError, QubitId};
use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

/// Elementary single-qubit operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    /// `I`
    Identity,
    /// Pauli `Z`
    Z,
    /// `(I + Z) / 2`, projects onto `|0>`
    ProjectorZero,
    /// `(I - Z) / 2`, projects onto `|1>`
    ProjectorOne,
}

impl Factor {
    /// Diagonal entry of the factor for a qubit holding `bit`.
    pub fn eigenvalue(self, bit: usize) -> f64 {
        match (self, bit & 1) {
            (Factor::Identity, _) => 1.0,
            (Factor::Z, 0) => 1.0,
            (Factor::Z, _) => -1.0,
            (Factor::ProjectorZero, 0) => 1.0,
            (Factor::ProjectorZero, _) => 0.0,
            (Factor::ProjectorOne, 0) => 0.0,
            (Factor::ProjectorOne, _) => 1.0,
        }
    }

    /// Expansion into Pauli labels: `(coefficient, 'I' | 'Z')` pairs.
    pub fn pauli_expansion(self) -> Vec<(f64, char)> {
        match self {
            Factor::Identity => vec![(1.0, 'I')],
            Factor::Z => vec![(1.0, 'Z')],
            Factor::ProjectorZero => vec![(0.5, 'I'), (0.5, 'Z')],
            Factor::ProjectorOne => vec![(0.5, 'I'), (-0.5, 'Z')],
        }
    }

    /// Short label used in diagrams.
    pub fn label(self) -> &'static str {
        match self {
            Factor::Identity => "I",
            Factor::Z => "Z",
            Factor::ProjectorZero => "P0",
            Factor::ProjectorOne => "P1",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A weighted Pauli string, e.g. `0.5 * "IZ"`. Leftmost character is the
/// most significant qubit.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliTerm {
    /// Real weight of the string.
    pub coefficient: f64,
    /// Pauli labels in tensor order.
    pub label: String,
}

/// Tensor product of elementary factors over an `n`-qubit register.
///
/// Only single products are representable. A weighted sum of products such
/// as `P0 ⊗ P1 - P1 ⊗ P1` has no `Observable` form; `pauli_terms` expands one
/// product into a sum, and callers combine sums of products themselves (the
/// functional does this in `post_processing`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Observable {
    factors: Vec<Factor>,
}

impl Observable {
    /// The `n`-fold identity.
    pub fn identity(num_qubits: usize) -> Self {
        Self { factors: vec![Factor::Identity; num_qubits] }
    }

    /// Single-qubit observable.
    pub fn single(factor: Factor) -> Self {
        Self { factors: vec![factor] }
    }

    /// Folds factors left to right with `tensor`, the first factor ending up
    /// on the most significant qubit.
    ///
    /// # Errors
    /// `InvalidQubitCount` if `factors` is empty.
    pub fn product<I>(factors: I) -> Result<Self, FunctionalError>
    where
        I: IntoIterator<Item = Factor>,
    {
        factors
            .into_iter()
            .map(Observable::single)
            .reduce(|acc, next| acc.tensor(&next))
            .ok_or_else(|| FunctionalError::InvalidQubitCount {
                requested: 0,
                message: "an observable needs at least one factor".to_string(),
            })
    }

    /// `self ⊗ other`: `other` occupies the least significant qubits.
    pub fn tensor(&self, other: &Observable) -> Observable {
        let mut factors = Vec::with_capacity(self.factors.len() + other.factors.len());
        factors.extend_from_slice(&self.factors);
        factors.extend_from_slice(&other.factors);
        Observable { factors }
    }

    /// Number of qubits acted upon.
    pub fn num_qubits(&self) -> usize {
        self.factors.len()
    }

    /// Factors in tensor order.
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Factor acting on `qubit`, if it is inside the register.
    pub fn factor_on(&self, qubit: QubitId) -> Option<Factor> {
        let n = self.factors.len();
        if qubit.0 < n { Some(self.factors[n - 1 - qubit.0]) } else { None }
    }

    /// Diagonal of the operator in the computational basis.
    ///
    /// # Errors
    /// `InvalidQubitCount` above the dense simulation limit.
    pub fn diagonal(&self) -> Result<Vec<f64>, FunctionalError> {
        let dim = self.dense_dim()?;
        let n = self.factors.len();
        Ok((0..dim)
            .map(|k| {
                self.factors
                    .iter()
                    .enumerate()
                    .map(|(p, factor)| factor.eigenvalue(k >> (n - 1 - p)))
                    .product::<f64>()
            })
            .collect())
    }

    /// Materializes the full `2^n x 2^n` matrix.
    pub fn to_dense_matrix(&self) -> Result<Vec<Vec<Complex<f64>>>, FunctionalError> {
        let diagonal = self.diagonal()?;
        let dim = diagonal.len();
        let mut matrix = vec![vec![Complex::zero(); dim]; dim];
        for (k, d) in diagonal.into_iter().enumerate() {
            matrix[k][k] = Complex::new(d, 0.0);
        }
        Ok(matrix)
    }

    /// Expands the product into a sum of weighted `I`/`Z` Pauli strings.
    /// Zero-weight strings are not emitted.
    pub fn pauli_terms(&self) -> Vec<PauliTerm> {
        let mut terms = vec![PauliTerm { coefficient: 1.0, label: String::new() }];
        for factor in &self.factors {
            let expansion = factor.pauli_expansion();
            terms = terms
                .iter()
                .flat_map(|term| {
                    expansion.iter().map(move |(coefficient, label)| {
                        let mut next = term.label.clone();
                        next.push(*label);
                        PauliTerm { coefficient: term.coefficient * coefficient, label: next }
                    })
                })
                .collect();
        }
        terms.retain(|t| t.coefficient != 0.0);
        terms
    }

    /// `<psi|O|psi>` for a state on the same register.
    ///
    /// # Errors
    /// `LengthMismatch` if the state's qubit count differs from the observable's.
    pub fn expectation(&self, state: &AmplitudeState) -> Result<Complex<f64>, FunctionalError> {
        self.check_width(state.num_qubits())?;
        let diagonal = self.diagonal()?;
        Ok(state
            .vector()
            .iter()
            .zip(diagonal.iter())
            .fold(Complex::zero(), |acc, (a, d)| acc + a.conj() * *a * *d))
    }

    /// Expectation value computed from outcome probabilities (or frequencies).
    pub fn expectation_from_probabilities(&self, probabilities: &[f64]) -> Result<f64, FunctionalError> {
        let diagonal = self.diagonal()?;
        if probabilities.len() != diagonal.len() {
            return Err(FunctionalError::LengthMismatch {
                context: "outcome probabilities".to_string(),
                expected: diagonal.len(),
                actual: probabilities.len(),
            });
        }
        Ok(probabilities.iter().zip(diagonal.iter()).map(|(p, d)| p * d).sum())
    }

    /// Returns `true` when every factor is the identity.
    pub fn is_identity(&self) -> bool {
        self.factors.iter().all(|f| *f == Factor::Identity)
    }

    fn check_width(&self, num_qubits: usize) -> Result<(), FunctionalError> {
        if num_qubits != self.factors.len() {
            return Err(FunctionalError::LengthMismatch {
                context: "observable width vs state qubits".to_string(),
                expected: self.factors.len(),
                actual: num_qubits,
            });
        }
        Ok(())
    }

    fn dense_dim(&self) -> Result<usize, FunctionalError> {
        let n = self.factors.len();
        if n > MAX_QUBITS {
            return Err(FunctionalError::InvalidQubitCount {
                requested: n,
                message: format!("dense evaluation is limited to {} qubits", MAX_QUBITS),
            });
        }
        Ok(1usize << n)
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, factor) in self.factors.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { " ⊗ " } else { "" }, factor)?;
        }
        Ok(())
    }
}
