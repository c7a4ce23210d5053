// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`matrix_functional::operations::Operation`) on a fixed-width
//! qubit register.
//!
//! A `Circuit` always knows its register width, so the empty circuit on `n`
//! qubits is a meaningful identity and two circuits can be composed
//! qubit-index aligned.

use crate::core::constants::functional_constants::{DEFAULT_NORM_TOLERANCE, MAX_QUBITS};
use crate::core::{FunctionalError, QubitId};
use crate::operations::Operation;
use std::fmt;
use tracing::trace;

/// Ordered sequence of operations applied to an `n`-qubit register.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates the empty (identity) circuit on `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits, operations: Vec::new() }
    }

    /// Appends an operation after checking it against the register.
    ///
    /// # Errors
    /// * `InvalidOperation` if a qubit index is out of range, a controlled gate
    ///   uses the same qubit twice, or `Initialize` is not the first operation.
    /// * `LengthMismatch` / `NonFinite` / `Incoherence` for a bad `Initialize` vector.
    pub fn add_operation(&mut self, op: Operation) -> Result<(), FunctionalError> {
        for qubit in op.involved_qubits() {
            if qubit.0 >= self.num_qubits {
                return Err(FunctionalError::InvalidOperation {
                    message: format!("{} is outside a {}-qubit register", qubit, self.num_qubits),
                });
            }
        }
        match &op {
            Operation::ControlledNot { control, target } if control == target => {
                return Err(FunctionalError::InvalidOperation {
                    message: format!("Control and target cannot both be {}", control),
                });
            }
            Operation::Initialize { amplitudes } => {
                if !self.operations.is_empty() {
                    return Err(FunctionalError::InvalidOperation {
                        message: "Initialize must be the first operation of a circuit".to_string(),
                    });
                }
                check_initialize_vector(amplitudes, self.num_qubits)?;
            }
            _ => {}
        }
        self.operations.push(op);
        Ok(())
    }

    /// Appends multiple operations, stopping at the first invalid one.
    pub fn add_operations<I>(&mut self, ops: I) -> Result<(), FunctionalError>
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op)?;
        }
        Ok(())
    }

    /// Returns a new circuit running `self` followed by `other` on the same qubits.
    ///
    /// # Errors
    /// `LengthMismatch` if the register widths differ.
    pub fn compose(&self, other: &Circuit) -> Result<Circuit, FunctionalError> {
        if self.num_qubits != other.num_qubits {
            return Err(FunctionalError::LengthMismatch {
                context: "composed circuit width".to_string(),
                expected: self.num_qubits,
                actual: other.num_qubits,
            });
        }
        let mut composed = self.clone();
        composed.add_operations(other.operations.iter().cloned())?;
        trace!(num_qubits = self.num_qubits, ops = composed.len(), "composed circuits");
        Ok(composed)
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Returns the ordered operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` for the identity circuit.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn check_initialize_vector(amplitudes: &[f64], num_qubits: usize) -> Result<(), FunctionalError> {
    let dim = 1usize.checked_shl(num_qubits as u32).filter(|_| num_qubits <= MAX_QUBITS).ok_or_else(|| {
        FunctionalError::InvalidQubitCount {
            requested: num_qubits,
            message: format!("dense state loading is limited to {} qubits", MAX_QUBITS),
        }
    })?;
    if amplitudes.len() != dim {
        return Err(FunctionalError::LengthMismatch {
            context: "Initialize amplitudes".to_string(),
            expected: dim,
            actual: amplitudes.len(),
        });
    }
    if amplitudes.iter().any(|a| !a.is_finite()) {
        return Err(FunctionalError::NonFinite { message: "Initialize amplitudes must be finite".to_string() });
    }
    let norm_sq: f64 = amplitudes.iter().map(|a| a * a).sum();
    if (norm_sq - 1.0).abs() > DEFAULT_NORM_TOLERANCE {
        return Err(FunctionalError::Incoherence {
            message: format!("Initialize amplitudes are not normalized. Sum(|a_k|^2) = {}", norm_sq),
        });
    }
    Ok(())
}

/// Builds the exact state-loading circuit for a real vector.
///
/// The vector is normalized before loading. Returns the circuit together
/// with the norm that was divided out; the loaded state is `x / norm`, so
/// post-processing with `scaling = 1 / norm` recovers the functional of `x`.
///
/// # Errors
/// * `LengthMismatch` if the length is not a power of two of at least 2.
/// * `NonFinite` if the vector has a non-finite entry or zero norm.
pub fn state_preparation(values: &[f64]) -> Result<(Circuit, f64), FunctionalError> {
    let dim = values.len();
    if dim < 2 || !dim.is_power_of_two() {
        return Err(FunctionalError::LengthMismatch {
            context: "state preparation vector (power of two)".to_string(),
            expected: dim.max(2).next_power_of_two(),
            actual: dim,
        });
    }
    let num_qubits = dim.trailing_zeros() as usize;
    if num_qubits > MAX_QUBITS {
        return Err(FunctionalError::InvalidQubitCount {
            requested: num_qubits,
            message: format!("dense state loading is limited to {} qubits", MAX_QUBITS),
        });
    }
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if !norm.is_finite() || norm == 0.0 {
        return Err(FunctionalError::NonFinite {
            message: format!("cannot normalize a vector with norm {}", norm),
        });
    }
    let amplitudes = values.iter().map(|v| v / norm).collect();
    let circuit = CircuitBuilder::new(num_qubits)
        .add_op(Operation::Initialize { amplitudes })
        .build()?;
    Ok((circuit, norm))
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Chained construction of a `Circuit`.
///
/// The first invalid operation is remembered and reported by `build`.
pub struct CircuitBuilder {
    circuit: Circuit,
    error: Option<FunctionalError>,
}

impl CircuitBuilder {
    /// Starts an empty circuit on `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self { circuit: Circuit::new(num_qubits), error: None }
    }

    /// Adds a single operation.
    pub fn add_op(mut self, op: Operation) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.circuit.add_operation(op) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Adds multiple operations.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self = self.add_op(op);
        }
        self
    }

    /// Finalizes the circuit.
    ///
    /// # Errors
    /// The first error raised by `add_op`/`add_ops`.
    pub fn build(self) -> Result<Circuit, FunctionalError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.circuit),
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_ops = self.operations.len();
        writeln!(f, "Circuit[{} operations on {} qubits]", num_ops, self.num_qubits)?;
        if self.num_qubits == 0 {
            return Ok(());
        }

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; self.num_qubits];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; self.num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre_dashes), symbol, H_WIRE.to_string().repeat(post_dashes))
            }
        }

        for (t, op) in self.operations.iter().enumerate() {
            match op {
                Operation::Hadamard { target } | Operation::PauliX { target } | Operation::PauliZ { target } => {
                    op_grid[target.0][t] = format_gate(op.symbol());
                }
                Operation::ControlledNot { control, target } => {
                    op_grid[control.0][t] = format_gate("@");
                    op_grid[target.0][t] = format_gate(op.symbol());
                    let r_min = control.0.min(target.0);
                    let r_max = control.0.max(target.0);
                    for row in v_connect.iter_mut().take(r_max).skip(r_min) {
                        row[t] = V_WIRE;
                    }
                }
                Operation::Initialize { .. } => {
                    for row in op_grid.iter_mut() {
                        row[t] = format_gate(op.symbol());
                    }
                    for row in v_connect.iter_mut().take(self.num_qubits - 1) {
                        row[t] = V_WIRE;
                    }
                }
            }
        }

        let labels: Vec<String> = (0..self.num_qubits).map(|q| format!("{}: ", QubitId(q))).collect();
        let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
        for (r, label) in labels.iter().enumerate() {
            writeln!(f, "{:<width$}{}", label, op_grid[r].join(""), width = label_width)?;
            if r + 1 < self.num_qubits {
                write!(f, "{}", " ".repeat(label_width))?;
                for t in 0..num_ops {
                    let pad = GATE_WIDTH - 1;
                    write!(f, "{}{}{}", " ".repeat(pad / 2), v_connect[r][t], " ".repeat(pad - pad / 2))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
