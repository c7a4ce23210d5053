// src/operations/mod.rs

//! Gate set used by the basis-change circuits and by state loading.
//!
//! The basis-change circuits only need controlled-NOT entanglers and a
//! Hadamard rotation. `PauliX`/`PauliZ` are kept for preparing basis states
//! in tests, and `Initialize` stands in for an external state-preparation
//! routine by loading an exact amplitude vector.

use crate::core::QubitId;

/// A single operation acting on a qubit register.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Hadamard basis rotation, mapping the Z basis onto the X basis.
    Hadamard {
        /// The rotated qubit.
        target: QubitId,
    },

    /// Bit flip.
    PauliX {
        /// The flipped qubit.
        target: QubitId,
    },

    /// Phase flip on `|1>`.
    PauliZ {
        /// The qubit whose `|1>` component is negated.
        target: QubitId,
    },

    /// Controlled-NOT: flips `target` when `control` is `|1>`.
    ControlledNot {
        /// The qubit whose value gates the flip.
        control: QubitId,
        /// The qubit that is flipped.
        target: QubitId,
    },

    /// Loads an exact real amplitude vector into the whole register.
    ///
    /// Only valid as the first operation of a circuit: it replaces the
    /// `|0...0>` starting state.
    Initialize {
        /// Normalized amplitudes, length `2^n`.
        amplitudes: Vec<f64>,
    },
}

impl Operation {
    /// Returns the qubits named in the operation's parameters.
    /// `Initialize` acts on the whole register and names none.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Hadamard { target }
            | Operation::PauliX { target }
            | Operation::PauliZ { target } => vec![*target],
            Operation::ControlledNot { control, target } => vec![*control, *target],
            Operation::Initialize { .. } => Vec::new(),
        }
    }

    /// Short gate symbol used by the circuit diagram.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Hadamard { .. } => "H",
            Operation::PauliX { .. } => "X",
            Operation::PauliZ { .. } => "Z",
            Operation::ControlledNot { .. } => "X",
            Operation::Initialize { .. } => "Init",
        }
    }
}
