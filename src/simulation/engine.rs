// src/simulation/engine.rs
use crate::core::constants::functional_constants::MAX_QUBITS;
use crate::core::{AmplitudeState, FunctionalError, QubitId};
use crate::operations::Operation;
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::FRAC_1_SQRT_2;

/// Dense statevector engine. Qubit `q` is bit `q` of the amplitude index.
/// (Internal visibility)
pub(crate) struct StatevectorEngine {
    state: AmplitudeState,
    num_qubits: usize,
}

impl StatevectorEngine {
    /// Starts the register in `|0...0>`.
    pub(crate) fn init(num_qubits: usize) -> Result<Self, FunctionalError> {
        if num_qubits == 0 {
            return Err(FunctionalError::InvalidQubitCount {
                requested: 0,
                message: "cannot simulate a zero-qubit register".to_string(),
            });
        }
        if num_qubits > MAX_QUBITS {
            return Err(FunctionalError::InvalidQubitCount {
                requested: num_qubits,
                message: format!("statevector simulation is limited to {} qubits", MAX_QUBITS),
            });
        }
        Ok(Self { state: AmplitudeState::zero(num_qubits), num_qubits })
    }

    pub(crate) fn into_state(self) -> AmplitudeState {
        self.state
    }

    /// Applies one operation to the register.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<(), FunctionalError> {
        match op {
            Operation::Hadamard { target } => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                self.apply_single_qubit_gate(*target, &[[h, h], [h, -h]])
            }
            Operation::PauliX { target } => {
                let (o, l) = (Complex::zero(), Complex::new(1.0, 0.0));
                self.apply_single_qubit_gate(*target, &[[o, l], [l, o]])
            }
            Operation::PauliZ { target } => {
                let (o, l) = (Complex::zero(), Complex::new(1.0, 0.0));
                self.apply_single_qubit_gate(*target, &[[l, o], [o, -l]])
            }
            Operation::ControlledNot { control, target } => self.apply_controlled_not(*control, *target),
            Operation::Initialize { amplitudes } => {
                if amplitudes.len() != self.state.dim() {
                    return Err(FunctionalError::LengthMismatch {
                        context: "Initialize amplitudes".to_string(),
                        expected: self.state.dim(),
                        actual: amplitudes.len(),
                    });
                }
                for (slot, value) in self.state.vector_mut().iter_mut().zip(amplitudes.iter()) {
                    *slot = Complex::new(*value, 0.0);
                }
                Ok(())
            }
        }
    }

    fn check_qubit(&self, qubit: QubitId) -> Result<usize, FunctionalError> {
        if qubit.0 < self.num_qubits {
            Ok(qubit.0)
        } else {
            Err(FunctionalError::InvalidOperation {
                message: format!("{} not found in a {}-qubit register", qubit, self.num_qubits),
            })
        }
    }

    /// Applies a 2x2 matrix to one qubit.
    fn apply_single_qubit_gate(&mut self, target: QubitId, matrix: &[[Complex<f64>; 2]; 2]) -> Result<(), FunctionalError> {
        let k = self.check_qubit(target)?;
        let k_mask = 1usize << k;
        let lower_mask = k_mask - 1;
        let upper_mask = !lower_mask;
        let dim = self.state.dim();
        let vector = self.state.vector_mut();

        // Pairs of basis states differing only at bit k
        for i in 0..dim / 2 {
            let i0 = ((i & upper_mask) << 1) | (i & lower_mask);
            let i1 = i0 | k_mask;
            let psi_0 = vector[i0];
            let psi_1 = vector[i1];
            vector[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            vector[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
        Ok(())
    }

    fn apply_controlled_not(&mut self, control: QubitId, target: QubitId) -> Result<(), FunctionalError> {
        let c = self.check_qubit(control)?;
        let t = self.check_qubit(target)?;
        if c == t {
            return Err(FunctionalError::InvalidOperation {
                message: "Control and target qubits cannot be the same for controlled operation".to_string(),
            });
        }
        let (c_mask, t_mask) = (1usize << c, 1usize << t);
        let dim = self.state.dim();
        let vector = self.state.vector_mut();
        for k in 0..dim {
            // Visit each swapped pair once, from its target=0 member
            if k & c_mask != 0 && k & t_mask == 0 {
                vector.swap(k, k | t_mask);
            }
        }
        Ok(())
    }
}
