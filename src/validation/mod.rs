// src/validation/mod.rs

//! Input checks shared by the builders, the combiner and the classical reference.

use crate::core::constants::functional_constants::{DEFAULT_IMAGINARY_TOLERANCE, DEFAULT_NORM_TOLERANCE};
use crate::core::{AmplitudeState, FunctionalError};
use num_complex::Complex;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `AmplitudeState` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `DEFAULT_NORM_TOLERANCE`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(FunctionalError::Incoherence)` if normalization fails.
pub fn check_normalization(state: &AmplitudeState, tolerance: Option<f64>) -> Result<(), FunctionalError> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq = state.norm_sqr();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(FunctionalError::Incoherence {
            message: format!(
                "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Reduces a nominally real complex value to its real part.
///
/// # Returns
/// * `Ok(re)` when `|im|` is within `tolerance` (default `DEFAULT_IMAGINARY_TOLERANCE`).
/// * `Err(FunctionalError::ImaginaryResidue)` otherwise.
pub fn check_real(value: Complex<f64>, tolerance: Option<f64>) -> Result<f64, FunctionalError> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_IMAGINARY_TOLERANCE);
    if !value.re.is_finite() || !value.im.is_finite() {
        return Err(FunctionalError::NonFinite { message: format!("value {} is not finite", value) });
    }
    if value.im.abs() > effective_tolerance {
        return Err(FunctionalError::ImaginaryResidue { imaginary: value.im, tolerance: effective_tolerance });
    }
    Ok(value.re)
}

/// Checks that a register width is usable by the builders: `n >= 1`.
///
/// No upper bound applies here. Builders and the combiner never touch dense
/// `2^n` storage; the dense paths enforce their own limit.
pub fn check_qubit_count(num_qubits: usize) -> Result<(), FunctionalError> {
    if num_qubits == 0 {
        return Err(FunctionalError::InvalidQubitCount {
            requested: 0,
            message: "at least one qubit is required".to_string(),
        });
    }
    Ok(())
}

/// Checks that a result list holds exactly one norm term plus a (zero, one)
/// pair per qubit: `2n + 1` entries.
pub fn check_result_length(len: usize, num_qubits: usize) -> Result<(), FunctionalError> {
    let expected = 2 * num_qubits + 1;
    if len != expected {
        return Err(FunctionalError::LengthMismatch {
            context: "observable results (2n+1)".to_string(),
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Checks that `value` is a finite real number.
pub fn check_finite(name: &str, value: f64) -> Result<(), FunctionalError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FunctionalError::NonFinite { message: format!("{} must be finite, got {}", name, value) })
    }
}

/// Checks that a scaling factor is finite and strictly positive.
pub fn check_scaling(scaling: f64) -> Result<(), FunctionalError> {
    check_finite("scaling", scaling)?;
    if scaling <= 0.0 {
        return Err(FunctionalError::InvalidScaling { scaling });
    }
    Ok(())
}
