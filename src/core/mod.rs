// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;
pub mod tolerance;
pub mod constants;

// Re-export public types for convenient access via `matrix_functional::core::TypeName`
pub use error::{FunctionalError, QubitId};
pub use state::AmplitudeState;
pub use tolerance::Tolerances;
pub use constants::functional_constants::{
    DEFAULT_IMAGINARY_TOLERANCE, DEFAULT_NORM_TOLERANCE, MAX_QUBITS,
};
