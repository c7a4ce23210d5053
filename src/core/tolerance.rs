// src/core/tolerance.rs

use super::constants::functional_constants::DEFAULT_IMAGINARY_TOLERANCE;

/// Numerical tolerances applied when recombining results.
///
/// `Tolerances::default()` uses the crate constants; fields can be
/// overridden with the `with_*` methods. State normalization is checked
/// against `DEFAULT_NORM_TOLERANCE`, or an explicit `check_normalization`
/// override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Largest `|im|` accepted when a complex intermediate is reduced to a real value.
    pub imaginary_residue: f64,
}

impl Tolerances {
    /// Overrides the imaginary residue tolerance.
    pub fn with_imaginary_residue(mut self, tolerance: f64) -> Self {
        self.imaginary_residue = tolerance;
        self
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { imaginary_residue: DEFAULT_IMAGINARY_TOLERANCE }
    }
}
