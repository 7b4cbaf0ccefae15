//! Diagonal Gaussian noise models.
//!
//! A factor emits a raw residual; the optimizer whitens it with the
//! factor's noise model when assembling the normal equations. Only the
//! diagonal (per-component sigma) model is provided, matching what
//! bounding-box detections supply in practice.

use crate::error::{QuadricError, QuadricResult};
use nalgebra::DVector;

/// Diagonal Gaussian noise model parameterized by per-component standard
/// deviations.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalNoise {
    sigmas: DVector<f64>,
}

impl DiagonalNoise {
    /// Create a noise model from per-component sigmas.
    ///
    /// # Errors
    /// [`QuadricError::InvalidNoiseModel`] if the vector is empty or any
    /// sigma is not strictly positive and finite.
    pub fn from_sigmas(sigmas: DVector<f64>) -> QuadricResult<Self> {
        if sigmas.is_empty() {
            return Err(QuadricError::InvalidNoiseModel("no sigmas given".into()));
        }
        if sigmas.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(QuadricError::InvalidNoiseModel(
                "sigmas must be strictly positive and finite".into(),
            ));
        }
        Ok(DiagonalNoise { sigmas })
    }

    /// An isotropic model with the given sigma on every component.
    pub fn isotropic(dim: usize, sigma: f64) -> QuadricResult<Self> {
        Self::from_sigmas(DVector::from_element(dim, sigma))
    }

    /// Residual dimension this model weights.
    pub fn dim(&self) -> usize {
        self.sigmas.len()
    }

    /// The per-component standard deviations.
    pub fn sigmas(&self) -> &DVector<f64> {
        &self.sigmas
    }

    /// Scale a raw residual into whitened (unit-variance) coordinates.
    ///
    /// # Errors
    /// [`QuadricError::DimensionMismatch`] if the residual dimension does
    /// not match the model.
    pub fn whiten(&self, residual: &DVector<f64>) -> QuadricResult<DVector<f64>> {
        if residual.len() != self.dim() {
            return Err(QuadricError::DimensionMismatch {
                expected: self.dim(),
                actual: residual.len(),
            });
        }
        Ok(residual.component_div(&self.sigmas))
    }
}
