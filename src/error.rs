//! Error types for the quadric-factors library
//!
//! This module provides the main error and result types used throughout the
//! library. All errors use the `thiserror` crate for automatic trait
//! implementations.
//!
//! Construction-time errors ([`QuadricError::InvalidRadii`],
//! [`QuadricError::InvalidCalibration`], [`QuadricError::InvalidNoiseModel`],
//! [`QuadricError::DimensionMismatch`]) abort the creation of the offending
//! object. Evaluation-time errors ([`QuadricError::InvalidProjection`],
//! [`QuadricError::DegenerateConic`], [`QuadricError::UnknownVariable`]) mark
//! a factor as not evaluable at the current linearization point; the owning
//! optimizer decides whether to skip the factor or saturate its residual.

use thiserror::Error;

/// Main result type used throughout the quadric-factors library
pub type QuadricResult<T> = Result<T, QuadricError>;

/// Main error type for the quadric-factors library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadricError {
    /// Quadric radii must be strictly positive and finite
    #[error("invalid quadric radii {radii:?}: all radii must be strictly positive")]
    InvalidRadii {
        /// The rejected radii values
        radii: [f64; 3],
    },

    /// Calibration parameters are malformed (non-positive focal length, non-finite entries)
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    /// Noise model parameters are malformed (non-positive or non-finite sigmas)
    #[error("invalid noise model: {0}")]
    InvalidNoiseModel(String),

    /// A vector or noise model does not match the expected dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension required by the consuming operation
        expected: usize,
        /// Dimension actually supplied
        actual: usize,
    },

    /// The quadric is not strictly in front of the camera
    #[error("quadric is not in front of the camera (centroid depth {depth})")]
    InvalidProjection {
        /// Centroid depth in the camera frame
        depth: f64,
    },

    /// The projected dual conic has no bounded real box extraction
    #[error("degenerate dual conic: {0}")]
    DegenerateConic(String),

    /// A variable lookup failed (missing key or mismatched variable type)
    #[error("unknown or mistyped variable for key {0}")]
    UnknownVariable(u64),
}

impl QuadricError {
    /// Whether this error marks a factor as not evaluable at the current
    /// linearization point, as opposed to a construction-time failure.
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            QuadricError::InvalidProjection { .. }
                | QuadricError::DegenerateConic(_)
                | QuadricError::UnknownVariable(_)
        )
    }
}
