//! Factor implementations for quadric-based object mapping
//!
//! A factor is one measurement constraint consumed by a nonlinear
//! optimizer: it binds a subset of variables (by key) and contributes a
//! residual vector plus one Jacobian block per variable. The
//! [`BoundingBoxFactor`] constrains one camera pose and one quadric
//! landmark through a detected bounding box; further measurement types
//! plug in alongside it through the same [`Factor`] trait.

use std::fmt;

use crate::core::{Key, Values};
use crate::error::QuadricResult;
use nalgebra::{DMatrix, DVector};

pub mod bounding_box_factor;

pub use bounding_box_factor::BoundingBoxFactor;

/// Residual and per-variable Jacobian blocks at a linearization point.
#[derive(Debug, Clone)]
pub struct Linearization {
    /// Raw (unwhitened) residual vector
    pub residual: DVector<f64>,
    /// One Jacobian block per connected variable, in key order, each of
    /// shape residual-dim x variable-DOF
    pub jacobians: Vec<DMatrix<f64>>,
}

/// Capability interface for measurement factors.
///
/// Evaluation is a pure function of the variable values supplied through
/// the container; factors hold no mutable state and are safe to evaluate
/// concurrently across threads (`Send + Sync`).
///
/// Evaluation-time failures (quadric behind the camera, degenerate conic,
/// missing variable) surface as structured errors meaning "not evaluable
/// at this linearization point"; the optimizer chooses its fallback
/// policy (skip the factor for this iteration, saturate the residual, or
/// mark the problem ill-conditioned) and must never crash on them.
pub trait Factor: fmt::Debug + Send + Sync {
    /// The keys of all variables connected to this factor.
    fn keys(&self) -> &[Key];

    /// Residual dimension.
    fn dim(&self) -> usize;

    /// Evaluate only the raw residual at the current variable values.
    fn error(&self, values: &Values) -> QuadricResult<DVector<f64>>;

    /// Evaluate the raw residual and per-variable Jacobian blocks.
    fn linearize(&self, values: &Values) -> QuadricResult<Linearization>;
}
