//! Optimizer-facing plumbing for the quadric-factors library
//!
//! This module contains the pieces an external nonlinear least-squares
//! engine interacts with besides the factors themselves:
//! - Variable storage keyed by opaque identifiers
//! - Noise models for residual weighting

pub mod noise;
pub mod values;

pub use noise::DiagonalNoise;
pub use values::{Key, Values, VariableValue};
