//! Manifold representations for optimization on non-Euclidean spaces.
//!
//! This module provides the Lie groups used by the quadric projection
//! pipeline:
//! - **SO(3)**: rotations in 3D
//! - **SE(3)**: rigid body transformations in 3D
//!
//! Lie group M,° | size | dim | X ∈ M                | Constraint | T_X M   | Exp(T)        | Comp. | Action
//! ------------- | ---- | --- | -------------------- | ---------- | ------- | ------------- | ----- | ------
//! Rotation      | SO(3)| 3   | R                    | RᵀR = I    | θ ∈ R³  | R = exp([θ]ₓ) | R₁R₂  | Rx
//! Rigid motion  | SE(3)| 6   | M = [R t; 0 1]       | RᵀR = I    | τ ∈ R⁶  | Exp([τ]^)     | M₁M₂  | Rx+t
//!
//! SE(3) tangent vectors are ordered `[rho(3), theta(3)]`: translational
//! component first, rotational component second, following the
//! [manif](https://github.com/artivis/manif) convention.
//!
//! Retraction is the right-plus operation `g ⊞ τ = g ∘ Exp(τ)` and local
//! coordinates the right-minus `g₁ ⊟ g₂ = Log(g₂⁻¹ ∘ g₁)`, so tangent
//! updates are expressed in the body frame of the current estimate. These
//! are the primitives an optimizer uses to step on the manifold, and the
//! convention every Jacobian in this crate is differentiated against.

use std::fmt::Debug;

pub mod se3;
pub mod so3;

pub use se3::SE3;
pub use so3::SO3;

/// Core trait for Lie group operations.
///
/// A deliberately small surface: group structure (identity, inverse,
/// composition), the exponential/logarithmic maps, and the derived
/// retract/local-coordinates pair used by optimizers. Jacobians of the
/// measurement pipeline are computed analytically at the evaluation point,
/// so the group operations themselves stay Jacobian-free.
pub trait LieGroup: Clone + Debug + PartialEq + Sized {
    /// The tangent space vector type
    type Tangent: Clone + Debug + PartialEq;

    /// Degrees of freedom - dimension of the tangent space
    const DOF: usize;

    /// Get the identity element of the group.
    fn identity() -> Self;

    /// Compute the inverse of this element: g⁻¹ such that g ∘ g⁻¹ = e.
    fn inverse(&self) -> Self;

    /// Compose this element with another (group multiplication g₁ ∘ g₂).
    fn compose(&self, other: &Self) -> Self;

    /// Exponential map from tangent space to the group: Exp(τ).
    fn exp(tangent: &Self::Tangent) -> Self;

    /// Logarithmic map from the group to tangent space: Log(g).
    fn log(&self) -> Self::Tangent;

    /// Right-plus retraction: g ⊞ τ = g ∘ Exp(τ).
    fn retract(&self, tangent: &Self::Tangent) -> Self {
        self.compose(&Self::exp(tangent))
    }

    /// Right-minus local coordinates: Log(self⁻¹ ∘ other), the tangent
    /// vector at `self` pointing to `other`. Inverse of [`retract`]:
    /// `g.retract(&g.local_coordinates(&h)) == h`.
    ///
    /// [`retract`]: LieGroup::retract
    fn local_coordinates(&self, other: &Self) -> Self::Tangent {
        self.inverse().compose(other).log()
    }

    /// Generate a random element (useful for testing and initialization).
    fn random() -> Self;
}
