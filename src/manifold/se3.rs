//! SE(3) - Special Euclidean Group in 3D
//!
//! Rigid body transformations in 3D space (rotation + translation),
//! represented as a combination of an SO(3) rotation and a Vector3
//! translation. Tangent elements are ordered [rho(3), theta(3)]: the
//! translational component first, the rotational component second.
//!
//! The implementation follows the [manif](https://github.com/artivis/manif)
//! C++ library conventions.

use crate::manifold::{LieGroup, SO3};
use nalgebra::{Isometry3, Matrix4, Translation3, UnitQuaternion, Vector3, Vector6};
use std::fmt;

/// SE(3) group element representing a rigid body transformation in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SE3 {
    /// Rotation part as SO(3) element
    rotation: SO3,
    /// Translation part as Vector3
    translation: Vector3<f64>,
}

impl fmt::Display for SE3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translation;
        let q = self.rotation.quaternion();
        write!(
            f,
            "SE3(translation: [{:.4}, {:.4}, {:.4}], rotation: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            t.x, t.y, t.z, q.w, q.i, q.j, q.k
        )
    }
}

impl SE3 {
    /// Create a new SE3 element from translation and rotation.
    pub fn new(translation: Vector3<f64>, rotation: SO3) -> Self {
        SE3 {
            rotation,
            translation,
        }
    }

    /// Create SE3 from translation components and a unit quaternion.
    pub fn from_translation_quaternion(
        x: f64,
        y: f64,
        z: f64,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        SE3::new(Vector3::new(x, y, z), SO3::new(rotation))
    }

    /// Get the translation part as a Vector3.
    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    /// Get the rotation part as SO3.
    pub fn rotation(&self) -> SO3 {
        self.rotation.clone()
    }

    /// Get as an Isometry3 (convenience method).
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.translation),
            self.rotation.quaternion(),
        )
    }

    /// Get the transformation matrix (4x4 homogeneous matrix).
    pub fn matrix(&self) -> Matrix4<f64> {
        self.isometry().to_homogeneous()
    }

    /// Transform a point: R * p + t.
    pub fn act(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.act(point) + self.translation
    }

    /// Hat operator: [τ]^ ∈ se(3), the 4x4 Lie algebra matrix of a tangent
    /// vector τ = [rho, theta].
    ///
    /// [τ]^ = [ [θ]ₓ ρ ]
    ///        [  0   0 ]
    pub fn hat(tangent: &Vector6<f64>) -> Matrix4<f64> {
        let rho = tangent.fixed_rows::<3>(0);
        let theta = Vector3::new(tangent[3], tangent[4], tangent[5]);
        let mut algebra = Matrix4::zeros();
        algebra
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&SO3::hat(&theta));
        algebra.fixed_view_mut::<3, 1>(0, 3).copy_from(&rho);
        algebra
    }
}

impl LieGroup for SE3 {
    type Tangent = Vector6<f64>;

    const DOF: usize = 6;

    fn identity() -> Self {
        SE3 {
            rotation: SO3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Inverse: M⁻¹ = [Rᵀ -Rᵀt; 0 1].
    fn inverse(&self) -> Self {
        let rotation_inv = self.rotation.inverse();
        let translation_inv = -rotation_inv.act(&self.translation);
        SE3 {
            rotation: rotation_inv,
            translation: translation_inv,
        }
    }

    /// Composition: Mₐ M_b = [Rₐ R_b, Rₐ t_b + tₐ; 0 1].
    fn compose(&self, other: &Self) -> Self {
        SE3 {
            rotation: self.rotation.compose(&other.rotation),
            translation: self.rotation.act(&other.translation) + self.translation,
        }
    }

    /// Exponential map: Exp([ρ, θ]) = [Exp(θ), V(θ) ρ; 0 1], with V the
    /// left Jacobian of SO(3).
    fn exp(tangent: &Self::Tangent) -> Self {
        let rho = Vector3::new(tangent[0], tangent[1], tangent[2]);
        let theta = Vector3::new(tangent[3], tangent[4], tangent[5]);
        SE3 {
            rotation: SO3::exp(&theta),
            translation: SO3::left_jacobian(&theta) * rho,
        }
    }

    /// Logarithmic map: Log(M) = [V⁻¹(θ) t, Log(R)].
    fn log(&self) -> Self::Tangent {
        let theta = self.rotation.log();
        let rho = SO3::left_jacobian_inv(&theta) * self.translation;
        let mut tangent = Vector6::zeros();
        tangent.fixed_rows_mut::<3>(0).copy_from(&rho);
        tangent.fixed_rows_mut::<3>(3).copy_from(&theta);
        tangent
    }

    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();

        let translation = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );

        SE3 {
            rotation: SO3::random(),
            translation,
        }
    }
}
