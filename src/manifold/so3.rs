//! SO(3) - Special Orthogonal Group in 3D
//!
//! Rotations in 3D space, represented internally as unit quaternions.
//! Tangent elements are axis-angle vectors θ ∈ R³ with ‖θ‖ the rotation
//! angle in radians.
//!
//! The implementation follows the [manif](https://github.com/artivis/manif)
//! C++ library conventions.

use crate::manifold::LieGroup;
use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};
use std::fmt;

/// SO(3) group element representing a rotation in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SO3 {
    quaternion: UnitQuaternion<f64>,
}

impl fmt::Display for SO3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.quaternion;
        write!(
            f,
            "SO3(w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4})",
            q.w, q.i, q.j, q.k
        )
    }
}

impl SO3 {
    /// Create a new SO3 element from a unit quaternion.
    pub fn new(quaternion: UnitQuaternion<f64>) -> Self {
        SO3 { quaternion }
    }

    /// Create SO3 from quaternion coefficients (x, y, z, w), normalizing.
    pub fn from_quaternion_coeffs(x: f64, y: f64, z: f64, w: f64) -> Self {
        SO3 {
            quaternion: UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z).normalize()),
        }
    }

    /// Get the rotation as a unit quaternion.
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    /// Get the rotation as a 3x3 matrix.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.quaternion.to_rotation_matrix().into_inner()
    }

    /// Rotate a vector: R * v.
    pub fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.quaternion * vector
    }

    /// Hat operator: [θ]ₓ, the skew-symmetric matrix of a tangent vector.
    ///
    /// [θ]ₓ = [0 -θz θy; θz 0 -θx; -θy θx 0]
    pub fn hat(theta: &Vector3<f64>) -> Matrix3<f64> {
        Matrix3::new(
            0.0, -theta.z, theta.y, //
            theta.z, 0.0, -theta.x, //
            -theta.y, theta.x, 0.0,
        )
    }

    /// Left Jacobian of the SO(3) exponential map.
    ///
    /// J_l(θ) = I + (1 - cos θ)/θ² [θ]ₓ + (θ - sin θ)/θ³ [θ]ₓ²
    ///
    /// Also the V(θ) matrix relating the SE(3) translational tangent to
    /// the group translation: t = V(θ) ρ.
    pub fn left_jacobian(theta: &Vector3<f64>) -> Matrix3<f64> {
        let angle_squared = theta.norm_squared();
        let tangent_skew = Self::hat(theta);

        if angle_squared <= f64::EPSILON {
            Matrix3::identity() + 0.5 * tangent_skew
        } else {
            let angle = angle_squared.sqrt();
            Matrix3::identity()
                + (1.0 - angle.cos()) / angle_squared * tangent_skew
                + (angle - angle.sin()) / (angle_squared * angle) * tangent_skew * tangent_skew
        }
    }

    /// Inverse of the left Jacobian of the SO(3) exponential map.
    ///
    /// J_l⁻¹(θ) = I - (1/2) [θ]ₓ + (1/θ² - (1 + cos θ)/(2θ sin θ)) [θ]ₓ²
    pub fn left_jacobian_inv(theta: &Vector3<f64>) -> Matrix3<f64> {
        let angle_squared = theta.norm_squared();
        let tangent_skew = Self::hat(theta);

        if angle_squared <= f64::EPSILON {
            Matrix3::identity() - 0.5 * tangent_skew
        } else {
            let angle = angle_squared.sqrt();
            Matrix3::identity() - 0.5 * tangent_skew
                + (1.0 / angle_squared - (1.0 + angle.cos()) / (2.0 * angle * angle.sin()))
                    * tangent_skew
                    * tangent_skew
        }
    }
}

impl LieGroup for SO3 {
    type Tangent = Vector3<f64>;

    const DOF: usize = 3;

    fn identity() -> Self {
        SO3 {
            quaternion: UnitQuaternion::identity(),
        }
    }

    fn inverse(&self) -> Self {
        SO3 {
            quaternion: self.quaternion.inverse(),
        }
    }

    fn compose(&self, other: &Self) -> Self {
        SO3 {
            quaternion: self.quaternion * other.quaternion,
        }
    }

    /// Exponential map for unit quaternions: q = exp(u θ/2).
    fn exp(tangent: &Self::Tangent) -> Self {
        let theta_squared = tangent.norm_squared();

        let quaternion = if theta_squared > f64::EPSILON {
            UnitQuaternion::from_scaled_axis(*tangent)
        } else {
            // First-order quaternion for vanishing angles
            UnitQuaternion::from_quaternion(Quaternion::new(
                1.0,
                tangent.x / 2.0,
                tangent.y / 2.0,
                tangent.z / 2.0,
            ))
        };

        SO3 { quaternion }
    }

    /// Logarithmic map: θu = Log(q) = (2 / ‖v‖) v arctan(‖v‖, w).
    fn log(&self) -> Self::Tangent {
        let q = self.quaternion.quaternion();
        let sin_angle_squared = q.i * q.i + q.j * q.j + q.k * q.k;

        let log_coeff = if sin_angle_squared > f64::EPSILON {
            let sin_angle = sin_angle_squared.sqrt();
            let cos_angle = q.w;

            // cos_angle < 0 means the quaternion encodes an angle >= pi;
            // flip both arguments to keep the axis-angle principal
            let two_angle = 2.0
                * if cos_angle < 0.0 {
                    f64::atan2(-sin_angle, -cos_angle)
                } else {
                    f64::atan2(sin_angle, cos_angle)
                };

            two_angle / sin_angle
        } else {
            2.0
        };

        Vector3::new(q.i * log_coeff, q.j * log_coeff, q.k * log_coeff)
    }

    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();

        Self::exp(&Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        ))
    }
}
