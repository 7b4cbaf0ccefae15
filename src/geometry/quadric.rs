//! Constrained dual quadric: the object landmark representation.
//!
//! A quadric surface in dual (tangent-plane) form is a symmetric 4x4
//! matrix with 10 independent entries, but only a 9-dimensional subset of
//! that space corresponds to bounded ellipsoids. This module keeps every
//! quadric on that subset by construction: the state is a rigid pose plus
//! three strictly positive radii, and all updates go through a manifold
//! retraction that revalidates the radii.

use crate::error::{QuadricError, QuadricResult};
use crate::manifold::{LieGroup, SE3};
use nalgebra::{Matrix4, SVector, Vector3, Vector4, Vector6};

/// 9-dimensional tangent vector of a constrained dual quadric:
/// [rho(3), theta(3), radii(3)].
pub type Vector9 = SVector<f64, 9>;

/// A bounded ellipsoidal quadric in minimal 9-parameter form.
///
/// The dual matrix is `Q* = Z · diag(r1², r2², r3², -1) · Zᵀ` with `Z` the
/// homogeneous matrix of the pose. Immutable once constructed; updates
/// produce new instances via [`retract`](ConstrainedDualQuadric::retract).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedDualQuadric {
    pose: SE3,
    radii: Vector3<f64>,
}

impl Default for ConstrainedDualQuadric {
    /// The canonical unit sphere at the origin.
    fn default() -> Self {
        ConstrainedDualQuadric {
            pose: SE3::identity(),
            radii: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl ConstrainedDualQuadric {
    /// Create a quadric from a pose and principal-axis radii.
    ///
    /// # Errors
    /// [`QuadricError::InvalidRadii`] if any radius is not strictly
    /// positive and finite. Radii are never clamped.
    pub fn new(pose: SE3, radii: Vector3<f64>) -> QuadricResult<Self> {
        if radii.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(QuadricError::InvalidRadii {
                radii: [radii.x, radii.y, radii.z],
            });
        }
        Ok(ConstrainedDualQuadric { pose, radii })
    }

    /// The quadric's pose (principal-axis frame in the world).
    pub fn pose(&self) -> &SE3 {
        &self.pose
    }

    /// The strictly positive radii along the principal axes.
    pub fn radii(&self) -> Vector3<f64> {
        self.radii
    }

    /// The quadric's center in world coordinates.
    pub fn centroid(&self) -> Vector3<f64> {
        self.pose.translation()
    }

    /// Apply a 9-dimensional tangent update and return the updated quadric.
    ///
    /// The pose block `delta[0..6]` uses the SE(3) exponential-map
    /// retraction; the radii block `delta[6..9]` is additive.
    ///
    /// # Errors
    /// [`QuadricError::InvalidRadii`] if the update drives any radius out
    /// of the strictly positive range.
    pub fn retract(&self, delta: &Vector9) -> QuadricResult<Self> {
        let pose_delta = Vector6::new(delta[0], delta[1], delta[2], delta[3], delta[4], delta[5]);
        let radii_delta = Vector3::new(delta[6], delta[7], delta[8]);
        Self::new(self.pose.retract(&pose_delta), self.radii + radii_delta)
    }

    /// The tangent vector at `self` pointing to `other`; inverse of
    /// [`retract`](ConstrainedDualQuadric::retract).
    pub fn local_coordinates(&self, other: &Self) -> Vector9 {
        let pose_delta = self.pose.local_coordinates(&other.pose);
        let radii_delta = other.radii - self.radii;
        let mut delta = Vector9::zeros();
        delta.fixed_rows_mut::<6>(0).copy_from(&pose_delta);
        delta.fixed_rows_mut::<3>(6).copy_from(&radii_delta);
        delta
    }

    /// The symmetric 4x4 dual (adjoint) matrix `Q* = Z Q̌ Zᵀ` consumed by
    /// camera projection.
    pub fn dual_matrix(&self) -> Matrix4<f64> {
        let z = self.pose.matrix();
        z * self.shape_matrix() * z.transpose()
    }

    /// The per-direction derivatives ∂Q*/∂δᵢ of the dual matrix with
    /// respect to the 9 tangent directions, evaluated at δ = 0.
    ///
    /// Pose directions perturb `Z` on the right (`Z Exp(δ)`), so
    /// ∂Q*/∂δᵢ = Z Ĝᵢ Q̌ Zᵀ + (Z Ĝᵢ Q̌ Zᵀ)ᵀ with Ĝᵢ the i-th se(3)
    /// generator; radii directions give ∂Q*/∂rⱼ = 2 rⱼ zⱼ zⱼᵀ with zⱼ the
    /// j-th column of Z.
    pub fn tangent_jacobians(&self) -> [Matrix4<f64>; 9] {
        let z = self.pose.matrix();
        let shape = self.shape_matrix();
        let mut jacobians = [Matrix4::zeros(); 9];

        for (i, jacobian) in jacobians.iter_mut().enumerate().take(6) {
            let mut direction = Vector6::zeros();
            direction[i] = 1.0;
            let half = z * SE3::hat(&direction) * shape * z.transpose();
            *jacobian = half + half.transpose();
        }

        for j in 0..3 {
            let column = z.column(j).into_owned();
            jacobians[6 + j] = 2.0 * self.radii[j] * column * column.transpose();
        }

        jacobians
    }

    /// The 3D axis-aligned extent of the ellipsoid as (min, max) corners.
    ///
    /// Tangent-plane extrema of the dual form reduce per world axis to
    /// `tᵢ ± sqrt(Σₖ (rₖ Rᵢₖ)²)`, which is always real for valid radii.
    pub fn bounds3(&self) -> (Vector3<f64>, Vector3<f64>) {
        let rotation = self.pose.rotation().rotation_matrix();
        let center = self.centroid();
        let mut half_extent = Vector3::zeros();
        for axis in 0..3 {
            let mut sum = 0.0;
            for k in 0..3 {
                let term = self.radii[k] * rotation[(axis, k)];
                sum += term * term;
            }
            half_extent[axis] = sum.sqrt();
        }
        (center - half_extent, center + half_extent)
    }

    /// Whether a world point lies inside (or on) the ellipsoid.
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        let local = self.pose.inverse().act(point);
        let normalized = Vector3::new(
            local.x / self.radii.x,
            local.y / self.radii.y,
            local.z / self.radii.z,
        );
        normalized.norm_squared() <= 1.0
    }

    /// Whether the quadric centroid is at or behind the camera's principal
    /// plane (non-positive depth in the camera frame).
    pub fn is_behind(&self, camera_pose: &SE3) -> bool {
        let camera_frame = camera_pose.inverse().act(&self.centroid());
        camera_frame.z <= 0.0
    }

    /// Generate a random valid quadric (useful for testing).
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();

        let pose = SE3::random();
        let radii = Vector3::new(
            rng.random_range(0.1..2.0),
            rng.random_range(0.1..2.0),
            rng.random_range(0.1..2.0),
        );
        ConstrainedDualQuadric { pose, radii }
    }

    /// diag(r1², r2², r3², -1), the dual form in the principal-axis frame.
    fn shape_matrix(&self) -> Matrix4<f64> {
        Matrix4::from_diagonal(&Vector4::new(
            self.radii.x * self.radii.x,
            self.radii.y * self.radii.y,
            self.radii.z * self.radii.z,
            -1.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::SO3;

    fn sample_quadric() -> ConstrainedDualQuadric {
        let pose = SE3::exp(&Vector6::new(0.5, -0.4, 6.0, 0.3, 0.2, -0.1));
        ConstrainedDualQuadric::new(pose, Vector3::new(0.9, 1.4, 0.7)).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_radii() {
        for radii in [
            Vector3::new(0.0, 1.0, 1.0),
            Vector3::new(1.0, -0.5, 1.0),
            Vector3::new(1.0, 1.0, f64::NAN),
        ] {
            let result = ConstrainedDualQuadric::new(SE3::identity(), radii);
            assert!(matches!(result, Err(QuadricError::InvalidRadii { .. })));
        }
    }

    #[test]
    fn test_default_is_unit_sphere() {
        let quadric = ConstrainedDualQuadric::default();
        assert_eq!(quadric.radii(), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(quadric.centroid(), Vector3::zeros());
        let expected = Matrix4::from_diagonal(&Vector4::new(1.0, 1.0, 1.0, -1.0));
        assert!((quadric.dual_matrix() - expected).norm() < 1e-12);
    }

    #[test]
    fn test_dual_matrix_is_symmetric() {
        let q = sample_quadric().dual_matrix();
        assert!((q - q.transpose()).norm() < 1e-10);
    }

    #[test]
    fn test_retract_local_coordinates_roundtrip() {
        let quadric = sample_quadric();
        let delta = Vector9::from_column_slice(&[
            0.01, -0.02, 0.03, 0.005, -0.01, 0.02, 0.03, -0.01, 0.02,
        ]);
        let moved = quadric.retract(&delta).unwrap();
        let recovered = quadric.local_coordinates(&moved);
        assert!((recovered - delta).norm() < 1e-8);
    }

    #[test]
    fn test_local_coordinates_then_retract() {
        let a = sample_quadric();
        let b = a
            .retract(&Vector9::from_column_slice(&[
                0.1, 0.05, -0.08, 0.02, -0.03, 0.06, -0.1, 0.2, 0.05,
            ]))
            .unwrap();
        let rebuilt = a.retract(&a.local_coordinates(&b)).unwrap();
        assert!(b.local_coordinates(&rebuilt).norm() < 1e-8);
    }

    #[test]
    fn test_retract_rejects_radius_collapse() {
        let quadric = ConstrainedDualQuadric::default();
        let mut delta = Vector9::zeros();
        delta[6] = -1.0; // drives r1 to zero
        assert!(matches!(
            quadric.retract(&delta),
            Err(QuadricError::InvalidRadii { .. })
        ));
    }

    #[test]
    fn test_bounds3_identity_pose() {
        let quadric =
            ConstrainedDualQuadric::new(SE3::identity(), Vector3::new(1.0, 2.0, 3.0)).unwrap();
        let (min, max) = quadric.bounds3();
        assert!((min - Vector3::new(-1.0, -2.0, -3.0)).norm() < 1e-12);
        assert!((max - Vector3::new(1.0, 2.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_bounds3_is_finite_and_contains_centroid() {
        for _ in 0..10 {
            let quadric = ConstrainedDualQuadric::random();
            let (min, max) = quadric.bounds3();
            let center = quadric.centroid();
            for axis in 0..3 {
                assert!(min[axis].is_finite() && max[axis].is_finite());
                assert!(min[axis] <= center[axis] && center[axis] <= max[axis]);
            }
        }
    }

    #[test]
    fn test_contains() {
        let quadric = sample_quadric();
        assert!(quadric.contains(&quadric.centroid()));
        let (min, _) = quadric.bounds3();
        let outside = min - Vector3::new(1.0, 1.0, 1.0);
        assert!(!quadric.contains(&outside));
    }

    #[test]
    fn test_is_behind() {
        let ahead = ConstrainedDualQuadric::new(
            SE3::new(Vector3::new(0.0, 0.0, 5.0), SO3::identity()),
            Vector3::new(1.0, 1.0, 1.0),
        )
        .unwrap();
        let camera = SE3::identity();
        assert!(!ahead.is_behind(&camera));

        let behind = ConstrainedDualQuadric::new(
            SE3::new(Vector3::new(0.0, 0.0, -5.0), SO3::identity()),
            Vector3::new(1.0, 1.0, 1.0),
        )
        .unwrap();
        assert!(behind.is_behind(&camera));
    }
}
