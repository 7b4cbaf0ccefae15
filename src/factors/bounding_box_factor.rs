//! Bounding-box measurement factor.
//!
//! Constrains one SE(3) camera pose and one constrained dual quadric
//! through a detected axis-aligned bounding box: the quadric is projected
//! into the image as a dual conic, the conic's circumscribing box is
//! extracted in closed form, and the residual is the difference between
//! predicted and measured box corners. Jacobians chain the analytic
//! derivatives of every stage; no numerical differencing on the
//! production path.

use crate::core::{DiagonalNoise, Key, Values};
use crate::error::{QuadricError, QuadricResult};
use crate::factors::{Factor, Linearization};
use crate::geometry::camera::{self, Calibration};
use crate::geometry::{AlignedBox2, ConstrainedDualQuadric};
use crate::manifold::SE3;
use nalgebra::{DMatrix, DVector, SMatrix, Vector2, Vector4};

/// Residual dimension: one component per box edge.
const RESIDUAL_DIM: usize = 4;

/// Factor tying a detected bounding box to a (pose, quadric) pair.
///
/// Immutable after construction; all variability comes from the variable
/// values supplied at each evaluation, so instances are freely shared
/// across threads by the owning optimizer.
#[derive(Debug, Clone)]
pub struct BoundingBoxFactor {
    measured: AlignedBox2,
    calibration: Calibration,
    image_dimensions: Vector2<f64>,
    keys: [Key; 2],
    noise: DiagonalNoise,
}

impl BoundingBoxFactor {
    /// Create a factor from a detection.
    ///
    /// # Arguments
    /// * `measured` - Detected box in pixel coordinates
    /// * `calibration` - Camera intrinsics
    /// * `image_dimensions` - Image (width, height) bound used for
    ///   display-side clipping
    /// * `pose_key` - Identifier of the camera pose variable
    /// * `quadric_key` - Identifier of the quadric landmark variable
    /// * `noise` - Noise model the optimizer applies to the residual
    ///
    /// # Errors
    /// [`QuadricError::DimensionMismatch`] unless the noise model is
    /// 4-dimensional. Fails fast so a malformed factor is never added to
    /// an optimization problem.
    pub fn new(
        measured: AlignedBox2,
        calibration: Calibration,
        image_dimensions: Vector2<f64>,
        pose_key: Key,
        quadric_key: Key,
        noise: DiagonalNoise,
    ) -> QuadricResult<Self> {
        if noise.dim() != RESIDUAL_DIM {
            return Err(QuadricError::DimensionMismatch {
                expected: RESIDUAL_DIM,
                actual: noise.dim(),
            });
        }
        Ok(BoundingBoxFactor {
            measured,
            calibration,
            image_dimensions,
            keys: [pose_key, quadric_key],
            noise,
        })
    }

    pub fn measurement(&self) -> &AlignedBox2 {
        &self.measured
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn image_dimensions(&self) -> Vector2<f64> {
        self.image_dimensions
    }

    pub fn pose_key(&self) -> Key {
        self.keys[0]
    }

    pub fn quadric_key(&self) -> Key {
        self.keys[1]
    }

    pub fn noise_model(&self) -> &DiagonalNoise {
        &self.noise
    }

    /// Project the quadric and extract the predicted box (unclipped).
    ///
    /// # Errors
    /// [`QuadricError::InvalidProjection`] or
    /// [`QuadricError::DegenerateConic`] when the prediction does not
    /// exist at this (pose, quadric).
    pub fn predict(
        &self,
        pose: &SE3,
        quadric: &ConstrainedDualQuadric,
    ) -> QuadricResult<AlignedBox2> {
        camera::project_quadric(pose, quadric, &self.calibration)?.bounds()
    }

    /// Raw residual `predicted.vector() - measured.vector()` in
    /// (xmin, ymin, xmax, ymax) order. Weighting by the noise model is the
    /// optimizer's responsibility.
    pub fn evaluate_error(
        &self,
        pose: &SE3,
        quadric: &ConstrainedDualQuadric,
    ) -> QuadricResult<Vector4<f64>> {
        Ok(self.predict(pose, quadric)?.vector() - self.measured.vector())
    }

    /// Residual plus analytic Jacobians with respect to the pose tangent
    /// (4x6) and the quadric tangent (4x9).
    ///
    /// Chain rule through the forward pass:
    /// `∂e/∂δx = ∂b/∂vec(C) · ∂vec(C)/∂δx` and likewise for δq, where the
    /// conic derivatives come from
    /// [`camera::project_quadric_with_jacobians`] and the box derivative
    /// from [`DualConic::bounds_with_jacobian`].
    ///
    /// [`DualConic::bounds_with_jacobian`]: crate::geometry::DualConic::bounds_with_jacobian
    #[allow(clippy::type_complexity)]
    pub fn evaluate_error_with_jacobians(
        &self,
        pose: &SE3,
        quadric: &ConstrainedDualQuadric,
    ) -> QuadricResult<(Vector4<f64>, SMatrix<f64, 4, 6>, SMatrix<f64, 4, 9>)> {
        let (conic, conic_by_pose, conic_by_quadric) =
            camera::project_quadric_with_jacobians(pose, quadric, &self.calibration)?;
        let (predicted, box_by_conic) = conic.bounds_with_jacobian()?;

        let error = predicted.vector() - self.measured.vector();
        let error_by_pose = box_by_conic * conic_by_pose;
        let error_by_quadric = box_by_conic * conic_by_quadric;
        Ok((error, error_by_pose, error_by_quadric))
    }
}

impl Factor for BoundingBoxFactor {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        RESIDUAL_DIM
    }

    fn error(&self, values: &Values) -> QuadricResult<DVector<f64>> {
        let pose = values.pose(self.pose_key())?;
        let quadric = values.quadric(self.quadric_key())?;
        let error = self.evaluate_error(pose, quadric)?;
        Ok(DVector::from_column_slice(error.as_slice()))
    }

    fn linearize(&self, values: &Values) -> QuadricResult<Linearization> {
        let pose = values.pose(self.pose_key())?;
        let quadric = values.quadric(self.quadric_key())?;
        let (error, error_by_pose, error_by_quadric) = self
            .evaluate_error_with_jacobians(pose, quadric)
            .map_err(|error| {
                tracing::debug!(
                    pose_key = self.pose_key(),
                    quadric_key = self.quadric_key(),
                    %error,
                    "bounding-box factor not evaluable at this linearization point"
                );
                error
            })?;

        Ok(Linearization {
            residual: DVector::from_column_slice(error.as_slice()),
            jacobians: vec![
                DMatrix::from_column_slice(4, 6, error_by_pose.as_slice()),
                DMatrix::from_column_slice(4, 9, error_by_quadric.as_slice()),
            ],
        })
    }
}
