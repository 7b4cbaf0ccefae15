//! Camera calibration and quadric projection.
//!
//! A quadric in dual form projects linearly: `C* = P Q* Pᵀ` with
//! `P = K [I|0] X⁻¹` the 3x4 projection operator built from the intrinsic
//! matrix K and the camera pose X. This module owns that operator, the
//! projection itself, and its analytic derivatives with respect to the
//! pose and quadric tangents.

use crate::error::{QuadricError, QuadricResult};
use crate::geometry::{ConstrainedDualQuadric, DualConic};
use crate::manifold::{LieGroup, SE3};
use nalgebra::{Matrix3, Matrix3x4, SMatrix, SVector, Vector6};

/// Minimum centroid depth (camera frame) for a projection to be valid.
const MIN_DEPTH: f64 = 1e-8;

/// Intrinsic calibration of a pinhole camera: focal lengths, skew and
/// principal point, matching the classic five-parameter K matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    fx: f64,
    fy: f64,
    skew: f64,
    cx: f64,
    cy: f64,
}

impl Calibration {
    /// Create a calibration (fx, fy, skew, cx, cy).
    ///
    /// # Errors
    /// [`QuadricError::InvalidCalibration`] for non-positive focal lengths
    /// or non-finite parameters.
    pub fn new(fx: f64, fy: f64, skew: f64, cx: f64, cy: f64) -> QuadricResult<Self> {
        if !(fx.is_finite() && fy.is_finite() && skew.is_finite() && cx.is_finite() && cy.is_finite())
        {
            return Err(QuadricError::InvalidCalibration(
                "parameters must be finite".into(),
            ));
        }
        if fx <= 0.0 || fy <= 0.0 {
            return Err(QuadricError::InvalidCalibration(format!(
                "focal lengths must be positive (got fx={fx}, fy={fy})"
            )));
        }
        Ok(Calibration {
            fx,
            fy,
            skew,
            cx,
            cy,
        })
    }

    /// The 3x3 intrinsic matrix K.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, self.skew, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    pub fn fx(&self) -> f64 {
        self.fx
    }

    pub fn fy(&self) -> f64 {
        self.fy
    }

    pub fn skew(&self) -> f64 {
        self.skew
    }

    pub fn cx(&self) -> f64 {
        self.cx
    }

    pub fn cy(&self) -> f64 {
        self.cy
    }
}

/// The 3x4 projection operator `P = K [I|0] X⁻¹` mapping world
/// homogeneous coordinates to image coordinates.
pub fn projection_matrix(pose: &SE3, calibration: &Calibration) -> Matrix3x4<f64> {
    let extrinsic = pose.inverse().matrix();
    calibration.matrix() * extrinsic.fixed_view::<3, 4>(0, 0)
}

/// Project a quadric into a dual conic: `C* = P Q* Pᵀ`, scaled to unit
/// Frobenius norm.
///
/// The normalization keeps the conic entries O(1) for the bounds
/// extraction; the extracted box is invariant to the choice.
///
/// # Errors
/// [`QuadricError::InvalidProjection`] unless the quadric centroid has
/// strictly positive depth in the camera frame;
/// [`QuadricError::DegenerateConic`] if the projected conic vanishes.
pub fn project_quadric(
    pose: &SE3,
    quadric: &ConstrainedDualQuadric,
    calibration: &Calibration,
) -> QuadricResult<DualConic> {
    let (conic, _) = project_raw(pose, quadric, calibration)?;
    Ok(conic)
}

/// Project a quadric into a dual conic together with the derivatives of
/// the (normalized) conic entries: ∂vec(C)/∂δx (9x6, pose tangent) and
/// ∂vec(C)/∂δq (9x9, quadric tangent).
///
/// Derivatives are assembled per tangent direction from the matrices of
/// the forward pass:
/// - pose: `∂P/∂δᵢ = -K [I|0] Ĝᵢ X⁻¹` (right perturbation `X Exp(δ)`),
///   so `∂C/∂δᵢ = M + Mᵀ` with `M = ∂P/∂δᵢ Q* Pᵀ`;
/// - quadric: `∂C/∂δⱼ = P (∂Q*/∂δⱼ) Pᵀ` with ∂Q*/∂δⱼ from
///   [`ConstrainedDualQuadric::tangent_jacobians`].
///
/// Both blocks are mapped through the Frobenius-normalization derivative
/// `(I - n nᵀ)/f`, n = vec(C)/f, so they are consistent with the conic
/// this function returns.
#[allow(clippy::type_complexity)]
pub fn project_quadric_with_jacobians(
    pose: &SE3,
    quadric: &ConstrainedDualQuadric,
    calibration: &Calibration,
) -> QuadricResult<(DualConic, SMatrix<f64, 9, 6>, SMatrix<f64, 9, 9>)> {
    let (conic, raw) = project_raw(pose, quadric, calibration)?;

    let projection = projection_matrix(pose, calibration);
    let extrinsic = pose.inverse().matrix();
    let intrinsic = calibration.matrix();
    let dual = quadric.dual_matrix();

    let mut conic_by_pose = SMatrix::<f64, 9, 6>::zeros();
    for i in 0..6 {
        let mut direction = Vector6::zeros();
        direction[i] = 1.0;
        let generator = SE3::hat(&direction) * extrinsic;
        let projection_derivative = -intrinsic * generator.fixed_view::<3, 4>(0, 0);
        let half = projection_derivative * dual * projection.transpose();
        conic_by_pose.set_column(i, &vectorize(&(half + half.transpose())));
    }

    let mut conic_by_quadric = SMatrix::<f64, 9, 9>::zeros();
    for (j, dual_derivative) in quadric.tangent_jacobians().iter().enumerate() {
        let derivative = projection * dual_derivative * projection.transpose();
        conic_by_quadric.set_column(j, &vectorize(&derivative));
    }

    // fold in the Frobenius-normalization derivative
    let norm = raw.norm();
    let unit = vectorize(&(raw / norm));
    apply_normalization_derivative(&mut conic_by_pose, &unit, norm);
    apply_normalization_derivative(&mut conic_by_quadric, &unit, norm);

    Ok((conic, conic_by_pose, conic_by_quadric))
}

/// Forward projection: depth check, raw conic, normalized conic.
fn project_raw(
    pose: &SE3,
    quadric: &ConstrainedDualQuadric,
    calibration: &Calibration,
) -> QuadricResult<(DualConic, Matrix3<f64>)> {
    let depth = pose.inverse().act(&quadric.centroid()).z;
    if depth <= MIN_DEPTH {
        return Err(QuadricError::InvalidProjection { depth });
    }

    let projection = projection_matrix(pose, calibration);
    let raw = projection * quadric.dual_matrix() * projection.transpose();
    let norm = raw.norm();
    if !norm.is_finite() || norm <= f64::MIN_POSITIVE {
        return Err(QuadricError::DegenerateConic(
            "projected conic vanishes".into(),
        ));
    }
    Ok((DualConic::new(raw / norm), raw))
}

/// Map raw-conic derivative columns through the derivative of
/// `C ↦ C / ‖C‖_F`, which is `(I - n nᵀ)/f` with n = vec(C)/f.
fn apply_normalization_derivative<const COLS: usize>(
    jacobian: &mut SMatrix<f64, 9, COLS>,
    unit: &SVector<f64, 9>,
    norm: f64,
) {
    for i in 0..COLS {
        let column = jacobian.column(i).into_owned();
        jacobian.set_column(i, &((column - unit * unit.dot(&column)) / norm));
    }
}

/// Column-major vectorization of a 3x3 matrix.
fn vectorize(matrix: &Matrix3<f64>) -> SVector<f64, 9> {
    SVector::<f64, 9>::from_column_slice(matrix.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::SO3;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn centered_sphere(depth: f64, radius: f64) -> ConstrainedDualQuadric {
        ConstrainedDualQuadric::new(
            SE3::new(Vector3::new(0.0, 0.0, depth), SO3::identity()),
            Vector3::new(radius, radius, radius),
        )
        .unwrap()
    }

    #[test]
    fn test_calibration_validation() {
        assert!(Calibration::new(525.0, 525.0, 0.0, 320.0, 240.0).is_ok());
        assert!(matches!(
            Calibration::new(-1.0, 525.0, 0.0, 320.0, 240.0),
            Err(QuadricError::InvalidCalibration(_))
        ));
        assert!(matches!(
            Calibration::new(525.0, f64::NAN, 0.0, 320.0, 240.0),
            Err(QuadricError::InvalidCalibration(_))
        ));
    }

    #[test]
    fn test_projection_matrix_identity_pose() {
        let calibration = Calibration::new(100.0, 110.0, 1.5, 320.0, 240.0).unwrap();
        let projection = projection_matrix(&SE3::identity(), &calibration);
        let k = calibration.matrix();
        for row in 0..3 {
            for col in 0..3 {
                assert_relative_eq!(projection[(row, col)], k[(row, col)]);
            }
            assert_relative_eq!(projection[(row, 3)], 0.0);
        }
    }

    #[test]
    fn test_projected_sphere_matches_silhouette() {
        // a sphere of radius r at depth d on the optical axis projects to
        // a circle of radius fx * r / sqrt(d² - r²) around the principal point
        let calibration = Calibration::new(100.0, 100.0, 0.0, 320.0, 240.0).unwrap();
        let quadric = centered_sphere(5.0, 1.0);
        let conic = project_quadric(&SE3::identity(), &quadric, &calibration).unwrap();
        let bounds = conic.bounds().unwrap();

        let image_radius = 100.0 / 24.0_f64.sqrt();
        assert_relative_eq!(bounds.xmin(), 320.0 - image_radius, epsilon = 1e-9);
        assert_relative_eq!(bounds.ymin(), 240.0 - image_radius, epsilon = 1e-9);
        assert_relative_eq!(bounds.xmax(), 320.0 + image_radius, epsilon = 1e-9);
        assert_relative_eq!(bounds.ymax(), 240.0 + image_radius, epsilon = 1e-9);
    }

    #[test]
    fn test_projected_conic_is_normalized() {
        let calibration = Calibration::new(525.0, 525.0, 0.0, 320.0, 240.0).unwrap();
        let conic =
            project_quadric(&SE3::identity(), &centered_sphere(6.0, 0.5), &calibration).unwrap();
        assert_relative_eq!(conic.matrix().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quadric_behind_camera_rejected() {
        let calibration = Calibration::new(525.0, 525.0, 0.0, 320.0, 240.0).unwrap();
        let behind = centered_sphere(-5.0, 1.0);
        let result = project_quadric(&SE3::identity(), &behind, &calibration);
        assert!(matches!(
            result,
            Err(QuadricError::InvalidProjection { depth }) if depth < 0.0
        ));
    }

    #[test]
    fn test_camera_inside_quadric_is_degenerate() {
        // centroid in front, but the camera sits inside the ellipsoid:
        // no real silhouette
        let calibration = Calibration::new(525.0, 525.0, 0.0, 320.0, 240.0).unwrap();
        let surrounding = centered_sphere(1.0, 5.0);
        let conic = project_quadric(&SE3::identity(), &surrounding, &calibration).unwrap();
        assert!(matches!(
            conic.bounds(),
            Err(QuadricError::DegenerateConic(_))
        ));
    }

    #[test]
    fn test_conic_jacobians_match_finite_differences() {
        let calibration = Calibration::new(525.0, 525.0, 0.0, 320.0, 240.0).unwrap();
        let pose = SE3::exp(&Vector6::new(0.1, -0.2, 0.3, 0.05, -0.1, 0.15));
        let quadric = ConstrainedDualQuadric::new(
            pose.compose(&SE3::exp(&Vector6::new(0.5, -0.4, 6.0, 0.3, 0.2, -0.1))),
            Vector3::new(0.9, 1.4, 0.7),
        )
        .unwrap();

        let (_, conic_by_pose, conic_by_quadric) =
            project_quadric_with_jacobians(&pose, &quadric, &calibration).unwrap();

        let step = 1e-6;
        let conic_vector = |pose: &SE3, quadric: &ConstrainedDualQuadric| {
            let conic = project_quadric(pose, quadric, &calibration).unwrap();
            vectorize(conic.matrix())
        };

        for i in 0..6 {
            let mut direction = Vector6::zeros();
            direction[i] = step;
            let plus = conic_vector(&pose.retract(&direction), &quadric);
            let minus = conic_vector(&pose.retract(&(-direction)), &quadric);
            let numerical = (plus - minus) / (2.0 * step);
            for row in 0..9 {
                assert_relative_eq!(
                    conic_by_pose[(row, i)],
                    numerical[row],
                    epsilon = 1e-7,
                    max_relative = 1e-4
                );
            }
        }

        for j in 0..9 {
            let mut direction = crate::geometry::Vector9::zeros();
            direction[j] = step;
            let plus = conic_vector(&pose, &quadric.retract(&direction).unwrap());
            let minus = conic_vector(&pose, &quadric.retract(&(-direction)).unwrap());
            let numerical = (plus - minus) / (2.0 * step);
            for row in 0..9 {
                assert_relative_eq!(
                    conic_by_quadric[(row, j)],
                    numerical[row],
                    epsilon = 1e-7,
                    max_relative = 1e-4
                );
            }
        }
    }
}
