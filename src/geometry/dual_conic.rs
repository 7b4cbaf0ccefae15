//! Dual conic: the 2D projection of a dual quadric.
//!
//! A dual conic is a symmetric 3x3 matrix C whose null form describes the
//! envelope of lines tangent to the conic: a line l satisfies lᵀ C l = 0
//! exactly when it touches the conic boundary. Probing with vertical and
//! horizontal lines turns the tangency condition into a quadratic whose
//! two roots are the conic's axis-aligned extrema, which is how the
//! bounding box falls out in closed form.
//!
//! Instances exist only transiently between camera projection and box
//! extraction; they are never persisted.

use crate::error::{QuadricError, QuadricResult};
use crate::geometry::AlignedBox2;
use nalgebra::{Matrix3, SMatrix};

/// Relative tolerance below which the conic is treated as degenerate.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// A 2D projective conic in dual (line-envelope) form.
#[derive(Debug, Clone, PartialEq)]
pub struct DualConic {
    matrix: Matrix3<f64>,
}

impl DualConic {
    /// Wrap a dual-form conic matrix. The dual form is symmetric; the
    /// symmetric part of the input is stored.
    pub fn new(matrix: Matrix3<f64>) -> Self {
        DualConic {
            matrix: 0.5 * (matrix + matrix.transpose()),
        }
    }

    /// The symmetric dual-form matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Whether the conic admits no bounded real box extraction.
    ///
    /// True when any entry is non-finite, the conic vanishes, `c22` is
    /// (relatively) zero, or either axis discriminant is non-positive.
    pub fn is_degenerate(&self) -> bool {
        self.check_bounded().is_err()
    }

    /// Extract the axis-aligned box circumscribing the conic.
    ///
    /// Tangency of the vertical line x = u gives
    /// `c00 - 2 u c02 + u² c22 = 0`, so `u = (c02 ± √(c02² - c00 c22)) / c22`,
    /// and the horizontal analogue for v. The two roots per axis are
    /// ordered by the sign of `c22`. The formula is invariant to positive
    /// rescaling of C, so any normalization convention upstream yields the
    /// same box.
    ///
    /// # Errors
    /// [`QuadricError::DegenerateConic`] when the extraction has no
    /// bounded real solution.
    pub fn bounds(&self) -> QuadricResult<AlignedBox2> {
        let (box2, _) = self.bounds_with_jacobian()?;
        Ok(box2)
    }

    /// Bounds plus the 4x9 derivative of (xmin, ymin, xmax, ymax) with
    /// respect to the column-major vectorization of the conic matrix,
    /// branch-consistent with the root ordering.
    pub fn bounds_with_jacobian(&self) -> QuadricResult<(AlignedBox2, SMatrix<f64, 4, 9>)> {
        let (disc_x, disc_y) = self.check_bounded()?;

        let c = &self.matrix;
        let (c00, c11, c22) = (c[(0, 0)], c[(1, 1)], c[(2, 2)]);
        let (c02, c12) = (c[(0, 2)], c[(1, 2)]);
        let sx = disc_x.sqrt();
        let sy = disc_y.sqrt();

        // roots and their derivatives wrt (c00|c11, c02|c12, c22);
        // sign = +1/-1 selects the branch of the square root
        let root = |sign: f64, diag: f64, s: f64, mixed: f64| {
            let value = (mixed + sign * s) / c22;
            let d_diag = -sign / (2.0 * s);
            let d_mixed = (1.0 + sign * mixed / s) / c22;
            let d_c22 = -sign * diag / (2.0 * s * c22) - value / c22;
            (value, d_diag, d_mixed, d_c22)
        };

        let x_plus = root(1.0, c00, sx, c02);
        let x_minus = root(-1.0, c00, sx, c02);
        let y_plus = root(1.0, c11, sy, c12);
        let y_minus = root(-1.0, c11, sy, c12);

        // c22 > 0 puts the +√ root on the max side, c22 < 0 flips it
        let (xmin, xmax, ymin, ymax) = if c22 > 0.0 {
            (x_minus, x_plus, y_minus, y_plus)
        } else {
            (x_plus, x_minus, y_plus, y_minus)
        };

        let mut jacobian = SMatrix::<f64, 4, 9>::zeros();
        // vec(C) indices: c00 -> 0, c11 -> 4, c22 -> 8, c02 -> 6, c12 -> 7
        for (row, (_, d_diag, d_mixed, d_c22), diag_index, mixed_index) in [
            (0, xmin, 0, 6),
            (1, ymin, 4, 7),
            (2, xmax, 0, 6),
            (3, ymax, 4, 7),
        ] {
            jacobian[(row, diag_index)] = d_diag;
            jacobian[(row, mixed_index)] = d_mixed;
            jacobian[(row, 8)] = d_c22;
        }

        let box2 = AlignedBox2::new(xmin.0, ymin.0, xmax.0, ymax.0);
        Ok((box2, jacobian))
    }

    /// Validate boundedness and return the two axis discriminants.
    fn check_bounded(&self) -> QuadricResult<(f64, f64)> {
        let c = &self.matrix;
        let scale = c.norm();
        if !scale.is_finite() || scale <= DEGENERATE_TOLERANCE {
            return Err(QuadricError::DegenerateConic(
                "conic matrix is zero or non-finite".into(),
            ));
        }

        let c22 = c[(2, 2)];
        if c22.abs() <= DEGENERATE_TOLERANCE * scale {
            return Err(QuadricError::DegenerateConic(
                "conic passes through infinity (c22 ~ 0)".into(),
            ));
        }

        let disc_x = c[(0, 2)] * c[(0, 2)] - c[(0, 0)] * c22;
        let disc_y = c[(1, 2)] * c[(1, 2)] - c[(1, 1)] * c22;
        let tolerance = DEGENERATE_TOLERANCE * scale * scale;
        if !(disc_x > tolerance) || !(disc_y > tolerance) {
            return Err(QuadricError::DegenerateConic(format!(
                "no real bounded extrema (discriminants {disc_x}, {disc_y})"
            )));
        }

        Ok((disc_x, disc_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Dual conic of a circle with center (cx, cy) and radius r:
    /// C = diag(r², r², -1) conjugated by the translation (cx, cy).
    fn circle_conic(cx: f64, cy: f64, r: f64) -> DualConic {
        let translate = Matrix3::new(1.0, 0.0, cx, 0.0, 1.0, cy, 0.0, 0.0, 1.0);
        let shape = Matrix3::from_diagonal(&nalgebra::Vector3::new(r * r, r * r, -1.0));
        DualConic::new(translate * shape * translate.transpose())
    }

    #[test]
    fn test_circle_bounds() {
        let conic = circle_conic(45.2, 13.8, 3.0);
        let bounds = conic.bounds().unwrap();
        assert_relative_eq!(bounds.xmin(), 42.2, epsilon = 1e-9);
        assert_relative_eq!(bounds.ymin(), 10.8, epsilon = 1e-9);
        assert_relative_eq!(bounds.xmax(), 48.2, epsilon = 1e-9);
        assert_relative_eq!(bounds.ymax(), 16.8, epsilon = 1e-9);
    }

    #[test]
    fn test_bounds_scale_invariant() {
        let conic = circle_conic(10.0, -5.0, 2.0);
        let scaled = DualConic::new(conic.matrix() * 37.5);
        let negated = DualConic::new(conic.matrix() * -1.0);
        assert_relative_eq!(
            conic.bounds().unwrap().vector(),
            scaled.bounds().unwrap().vector(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            conic.bounds().unwrap().vector(),
            negated.bounds().unwrap().vector(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_degenerate_conics_rejected() {
        // zero matrix
        assert!(DualConic::new(Matrix3::zeros()).is_degenerate());
        // c22 = 0: envelope through infinity
        let unbounded = DualConic::new(Matrix3::from_diagonal(&nalgebra::Vector3::new(
            1.0, 1.0, 0.0,
        )));
        assert!(unbounded.is_degenerate());
        // negative discriminant: no real tangent lines
        let imaginary = DualConic::new(Matrix3::from_diagonal(&nalgebra::Vector3::new(
            1.0, 1.0, 1.0,
        )));
        assert!(matches!(
            imaginary.bounds(),
            Err(QuadricError::DegenerateConic(_))
        ));
    }

    #[test]
    fn test_bounds_jacobian_matches_finite_differences() {
        let conic = circle_conic(45.2, 13.8, 3.0);
        let (_, jacobian) = conic.bounds_with_jacobian().unwrap();

        let step = 1e-7;
        // perturb the symmetric entries the bounds read
        for (row_index, col_index, vec_index) in
            [(0, 0, 0), (1, 1, 4), (2, 2, 8), (0, 2, 6), (1, 2, 7)]
        {
            let mut plus = *conic.matrix();
            let mut minus = *conic.matrix();
            plus[(row_index, col_index)] += step;
            minus[(row_index, col_index)] -= step;
            // the extraction reads upper-triangle entries only, so a
            // single-entry perturbation probes exactly one Jacobian column
            let bounds_plus = DualConic { matrix: plus }.bounds().unwrap().vector();
            let bounds_minus = DualConic { matrix: minus }.bounds().unwrap().vector();
            let numerical = (bounds_plus - bounds_minus) / (2.0 * step);
            for row in 0..4 {
                assert_relative_eq!(
                    jacobian[(row, vec_index)],
                    numerical[row],
                    epsilon = 1e-6,
                    max_relative = 1e-5
                );
            }
        }
    }
}
