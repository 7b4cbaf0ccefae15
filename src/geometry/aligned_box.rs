//! Axis-aligned bounding box in image space.
//!
//! Boxes appear twice per factor evaluation: once as the measured
//! detection (fixed external input) and once as the predicted projection
//! of a quadric (recomputed every evaluation). Both share this type.

use crate::error::QuadricResult;
use crate::geometry::DualConic;
use nalgebra::{Vector2, Vector4};

/// Axis-aligned 2D box, stored as (xmin, ymin, xmax, ymax) in pixels.
///
/// The corner ordering invariant xmin <= xmax, ymin <= ymax is enforced at
/// construction; corners supplied in any order are normalized by swapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedBox2 {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl AlignedBox2 {
    /// Create a box from two corners in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        AlignedBox2 {
            xmin: x1.min(x2),
            ymin: y1.min(y2),
            xmax: x1.max(x2),
            ymax: y1.max(y2),
        }
    }

    /// Create a box from a (xmin, ymin, xmax, ymax) vector.
    pub fn from_vector(bounds: &Vector4<f64>) -> Self {
        Self::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }

    /// Extract the box circumscribing a dual conic in image space.
    ///
    /// # Errors
    /// [`QuadricError::DegenerateConic`] when the conic admits no bounded
    /// real extraction.
    ///
    /// [`QuadricError::DegenerateConic`]: crate::error::QuadricError::DegenerateConic
    pub fn from_dual_conic(conic: &DualConic) -> QuadricResult<Self> {
        conic.bounds()
    }

    /// The box as a (xmin, ymin, xmax, ymax) vector for residual arithmetic.
    pub fn vector(&self) -> Vector4<f64> {
        Vector4::new(self.xmin, self.ymin, self.xmax, self.ymax)
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Vector2<f64> {
        Vector2::new(
            0.5 * (self.xmin + self.xmax),
            0.5 * (self.ymin + self.ymax),
        )
    }

    /// Whether a pixel lies inside this box (boundary included).
    pub fn contains_point(&self, point: &Vector2<f64>) -> bool {
        point.x >= self.xmin && point.x <= self.xmax && point.y >= self.ymin && point.y <= self.ymax
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &AlignedBox2) -> bool {
        other.xmin >= self.xmin
            && other.xmax <= self.xmax
            && other.ymin >= self.ymin
            && other.ymax <= self.ymax
    }

    /// Whether this box and `other` overlap.
    pub fn intersects(&self, other: &AlignedBox2) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    /// The overlapping region of two boxes, if any.
    pub fn intersection(&self, other: &AlignedBox2) -> Option<AlignedBox2> {
        if !self.intersects(other) {
            return None;
        }
        Some(AlignedBox2 {
            xmin: self.xmin.max(other.xmin),
            ymin: self.ymin.max(other.ymin),
            xmax: self.xmax.min(other.xmax),
            ymax: self.ymax.min(other.ymax),
        })
    }

    /// Intersection over union with another box, in [0, 1].
    pub fn iou(&self, other: &AlignedBox2) -> f64 {
        match self.intersection(other) {
            Some(overlap) => {
                let union = self.area() + other.area() - overlap.area();
                if union > 0.0 {
                    overlap.area() / union
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }

    /// Truncate the box to image bounds (0, 0) .. (width, height).
    ///
    /// Returns `None` when the box lies entirely outside the image.
    /// Clipping is for display and validation only: it is not
    /// differentiable at the image border and is deliberately kept out of
    /// the factor's error computation.
    pub fn clipped(&self, image_dimensions: &Vector2<f64>) -> Option<AlignedBox2> {
        let image = AlignedBox2::new(0.0, 0.0, image_dimensions.x, image_dimensions.y);
        self.intersection(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_corner_normalization_all_orders() {
        let expected = AlignedBox2::new(1.0, 2.0, 3.0, 4.0);
        for (x1, y1, x2, y2) in [
            (1.0, 2.0, 3.0, 4.0),
            (3.0, 2.0, 1.0, 4.0),
            (1.0, 4.0, 3.0, 2.0),
            (3.0, 4.0, 1.0, 2.0),
        ] {
            let bx = AlignedBox2::new(x1, y1, x2, y2);
            assert_eq!(bx, expected);
            assert!(bx.xmin() <= bx.xmax());
            assert!(bx.ymin() <= bx.ymax());
        }
    }

    #[test]
    fn test_vector_roundtrip() {
        let bx = AlignedBox2::new(15.2, 18.5, 120.5, 230.2);
        let rebuilt = AlignedBox2::from_vector(&bx.vector());
        assert_eq!(bx, rebuilt);
        assert_eq!(bx.vector(), Vector4::new(15.2, 18.5, 120.5, 230.2));
    }

    #[test]
    fn test_dimensions_and_center() {
        let bx = AlignedBox2::new(10.0, 20.0, 30.0, 60.0);
        assert_relative_eq!(bx.width(), 20.0);
        assert_relative_eq!(bx.height(), 40.0);
        assert_relative_eq!(bx.area(), 800.0);
        assert_relative_eq!(bx.center().x, 20.0);
        assert_relative_eq!(bx.center().y, 40.0);
    }

    #[test]
    fn test_containment() {
        let outer = AlignedBox2::new(0.0, 0.0, 100.0, 100.0);
        let inner = AlignedBox2::new(10.0, 10.0, 50.0, 50.0);
        assert!(outer.contains_box(&inner));
        assert!(!inner.contains_box(&outer));
        assert!(outer.contains_point(&Vector2::new(100.0, 100.0)));
        assert!(!outer.contains_point(&Vector2::new(100.1, 50.0)));
    }

    #[test]
    fn test_intersection_and_iou() {
        let a = AlignedBox2::new(0.0, 0.0, 10.0, 10.0);
        let b = AlignedBox2::new(5.0, 5.0, 15.0, 15.0);
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap, AlignedBox2::new(5.0, 5.0, 10.0, 10.0));
        assert_relative_eq!(a.iou(&b), 25.0 / 175.0, epsilon = 1e-12);

        let far = AlignedBox2::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersection(&far).is_none());
        assert_relative_eq!(a.iou(&far), 0.0);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_clipping() {
        let image = Vector2::new(640.0, 480.0);
        let partly_outside = AlignedBox2::new(-20.0, 400.0, 100.0, 600.0);
        let clipped = partly_outside.clipped(&image).unwrap();
        assert_eq!(clipped, AlignedBox2::new(0.0, 400.0, 100.0, 480.0));

        let fully_outside = AlignedBox2::new(700.0, 500.0, 800.0, 600.0);
        assert!(fully_outside.clipped(&image).is_none());
    }
}
