//! Geometric types for quadric-based object mapping.
//!
//! The projection pipeline runs leaves-first through this module:
//! a [`ConstrainedDualQuadric`] is projected through a [`Calibration`]d
//! camera into a [`DualConic`], from which an [`AlignedBox2`] is extracted
//! in closed form. Every stage exposes the analytic derivatives the
//! bounding-box factor chains together.

pub mod aligned_box;
pub mod camera;
pub mod dual_conic;
pub mod quadric;

pub use aligned_box::AlignedBox2;
pub use camera::{project_quadric, project_quadric_with_jacobians, projection_matrix, Calibration};
pub use dual_conic::DualConic;
pub use quadric::{ConstrainedDualQuadric, Vector9};
