//! Dual-quadric landmark projection factors for object-level SLAM.
//!
//! This crate implements the measurement side of quadric-based object
//! mapping: a bounded 3D quadric surface (an object landmark) is projected
//! through a calibrated camera into a 2D dual conic, an axis-aligned
//! bounding box is extracted from the conic in closed form, and the box is
//! compared against a detected bounding box. The resulting 4-vector
//! residual comes with analytic Jacobians with respect to the camera pose
//! tangent (4x6) and the quadric tangent (4x9), ready for consumption by a
//! nonlinear least-squares optimizer.
//!
//! # Modules
//!
//! - [`manifold`]: SO(3)/SE(3) Lie-group support (exp/log maps, retraction)
//! - [`geometry`]: quadrics, dual conics, boxes, and camera projection
//! - [`core`]: variable container and noise models for optimizer plumbing
//! - [`factors`]: the [`Factor`] trait and [`BoundingBoxFactor`]
//!
//! # Example
//!
//! ```rust
//! use nalgebra::{DVector, Vector2, Vector3};
//! use quadric_factors::{
//!     AlignedBox2, BoundingBoxFactor, Calibration, ConstrainedDualQuadric, DiagonalNoise,
//!     LieGroup, SE3, SO3,
//! };
//!
//! let calibration = Calibration::new(525.0, 525.0, 0.0, 320.0, 240.0).unwrap();
//! let noise = DiagonalNoise::from_sigmas(DVector::from_element(4, 0.2)).unwrap();
//! let measured = AlignedBox2::new(15.2, 18.5, 120.5, 230.2);
//! let factor = BoundingBoxFactor::new(
//!     measured,
//!     calibration,
//!     Vector2::new(640.0, 480.0),
//!     1, // pose key
//!     2, // quadric key
//!     noise,
//! )
//! .unwrap();
//!
//! let pose = SE3::identity();
//! let quadric = ConstrainedDualQuadric::new(
//!     SE3::new(Vector3::new(0.0, 0.0, 5.0), SO3::identity()),
//!     Vector3::new(1.0, 1.0, 1.0),
//! )
//! .unwrap();
//!
//! let (error, h_pose, h_quadric) = factor
//!     .evaluate_error_with_jacobians(&pose, &quadric)
//!     .unwrap();
//! assert_eq!(h_pose.nrows(), 4);
//! assert_eq!(h_quadric.ncols(), 9);
//! # let _ = error;
//! ```

pub mod core;
pub mod error;
pub mod factors;
pub mod geometry;
pub mod logger;
pub mod manifold;

pub use crate::core::{DiagonalNoise, Key, Values, VariableValue};
pub use error::{QuadricError, QuadricResult};
pub use factors::{BoundingBoxFactor, Factor, Linearization};
pub use geometry::{AlignedBox2, Calibration, ConstrainedDualQuadric, DualConic, Vector9};
pub use logger::{init_logger, init_logger_with_level};
pub use manifold::{LieGroup, SE3, SO3};
