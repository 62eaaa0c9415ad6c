#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # lgmath
//!
//! Closed-form conversions between the Lie groups SO(3) and SE(3) and their Lie
//! algebras, plus the composition, inversion and adjoint operators built on them.
//!
//! The free functions in [`so3`] and [`se3`] are the core maps. [`Rotation`] and
//! [`Transformation`] are small `Copy` value types that delegate to them and keep
//! their rotation block on the manifold with conditional reprojection.
//!
//! ## Example
//!
//! ```rust
//! use lgmath::{DMat4, DVec3, Transformation};
//!
//! // a quarter turn about z followed by a unit step along x
//! let xi = [1.0, 0.0, 0.0, 0.0, 0.0, std::f64::consts::FRAC_PI_2];
//! let t_ba = Transformation::from_vec(&xi);
//!
//! // compose, invert and map points
//! let identity = t_ba * t_ba.inverse();
//! assert!(identity.matrix().abs_diff_eq(DMat4::IDENTITY, 1e-12));
//!
//! let p_b = t_ba * DVec3::new(1.0, 0.0, 0.0);
//! assert!(p_b.is_finite());
//!
//! // and back to the algebra
//! let v = t_ba.vec();
//! assert!((v[5] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! ```

mod error;
pub use error::LieError;

/// Arithmetic helpers for 6x6 matrices.
pub mod mat6;

mod rotation;
pub use rotation::Rotation;

/// Special Euclidean group SE(3) for 3D rigid transformations.
pub mod se3;

/// Skew-symmetric operator on 3-vectors.
pub mod skew;

/// Special Orthogonal group SO(3) for 3D rotations.
pub mod so3;

mod transformation;
pub use transformation::Transformation;

/// Fixed-size algebraic types.
pub mod types;
pub use types::{DMat3, DMat4, DVec3, DVec4, Mat4x6F64, Mat6F64, Vec6F64};
