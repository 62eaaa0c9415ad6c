//! Fixed-size algebraic types used across the crate.
//!
//! Three and four dimensional quantities use the glam double precision types.
//! Six dimensional quantities (twists, adjoints, Jacobians) are plain row-major
//! arrays, the same way larger adjoints are returned elsewhere in the pipeline.

pub use glam::{DMat3, DMat4, DVec3, DVec4};

/// A 6-vector. Twists are laid out as `[rho; phi]` (translation first).
pub type Vec6F64 = [f64; 6];

/// A row-major 6x6 matrix.
pub type Mat6F64 = [[f64; 6]; 6];

/// A row-major 4x6 matrix.
pub type Mat4x6F64 = [[f64; 6]; 4];

/// Split a twist into its translational and rotational parts.
#[inline]
pub fn split_twist(xi: &Vec6F64) -> (DVec3, DVec3) {
    (
        DVec3::new(xi[0], xi[1], xi[2]),
        DVec3::new(xi[3], xi[4], xi[5]),
    )
}

/// Stack translational and rotational parts into a twist `[rho; phi]`.
#[inline]
pub fn join_twist(rho: DVec3, phi: DVec3) -> Vec6F64 {
    [rho.x, rho.y, rho.z, phi.x, phi.y, phi.z]
}
