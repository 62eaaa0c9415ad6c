//! Skew-symmetric (cross product) operator and its inverse.

use crate::types::{DMat3, DVec3};

/// Vector space -> Lie algebra.
///
/// Builds the skew-symmetric matrix `v^` such that `v^ * u = v x u`:
///
/// ```text
/// |  0   -v.z   v.y |
/// |  v.z   0   -v.x |
/// | -v.y  v.x    0  |
/// ```
#[inline]
pub fn hat(v: DVec3) -> DMat3 {
    // glam matrices are column major
    DMat3::from_cols(
        DVec3::new(0.0, v.z, -v.y),
        DVec3::new(-v.z, 0.0, v.x),
        DVec3::new(v.y, -v.x, 0.0),
    )
}

/// Lie algebra -> vector space.
///
/// Extracts `v` from a skew-symmetric matrix. Only the lower triangle is read,
/// so callers wanting the skew part of a general matrix `m` should pass
/// `0.5 * (m - m^T)`.
#[inline]
pub fn vee(m: DMat3) -> DVec3 {
    DVec3::new(m.y_axis.z, m.z_axis.x, m.x_axis.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hat_layout() {
        let h = hat(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(h.row(0), DVec3::new(0.0, -3.0, 2.0));
        assert_eq!(h.row(1), DVec3::new(3.0, 0.0, -1.0));
        assert_eq!(h.row(2), DVec3::new(-2.0, 1.0, 0.0));
    }

    #[test]
    fn test_hat_cross_product() {
        let v = DVec3::new(1.0, -2.0, 0.5);
        let u = DVec3::new(4.0, 5.0, 6.0);
        let lhs = hat(v) * u;
        let rhs = v.cross(u);
        assert_relative_eq!(lhs.x, rhs.x, epsilon = 1e-12);
        assert_relative_eq!(lhs.y, rhs.y, epsilon = 1e-12);
        assert_relative_eq!(lhs.z, rhs.z, epsilon = 1e-12);
    }

    #[test]
    fn test_hat_antisymmetric() {
        let h = hat(DVec3::new(0.3, -0.7, 1.1));
        assert!(h.abs_diff_eq(-h.transpose(), 1e-15));
    }

    #[test]
    fn test_hat_vee() {
        for v in [
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(-0.5, 0.0, 1.5),
            DVec3::ZERO,
        ] {
            assert_eq!(vee(hat(v)), v);
        }
    }
}
