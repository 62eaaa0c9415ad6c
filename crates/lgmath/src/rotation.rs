use std::fmt;
use std::ops::{Div, DivAssign, Mul, MulAssign};

use glam::DQuat;
use rand::Rng;

use crate::error::LieError;
use crate::so3;
use crate::types::{DMat3, DVec3};

/// A 3D rotation `C_ba`, stored as a 3x3 rotation matrix.
///
/// Composition triggers a conditional reprojection, so the matrix stays on
/// SO(3) under long chains of products without paying for a log-exp round trip
/// on every step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation {
    c_ba: DMat3,
}

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        c_ba: DMat3::IDENTITY,
    };

    /// Create a rotation from a 3x3 matrix.
    ///
    /// With `reproject` set the matrix is snapped onto SO(3) unconditionally,
    /// otherwise it is stored as given.
    pub fn from_matrix(c_ba: DMat3, reproject: bool) -> Self {
        let c_ba = if reproject {
            so3::reproject(c_ba, true)
        } else {
            c_ba
        };
        Self { c_ba }
    }

    /// Create a rotation from an axis-angle vector, `C_ba = vec2rot(aaxis_ab)`.
    pub fn from_vec(aaxis_ab: DVec3) -> Self {
        Self::from_vec_series(aaxis_ab, 0)
    }

    /// Like [`Rotation::from_vec`] with an explicit series truncation, see [`so3::vec2rot`].
    pub fn from_vec_series(aaxis_ab: DVec3, num_terms: u32) -> Self {
        Self {
            c_ba: so3::vec2rot(aaxis_ab, num_terms),
        }
    }

    /// Create a rotation from a dynamically sized axis-angle vector.
    ///
    /// # Errors
    ///
    /// [`LieError::DimensionMismatch`] if `aaxis_ab` does not have exactly 3 elements.
    pub fn try_from_slice(aaxis_ab: &[f64]) -> Result<Self, LieError> {
        match aaxis_ab {
            [x, y, z] => Ok(Self::from_vec(DVec3::new(*x, *y, *z))),
            _ => Err(LieError::DimensionMismatch {
                expected: 3,
                got: aaxis_ab.len(),
            }),
        }
    }

    /// Draw a rotation uniformly over SO(3).
    pub fn from_random() -> Self {
        let mut rng = rand::rng();

        let r1: f64 = rng.random();
        let r2: f64 = rng.random();
        let r3: f64 = rng.random();

        // Shoemake's method: uniform unit quaternion
        let one_minus_r1_sqrt = (1.0 - r1).sqrt();
        let r1_sqrt = r1.sqrt();
        let two_pi = 2.0 * std::f64::consts::PI;

        let q = DQuat::from_xyzw(
            one_minus_r1_sqrt * (two_pi * r2).sin(),
            r1_sqrt * (two_pi * r3).cos(),
            r1_sqrt * (two_pi * r3).sin(),
            one_minus_r1_sqrt * (two_pi * r2).cos(),
        )
        .normalize();

        Self {
            c_ba: DMat3::from_quat(q),
        }
    }

    /// The underlying rotation matrix.
    #[inline]
    pub fn matrix(&self) -> DMat3 {
        self.c_ba
    }

    /// The axis-angle vector, `rot2vec(C_ba)`.
    pub fn vec(&self) -> DVec3 {
        so3::rot2vec(self.c_ba)
    }

    /// The inverse rotation (the transpose).
    pub fn inverse(&self) -> Self {
        Self {
            c_ba: self.c_ba.transpose(),
        }
    }

    /// Snap the matrix back onto SO(3), see [`so3::reproject`].
    pub fn reproject(&mut self, force: bool) {
        self.c_ba = so3::reproject(self.c_ba, force);
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<&[f64]> for Rotation {
    type Error = LieError;

    fn try_from(aaxis_ab: &[f64]) -> Result<Self, Self::Error> {
        Self::try_from_slice(aaxis_ab)
    }
}

impl MulAssign<Rotation> for Rotation {
    fn mul_assign(&mut self, rhs: Rotation) {
        self.c_ba = self.c_ba * rhs.c_ba;
        self.reproject(false);
    }
}

impl Mul<Rotation> for Rotation {
    type Output = Rotation;

    fn mul(mut self, rhs: Rotation) -> Self::Output {
        self *= rhs;
        self
    }
}

/// `self * rhs^-1`.
impl DivAssign<Rotation> for Rotation {
    fn div_assign(&mut self, rhs: Rotation) {
        self.c_ba = self.c_ba * rhs.c_ba.transpose();
        self.reproject(false);
    }
}

impl Div<Rotation> for Rotation {
    type Output = Rotation;

    fn div(mut self, rhs: Rotation) -> Self::Output {
        self /= rhs;
        self
    }
}

impl Mul<DVec3> for Rotation {
    type Output = DVec3;

    fn mul(self, p_a: DVec3) -> Self::Output {
        self.c_ba * p_a
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..3 {
            let row = self.c_ba.row(i);
            writeln!(f, "{:>12.6} {:>12.6} {:>12.6}", row.x, row.y, row.z)?;
        }
        Ok(())
    }
}

#[cfg(feature = "approx")]
impl approx::AbsDiffEq for Rotation {
    type Epsilon = <DMat3 as approx::AbsDiffEq>::Epsilon;

    #[inline]
    fn default_epsilon() -> Self::Epsilon {
        <DMat3 as approx::AbsDiffEq>::default_epsilon()
    }

    #[inline]
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.c_ba, &other.c_ba, epsilon)
    }
}

#[cfg(feature = "approx")]
impl approx::RelativeEq for Rotation {
    #[inline]
    fn default_max_relative() -> Self::Epsilon {
        <DMat3 as approx::RelativeEq>::default_max_relative()
    }

    #[inline]
    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        approx::RelativeEq::relative_eq(&self.c_ba, &other.c_ba, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_identity() {
        let c = Rotation::default();
        assert_eq!(c.matrix(), DMat3::IDENTITY);
        assert_eq!(c.vec(), DVec3::ZERO);
    }

    #[test]
    fn test_from_vec() {
        let c = Rotation::from_vec(DVec3::new(0.0, 0.0, FRAC_PI_2));
        let p = c * DVec3::X;
        assert_relative_eq!(p.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(p.y, 1.0, epsilon = EPSILON);
        assert_relative_eq!(p.z, 0.0, epsilon = EPSILON);
        assert_relative_eq!(c.vec().z, FRAC_PI_2, epsilon = EPSILON);
    }

    #[test]
    fn test_try_from_slice() {
        let c = Rotation::try_from_slice(&[0.1, 0.2, 0.3]).unwrap();
        assert!(c
            .matrix()
            .abs_diff_eq(so3::vec2rot(DVec3::new(0.1, 0.2, 0.3), 0), EPSILON));

        assert_eq!(
            Rotation::try_from_slice(&[0.1, 0.2, 0.3, 0.4]),
            Err(LieError::DimensionMismatch {
                expected: 3,
                got: 4
            })
        );
        let empty: &[f64] = &[];
        assert!(Rotation::try_from(empty).is_err());
    }

    #[test]
    fn test_from_matrix_reproject() {
        let c = so3::vec2rot(DVec3::new(0.3, 0.1, -0.2), 0);
        let drifted = c * 1.01;
        assert_eq!(Rotation::from_matrix(drifted, false).matrix(), drifted);

        let fixed = Rotation::from_matrix(drifted, true).matrix();
        assert_relative_eq!(fixed.determinant(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_inverse() {
        let c = Rotation::from_random();
        let identity = (c * c.inverse()).matrix();
        assert!(identity.abs_diff_eq(DMat3::IDENTITY, EPSILON));
    }

    #[test]
    fn test_compose_and_divide() {
        let c1 = Rotation::from_vec(DVec3::new(0.1, -0.5, 0.2));
        let c2 = Rotation::from_vec(DVec3::new(-0.3, 0.4, 0.9));

        let product = c1 * c2;
        assert!(product
            .matrix()
            .abs_diff_eq(c1.matrix() * c2.matrix(), EPSILON));

        let back = product / c2;
        assert!(back.matrix().abs_diff_eq(c1.matrix(), EPSILON));

        let mut c = c1;
        c *= c2;
        c /= c2;
        assert!(c.matrix().abs_diff_eq(c1.matrix(), EPSILON));
    }

    #[test]
    fn test_random_is_valid() {
        for _ in 0..10 {
            let c = Rotation::from_random().matrix();
            assert!((c.transpose() * c).abs_diff_eq(DMat3::IDENTITY, EPSILON));
            assert_relative_eq!(c.determinant(), 1.0, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_long_chain_stays_on_manifold() {
        let step = Rotation::from_vec(DVec3::new(0.01, 0.02, -0.015));
        let mut c = Rotation::IDENTITY;
        for _ in 0..5000 {
            c *= step;
        }
        let m = c.matrix();
        assert!((m.transpose() * m).abs_diff_eq(DMat3::IDENTITY, 1e-6));
        assert_relative_eq!(m.determinant(), 1.0, epsilon = so3::DETERMINANT_TOLERANCE);
    }

    #[test]
    fn test_display() {
        let s = Rotation::IDENTITY.to_string();
        assert_eq!(s.lines().count(), 3);
        assert!(s.lines().next().is_some_and(|l| l.trim().starts_with("1.000000")));
    }
}
