use std::fmt;
use std::ops::{Div, DivAssign, Mul, MulAssign};

use rand::Rng;

use crate::error::LieError;
use crate::rotation::Rotation;
use crate::se3;
use crate::so3;
use crate::types::{DMat3, DMat4, DVec3, DVec4, Mat6F64, Vec6F64};

/// A rigid body transformation `T_ba`, stored as the pair `(C_ba, r_ab_inb)`.
///
/// It maps homogeneous points from frame `a` into frame `b`:
///
/// ```text
/// p_b = | C_ba  r_ab_inb | p_a
///       |  0       1     |
/// ```
///
/// Only the rotation block can drift off the manifold, so every operation that
/// produces a new rotation block finishes with a conditional reprojection of it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transformation {
    c_ba: DMat3,
    r_ab_inb: DVec3,
}

impl Transformation {
    /// The identity transformation.
    pub const IDENTITY: Self = Self {
        c_ba: DMat3::IDENTITY,
        r_ab_inb: DVec3::ZERO,
    };

    /// Create from a 4x4 homogeneous matrix. The bottom row is ignored.
    pub fn from_matrix(t_ba: &DMat4) -> Self {
        Self::from_parts(DMat3::from_mat4(*t_ba), t_ba.w_axis.truncate())
    }

    /// Create from the rotation `C_ba` and the translation `r_ab_inb`.
    pub fn from_parts(c_ba: DMat3, r_ab_inb: DVec3) -> Self {
        let mut t = Self { c_ba, r_ab_inb };
        t.reproject(false);
        t
    }

    /// Create from the rotation `C_ba` and the position of frame `b` expressed in
    /// frame `a`, `r_ba_ina`. The stored translation is `r_ab_inb = -C_ba r_ba_ina`.
    pub fn from_rotation_and_origin(c_ba: DMat3, r_ba_ina: DVec3) -> Self {
        let c_ba = so3::reproject(c_ba, false);
        Self {
            c_ba,
            r_ab_inb: -(c_ba * r_ba_ina),
        }
    }

    /// Create from a twist, `T_ba = vec2tran(xi_ab)`.
    pub fn from_vec(xi_ab: &Vec6F64) -> Self {
        Self::from_vec_series(xi_ab, 0)
    }

    /// Like [`Transformation::from_vec`] with an explicit series truncation, see
    /// [`se3::vec2tran`].
    pub fn from_vec_series(xi_ab: &Vec6F64, num_terms: u32) -> Self {
        let (c_ba, r_ab_inb) = se3::vec2tran(xi_ab, num_terms);
        Self { c_ba, r_ab_inb }
    }

    /// Create from a dynamically sized twist.
    ///
    /// # Errors
    ///
    /// [`LieError::DimensionMismatch`] if `xi_ab` does not have exactly 6 elements.
    pub fn try_from_slice(xi_ab: &[f64]) -> Result<Self, LieError> {
        let xi_ab: &Vec6F64 = xi_ab
            .try_into()
            .map_err(|_| LieError::DimensionMismatch {
                expected: 6,
                got: xi_ab.len(),
            })?;
        Ok(Self::from_vec(xi_ab))
    }

    /// Draw a transformation with a uniformly distributed rotation and a
    /// translation with each component uniform in `[-1, 1)`.
    pub fn from_random() -> Self {
        let mut rng = rand::rng();
        let r_ab_inb = DVec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        Self {
            c_ba: Rotation::from_random().matrix(),
            r_ab_inb,
        }
    }

    /// The 4x4 homogeneous matrix.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_cols(
            self.c_ba.x_axis.extend(0.0),
            self.c_ba.y_axis.extend(0.0),
            self.c_ba.z_axis.extend(0.0),
            self.r_ab_inb.extend(1.0),
        )
    }

    /// The rotation block `C_ba`.
    #[inline]
    pub fn c_ba(&self) -> DMat3 {
        self.c_ba
    }

    /// The rotation block as a [`Rotation`].
    pub fn rotation(&self) -> Rotation {
        Rotation::from_matrix(self.c_ba, false)
    }

    /// The stored translation `r_ab_inb`.
    #[inline]
    pub fn r_ab_inb(&self) -> DVec3 {
        self.r_ab_inb
    }

    /// The position of frame `b` in frame `a`, `r_ba_ina = -C_ba^T r_ab_inb`.
    pub fn r_ba_ina(&self) -> DVec3 {
        -(self.c_ba.transpose() * self.r_ab_inb)
    }

    /// The twist, `tran2vec(C_ba, r_ab_inb)`.
    pub fn vec(&self) -> Vec6F64 {
        se3::tran2vec(self.c_ba, self.r_ab_inb)
    }

    /// The inverse transformation `T_ab`.
    pub fn inverse(&self) -> Self {
        let c_ab = so3::reproject(self.c_ba.transpose(), false);
        Self {
            c_ba: c_ab,
            r_ab_inb: -(c_ab * self.r_ab_inb),
        }
    }

    /// The 6x6 adjoint, see [`se3::tran_ad`].
    pub fn adjoint(&self) -> Mat6F64 {
        se3::tran_ad(self.c_ba, self.r_ab_inb)
    }

    /// Snap the rotation block back onto SO(3), see [`so3::reproject`].
    /// The translation is never modified.
    pub fn reproject(&mut self, force: bool) {
        self.c_ba = so3::reproject(self.c_ba, force);
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<&[f64]> for Transformation {
    type Error = LieError;

    fn try_from(xi_ab: &[f64]) -> Result<Self, Self::Error> {
        Self::try_from_slice(xi_ab)
    }
}

impl MulAssign<Transformation> for Transformation {
    fn mul_assign(&mut self, rhs: Transformation) {
        self.r_ab_inb += self.c_ba * rhs.r_ab_inb;
        self.c_ba = self.c_ba * rhs.c_ba;
        self.reproject(false);
    }
}

impl Mul<Transformation> for Transformation {
    type Output = Transformation;

    fn mul(mut self, rhs: Transformation) -> Self::Output {
        self *= rhs;
        self
    }
}

/// `self * rhs^-1`.
impl DivAssign<Transformation> for Transformation {
    fn div_assign(&mut self, rhs: Transformation) {
        self.c_ba = self.c_ba * rhs.c_ba.transpose();
        self.r_ab_inb -= self.c_ba * rhs.r_ab_inb;
        self.reproject(false);
    }
}

impl Div<Transformation> for Transformation {
    type Output = Transformation;

    fn div(mut self, rhs: Transformation) -> Self::Output {
        self /= rhs;
        self
    }
}

/// Homogeneous point. The `w` component is carried through unchanged.
impl Mul<DVec4> for Transformation {
    type Output = DVec4;

    fn mul(self, p_a: DVec4) -> Self::Output {
        (self.c_ba * p_a.truncate() + self.r_ab_inb * p_a.w).extend(p_a.w)
    }
}

/// Euclidean point, treated as `w = 1`.
impl Mul<DVec3> for Transformation {
    type Output = DVec3;

    fn mul(self, p_a: DVec3) -> Self::Output {
        self.c_ba * p_a + self.r_ab_inb
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.matrix();
        for i in 0..4 {
            let row = m.row(i);
            writeln!(
                f,
                "{:>12.6} {:>12.6} {:>12.6} {:>12.6}",
                row.x, row.y, row.z, row.w
            )?;
        }
        Ok(())
    }
}

#[cfg(feature = "approx")]
impl approx::AbsDiffEq for Transformation {
    type Epsilon = f64;

    #[inline]
    fn default_epsilon() -> Self::Epsilon {
        <f64 as approx::AbsDiffEq>::default_epsilon()
    }

    #[inline]
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.c_ba, &other.c_ba, epsilon)
            && approx::AbsDiffEq::abs_diff_eq(&self.r_ab_inb, &other.r_ab_inb, epsilon)
    }
}

#[cfg(feature = "approx")]
impl approx::RelativeEq for Transformation {
    #[inline]
    fn default_max_relative() -> Self::Epsilon {
        <f64 as approx::RelativeEq>::default_max_relative()
    }

    #[inline]
    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        approx::RelativeEq::relative_eq(&self.c_ba, &other.c_ba, epsilon, max_relative)
            && approx::RelativeEq::relative_eq(
                &self.r_ab_inb,
                &other.r_ab_inb,
                epsilon,
                max_relative,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat6;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f64 = 1e-12;

    fn assert_transform_eq(a: &Transformation, b: &Transformation, eps: f64) {
        assert!(a.matrix().abs_diff_eq(b.matrix(), eps), "\n{a}\n!=\n{b}");
    }

    #[test]
    fn test_identity() {
        let t = Transformation::default();
        assert_eq!(t.matrix(), DMat4::IDENTITY);
        assert_eq!(t.vec(), [0.0; 6]);
        assert_eq!(Transformation::from_vec(&[0.0; 6]), Transformation::IDENTITY);
    }

    #[test]
    fn test_from_matrix_roundtrip() {
        let t = Transformation::from_vec(&[0.5, -1.0, 2.0, 0.3, 0.2, -0.1]);
        let t2 = Transformation::from_matrix(&t.matrix());
        assert_eq!(t, t2);
    }

    #[test]
    fn test_from_rotation_and_origin() {
        let c = so3::vec2rot(DVec3::new(0.0, 0.0, FRAC_PI_2), 0);
        let r_ba_ina = DVec3::new(1.0, 2.0, 3.0);
        let t = Transformation::from_rotation_and_origin(c, r_ba_ina);

        assert!(t.r_ab_inb().abs_diff_eq(-(c * r_ba_ina), EPSILON));
        assert!(t.r_ba_ina().abs_diff_eq(r_ba_ina, EPSILON));

        // the origin of frame b maps to zero
        assert!((t * r_ba_ina).abs_diff_eq(DVec3::ZERO, EPSILON));
    }

    #[test]
    fn test_try_from_slice() {
        let xi = [0.1, 0.2, 0.3, -0.1, 0.05, 0.2];
        let t = Transformation::try_from_slice(&xi).unwrap();
        assert_eq!(t, Transformation::from_vec(&xi));

        assert_eq!(
            Transformation::try_from_slice(&xi[..5]),
            Err(LieError::DimensionMismatch {
                expected: 6,
                got: 5
            })
        );
        let seven = [0.0; 7];
        assert!(Transformation::try_from(&seven[..]).is_err());
    }

    #[test]
    fn test_inverse() {
        for _ in 0..10 {
            let t = Transformation::from_random();
            assert_transform_eq(&(t * t.inverse()), &Transformation::IDENTITY, EPSILON);
            assert_transform_eq(&(t.inverse() * t), &Transformation::IDENTITY, EPSILON);
            assert!(t
                .inverse()
                .matrix()
                .abs_diff_eq(t.matrix().inverse(), 1e-10));
        }
    }

    #[test]
    fn test_compose_matches_matrix_product() {
        let t1 = Transformation::from_random();
        let t2 = Transformation::from_random();
        assert!((t1 * t2).matrix().abs_diff_eq(t1.matrix() * t2.matrix(), EPSILON));

        let mut t = t1;
        t *= t2;
        assert_transform_eq(&t, &(t1 * t2), 0.0);
    }

    #[test]
    fn test_divide_is_compose_with_inverse() {
        let t1 = Transformation::from_random();
        let t2 = Transformation::from_random();
        assert_transform_eq(&(t1 / t2), &(t1 * t2.inverse()), EPSILON);

        let mut t = t1 * t2;
        t /= t2;
        assert_transform_eq(&t, &t1, EPSILON);
    }

    #[test]
    fn test_point_transformation() {
        let t = Transformation::from_vec(&[1.0, 2.0, 3.0, 0.0, 0.0, FRAC_PI_2]);
        let p = DVec3::new(1.0, 0.0, 0.0);

        let expected = t.c_ba() * p + t.r_ab_inb();
        assert!((t * p).abs_diff_eq(expected, EPSILON));
        assert!((t * p.extend(1.0)).abs_diff_eq(expected.extend(1.0), EPSILON));

        // directions (w = 0) are only rotated
        let d = t * p.extend(0.0);
        assert!(d.abs_diff_eq(DVec4::new(0.0, 1.0, 0.0, 0.0), EPSILON));

        // scaled homogeneous points keep their scale
        let s = t * (p * 2.0).extend(2.0);
        assert!(s.abs_diff_eq(expected.extend(1.0) * 2.0, EPSILON));
    }

    #[test]
    fn test_vec_roundtrip() {
        let xi = [0.4, -0.3, 1.5, -0.7, 0.2, 0.9];
        let v = Transformation::from_vec(&xi).vec();
        for (a, b) in v.iter().zip(xi.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_series_constructor() {
        let xi = [0.2, 0.1, -0.3, 0.1, -0.2, 0.05];
        assert_transform_eq(
            &Transformation::from_vec_series(&xi, 20),
            &Transformation::from_vec(&xi),
            EPSILON,
        );
    }

    #[test]
    fn test_adjoint_consistency_random() {
        for _ in 0..10 {
            let t = Transformation::from_random();
            let xi = Transformation::from_random().vec();

            let lhs = t * Transformation::from_vec(&xi) * t.inverse();
            let rhs = Transformation::from_vec(&mat6::mul_vec(&t.adjoint(), &xi));
            assert_transform_eq(&lhs, &rhs, 1e-9);
        }
    }

    #[test]
    fn test_adjoint_of_product() {
        let t1 = Transformation::from_random();
        let t2 = Transformation::from_random();
        let lhs = (t1 * t2).adjoint();
        let rhs = mat6::mul(&t1.adjoint(), &t2.adjoint());
        assert!(mat6::max_abs_diff(&lhs, &rhs) < 1e-12);
    }

    #[test]
    fn test_reprojection_leaves_translation() {
        let t = Transformation::from_vec(&[1.0, -1.0, 0.5, 0.2, 0.1, -0.4]);
        let mut drifted = t;
        drifted.c_ba = t.c_ba * (1.0 + 1e-4);
        drifted.reproject(false);

        assert_eq!(drifted.r_ab_inb(), t.r_ab_inb());
        assert_relative_eq!(drifted.c_ba().determinant(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_group_closure_under_long_chain() {
        let step = Transformation::from_vec(&[0.01, 0.0, 0.002, 1e-3, -2e-3, 5e-4]);
        let mut t = Transformation::IDENTITY;
        for _ in 0..10_000 {
            t *= step;
        }
        let c = t.c_ba();
        assert!((c.transpose() * c).abs_diff_eq(DMat3::IDENTITY, 1e-6));
        assert!((c.determinant() - 1.0).abs() <= so3::DETERMINANT_TOLERANCE);
    }

    #[test]
    fn test_display() {
        let s = Transformation::from_vec(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0]).to_string();
        let rows: Vec<&str> = s.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].trim().ends_with("1.000000"));
        assert!(rows[2].trim().ends_with("3.000000"));
    }
}
