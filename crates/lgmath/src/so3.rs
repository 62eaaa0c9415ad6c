//! # SO(3): rotations in 3D
//!
//! Exponential and logarithmic maps between axis-angle vectors `phi = theta * axis`
//! and 3x3 rotation matrices, the left Jacobian of SO(3) and its inverse, and the
//! log-then-exp reprojection used to pull a drifted matrix back onto the group.
//!
//! Every map comes in two flavours selected by `num_terms`:
//!
//! - `num_terms == 0`: the closed form (Rodrigues), which is exact.
//! - `num_terms > 0`: the matrix power series truncated after `num_terms` terms.
//!   This is intentionally approximate and exists for callers that need a specific
//!   truncation to stay consistent with a linearized model.
//!
//! ## Numerical regimes
//!
//! The closed forms divide by powers of `theta`. Below [`SMALL_ANGLE_THRESHOLD`]
//! the trigonometric coefficients are replaced by their Taylor expansions, and
//! below [`ZERO_ANGLE_TOLERANCE`] the maps return their exact limits.
//!
//! The logarithm is ill-conditioned near `theta = pi`, where the skew part of the
//! matrix vanishes. Within [`NEAR_PI_TOLERANCE`] of `pi` the axis is read from the
//! symmetric part of the matrix instead, with its sign taken from what remains of
//! the skew part.

use std::f64::consts::PI;

use crate::skew::{hat, vee};
use crate::types::{DMat3, DVec3};

/// Angles below this are treated as exactly zero.
pub const ZERO_ANGLE_TOLERANCE: f64 = 1e-12;

/// Below this angle the closed-form coefficients use their Taylor expansions.
pub const SMALL_ANGLE_THRESHOLD: f64 = 1e-4;

/// When `pi - theta` is below this, [`rot2vec`] extracts the axis from the
/// symmetric part of the matrix.
pub const NEAR_PI_TOLERANCE: f64 = 1e-3;

/// Conditional reprojection fires when `|det(C) - 1|` exceeds this.
pub const DETERMINANT_TOLERANCE: f64 = 1e-6;

/// Maximum number of terms accepted by the series inverse Jacobians.
pub const MAX_SERIES_TERMS: u32 = 20;

/// Bernoulli numbers B_0..B_20 with the B_1 = -1/2 convention.
pub(crate) const BERNOULLI: [f64; MAX_SERIES_TERMS as usize + 1] = [
    1.0,
    -0.5,
    1.0 / 6.0,
    0.0,
    -1.0 / 30.0,
    0.0,
    1.0 / 42.0,
    0.0,
    -1.0 / 30.0,
    0.0,
    5.0 / 66.0,
    0.0,
    -691.0 / 2730.0,
    0.0,
    7.0 / 6.0,
    0.0,
    -3617.0 / 510.0,
    0.0,
    43867.0 / 798.0,
    0.0,
    -174611.0 / 330.0,
];

#[inline]
fn trace(m: &DMat3) -> f64 {
    m.x_axis.x + m.y_axis.y + m.z_axis.z
}

/// Sum of `k^n * coeff(n)` for `n` in `0..=num_terms`, with `coeff(0) == 1`.
///
/// `ratio(n)` is the factor turning the n-1 term into the n-th one.
fn power_series(k: DMat3, num_terms: u32, ratio: impl Fn(u32) -> f64) -> DMat3 {
    let mut sum = DMat3::IDENTITY;
    let mut term = DMat3::IDENTITY;
    for n in 1..=num_terms {
        term = term * k * ratio(n);
        sum += term;
    }
    sum
}

/// Exponential map: axis-angle vector -> rotation matrix.
///
/// # Arguments
///
/// * `aaxis` - The axis-angle vector `phi`. It is used as given, angles larger
///   than `pi` are not wrapped.
/// * `num_terms` - 0 for the closed form, otherwise the number of terms of the
///   power series `I + phi^ + phi^^2 / 2! + ...`.
///
/// Example:
///
/// ```
/// use lgmath::so3::vec2rot;
/// use glam::DVec3;
///
/// let c = vec2rot(DVec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2), 0);
/// assert!((c * DVec3::X - DVec3::Y).length() < 1e-12);
/// ```
pub fn vec2rot(aaxis: DVec3, num_terms: u32) -> DMat3 {
    let k = hat(aaxis);
    if num_terms > 0 {
        return power_series(k, num_terms, |n| 1.0 / n as f64);
    }

    let theta_sq = aaxis.length_squared();
    let theta = theta_sq.sqrt();
    if theta < ZERO_ANGLE_TOLERANCE {
        return DMat3::IDENTITY;
    }

    // C = I + sin(t)/t phi^ + (1 - cos(t))/t^2 phi^^2
    let (a, b) = if theta < SMALL_ANGLE_THRESHOLD {
        (1.0 - theta_sq / 6.0, 0.5 - theta_sq / 24.0)
    } else {
        (theta.sin() / theta, (1.0 - theta.cos()) / theta_sq)
    };

    DMat3::IDENTITY + k * a + (k * k) * b
}

/// Logarithmic map: rotation matrix -> axis-angle vector.
///
/// The result has norm in `[0, pi]`. At exactly `pi` only `+-axis` can be told
/// apart from the matrix, the sign returned then is the one whose dominant
/// component is positive.
///
/// The input is assumed to be close to SO(3) and is not validated.
pub fn rot2vec(c: DMat3) -> DVec3 {
    // C - C^T = 2 sin(t) axis^
    let two_sin_axis = vee(c - c.transpose());
    let sin_theta = 0.5 * two_sin_axis.length();
    let cos_theta = (0.5 * (trace(&c) - 1.0)).clamp(-1.0, 1.0);

    // same angle as acos(cos_theta), but well conditioned at both ends
    let theta = sin_theta.atan2(cos_theta);

    if theta < ZERO_ANGLE_TOLERANCE {
        return DVec3::ZERO;
    }

    if PI - theta < NEAR_PI_TOLERANCE {
        log::trace!("rot2vec: near-pi axis extraction, pi - theta = {:e}", PI - theta);
        return near_pi_axis(&c, cos_theta, two_sin_axis) * theta;
    }

    two_sin_axis * (theta / (2.0 * sin_theta))
}

/// Unit rotation axis of `c` read from its symmetric part.
///
/// `(C + C^T) / 2 = cos(t) I + (1 - cos(t)) axis axis^T`, so the column of
/// `axis axis^T` with the largest diagonal entry gives the best conditioned
/// estimate of the axis up to sign.
fn near_pi_axis(c: &DMat3, cos_theta: f64, two_sin_axis: DVec3) -> DVec3 {
    let sym = (*c + c.transpose()) * 0.5;
    let outer = (sym - DMat3::IDENTITY * cos_theta) * (1.0 / (1.0 - cos_theta));

    let diag = DVec3::new(outer.x_axis.x, outer.y_axis.y, outer.z_axis.z);
    let k = if diag.x >= diag.y && diag.x >= diag.z {
        0
    } else if diag.y >= diag.z {
        1
    } else {
        2
    };

    // column k is axis * axis[k], with axis[k]^2 = diag[k] >= 1/3
    let axis = (outer.col(k) / diag[k].sqrt()).normalize();

    // sin(t) >= 0 on [0, pi], so the skew part points along +axis
    if axis.dot(two_sin_axis) < 0.0 {
        -axis
    } else {
        axis
    }
}

/// Left Jacobian of SO(3).
///
/// `J = I + (1 - cos t)/t^2 phi^ + (t - sin t)/t^3 phi^^2`, or with `num_terms > 0`
/// the series `sum_n phi^^n / (n + 1)!`.
pub fn vec2jac(aaxis: DVec3, num_terms: u32) -> DMat3 {
    let k = hat(aaxis);
    if num_terms > 0 {
        return power_series(k, num_terms, |n| 1.0 / (n + 1) as f64);
    }

    let theta_sq = aaxis.length_squared();
    let theta = theta_sq.sqrt();
    if theta < ZERO_ANGLE_TOLERANCE {
        return DMat3::IDENTITY;
    }

    let (a, b) = if theta < SMALL_ANGLE_THRESHOLD {
        (0.5 - theta_sq / 24.0, 1.0 / 6.0 - theta_sq / 120.0)
    } else {
        (
            (1.0 - theta.cos()) / theta_sq,
            (theta - theta.sin()) / (theta_sq * theta),
        )
    };

    DMat3::IDENTITY + k * a + (k * k) * b
}

/// Inverse of the left Jacobian of SO(3).
///
/// `J^-1 = I - 1/2 phi^ + (1 - (t/2) cot(t/2))/t^2 phi^^2`, or with `num_terms > 0`
/// the Bernoulli series `sum_n B_n / n! phi^^n`. The closed form is singular at
/// `t = 2 pi`, which the logarithm never produces.
///
/// # Panics
///
/// If `num_terms` exceeds [`MAX_SERIES_TERMS`].
pub fn vec2jacinv(aaxis: DVec3, num_terms: u32) -> DMat3 {
    let k = hat(aaxis);
    if num_terms > 0 {
        assert!(
            num_terms <= MAX_SERIES_TERMS,
            "series inverse Jacobian supports at most {MAX_SERIES_TERMS} terms, got {num_terms}"
        );
        let mut sum = DMat3::IDENTITY;
        let mut term = DMat3::IDENTITY;
        for n in 1..=num_terms {
            term = term * k * (1.0 / n as f64);
            sum += term * BERNOULLI[n as usize];
        }
        return sum;
    }

    let theta_sq = aaxis.length_squared();
    let theta = theta_sq.sqrt();
    if theta < ZERO_ANGLE_TOLERANCE {
        return DMat3::IDENTITY;
    }

    let b = if theta < SMALL_ANGLE_THRESHOLD {
        1.0 / 12.0 + theta_sq / 720.0
    } else {
        let half = 0.5 * theta;
        (1.0 - half / half.tan()) / theta_sq
    };

    DMat3::IDENTITY - k * 0.5 + (k * k) * b
}

/// Snap a possibly drifted rotation matrix back onto SO(3).
///
/// With `force == false` the log-exp round trip only runs when `|det(C) - 1|`
/// exceeds [`DETERMINANT_TOLERANCE`], otherwise `c` is returned untouched.
pub fn reproject(c: DMat3, force: bool) -> DMat3 {
    let det = c.determinant();
    if force || (1.0 - det).abs() > DETERMINANT_TOLERANCE {
        log::debug!("reprojecting rotation onto SO(3), det = {det}");
        vec2rot(rot2vec(c), 0)
    } else {
        c
    }
}
