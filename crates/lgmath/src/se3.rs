//! # SE(3): rigid body transformations in 3D
//!
//! A transformation is kept as the pair `(C_ba, r_ab_inb)` and is equivalent to
//! the homogeneous matrix
//!
//! ```text
//! T_ba = | C_ba  r_ab_inb |
//!        |  0       1     |
//! ```
//!
//! Its Lie algebra element is the twist `xi = [rho; phi]`, translation first. The
//! exponential map is
//!
//! ```text
//! C = vec2rot(phi),  r = J(phi) rho
//! ```
//!
//! where `J` is the left Jacobian of SO(3), and the logarithm inverts it with
//! `J^-1`. The 6x6 adjoint transports twists between frames:
//! `T exp(xi^) T^-1 = exp((Ad(T) xi)^)`.

use crate::mat6;
use crate::so3::{self, BERNOULLI, MAX_SERIES_TERMS};
use crate::skew;
use crate::types::{
    join_twist, split_twist, DMat3, DMat4, DVec3, DVec4, Mat4x6F64, Mat6F64, Vec6F64,
};

/// Below this angle the coefficients of [`vec2q`] use their Taylor expansions.
///
/// The second coefficient loses `eps / t^2` to cancellation, so the switch sits
/// much higher than for the SO(3) maps.
const Q_TAYLOR_THRESHOLD: f64 = 1e-2;

/// Twist -> 4x4 Lie algebra matrix.
///
/// ```text
/// xi^ = | phi^  rho |
///       |  0     0  |
/// ```
pub fn hat(xi: &Vec6F64) -> DMat4 {
    let (rho, phi) = split_twist(xi);
    let k = skew::hat(phi);
    DMat4::from_cols(
        k.x_axis.extend(0.0),
        k.y_axis.extend(0.0),
        k.z_axis.extend(0.0),
        rho.extend(0.0),
    )
}

/// Twist -> 6x6 adjoint of the Lie algebra.
///
/// ```text
/// xi_curlyhat = | phi^  rho^ |
///               |  0    phi^ |
/// ```
pub fn curlyhat(xi: &Vec6F64) -> Mat6F64 {
    let (rho, phi) = split_twist(xi);
    let phi_hat = skew::hat(phi);
    mat6::from_blocks(phi_hat, skew::hat(rho), DMat3::ZERO, phi_hat)
}

/// Homogeneous point -> 4x6 matrix such that `xi^ p = point2fs(p) xi`.
///
/// For `p = [eps; eta]`:
///
/// ```text
/// | eta I  -eps^ |
/// |  0       0   |
/// ```
pub fn point2fs(p: DVec4) -> Mat4x6F64 {
    let eps_hat = skew::hat(p.truncate());
    let mut out = [[0.0; 6]; 4];
    for (i, row) in out.iter_mut().take(3).enumerate() {
        row[i] = p.w;
        let e = eps_hat.row(i);
        row[3] = -e.x;
        row[4] = -e.y;
        row[5] = -e.z;
    }
    out
}

/// Upper-right block `Q` of the SE(3) left Jacobian.
///
/// ```text
/// Q = 1/2 rho^
///   + (t - sin t)/t^3                    (phi^ rho^ + rho^ phi^ + phi^ rho^ phi^)
///   + (t^2 + 2 cos t - 2)/(2 t^4)        (phi^ phi^ rho^ + rho^ phi^ phi^ - 3 phi^ rho^ phi^)
///   + (2 t - 3 sin t + t cos t)/(2 t^5)  (phi^ rho^ phi^ phi^ + phi^ phi^ rho^ phi^)
/// ```
///
/// Near `t = 0` the three coefficients are replaced by their Taylor expansions.
pub fn vec2q(xi: &Vec6F64) -> DMat3 {
    let (rho, phi) = split_twist(xi);
    let rx = skew::hat(rho);
    let px = skew::hat(phi);

    let theta_sq = phi.length_squared();
    let theta = theta_sq.sqrt();

    let (a, b, c) = if theta < Q_TAYLOR_THRESHOLD {
        let theta_4 = theta_sq * theta_sq;
        (
            1.0 / 6.0 - theta_sq / 120.0 + theta_4 / 5040.0,
            1.0 / 24.0 - theta_sq / 720.0 + theta_4 / 40320.0,
            1.0 / 120.0 - theta_sq / 2520.0 + theta_4 / 120960.0,
        )
    } else {
        let (sin_t, cos_t) = theta.sin_cos();
        let theta_4 = theta_sq * theta_sq;
        (
            (theta - sin_t) / (theta_sq * theta),
            (theta_sq + 2.0 * cos_t - 2.0) / (2.0 * theta_4),
            (2.0 * theta - 3.0 * sin_t + theta * cos_t) / (2.0 * theta_4 * theta),
        )
    };

    let pxrx = px * rx;
    let rxpx = rx * px;
    let pxrxpx = pxrx * px;
    let pxpx = px * px;

    rx * 0.5
        + (pxrx + rxpx + pxrxpx) * a
        + (pxpx * rx + rxpx * px - pxrxpx * 3.0) * b
        + (pxrxpx * px + pxpx * rxpx) * c
}

/// Exponential map: twist -> `(C_ba, r_ab_inb)`.
///
/// # Arguments
///
/// * `xi` - The twist `[rho; phi]`.
/// * `num_terms` - 0 for the closed form, otherwise the number of terms of the
///   4x4 power series `sum_n (xi^)^n / n!`. The rotation block of that series is
///   exactly `so3::vec2rot(phi, num_terms)`.
pub fn vec2tran(xi: &Vec6F64, num_terms: u32) -> (DMat3, DVec3) {
    if num_terms > 0 {
        let x = hat(xi);
        let mut t = DMat4::IDENTITY;
        let mut term = DMat4::IDENTITY;
        for n in 1..=num_terms {
            term = term * x * (1.0 / n as f64);
            t += term;
        }
        return (DMat3::from_mat4(t), t.w_axis.truncate());
    }

    let (rho, phi) = split_twist(xi);
    let c_ba = so3::vec2rot(phi, 0);
    let r_ab_inb = so3::vec2jac(phi, 0) * rho;
    (c_ba, r_ab_inb)
}

/// Logarithmic map: `(C_ba, r_ab_inb)` -> twist `[rho; phi]`.
///
/// The rotational part inherits the near-zero and near-pi handling of
/// [`so3::rot2vec`], so `|phi| <= pi` and `J^-1(phi)` is always well defined.
pub fn tran2vec(c_ba: DMat3, r_ab_inb: DVec3) -> Vec6F64 {
    let phi = so3::rot2vec(c_ba);
    let rho = so3::vec2jacinv(phi, 0) * r_ab_inb;
    join_twist(rho, phi)
}

/// Left Jacobian of SE(3).
///
/// ```text
/// | J  Q |
/// | 0  J |
/// ```
///
/// With `num_terms > 0` the series `sum_n xi_curlyhat^n / (n + 1)!` is used.
pub fn vec2jac(xi: &Vec6F64, num_terms: u32) -> Mat6F64 {
    if num_terms > 0 {
        let k = curlyhat(xi);
        let mut sum = mat6::identity();
        let mut term = mat6::identity();
        for n in 1..=num_terms {
            term = mat6::scale(&mat6::mul(&term, &k), 1.0 / (n + 1) as f64);
            sum = mat6::add_scaled(&sum, &term, 1.0);
        }
        return sum;
    }

    let (_, phi) = split_twist(xi);
    let j = so3::vec2jac(phi, 0);
    mat6::from_blocks(j, vec2q(xi), DMat3::ZERO, j)
}

/// Inverse of the left Jacobian of SE(3).
///
/// ```text
/// | J^-1  -J^-1 Q J^-1 |
/// |  0        J^-1     |
/// ```
///
/// With `num_terms > 0` the Bernoulli series `sum_n B_n / n! xi_curlyhat^n` is used.
///
/// # Panics
///
/// If `num_terms` exceeds [`MAX_SERIES_TERMS`].
pub fn vec2jacinv(xi: &Vec6F64, num_terms: u32) -> Mat6F64 {
    if num_terms > 0 {
        assert!(
            num_terms <= MAX_SERIES_TERMS,
            "series inverse Jacobian supports at most {MAX_SERIES_TERMS} terms, got {num_terms}"
        );
        let k = curlyhat(xi);
        let mut sum = mat6::identity();
        let mut term = mat6::identity();
        for n in 1..=num_terms {
            term = mat6::scale(&mat6::mul(&term, &k), 1.0 / n as f64);
            sum = mat6::add_scaled(&sum, &term, BERNOULLI[n as usize]);
        }
        return sum;
    }

    let (_, phi) = split_twist(xi);
    let j_inv = so3::vec2jacinv(phi, 0);
    let q = vec2q(xi);
    mat6::from_blocks(j_inv, -(j_inv * q * j_inv), DMat3::ZERO, j_inv)
}

/// Adjoint of the transformation `(C_ba, r_ab_inb)`.
///
/// ```text
/// Ad(T) = | C  r^ C |
///         | 0    C  |
/// ```
pub fn tran_ad(c_ba: DMat3, r_ab_inb: DVec3) -> Mat6F64 {
    mat6::from_blocks(c_ba, skew::hat(r_ab_inb) * c_ba, DMat3::ZERO, c_ba)
}
