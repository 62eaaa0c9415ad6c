//! Minimal arithmetic on row-major 6x6 matrices.
//!
//! glam stops at four dimensions, so adjoints and SE(3) Jacobians are built
//! block-wise from 3x3 pieces and combined with these helpers.

use crate::types::{DMat3, Mat6F64, Vec6F64};

/// The 6x6 zero matrix.
pub const ZERO: Mat6F64 = [[0.0; 6]; 6];

/// The 6x6 identity matrix.
pub fn identity() -> Mat6F64 {
    let mut m = ZERO;
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

/// Build a matrix from four 3x3 blocks `[[tl, tr], [bl, br]]`.
pub fn from_blocks(tl: DMat3, tr: DMat3, bl: DMat3, br: DMat3) -> Mat6F64 {
    let mut m = ZERO;
    set_block(&mut m, 0, 0, tl);
    set_block(&mut m, 0, 3, tr);
    set_block(&mut m, 3, 0, bl);
    set_block(&mut m, 3, 3, br);
    m
}

/// Write a 3x3 block with its top-left corner at `(row, col)`.
///
/// PRECONDITION: `row` and `col` are 0 or 3.
pub fn set_block(m: &mut Mat6F64, row: usize, col: usize, block: DMat3) {
    for j in 0..3 {
        let c = block.col(j);
        m[row][col + j] = c.x;
        m[row + 1][col + j] = c.y;
        m[row + 2][col + j] = c.z;
    }
}

/// Read the 3x3 block with its top-left corner at `(row, col)`.
pub fn block(m: &Mat6F64, row: usize, col: usize) -> DMat3 {
    DMat3::from_cols_array(&[
        m[row][col],
        m[row + 1][col],
        m[row + 2][col],
        m[row][col + 1],
        m[row + 1][col + 1],
        m[row + 2][col + 1],
        m[row][col + 2],
        m[row + 1][col + 2],
        m[row + 2][col + 2],
    ])
}

/// Matrix product `a * b`.
pub fn mul(a: &Mat6F64, b: &Mat6F64) -> Mat6F64 {
    let mut out = ZERO;
    for (i, out_row) in out.iter_mut().enumerate() {
        for (j, out_ij) in out_row.iter_mut().enumerate() {
            *out_ij = (0..6).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Matrix-vector product `a * v`.
pub fn mul_vec(a: &Mat6F64, v: &Vec6F64) -> Vec6F64 {
    let mut out = [0.0; 6];
    for (out_i, row) in out.iter_mut().zip(a.iter()) {
        *out_i = row.iter().zip(v.iter()).map(|(x, y)| x * y).sum();
    }
    out
}

/// Element-wise `a + s * b`.
pub fn add_scaled(a: &Mat6F64, b: &Mat6F64, s: f64) -> Mat6F64 {
    let mut out = *a;
    for (out_row, b_row) in out.iter_mut().zip(b.iter()) {
        for (x, y) in out_row.iter_mut().zip(b_row.iter()) {
            *x += s * y;
        }
    }
    out
}

/// Element-wise scale `s * a`.
pub fn scale(a: &Mat6F64, s: f64) -> Mat6F64 {
    add_scaled(&ZERO, a, s)
}

/// Largest absolute element-wise difference between `a` and `b`.
pub fn max_abs_diff(a: &Mat6F64, b: &Mat6F64) -> f64 {
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
