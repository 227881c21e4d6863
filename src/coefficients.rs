//! Winograd transform coefficient matrices and the shared scalar engine.
//!
//! The three transforms of each variant are two-sided products with fixed
//! rational matrices: filter `G·g·Gᵀ`, input `Bᵀ·d·B`, output `Aᵀ·m·A`. The
//! matrices are kept as named constants so the linear-algebra identity stays
//! auditable, and a single engine parameterized by the block size serves both
//! F(2,3) and F(4,3).

/// Filter transform matrix G for F(2,3). The kernels compute `G·g·Gᵀ` in
/// factored closed form; this constant documents the identity and anchors the
/// oracle tests.
#[allow(dead_code)]
pub(crate) const FILTER_2X3: [[f32; 3]; 4] = [
    [1.0, 0.0, 0.0],
    [0.5, 0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.0, 0.0, 1.0],
];

/// Input transform matrix Bᵀ for F(2,3).
pub(crate) const INPUT_2X3: [[f32; 4]; 4] = [
    [1.0, 0.0, -1.0, 0.0],
    [0.0, 1.0, 1.0, 0.0],
    [0.0, -1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0, -1.0],
];

/// Output transform matrix Aᵀ for F(2,3).
pub(crate) const OUTPUT_2X3: [[f32; 4]; 2] = [
    [1.0, 1.0, 1.0, 0.0],
    [0.0, 1.0, -1.0, -1.0],
];

/// Filter transform matrix G for F(4,3), denominators up to 24. Like
/// [`FILTER_2X3`], documentation and test oracle for the factored kernels.
#[allow(dead_code)]
pub(crate) const FILTER_4X3: [[f32; 3]; 6] = [
    [1.0 / 4.0, 0.0, 0.0],
    [-1.0 / 6.0, -1.0 / 6.0, -1.0 / 6.0],
    [-1.0 / 6.0, 1.0 / 6.0, -1.0 / 6.0],
    [1.0 / 24.0, 1.0 / 12.0, 1.0 / 6.0],
    [1.0 / 24.0, -1.0 / 12.0, 1.0 / 6.0],
    [0.0, 0.0, 1.0],
];

/// Input transform matrix Bᵀ for F(4,3).
pub(crate) const INPUT_4X3: [[f32; 6]; 6] = [
    [4.0, 0.0, -5.0, 0.0, 1.0, 0.0],
    [0.0, -4.0, -4.0, 1.0, 1.0, 0.0],
    [0.0, 4.0, -4.0, -1.0, 1.0, 0.0],
    [0.0, -2.0, -1.0, 2.0, 1.0, 0.0],
    [0.0, 2.0, -1.0, -2.0, 1.0, 0.0],
    [0.0, 4.0, 0.0, -5.0, 0.0, 1.0],
];

/// Output transform matrix Aᵀ for F(4,3).
pub(crate) const OUTPUT_4X3: [[f32; 6]; 4] = [
    [1.0, 1.0, 1.0, 1.0, 1.0, 0.0],
    [0.0, 1.0, -1.0, 2.0, -2.0, 0.0],
    [0.0, 1.0, 1.0, 4.0, 4.0, 0.0],
    [0.0, 1.0, -1.0, 8.0, -8.0, 1.0],
];

/// `a·t·aᵀ` with the vertical pass (combining tile rows) first.
///
/// Summation runs in matrix-column order so the result is bit-identical to
/// the batched input kernels, which also reduce rows before columns.
pub(crate) fn forward<const N: usize, const M: usize>(
    a: &[[f32; N]; M],
    t: &[[f32; N]; N],
) -> [[f32; M]; M] {
    let mut tmp = [[0.0f32; N]; M];
    for i in 0..M {
        for j in 0..N {
            let mut acc = 0.0f32;
            for k in 0..N {
                acc += a[i][k] * t[k][j];
            }
            tmp[i][j] = acc;
        }
    }
    let mut out = [[0.0f32; M]; M];
    for i in 0..M {
        for j in 0..M {
            let mut acc = 0.0f32;
            for k in 0..N {
                acc += tmp[i][k] * a[j][k];
            }
            out[i][j] = acc;
        }
    }
    out
}

/// `a·t·aᵀ` with the horizontal pass (reducing each tile row) first, matching
/// the summation order of the batched output kernels.
pub(crate) fn inverse<const N: usize, const M: usize>(
    a: &[[f32; N]; M],
    t: &[[f32; N]; N],
) -> [[f32; M]; M] {
    let mut tmp = [[0.0f32; M]; N];
    for k in 0..N {
        for j in 0..M {
            let mut acc = 0.0f32;
            for l in 0..N {
                acc += a[j][l] * t[k][l];
            }
            tmp[k][j] = acc;
        }
    }
    let mut out = [[0.0f32; M]; M];
    for i in 0..M {
        for j in 0..M {
            let mut acc = 0.0f32;
            for k in 0..N {
                acc += a[i][k] * tmp[k][j];
            }
            out[i][j] = acc;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_ones_tile_f23() {
        // Bᵀ·1·B concentrates an all-ones 4x4 tile into the (1,1) cell.
        let v = forward(&INPUT_2X3, &[[1.0; 4]; 4]);
        for i in 0..4 {
            for j in 0..4 {
                let want = if (i, j) == (1, 1) { 4.0 } else { 0.0 };
                assert_eq!(v[i][j], want, "cell ({i},{j})");
            }
        }
    }

    #[test]
    fn forward_ones_tile_f43() {
        let v = forward(&INPUT_4X3, &[[1.0; 6]; 6]);
        for i in 0..6 {
            for j in 0..6 {
                let want = if (i, j) == (1, 1) { 36.0 } else { 0.0 };
                assert_eq!(v[i][j], want, "cell ({i},{j})");
            }
        }
    }

    #[test]
    fn output_inverts_identity_product_f23() {
        // With the identity filter's transform as multiplier, input followed
        // by output must reproduce the tile interior.
        let d = [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ];
        let u = forward(&FILTER_2X3, &[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);
        let v = forward(&INPUT_2X3, &d);
        let mut m = [[0.0f32; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                m[i][j] = u[i][j] * v[i][j];
            }
        }
        let out = inverse(&OUTPUT_2X3, &m);
        for i in 0..2 {
            for j in 0..2 {
                assert!((out[i][j] - d[i + 1][j + 1]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn output_inverts_identity_product_f43() {
        let mut d = [[0.0f32; 6]; 6];
        for (i, row) in d.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (i * 6 + j) as f32 * 0.25 - 3.0;
            }
        }
        let u = forward(&FILTER_4X3, &[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);
        let v = forward(&INPUT_4X3, &d);
        let mut m = [[0.0f32; 6]; 6];
        for i in 0..6 {
            for j in 0..6 {
                m[i][j] = u[i][j] * v[i][j];
            }
        }
        let out = inverse(&OUTPUT_4X3, &m);
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (out[i][j] - d[i + 1][j + 1]).abs() < 1e-4,
                    "({i},{j}): {} vs {}",
                    out[i][j],
                    d[i + 1][j + 1]
                );
            }
        }
    }
}
