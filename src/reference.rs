//! Portable one-tile-at-a-time transform paths.
//!
//! These are the fallback behind the batched kernels' size guards, the
//! remainder loop of the filter transforms, and the only implementation of
//! the F(4,3) input/output transforms in this vector-width variant. The
//! filter kernels keep the same factored summation order as the batched ones
//! so mixed batch/remainder calls stay bit-identical.

use crate::coefficients::{forward, inverse};
use crate::geometry::TileGeometry;

/// F(2,3) transform of one 3x3 filter into 16 cells at `dst[cell * stride]`.
pub(crate) fn set_filter1_2x3(src: &[f32], dst: &mut [f32], stride: usize) {
    let s = &src[..9];
    dst[0] = s[0];
    let a02 = s[0] + s[2];
    dst[stride] = (a02 + s[1]) * 0.5;
    dst[2 * stride] = (a02 - s[1]) * 0.5;
    dst[3 * stride] = s[2];

    let a036 = (s[0] + s[6]) + s[3];
    dst[4 * stride] = a036 * 0.5;
    let a258 = (s[2] + s[8]) + s[5];
    let a147 = (s[1] + s[7]) + s[4];
    dst[5 * stride] = ((a036 + a258) + a147) * 0.25;
    dst[6 * stride] = ((a036 + a258) - a147) * 0.25;
    dst[7 * stride] = a258 * 0.5;

    let s036 = (s[0] + s[6]) - s[3];
    dst[8 * stride] = s036 * 0.5;
    let s258 = (s[2] + s[8]) - s[5];
    let s147 = (s[1] + s[7]) - s[4];
    dst[9 * stride] = ((s036 + s258) + s147) * 0.25;
    dst[10 * stride] = ((s036 + s258) - s147) * 0.25;
    dst[11 * stride] = s258 * 0.5;

    dst[12 * stride] = s[6];
    let a68 = s[6] + s[8];
    dst[13 * stride] = (a68 + s[7]) * 0.5;
    dst[14 * stride] = (a68 - s[7]) * 0.5;
    dst[15 * stride] = s[8];
}

const R4: f32 = 1.0 / 4.0;
const R6: f32 = 1.0 / 6.0;
const MR6: f32 = -1.0 / 6.0;
const R12: f32 = 1.0 / 12.0;
const R24: f32 = 1.0 / 24.0;

/// One row-transform of the F(4,3) filter: 3 inputs to 6 cells.
#[inline(always)]
fn set_filter1_4x3_row(t: [f32; 3], dst: &mut [f32], base: usize, stride: usize) {
    dst[base] = R4 * t[0];
    let t0 = t[0] + t[2];
    dst[base + stride] = MR6 * (t0 + t[1]);
    dst[base + 2 * stride] = MR6 * (t0 - t[1]);
    let t1 = R24 * t[0] + R6 * t[2];
    let t2 = R12 * t[1];
    dst[base + 3 * stride] = t1 + t2;
    dst[base + 4 * stride] = t1 - t2;
    dst[base + 5 * stride] = t[2];
}

/// F(4,3) transform of one 3x3 filter into 36 cells at `dst[cell * stride]`.
pub(crate) fn set_filter1_4x3(src: &[f32], dst: &mut [f32], stride: usize) {
    let s = &src[..9];
    set_filter1_4x3_row([R4 * s[0], R4 * s[1], R4 * s[2]], dst, 0, stride);
    set_filter1_4x3_row(
        [
            MR6 * ((s[0] + s[3]) + s[6]),
            MR6 * ((s[1] + s[4]) + s[7]),
            MR6 * ((s[2] + s[5]) + s[8]),
        ],
        dst,
        6 * stride,
        stride,
    );
    set_filter1_4x3_row(
        [
            MR6 * ((s[0] - s[3]) + s[6]),
            MR6 * ((s[1] - s[4]) + s[7]),
            MR6 * ((s[2] - s[5]) + s[8]),
        ],
        dst,
        12 * stride,
        stride,
    );
    set_filter1_4x3_row(
        [
            (R24 * s[0] + R12 * s[3]) + R6 * s[6],
            (R24 * s[1] + R12 * s[4]) + R6 * s[7],
            (R24 * s[2] + R12 * s[5]) + R6 * s[8],
        ],
        dst,
        18 * stride,
        stride,
    );
    set_filter1_4x3_row(
        [
            (R24 * s[0] - R12 * s[3]) + R6 * s[6],
            (R24 * s[1] - R12 * s[4]) + R6 * s[7],
            (R24 * s[2] - R12 * s[5]) + R6 * s[8],
        ],
        dst,
        24 * stride,
        stride,
    );
    set_filter1_4x3_row([s[6], s[7], s[8]], dst, 30 * stride, stride);
}

/// Input transform over every tile of every channel, gathering each K x K
/// window with zero substitution for out-of-range samples. Works for any
/// geometry, including images too small for the batched path.
pub(crate) fn set_input<const K: usize>(
    bt: &[[f32; K]; K],
    src: &[f32],
    channels: usize,
    height: usize,
    width: usize,
    dst: &mut [f32],
    pad: bool,
) {
    let geo = TileGeometry::new(height, width, K - 2, pad);
    let shift = if pad { 1isize } else { 0 };
    let blocks_per_channel = geo.tile_height * geo.tile_width;
    for c in 0..channels {
        let plane = &src[c * height * width..][..height * width];
        for ty in 0..geo.tile_height {
            for tx in 0..geo.tile_width {
                let r0 = (ty * (K - 2)) as isize - shift;
                let c0 = (tx * (K - 2)) as isize - shift;
                let mut d = [[0.0f32; K]; K];
                for (i, row) in d.iter_mut().enumerate() {
                    let rr = r0 + i as isize;
                    if rr < 0 || rr >= height as isize {
                        continue;
                    }
                    let line = &plane[rr as usize * width..][..width];
                    for (j, v) in row.iter_mut().enumerate() {
                        let cc = c0 + j as isize;
                        if cc >= 0 && cc < width as isize {
                            *v = line[cc as usize];
                        }
                    }
                }
                let v = forward(bt, &d);
                let base = (c * blocks_per_channel + ty * geo.tile_width + tx) * K * K;
                for i in 0..K {
                    for j in 0..K {
                        dst[base + i * K + j] = v[i][j];
                    }
                }
            }
        }
    }
}

/// Output transform over every tile, clipping the final partial row/column so
/// nothing beyond `dst_height` x `dst_width` is written.
pub(crate) fn set_output<const K: usize, const M: usize>(
    at: &[[f32; K]; M],
    src: &[f32],
    dst: &mut [f32],
    channels: usize,
    dst_height: usize,
    dst_width: usize,
) {
    let tile_height = (dst_height + M - 1) / M;
    let tile_width = (dst_width + M - 1) / M;
    let blocks_per_channel = tile_height * tile_width;
    for c in 0..channels {
        for ty in 0..tile_height {
            for tx in 0..tile_width {
                let base = (c * blocks_per_channel + ty * tile_width + tx) * K * K;
                let mut m = [[0.0f32; K]; K];
                for (i, row) in m.iter_mut().enumerate() {
                    for (j, v) in row.iter_mut().enumerate() {
                        *v = src[base + i * K + j];
                    }
                }
                let out = inverse(at, &m);
                let row_end = M.min(dst_height - ty * M);
                let col_end = M.min(dst_width - tx * M);
                for (i, row) in out.iter().enumerate().take(row_end) {
                    let line = c * dst_height * dst_width + (ty * M + i) * dst_width + tx * M;
                    for (j, v) in row.iter().enumerate().take(col_end) {
                        dst[line + j] = *v;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::{FILTER_2X3, FILTER_4X3};

    #[test]
    fn identity_filter_cells_f23() {
        let g = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let mut u = [0.0f32; 16];
        set_filter1_2x3(&g, &mut u, 1);
        let mut want = [0.0f32; 16];
        want[5] = 0.25;
        want[6] = -0.25;
        want[9] = -0.25;
        want[10] = 0.25;
        assert_eq!(u, want);
    }

    #[test]
    fn zero_filter_transforms_to_zero() {
        let g = [0.0f32; 9];
        let mut u = [1.0f32; 16];
        set_filter1_2x3(&g, &mut u, 1);
        assert_eq!(u, [0.0f32; 16]);
        let mut u = [1.0f32; 36];
        set_filter1_4x3(&g, &mut u, 1);
        assert_eq!(u, [0.0f32; 36]);
    }

    #[test]
    fn filter_transform_is_linear() {
        let f1 = [0.3, -1.2, 0.7, 2.0, 0.1, -0.4, 1.5, -0.9, 0.2];
        let f2 = [1.1, 0.6, -2.3, 0.0, -0.8, 1.9, 0.4, 0.5, -1.0];
        let (a, b) = (2.5f32, -0.75f32);
        let mut combined = [0.0f32; 9];
        for i in 0..9 {
            combined[i] = a * f1[i] + b * f2[i];
        }
        let mut u1 = [0.0f32; 16];
        let mut u2 = [0.0f32; 16];
        let mut uc = [0.0f32; 16];
        set_filter1_2x3(&f1, &mut u1, 1);
        set_filter1_2x3(&f2, &mut u2, 1);
        set_filter1_2x3(&combined, &mut uc, 1);
        for i in 0..16 {
            assert!((uc[i] - (a * u1[i] + b * u2[i])).abs() < 1e-4, "cell {i}");
        }
    }

    #[test]
    fn closed_form_filter_matches_matrix_f23() {
        let g = [0.5, -1.5, 2.0, 0.25, 1.0, -0.75, 3.0, 0.125, -2.25];
        let mut u = [0.0f32; 16];
        set_filter1_2x3(&g, &mut u, 1);
        let tile = [
            [g[0], g[1], g[2]],
            [g[3], g[4], g[5]],
            [g[6], g[7], g[8]],
        ];
        // G·g·Gᵀ written as forward() over a padded 3x3 "tile" does not fit
        // the square engine, so expand by hand.
        let mut want = [[0.0f32; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                let mut acc = 0.0;
                for k in 0..3 {
                    for l in 0..3 {
                        acc += FILTER_2X3[i][k] * tile[k][l] * FILTER_2X3[j][l];
                    }
                }
                want[i][j] = acc;
            }
        }
        for i in 0..4 {
            for j in 0..4 {
                assert!((u[i * 4 + j] - want[i][j]).abs() < 1e-5, "cell ({i},{j})");
            }
        }
    }

    #[test]
    fn closed_form_filter_matches_matrix_f43() {
        let g = [0.5, -1.5, 2.0, 0.25, 1.0, -0.75, 3.0, 0.125, -2.25];
        let mut u = [0.0f32; 36];
        set_filter1_4x3(&g, &mut u, 1);
        let tile = [
            [g[0], g[1], g[2]],
            [g[3], g[4], g[5]],
            [g[6], g[7], g[8]],
        ];
        for i in 0..6 {
            for j in 0..6 {
                let mut acc = 0.0;
                for k in 0..3 {
                    for l in 0..3 {
                        acc += FILTER_4X3[i][k] * tile[k][l] * FILTER_4X3[j][l];
                    }
                }
                assert!((u[i * 6 + j] - acc).abs() < 1e-5, "cell ({i},{j})");
            }
        }
    }

    #[test]
    fn filter_transform_respects_output_stride() {
        let g = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let mut packed = [0.0f32; 16];
        let mut strided = [0.0f32; 48];
        set_filter1_2x3(&g, &mut packed, 1);
        set_filter1_2x3(&g, &mut strided, 3);
        for cell in 0..16 {
            assert_eq!(packed[cell], strided[cell * 3]);
        }
    }
}
