//! 4-lane batched transform kernels using the `wide` crate.
//!
//! Four independent tiles (or filters) ride the four lanes of an `f32x4`, so
//! one pass of the scalar recurrence transforms the whole batch. Body kernels
//! assume a full batch of in-range data; edge kernels substitute zeros for
//! out-of-range rows/columns per [`PadKind`] and mask partial stores, which is
//! why the callers guard on minimum spatial sizes before dispatching here.
//!
//! The `wide` crate lowers to SSE2/NEON/WASM SIMD where available and scalar
//! code elsewhere; results are bit-identical to the reference path either way.

use wide::f32x4;

use crate::geometry::{align_lo, PadKind, TileGeometry};

#[inline(always)]
fn store4(dst: &mut [f32], base: usize, v: f32x4) {
    dst[base..base + 4].copy_from_slice(&v.to_array());
}

/// Transposes four 4-lane rows: output `i` holds lane `i` of every input.
#[inline(always)]
fn transpose4(m: [f32x4; 4]) -> [f32x4; 4] {
    let a = m[0].to_array();
    let b = m[1].to_array();
    let c = m[2].to_array();
    let d = m[3].to_array();
    [
        f32x4::new([a[0], b[0], c[0], d[0]]),
        f32x4::new([a[1], b[1], c[1], d[1]]),
        f32x4::new([a[2], b[2], c[2], d[2]]),
        f32x4::new([a[3], b[3], c[3], d[3]]),
    ]
}

// ---------------------------------------------------------------------------
// Filter transform
// ---------------------------------------------------------------------------

/// Gathers each tap of four consecutive 3x3 filters into one vector per tap.
#[inline(always)]
fn filter_taps(src: &[f32]) -> [f32x4; 9] {
    let mut s = [f32x4::splat(0.0); 9];
    for (k, tap) in s.iter_mut().enumerate() {
        *tap = f32x4::new([src[k], src[9 + k], src[18 + k], src[27 + k]]);
    }
    s
}

/// F(2,3) transform of four filters at once; cell `k` of lane `l` lands at
/// `dst[k * stride + l]`.
pub(crate) fn set_filter4_2x3(src: &[f32], dst: &mut [f32], stride: usize) {
    let r2 = f32x4::splat(0.5);
    let r4 = f32x4::splat(0.25);
    let s = filter_taps(src);

    store4(dst, 0, s[0]);
    let a02 = s[0] + s[2];
    store4(dst, stride, (a02 + s[1]) * r2);
    store4(dst, 2 * stride, (a02 - s[1]) * r2);
    store4(dst, 3 * stride, s[2]);

    let a036 = (s[0] + s[6]) + s[3];
    store4(dst, 4 * stride, a036 * r2);
    let a258 = (s[2] + s[8]) + s[5];
    let a147 = (s[1] + s[7]) + s[4];
    store4(dst, 5 * stride, ((a036 + a258) + a147) * r4);
    store4(dst, 6 * stride, ((a036 + a258) - a147) * r4);
    store4(dst, 7 * stride, a258 * r2);

    let s036 = (s[0] + s[6]) - s[3];
    store4(dst, 8 * stride, s036 * r2);
    let s258 = (s[2] + s[8]) - s[5];
    let s147 = (s[1] + s[7]) - s[4];
    store4(dst, 9 * stride, ((s036 + s258) + s147) * r4);
    store4(dst, 10 * stride, ((s036 + s258) - s147) * r4);
    store4(dst, 11 * stride, s258 * r2);

    store4(dst, 12 * stride, s[6]);
    let a68 = s[6] + s[8];
    store4(dst, 13 * stride, (a68 + s[7]) * r2);
    store4(dst, 14 * stride, (a68 - s[7]) * r2);
    store4(dst, 15 * stride, s[8]);
}

#[inline(always)]
fn set_filter4_4x3_row(t: [f32x4; 3], dst: &mut [f32], base: usize, stride: usize) {
    let r4 = f32x4::splat(1.0 / 4.0);
    let r6 = f32x4::splat(1.0 / 6.0);
    let mr6 = f32x4::splat(-1.0 / 6.0);
    let r12 = f32x4::splat(1.0 / 12.0);
    let r24 = f32x4::splat(1.0 / 24.0);
    store4(dst, base, r4 * t[0]);
    let t0 = t[0] + t[2];
    store4(dst, base + stride, mr6 * (t0 + t[1]));
    store4(dst, base + 2 * stride, mr6 * (t0 - t[1]));
    let t1 = r24 * t[0] + r6 * t[2];
    let t2 = r12 * t[1];
    store4(dst, base + 3 * stride, t1 + t2);
    store4(dst, base + 4 * stride, t1 - t2);
    store4(dst, base + 5 * stride, t[2]);
}

/// F(4,3) transform of four filters at once, 36 cells per lane.
pub(crate) fn set_filter4_4x3(src: &[f32], dst: &mut [f32], stride: usize) {
    let r4 = f32x4::splat(1.0 / 4.0);
    let r6 = f32x4::splat(1.0 / 6.0);
    let mr6 = f32x4::splat(-1.0 / 6.0);
    let r12 = f32x4::splat(1.0 / 12.0);
    let r24 = f32x4::splat(1.0 / 24.0);
    let s = filter_taps(src);

    set_filter4_4x3_row([r4 * s[0], r4 * s[1], r4 * s[2]], dst, 0, stride);
    set_filter4_4x3_row(
        [
            mr6 * ((s[0] + s[3]) + s[6]),
            mr6 * ((s[1] + s[4]) + s[7]),
            mr6 * ((s[2] + s[5]) + s[8]),
        ],
        dst,
        6 * stride,
        stride,
    );
    set_filter4_4x3_row(
        [
            mr6 * ((s[0] - s[3]) + s[6]),
            mr6 * ((s[1] - s[4]) + s[7]),
            mr6 * ((s[2] - s[5]) + s[8]),
        ],
        dst,
        12 * stride,
        stride,
    );
    set_filter4_4x3_row(
        [
            (r24 * s[0] + r12 * s[3]) + r6 * s[6],
            (r24 * s[1] + r12 * s[4]) + r6 * s[7],
            (r24 * s[2] + r12 * s[5]) + r6 * s[8],
        ],
        dst,
        18 * stride,
        stride,
    );
    set_filter4_4x3_row(
        [
            (r24 * s[0] - r12 * s[3]) + r6 * s[6],
            (r24 * s[1] - r12 * s[4]) + r6 * s[7],
            (r24 * s[2] - r12 * s[5]) + r6 * s[8],
        ],
        dst,
        24 * stride,
        stride,
    );
    set_filter4_4x3_row([s[6], s[7], s[8]], dst, 30 * stride, stride);
}

// ---------------------------------------------------------------------------
// F(2,3) input transform
// ---------------------------------------------------------------------------

/// Ten consecutive samples feed a batch of four overlapping 4-wide windows.
/// `base` indexes the first in-range sample; `pad` says which conceptual
/// samples are out of range and must read as zero.
#[inline(always)]
fn load_row10(plane: &[f32], base: usize, pad: PadKind) -> [f32; 10] {
    let mut w = [0.0f32; 10];
    match pad {
        PadKind::None => w.copy_from_slice(&plane[base..base + 10]),
        PadKind::Nose1 => w[1..10].copy_from_slice(&plane[base..base + 9]),
        PadKind::Tail1 => w[..9].copy_from_slice(&plane[base..base + 9]),
        PadKind::Tail2 => w[..8].copy_from_slice(&plane[base..base + 8]),
    }
    w
}

/// Regroups one window row so vector `j` holds sample `j` of all four tiles.
#[inline(always)]
fn interleave_row(w: &[f32; 10]) -> [f32x4; 4] {
    [
        f32x4::new([w[0], w[2], w[4], w[6]]),
        f32x4::new([w[1], w[3], w[5], w[7]]),
        f32x4::new([w[2], w[4], w[6], w[8]]),
        f32x4::new([w[3], w[5], w[7], w[9]]),
    ]
}

/// Bᵀ·d·B across the batch: vertical pass over the four window rows, then the
/// same pattern horizontally over the four samples.
#[inline(always)]
fn input_transform4(t: &[[f32x4; 4]; 4]) -> [[f32x4; 4]; 4] {
    let mut p = [[f32x4::splat(0.0); 4]; 4];
    for j in 0..4 {
        p[0][j] = t[0][j] - t[2][j];
        p[1][j] = t[1][j] + t[2][j];
        p[2][j] = t[2][j] - t[1][j];
        p[3][j] = t[1][j] - t[3][j];
    }
    let mut v = [[f32x4::splat(0.0); 4]; 4];
    for i in 0..4 {
        v[i][0] = p[i][0] - p[i][2];
        v[i][1] = p[i][1] + p[i][2];
        v[i][2] = p[i][2] - p[i][1];
        v[i][3] = p[i][1] - p[i][3];
    }
    v
}

/// Scatters the batch into four contiguous 16-value tile blocks.
#[inline(always)]
fn store_tiles4(v: &[[f32x4; 4]; 4], dst: &mut [f32], base: usize) {
    for (i, row) in v.iter().enumerate() {
        let per_tile = transpose4(*row);
        for (tile, cells) in per_tile.iter().enumerate() {
            store4(dst, base + tile * 16 + i * 4, *cells);
        }
    }
}

/// Transforms four horizontally adjacent fully in-range tiles.
#[inline(always)]
fn set_input4_body(plane: &[f32], base: usize, stride: usize, dst: &mut [f32], dst_base: usize) {
    let mut t = [[f32x4::splat(0.0); 4]; 4];
    for (k, row) in t.iter_mut().enumerate() {
        let w = load_row10(plane, base + k * stride, PadKind::None);
        *row = interleave_row(&w);
    }
    store_tiles4(&input_transform4(&t), dst, dst_base);
}

/// Transforms a boundary batch: `row_pad` zeroes whole window rows, `col_pad`
/// zeroes the out-of-range samples of each loaded row. `base` indexes the
/// first in-range sample of the first in-range row.
#[inline(always)]
fn set_input4_edge(
    plane: &[f32],
    base: usize,
    stride: usize,
    row_pad: PadKind,
    col_pad: PadKind,
    dst: &mut [f32],
    dst_base: usize,
) {
    let mut t = [[f32x4::splat(0.0); 4]; 4];
    for (k, row) in t.iter_mut().enumerate() {
        let in_range = match row_pad {
            PadKind::None => true,
            PadKind::Nose1 => k > 0,
            PadKind::Tail1 => k < 3,
            PadKind::Tail2 => k < 2,
        };
        if in_range {
            let row_index = if row_pad == PadKind::Nose1 { k - 1 } else { k };
            let w = load_row10(plane, base + row_index * stride, col_pad);
            *row = interleave_row(&w);
        }
    }
    store_tiles4(&input_transform4(&t), dst, dst_base);
}

/// Batched F(2,3) input transform. Caller guarantees `height >= 4` and
/// `width >= 10` so every batch has room for its over-wide loads.
pub(crate) fn set_input_2x3(
    src: &[f32],
    channels: usize,
    height: usize,
    width: usize,
    dst: &mut [f32],
    pad: bool,
) {
    let geo = TileGeometry::new(height, width, 2, pad);
    let (dst_h, dst_w) = (geo.dst_height, geo.dst_width);
    let (tile_h, tile_w) = (geo.tile_height, geo.tile_width);
    let row_pad = geo.row_pad();
    let col_pad = geo.col_pad();
    // With padding the trailing aligned band still needs tail zeroing, so it
    // is carved out of the body range.
    let mut dst_h2 = geo.aligned_height;
    if pad && dst_h2 == dst_h {
        dst_h2 -= 2;
    }
    let mut dst_w8 = align_lo(dst_w, 8);
    if pad && dst_w8 == dst_w {
        dst_w8 -= 8;
    }
    let tail_col = if geo.aligned_width < dst_w { dst_w - 7 } else { dst_w - 8 };
    let tail_row = if geo.aligned_height < dst_h { dst_h - 1 } else { dst_h - 2 };
    let special_col_tail = dst_w8 < dst_w || pad;
    let special_row_tail = geo.aligned_height < dst_h || pad;
    let blocks = tile_h * tile_w;

    for c in 0..channels {
        let plane = &src[c * height * width..][..height * width];
        let dst_c = c * blocks * 16;
        let mut row = 0usize;
        let mut tile_y = 0usize;
        if pad {
            // Top band: the conceptual first window row is padding.
            let d_row = dst_c;
            set_input4_edge(plane, 0, width, PadKind::Nose1, PadKind::Nose1, dst, d_row);
            let mut col = 8;
            while col < dst_w8 {
                set_input4_edge(
                    plane,
                    col - 1,
                    width,
                    PadKind::Nose1,
                    PadKind::None,
                    dst,
                    d_row + (col / 2) * 16,
                );
                col += 8;
            }
            if special_col_tail {
                set_input4_edge(
                    plane,
                    tail_col - 1,
                    width,
                    PadKind::Nose1,
                    col_pad,
                    dst,
                    d_row + (tile_w - 4) * 16,
                );
            }
            row = 2;
            tile_y = 1;
        }
        while row < dst_h2 {
            let base_row = if pad { row - 1 } else { row };
            let d_row = dst_c + tile_y * tile_w * 16;
            let mut col = 0usize;
            if pad {
                set_input4_edge(
                    plane,
                    base_row * width,
                    width,
                    PadKind::None,
                    PadKind::Nose1,
                    dst,
                    d_row,
                );
                col = 8;
            }
            while col < dst_w8 {
                let base_col = if pad { col - 1 } else { col };
                set_input4_body(
                    plane,
                    base_row * width + base_col,
                    width,
                    dst,
                    d_row + (col / 2) * 16,
                );
                col += 8;
            }
            if special_col_tail {
                let base_col = if pad { tail_col - 1 } else { tail_col };
                set_input4_edge(
                    plane,
                    base_row * width + base_col,
                    width,
                    PadKind::None,
                    col_pad,
                    dst,
                    d_row + (tile_w - 4) * 16,
                );
            }
            row += 2;
            tile_y += 1;
        }
        if special_row_tail {
            let base_row = if pad { tail_row - 1 } else { tail_row };
            let d_row = dst_c + (tile_h - 1) * tile_w * 16;
            let mut col = 0usize;
            if pad {
                set_input4_edge(plane, base_row * width, width, row_pad, PadKind::Nose1, dst, d_row);
                col = 8;
            }
            while col < dst_w8 {
                let base_col = if pad { col - 1 } else { col };
                set_input4_edge(
                    plane,
                    base_row * width + base_col,
                    width,
                    row_pad,
                    PadKind::None,
                    dst,
                    d_row + (col / 2) * 16,
                );
                col += 8;
            }
            if special_col_tail {
                let base_col = if pad { tail_col - 1 } else { tail_col };
                set_input4_edge(
                    plane,
                    base_row * width + base_col,
                    width,
                    row_pad,
                    col_pad,
                    dst,
                    d_row + (tile_w - 4) * 16,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// F(2,3) output transform
// ---------------------------------------------------------------------------

/// Reduces cell row `r` of four consecutive tile blocks to the (sum, diff)
/// pair of the output row transform, one tile per lane.
#[inline(always)]
fn output_load_pair(src: &[f32], base: usize, r: usize) -> [f32x4; 2] {
    let cell = |c: usize| {
        f32x4::new([
            src[base + r * 4 + c],
            src[base + 16 + r * 4 + c],
            src[base + 32 + r * 4 + c],
            src[base + 48 + r * 4 + c],
        ])
    };
    let s0 = cell(0);
    let s1 = cell(1);
    let s2 = cell(2);
    let s3 = cell(3);
    [(s0 + s1) + s2, (s1 - s2) - s3]
}

#[inline(always)]
fn interleave_pair(a: f32x4, b: f32x4) -> (f32x4, f32x4) {
    let a = a.to_array();
    let b = b.to_array();
    (
        f32x4::new([a[0], b[0], a[1], b[1]]),
        f32x4::new([a[2], b[2], a[3], b[3]]),
    )
}

/// Aᵀ·m·A for four adjacent tiles, returning the two output rows as two
/// 4-column halves each, already in spatial order.
#[inline(always)]
fn output_transform4(src: &[f32], base: usize) -> [f32x4; 4] {
    let t0 = output_load_pair(src, base, 0);
    let t1 = output_load_pair(src, base, 1);
    let t2 = output_load_pair(src, base, 2);
    let t3 = output_load_pair(src, base, 3);
    let c0 = (t0[0] + t1[0]) + t2[0];
    let c1 = (t0[1] + t1[1]) + t2[1];
    let c2 = (t1[0] - t2[0]) - t3[0];
    let c3 = (t1[1] - t2[1]) - t3[1];
    let (r0_lo, r0_hi) = interleave_pair(c0, c1);
    let (r1_lo, r1_hi) = interleave_pair(c2, c3);
    [r0_lo, r0_hi, r1_lo, r1_hi]
}

/// Stores two full 8-column output rows of an interior batch.
#[inline(always)]
fn set_output4_body(src: &[f32], base: usize, dst: &mut [f32], dst_base: usize, stride: usize) {
    let d = output_transform4(src, base);
    store4(dst, dst_base, d[0]);
    store4(dst, dst_base + 4, d[1]);
    store4(dst, dst_base + stride, d[2]);
    store4(dst, dst_base + stride + 4, d[3]);
}

/// Boundary batch: the trailing half-store writes only `tail_lanes` columns,
/// and the second output row is suppressed for the final partial tile row.
#[inline(always)]
fn set_output4_edge(
    src: &[f32],
    base: usize,
    dst: &mut [f32],
    dst_base: usize,
    stride: usize,
    second_row: bool,
    tail_lanes: usize,
) {
    let d = output_transform4(src, base);
    store4(dst, dst_base, d[0]);
    dst[dst_base + 4..dst_base + 4 + tail_lanes].copy_from_slice(&d[1].to_array()[..tail_lanes]);
    if second_row {
        let dst_base = dst_base + stride;
        store4(dst, dst_base, d[2]);
        dst[dst_base + 4..dst_base + 4 + tail_lanes]
            .copy_from_slice(&d[3].to_array()[..tail_lanes]);
    }
}

/// Batched F(2,3) output transform. Caller guarantees `dst_height >= 2` and
/// `dst_width >= 8` so a full batch of four tiles always exists.
pub(crate) fn set_output_2x3(
    src: &[f32],
    dst: &mut [f32],
    channels: usize,
    dst_height: usize,
    dst_width: usize,
) {
    let tile_h = (dst_height + 1) / 2;
    let tile_w = (dst_width + 1) / 2;
    let dst_h2 = align_lo(dst_height, 2);
    let dst_w2 = align_lo(dst_width, 2);
    let dst_w8 = align_lo(dst_width, 8);
    // 3 live lanes when the last tile column is partial, otherwise 4.
    let tail_lanes = 4 + dst_w2 - dst_width;
    let tail_col = if dst_w2 < dst_width { dst_width - 7 } else { dst_width - 8 };
    let blocks = tile_h * tile_w;

    for c in 0..channels {
        let src_c = c * blocks * 16;
        let dst_c = c * dst_height * dst_width;
        let mut row = 0usize;
        let mut tile_y = 0usize;
        while row < dst_h2 {
            let s_row = src_c + tile_y * tile_w * 16;
            let d_row = dst_c + row * dst_width;
            let mut col = 0usize;
            while col < dst_w8 {
                set_output4_body(src, s_row + (col / 2) * 16, dst, d_row + col, dst_width);
                col += 8;
            }
            if col < dst_width {
                set_output4_edge(
                    src,
                    s_row + (tile_w - 4) * 16,
                    dst,
                    d_row + tail_col,
                    dst_width,
                    true,
                    tail_lanes,
                );
            }
            row += 2;
            tile_y += 1;
        }
        if row < dst_height {
            let s_row = src_c + (tile_h - 1) * tile_w * 16;
            let d_row = dst_c + (dst_height - 1) * dst_width;
            let mut col = 0usize;
            while col < dst_w8 {
                set_output4_edge(src, s_row + (col / 2) * 16, dst, d_row + col, dst_width, false, 4);
                col += 8;
            }
            if col < dst_width {
                set_output4_edge(
                    src,
                    s_row + (tile_w - 4) * 16,
                    dst,
                    d_row + tail_col,
                    dst_width,
                    false,
                    tail_lanes,
                );
            }
        }
    }
}
