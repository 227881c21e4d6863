//! F(4,3) entry points: 6x6 transform blocks producing 4x4 output tiles.
//!
//! Only the filter transform is lane-batched in this vector-width variant;
//! the fractional input coefficients (denominators up to 5) leave too little
//! arithmetic to amortize a 4-wide shuffle network, so input and output run
//! the portable per-tile path.

use crate::coefficients::{INPUT_4X3, OUTPUT_4X3};
use crate::geometry::TileGeometry;
use crate::reference;

/// Transforms `count` 3x3 filters into 36-cell F(4,3) form, cell-major with
/// stride `count` like the F(2,3) layout.
pub fn set_filter(src: &[f32], count: usize, dst: &mut [f32]) {
    debug_assert!(src.len() >= count * 9);
    debug_assert!(dst.len() >= count * 36);
    let mut i = 0;
    #[cfg(feature = "simd")]
    {
        while i + 4 <= count {
            crate::transform_simd::set_filter4_4x3(&src[i * 9..], &mut dst[i..], count);
            i += 4;
        }
    }
    while i < count {
        reference::set_filter1_4x3(&src[i * 9..], &mut dst[i..], count);
        i += 1;
    }
}

/// Transforms `channels` planes into the F(4,3) tile domain: one contiguous
/// 36-value block per 4x4-output tile. Padding semantics match the F(2,3)
/// variant (zero border, window origin shifted by one).
pub fn set_input(
    src: &[f32],
    channels: usize,
    height: usize,
    width: usize,
    dst: &mut [f32],
    pad: bool,
) {
    debug_assert!(src.len() >= channels * height * width);
    debug_assert!(dst.len() >= TileGeometry::new(height, width, 4, pad).transformed_len(channels, 6));
    reference::set_input(&INPUT_4X3, src, channels, height, width, dst, pad);
}

/// Transforms tile-domain products back to spatial planes, four output rows
/// and columns per tile, clipping partial boundary tiles.
pub fn set_output(src: &[f32], dst: &mut [f32], channels: usize, height: usize, width: usize) {
    let tile_h = (height + 3) / 4;
    let tile_w = (width + 3) / 4;
    debug_assert!(src.len() >= channels * tile_h * tile_w * 36);
    debug_assert!(dst.len() >= channels * height * width);
    reference::set_output(&OUTPUT_4X3, src, dst, channels, height, width);
}
