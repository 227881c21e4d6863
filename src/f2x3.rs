//! F(2,3) entry points: 4x4 transform blocks producing 2x2 output tiles.
//!
//! The batched kernels read up to ten consecutive samples per load and store
//! eight output columns per step, so small planes fall back to the portable
//! per-tile path. Both paths produce bit-identical results.

use crate::coefficients::{INPUT_2X3, OUTPUT_2X3};
use crate::geometry::TileGeometry;
use crate::reference;

/// Transforms `count` 3x3 filters into 16-cell F(2,3) form.
///
/// `src` holds `count * 9` taps, filter-major; `dst` receives `16 * count`
/// values in cell-major order, so cell `k` of filter `c` lands at
/// `dst[k * count + c]`.
pub fn set_filter(src: &[f32], count: usize, dst: &mut [f32]) {
    debug_assert!(src.len() >= count * 9);
    debug_assert!(dst.len() >= count * 16);
    let mut i = 0;
    #[cfg(feature = "simd")]
    {
        while i + 4 <= count {
            crate::transform_simd::set_filter4_2x3(&src[i * 9..], &mut dst[i..], count);
            i += 4;
        }
    }
    while i < count {
        reference::set_filter1_2x3(&src[i * 9..], &mut dst[i..], count);
        i += 1;
    }
}

/// Transforms `channels` planes of `height` x `width` samples into the F(2,3)
/// tile domain.
///
/// With `pad` the output geometry matches the source ("same" convolution,
/// zero border); without it the output is two rows and columns smaller.
/// `dst` receives one contiguous 16-value block per tile, tile-major within
/// each channel; size it with [`TileGeometry::transformed_len`].
pub fn set_input(
    src: &[f32],
    channels: usize,
    height: usize,
    width: usize,
    dst: &mut [f32],
    pad: bool,
) {
    debug_assert!(src.len() >= channels * height * width);
    debug_assert!(dst.len() >= TileGeometry::new(height, width, 2, pad).transformed_len(channels, 4));
    #[cfg(feature = "simd")]
    {
        if height >= 4 && width >= 10 {
            crate::transform_simd::set_input_2x3(src, channels, height, width, dst, pad);
            return;
        }
    }
    reference::set_input(&INPUT_2X3, src, channels, height, width, dst, pad);
}

/// Transforms tile-domain products back to `channels` spatial planes of
/// `height` x `width` output samples.
///
/// `src` holds one 16-value block per tile as produced by [`set_input`]
/// (after the elementwise multiply); partial boundary tiles contribute only
/// their in-range rows and columns.
pub fn set_output(src: &[f32], dst: &mut [f32], channels: usize, height: usize, width: usize) {
    let tile_h = (height + 1) / 2;
    let tile_w = (width + 1) / 2;
    debug_assert!(src.len() >= channels * tile_h * tile_w * 16);
    debug_assert!(dst.len() >= channels * height * width);
    #[cfg(feature = "simd")]
    {
        if height >= 2 && width >= 8 {
            crate::transform_simd::set_output_2x3(src, dst, channels, height, width);
            return;
        }
    }
    reference::set_output(&OUTPUT_2X3, src, dst, channels, height, width);
}
