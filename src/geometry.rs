//! Tile geometry for the Winograd transforms.
//!
//! Pure arithmetic mapping a source image size and padding flag to output
//! extents, tile counts, aligned boundaries and the padding classification of
//! boundary tiles. Both the input and output transforms consult the same
//! geometry so they agree on tile boundaries. There are no failure modes:
//! degenerate sizes produce empty geometry and the transforms degenerate to
//! no-ops.

/// Zero-padding classification of a boundary tile or tile batch.
///
/// Interior tiles are `None`. A tile overlapping the conceptual padding
/// border has the out-of-range rows or columns zero-substituted before the
/// transform; the transform math itself is identical for all classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    /// Fully in range, nothing to substitute.
    None,
    /// The leading row/column is conceptual padding ("same" convolution
    /// shifts the first window to (-1,-1)).
    Nose1,
    /// The trailing row/column is out of range.
    Tail1,
    /// The trailing two rows/columns are out of range.
    Tail2,
}

/// Largest multiple of `align` not exceeding `value`.
#[inline(always)]
pub(crate) fn align_lo(value: usize, align: usize) -> usize {
    value - value % align
}

/// Tiling of one spatial plane for a given Winograd variant.
///
/// `block` is the output tile stride: 2 for F(2,3), 4 for F(4,3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    /// Output height: source height for "same" padding, source height minus 2
    /// for "valid".
    pub dst_height: usize,
    /// Output width, derived like `dst_height`.
    pub dst_width: usize,
    /// Number of tile rows, `ceil(dst_height / block)`.
    pub tile_height: usize,
    /// Number of tile columns, `ceil(dst_width / block)`.
    pub tile_width: usize,
    /// Height boundary up to which full tiles fit: `align_lo(dst_height, block)`.
    pub aligned_height: usize,
    /// Width boundary up to which full tiles fit.
    pub aligned_width: usize,
    /// Rows of the final tile row that are in range (`block` when it is full).
    pub tail_height: usize,
    /// Columns of the final tile column that are in range.
    pub tail_width: usize,
    /// Whether "same" padding is in effect.
    pub pad: bool,
}

impl TileGeometry {
    /// Computes the tiling of a `src_height` x `src_width` plane.
    pub fn new(src_height: usize, src_width: usize, block: usize, pad: bool) -> Self {
        let dst_height = if pad { src_height } else { src_height.saturating_sub(2) };
        let dst_width = if pad { src_width } else { src_width.saturating_sub(2) };
        let tile_height = (dst_height + block - 1) / block;
        let tile_width = (dst_width + block - 1) / block;
        let aligned_height = align_lo(dst_height, block);
        let aligned_width = align_lo(dst_width, block);
        let tail_height = if aligned_height < dst_height {
            dst_height - aligned_height
        } else {
            block
        };
        let tail_width = if aligned_width < dst_width {
            dst_width - aligned_width
        } else {
            block
        };
        TileGeometry {
            dst_height,
            dst_width,
            tile_height,
            tile_width,
            aligned_height,
            aligned_width,
            tail_height,
            tail_width,
            pad,
        }
    }

    /// Padding class of the trailing tile row.
    pub fn row_pad(&self) -> PadKind {
        match (self.aligned_height < self.dst_height, self.pad) {
            (true, true) => PadKind::Tail2,
            (true, false) => PadKind::Tail1,
            (false, true) => PadKind::Tail1,
            (false, false) => PadKind::None,
        }
    }

    /// Padding class of the trailing tile column.
    pub fn col_pad(&self) -> PadKind {
        match (self.aligned_width < self.dst_width, self.pad) {
            (true, true) => PadKind::Tail2,
            (true, false) => PadKind::Tail1,
            (false, true) => PadKind::Tail1,
            (false, false) => PadKind::None,
        }
    }

    /// Length of the tile-domain tensor for `channels` planes and a `k` x `k`
    /// transform block (4 for F(2,3), 6 for F(4,3)).
    pub fn transformed_len(&self, channels: usize, k: usize) -> usize {
        channels * self.tile_height * self.tile_width * k * k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_geometry_f23() {
        let g = TileGeometry::new(6, 8, 2, false);
        assert_eq!((g.dst_height, g.dst_width), (4, 6));
        assert_eq!((g.tile_height, g.tile_width), (2, 3));
        assert_eq!((g.aligned_height, g.aligned_width), (4, 6));
        assert_eq!((g.tail_height, g.tail_width), (2, 2));
        assert_eq!(g.row_pad(), PadKind::None);
        assert_eq!(g.col_pad(), PadKind::None);
    }

    #[test]
    fn same_geometry_f23() {
        let g = TileGeometry::new(7, 9, 2, true);
        assert_eq!((g.dst_height, g.dst_width), (7, 9));
        assert_eq!((g.tile_height, g.tile_width), (4, 5));
        assert_eq!((g.tail_height, g.tail_width), (1, 1));
        // Odd extent with padding loses two trailing samples per window.
        assert_eq!(g.row_pad(), PadKind::Tail2);
        assert_eq!(g.col_pad(), PadKind::Tail2);

        let g = TileGeometry::new(8, 8, 2, true);
        assert_eq!(g.row_pad(), PadKind::Tail1);
        assert_eq!(g.col_pad(), PadKind::Tail1);
    }

    #[test]
    fn valid_geometry_f43() {
        let g = TileGeometry::new(12, 14, 4, false);
        assert_eq!((g.dst_height, g.dst_width), (10, 12));
        assert_eq!((g.tile_height, g.tile_width), (3, 3));
        assert_eq!((g.aligned_height, g.aligned_width), (8, 12));
        assert_eq!((g.tail_height, g.tail_width), (2, 4));
        assert_eq!(g.row_pad(), PadKind::Tail1);
        assert_eq!(g.col_pad(), PadKind::None);
    }

    #[test]
    fn degenerate_geometry_is_empty() {
        let g = TileGeometry::new(2, 1, 2, false);
        assert_eq!((g.dst_height, g.dst_width), (0, 0));
        assert_eq!((g.tile_height, g.tile_width), (0, 0));
        assert_eq!(g.transformed_len(3, 4), 0);
    }

    #[test]
    fn transformed_len_counts_blocks() {
        let g = TileGeometry::new(6, 6, 2, true);
        assert_eq!(g.transformed_len(2, 4), 2 * 3 * 3 * 16);
        let g = TileGeometry::new(6, 6, 4, true);
        assert_eq!(g.transformed_len(2, 6), 2 * 2 * 2 * 36);
    }
}
