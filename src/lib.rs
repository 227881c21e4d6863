//! Winograd minimal-filtering transforms for 3x3 convolution.
//!
//! This crate provides the three transforms surrounding the elementwise
//! multiply of a Winograd convolution: a one-time filter transform, a
//! per-image input transform into the tile domain, and an output transform
//! back to spatial layout. Two variants are supported, F(2,3) (4x4 blocks,
//! 2x2 output tiles) and F(4,3) (6x6 blocks, 4x4 output tiles), each with
//! "same" (zero-padded) and "valid" geometry.
//!
//! The multiply itself is out of scope: callers pair each transformed input
//! block with the transformed filter cells of the matching channel (commonly
//! as a batch of small GEMMs) and hand the products to the output transform.
//!
//! ```rust
//! use zenwinograd::{f2x3, TileGeometry};
//!
//! let (h, w) = (6usize, 6usize);
//! let image = vec![1.0f32; h * w];
//! let filter = [1.0f32; 9];
//! let geo = TileGeometry::new(h, w, 2, true);
//!
//! let mut u = [0.0f32; 16];
//! f2x3::set_filter(&filter, 1, &mut u);
//!
//! let mut tiles = vec![0.0f32; geo.transformed_len(1, 4)];
//! f2x3::set_input(&image, 1, h, w, &mut tiles, true);
//!
//! // Single channel: the "GEMM" degenerates to an elementwise scale.
//! for block in tiles.chunks_exact_mut(16) {
//!     for (cell, v) in block.iter_mut().enumerate() {
//!         *v *= u[cell];
//!     }
//! }
//!
//! let mut out = vec![0.0f32; h * w];
//! f2x3::set_output(&tiles, &mut out, 1, h, w);
//! assert_eq!(out[7], 9.0); // interior cell of an all-ones convolution
//! ```
//!
//! # Features
//!
//! - `std` (default): standard library support. The transforms allocate
//!   nothing, so disabling it leaves a fully `no_std` crate.
//! - `simd` (default): 4-lane batched kernels via the `wide` crate. Without
//!   it every entry point runs the portable scalar path; results are
//!   bit-identical either way.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod coefficients;
mod geometry;
mod reference;
#[cfg(feature = "simd")]
mod transform_simd;

pub mod f2x3;
pub mod f4x3;

pub use geometry::{PadKind, TileGeometry};
