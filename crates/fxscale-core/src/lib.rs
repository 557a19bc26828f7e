//! fxscale Core - Basic data structures for fixed-point image scaling
//!
//! This crate provides the fundamental types shared by the software and
//! accelerator scaling paths:
//!
//! - [`Raster`] - 8-bit single-channel image, owning or a zero-copy view
//! - [`RasterRead`] / [`RasterWrite`] - lock guards handing out row slices
//! - [`Rect`] - crop rectangle built from two corner coordinates
//! - [`FixedFormat`] - unsigned fixed-point encoding used by accelerator registers
//!
//! Dimensions and coordinates are always given rows first.

pub mod error;
pub mod fixed;
pub mod raster;
pub mod rect;

pub use error::{Error, Result};
pub use fixed::{
    COORDINATE_FORMAT, FixedFormat, SCALE_FACTOR_FORMAT, from_fixed_point, to_fixed_point,
};
pub use raster::{Raster, RasterDiff, RasterRead, RasterWrite};
pub use rect::Rect;
