//! Error types for fxscale-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// fxscale-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid raster dimensions
    #[error("invalid raster dimensions: {height}x{width} (rows x cols)")]
    InvalidDimension { width: u32, height: u32 },

    /// Requested view rectangle exceeds the parent extents
    #[error(
        "view ({rows}x{cols} at row {start_row}, col {start_col}) exceeds parent {parent_height}x{parent_width}"
    )]
    OutOfBounds {
        start_row: u32,
        start_col: u32,
        rows: u32,
        cols: u32,
        parent_height: u32,
        parent_width: u32,
    },

    /// Pixel index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Raster dimension mismatch
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fxscale-core operations
pub type Result<T> = std::result::Result<T, Error>;
