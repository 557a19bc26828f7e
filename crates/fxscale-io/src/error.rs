//! I/O error types
//!
//! Every reader and writer in this crate reports failures through
//! [`IoError`], so callers only handle one error type.

use thiserror::Error;

/// Error type for raster I/O operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The format is not supported or not enabled via features
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The raster data is structurally invalid or truncated
    #[error("invalid raster data: {0}")]
    InvalidData(String),

    /// An error from the core library
    #[error("core error: {0}")]
    Core(#[from] fxscale_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
