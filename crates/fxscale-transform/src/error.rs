//! Error types for fxscale-transform

use thiserror::Error;

/// Errors that can occur while planning or running a scale
#[derive(Debug, Error)]
pub enum TransformError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] fxscale_core::Error),

    /// Zero, negative, non-finite or unrepresentable scale factor
    #[error("invalid scale factor: {0}")]
    InvalidScaleFactor(String),

    /// The quantized scale factor leaves no output samples
    #[error("scale {scale} quantizes to {quantized}, giving an empty {axis} axis")]
    EmptyOutput {
        axis: &'static str,
        scale: f32,
        quantized: f32,
    },
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;
