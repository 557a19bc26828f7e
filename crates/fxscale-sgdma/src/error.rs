//! Error types for fxscale-sgdma

use crate::Direction;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building chains or running a transfer session
#[derive(Debug, Error)]
pub enum SgdmaError {
    /// The engine refused a new chain because it is still running one
    #[error("SGDMA engine '{engine}' is busy")]
    Busy { engine: String },

    /// A value does not fit the register or descriptor field it targets
    #[error("{field} value {value} does not fit {bits} bits")]
    RegisterOverflow {
        field: &'static str,
        value: u64,
        bits: u32,
    },

    /// A completion notification did not arrive within the configured bound
    #[error("{direction} completion not signalled within {waited:?}")]
    Timeout { direction: Direction, waited: Duration },

    /// Bus address map failure (unmapped address, exhausted address space)
    #[error("bus error at {address:#010x}: {message}")]
    Bus { address: u32, message: String },

    /// Scale planning error
    #[error("transform error: {0}")]
    Transform(#[from] fxscale_transform::TransformError),

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] fxscale_core::Error),
}

/// Result type for SGDMA operations
pub type SgdmaResult<T> = Result<T, SgdmaError>;
