//! fxscale - Fixed-point bilinear image scaling
//!
//! Scales 8-bit grayscale rasters with the fixed-point bilinear kernel
//! used by a streaming accelerator, either in software or by driving the
//! accelerator through scatter-gather DMA descriptor chains.
//!
//! # Overview
//!
//! - Rasters, zero-copy crop views and the fixed-point codec ([`fxscale_core`])
//! - `bin` and PGM files, bit-text stimulus dumps ([`io`])
//! - The software scaler ([`transform`])
//! - Descriptor chains, transfer sessions and the simulated platform ([`sgdma`])
//! - The job and prompt handling behind the `fxscale` binary ([`driver`], [`prompt`])
//!
//! # Example
//!
//! ```
//! use fxscale::Raster;
//! use fxscale::transform::scale_bilinear;
//!
//! let src = Raster::from_vec(2, 2, vec![0, 100, 100, 200]).unwrap();
//! let out = scale_bilinear(&src, 2.0, 2.0).unwrap();
//! assert_eq!(out.dimensions(), (4, 4));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use fxscale_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use fxscale_io as io;
pub use fxscale_sgdma as sgdma;
pub use fxscale_transform as transform;

pub mod driver;
pub mod prompt;
