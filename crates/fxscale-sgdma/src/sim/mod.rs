//! Simulated accelerator platform
//!
//! A software stand-in for the board: a [`BusMap`](crate::BusMap), the
//! scaling accelerator and two streaming engines, connected by in-process
//! streams.
//!
//! ```text
//! memory --[sgdma_tx]--> accelerator --[sgdma_rx]--> memory
//! ```
//!
//! # Examples
//!
//! ```
//! use fxscale_core::Raster;
//! use fxscale_sgdma::SessionConfig;
//! use fxscale_sgdma::sim::{SimConfig, SimPlatform};
//!
//! let mut session = SimPlatform::new(SimConfig::default()).into_session(SessionConfig::default());
//! let src = Raster::from_vec(2, 2, vec![0, 100, 100, 200]).unwrap();
//! let out = session.scale(&src, 2.0, 2.0).unwrap();
//! assert_eq!(out.dimensions(), (4, 4));
//! ```

mod accelerator;
mod engine;
mod platform;

pub use accelerator::SimAccelerator;
pub use engine::SimSgdma;
pub use platform::{SimConfig, SimPlatform, SimSession};
