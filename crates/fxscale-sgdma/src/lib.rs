//! fxscale SGDMA - Accelerator transfers over scatter-gather DMA
//!
//! This crate moves rasters through the scaling accelerator:
//!
//! - [`Descriptor`] - the 32-byte hardware descriptor and its bit fields
//! - [`BusMap`] - bus addresses for raster stores and descriptor memory
//! - [`build_transmit_chain`] / [`build_receive_chain`] - one descriptor
//!   per row plus a terminating sentinel
//! - [`AcceleratorRegisters`] / [`SgdmaEngine`] - hardware seams
//! - [`TransferSession`] - programs the accelerator, runs both chains and
//!   waits for completion
//!
//! With the `sim` feature (on by default) the [`sim`] module provides a
//! software platform producing the same output as
//! [`fxscale_transform::scale_bilinear`].

pub mod bus;
pub mod chain;
pub mod descriptor;
pub mod error;
pub mod regs;
pub mod session;
pub mod signal;

#[cfg(feature = "sim")]
pub mod sim;

pub use bus::BusMap;
pub use chain::{DescriptorChain, Direction, build_receive_chain, build_transmit_chain};
pub use descriptor::{DESCRIPTOR_SIZE, Descriptor, DescriptorSlot};
pub use error::{SgdmaError, SgdmaResult};
pub use regs::{AcceleratorConfig, AcceleratorRegisters, CompletionCallback, SgdmaEngine};
pub use session::{SessionConfig, SessionState, TransferSession, WAIT_TIMEOUT_ENV};
pub use signal::CompletionSignal;
