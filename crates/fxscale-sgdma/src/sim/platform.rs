//! Wiring of the simulated platform

use super::{SimAccelerator, SimSgdma};
use crate::bus::BusMap;
use crate::session::{SessionConfig, TransferSession};
use crossbeam_channel::unbounded;
use std::sync::Arc;

/// Session over the simulated platform
pub type SimSession = TransferSession<SimAccelerator, SimSgdma>;

/// Simulated platform parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// First bus address handed out by the address map.
    pub bus_base: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            bus_base: 0x2000_0000,
        }
    }
}

/// Accelerator, engines and bus of one simulated board
#[derive(Debug)]
pub struct SimPlatform {
    bus: Arc<BusMap>,
    accelerator: SimAccelerator,
    transmit: SimSgdma,
    receive: SimSgdma,
}

impl SimPlatform {
    pub fn new(config: SimConfig) -> Self {
        let bus = Arc::new(BusMap::new(config.bus_base));
        let (to_accelerator, accelerator_in) = unbounded();
        let (accelerator_out, from_accelerator) = unbounded();
        log::debug!("simulated platform, bus base {:#010x}", config.bus_base);
        SimPlatform {
            accelerator: SimAccelerator::spawn(accelerator_in, accelerator_out),
            transmit: SimSgdma::memory_to_stream("sgdma_tx", Arc::clone(&bus), to_accelerator),
            receive: SimSgdma::stream_to_memory("sgdma_rx", Arc::clone(&bus), from_accelerator),
            bus,
        }
    }

    pub fn bus(&self) -> &Arc<BusMap> {
        &self.bus
    }

    pub fn accelerator(&self) -> &SimAccelerator {
        &self.accelerator
    }

    /// Memory-to-stream engine feeding the accelerator.
    pub fn transmit_mut(&mut self) -> &mut SimSgdma {
        &mut self.transmit
    }

    /// Stream-to-memory engine draining the accelerator.
    pub fn receive_mut(&mut self) -> &mut SimSgdma {
        &mut self.receive
    }

    /// Hand the platform to a transfer session.
    pub fn into_session(self, config: SessionConfig) -> SimSession {
        TransferSession::new(
            self.accelerator,
            self.transmit,
            self.receive,
            self.bus,
            config,
        )
    }
}
