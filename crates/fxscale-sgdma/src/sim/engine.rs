//! Software model of a scatter-gather streaming engine
//!
//! Each started chain is walked by a worker thread. The worker fetches
//! descriptors from bus memory, moves one descriptor's worth of data
//! between memory and the stream, writes the status back and follows
//! `next` until it reaches a descriptor not owned by hardware. It then
//! invokes the completion callback.

use crate::bus::BusMap;
use crate::descriptor::{DESCRIPTOR_SIZE, Descriptor, status};
use crate::regs::{CompletionCallback, SgdmaEngine};
use crate::{DescriptorChain, SgdmaError, SgdmaResult};
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Stream side of an engine
#[derive(Debug, Clone)]
enum Port {
    /// Memory-to-stream: rows read from memory are sent downstream.
    ToStream(Sender<Vec<u8>>),
    /// Stream-to-memory: chunks received from upstream are written to memory.
    FromStream(Receiver<Vec<u8>>),
}

#[derive(Debug)]
struct Worker {
    /// Dropping the sender tells the worker to stop.
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Everything a worker thread needs to walk one chain
struct Walk {
    name: String,
    bus: Arc<BusMap>,
    port: Port,
    callback: Option<Arc<CompletionCallback>>,
    stop: Receiver<()>,
    head: u32,
}

enum Step {
    Done { transferred: u16, status: u8 },
    Halt,
}

impl Walk {
    fn stopped(&self) -> bool {
        matches!(self.stop.try_recv(), Err(TryRecvError::Disconnected))
    }

    fn run(self) {
        let mut addr = self.head;
        let mut count = 0usize;
        loop {
            if self.stopped() {
                log::debug!("{}: stopped after {} descriptors", self.name, count);
                return;
            }
            let mut bytes = [0u8; DESCRIPTOR_SIZE];
            if let Err(e) = self.bus.read(addr, &mut bytes) {
                log::warn!("{}: descriptor fetch failed: {}", self.name, e);
                return;
            }
            let mut desc = Descriptor::from_le_bytes(bytes);
            if !desc.is_owned_by_hw() {
                log::trace!("{}: chain drained after {} descriptors", self.name, count);
                if let Some(callback) = &self.callback {
                    callback();
                }
                return;
            }

            let (transferred, status) = match self.transfer(&desc) {
                Step::Done {
                    transferred,
                    status,
                } => (transferred, status),
                Step::Halt => return,
            };
            desc.complete(transferred, status);
            if let Err(e) = self.bus.write(addr, &desc.to_le_bytes()) {
                log::warn!("{}: status write-back failed: {}", self.name, e);
                return;
            }
            log::trace!(
                "{}: descriptor {} at {:#010x}: {} bytes, status {:#04x}",
                self.name,
                count,
                addr,
                transferred,
                status
            );
            count += 1;
            addr = desc.next;
        }
    }

    fn transfer(&self, desc: &Descriptor) -> Step {
        let len = usize::from(desc.bytes_to_transfer);
        match &self.port {
            Port::ToStream(stream) => {
                let mut buf = vec![0u8; len];
                if let Err(e) = self.bus.read(desc.read_addr, &mut buf) {
                    log::warn!("{}: source read failed: {}", self.name, e);
                    return Step::Halt;
                }
                if stream.send(buf).is_err() {
                    log::debug!("{}: stream closed", self.name);
                    return Step::Halt;
                }
                Step::Done {
                    transferred: desc.bytes_to_transfer,
                    status: 0,
                }
            }
            Port::FromStream(stream) => {
                let chunk = select! {
                    recv(stream) -> chunk => match chunk {
                        Ok(chunk) => chunk,
                        Err(_) => return Step::Halt,
                    },
                    recv(self.stop) -> _ => return Step::Halt,
                };
                let written = chunk.len().min(len);
                if let Err(e) = self.bus.write(desc.write_addr, &chunk[..written]) {
                    log::warn!("{}: destination write failed: {}", self.name, e);
                    return Step::Halt;
                }
                let status = if chunk.len() > len {
                    status::ERROR_OVERFLOW
                } else {
                    0
                };
                Step::Done {
                    transferred: written as u16,
                    status,
                }
            }
        }
    }
}

/// Simulated SGDMA engine
pub struct SimSgdma {
    name: String,
    bus: Arc<BusMap>,
    port: Port,
    callback: Option<Arc<CompletionCallback>>,
    refuse_kickoff: bool,
    worker: Option<Worker>,
}

impl std::fmt::Debug for SimSgdma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimSgdma")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("has_callback", &self.callback.is_some())
            .field("refuse_kickoff", &self.refuse_kickoff)
            .field("running", &self.is_running())
            .finish()
    }
}

impl SimSgdma {
    /// Engine reading memory and sending rows to `stream`.
    pub fn memory_to_stream(name: impl Into<String>, bus: Arc<BusMap>, stream: Sender<Vec<u8>>) -> Self {
        Self::with_port(name.into(), bus, Port::ToStream(stream))
    }

    /// Engine receiving chunks from `stream` and writing them to memory.
    pub fn stream_to_memory(
        name: impl Into<String>,
        bus: Arc<BusMap>,
        stream: Receiver<Vec<u8>>,
    ) -> Self {
        Self::with_port(name.into(), bus, Port::FromStream(stream))
    }

    fn with_port(name: String, bus: Arc<BusMap>, port: Port) -> Self {
        SimSgdma {
            name,
            bus,
            port,
            callback: None,
            refuse_kickoff: false,
            worker: None,
        }
    }

    /// Make subsequent `start` calls fail with [`SgdmaError::Busy`].
    pub fn set_refuse_kickoff(&mut self, refuse: bool) {
        self.refuse_kickoff = refuse;
    }

    /// Whether a chain is still being walked.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    fn busy(&self) -> SgdmaError {
        SgdmaError::Busy {
            engine: self.name.clone(),
        }
    }

    fn drain_stale(&self) {
        if let Port::FromStream(stream) = &self.port {
            let stale = stream.try_iter().count();
            if stale > 0 {
                log::warn!("{}: discarded {} stale stream chunks", self.name, stale);
            }
        }
    }
}

impl SgdmaEngine for SimSgdma {
    fn register_callback(&mut self, callback: CompletionCallback) {
        self.callback = Some(Arc::new(callback));
    }

    fn start(&mut self, chain: &DescriptorChain) -> SgdmaResult<()> {
        if self.refuse_kickoff || self.is_running() {
            return Err(self.busy());
        }
        // Reap a worker that finished on its own.
        self.stop();
        self.drain_stale();

        let (stop, stop_rx) = bounded(0);
        let walk = Walk {
            name: self.name.clone(),
            bus: Arc::clone(&self.bus),
            port: self.port.clone(),
            callback: self.callback.clone(),
            stop: stop_rx,
            head: chain.head_address(),
        };
        log::debug!(
            "{}: starting {} chain at {:#010x}",
            self.name,
            chain.direction(),
            chain.head_address()
        );
        let handle = thread::spawn(move || walk.run());
        self.worker = Some(Worker { stop, handle });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            drop(worker.stop);
            if worker.handle.join().is_err() {
                log::warn!("{}: worker panicked", self.name);
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SimSgdma {
    fn drop(&mut self) {
        self.stop();
    }
}
