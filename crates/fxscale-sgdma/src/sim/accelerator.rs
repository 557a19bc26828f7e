//! Software model of the scaling accelerator
//!
//! The model owns the register file and a worker thread sitting between
//! the two streams. Source rows arrive as byte chunks on the input stream;
//! once `HEIGHT` rows of `WIDTH` bytes have been collected the worker runs
//! the same fixed-point kernel as the software path, emits one chunk per
//! output row and raises `CTL_DONE`.
//!
//! Writing `CTL_RESET` drops a partially collected frame and cuts short a
//! frame that is still being emitted.

use crate::regs::{AcceleratorConfig, AcceleratorRegisters, CTL_DONE, CTL_RESET, offset};
use crossbeam_channel::{Receiver, Sender};
use fxscale_transform::{ScalePlan, interpolate_row};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

const REGISTER_FILE_LEN: usize = offset::CTL + 2;

#[derive(Debug, Default)]
struct RegisterFile {
    bytes: Mutex<[u8; REGISTER_FILE_LEN]>,
    /// Bumped by every reset so the worker can notice it between chunks
    /// and between output rows.
    epoch: AtomicU32,
    frames: AtomicU64,
}

impl RegisterFile {
    fn store(&self, offset: usize, data: &[u8]) {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        match bytes.get_mut(offset..offset + data.len()) {
            Some(dst) => dst.copy_from_slice(data),
            None => log::warn!("write past register file at offset {:#x}", offset),
        }
    }

    fn load_u16(&self, offset: usize) -> u16 {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        match bytes.get(offset..offset + 2) {
            Some(b) => u16::from_le_bytes([b[0], b[1]]),
            None => 0,
        }
    }

    fn set_done(&self) {
        let ctl = self.load_u16(offset::CTL) | CTL_DONE;
        self.store(offset::CTL, &ctl.to_le_bytes());
    }
}

impl AcceleratorRegisters for RegisterFile {
    fn write_u8(&self, offset: usize, value: u8) {
        self.store(offset, &[value]);
    }

    fn write_u16(&self, offset: usize, value: u16) {
        if offset == offset::CTL && value & CTL_RESET != 0 {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            self.store(offset, &0u16.to_le_bytes());
            return;
        }
        self.store(offset, &value.to_le_bytes());
    }

    fn read_u16(&self, offset: usize) -> u16 {
        self.load_u16(offset)
    }
}

/// How emitting a frame ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emitted {
    Done,
    /// `CTL_RESET` arrived mid-frame
    Reset,
    /// The output stream closed
    Closed,
}

/// A frame being collected from the input stream
struct Frame {
    plan: ScalePlan,
    epoch: u32,
    rows: Vec<Vec<u8>>,
    pending: Vec<u8>,
}

impl Frame {
    fn new(plan: ScalePlan, epoch: u32) -> Self {
        Frame {
            plan,
            epoch,
            rows: Vec::with_capacity(plan.input_height as usize),
            pending: Vec::with_capacity(plan.input_width as usize),
        }
    }

    fn push(&mut self, mut chunk: &[u8]) {
        let width = self.plan.input_width as usize;
        while !chunk.is_empty() && !self.is_complete() {
            let take = (width - self.pending.len()).min(chunk.len());
            self.pending.extend_from_slice(&chunk[..take]);
            chunk = &chunk[take..];
            if self.pending.len() == width {
                self.rows
                    .push(std::mem::replace(&mut self.pending, Vec::with_capacity(width)));
            }
        }
        if !chunk.is_empty() {
            log::warn!("accelerator: dropping {} bytes past end of frame", chunk.len());
        }
    }

    fn is_complete(&self) -> bool {
        self.rows.len() >= self.plan.input_height as usize
    }

    /// Scale the collected rows onto `output`, stopping early on a reset.
    fn emit(&self, file: &RegisterFile, output: &Sender<Vec<u8>>) -> Emitted {
        for v in 0..self.plan.out_height {
            if file.epoch.load(Ordering::Acquire) != self.epoch {
                return Emitted::Reset;
            }
            let mut row = vec![0u8; self.plan.out_width as usize];
            interpolate_row(&self.rows, &self.plan, self.plan.row_coordinate(v), &mut row);
            if output.send(row).is_err() {
                return Emitted::Closed;
            }
        }
        Emitted::Done
    }
}

fn run(file: Arc<RegisterFile>, input: Receiver<Vec<u8>>, output: Sender<Vec<u8>>) {
    let mut frame: Option<Frame> = None;
    for chunk in input.iter() {
        let epoch = file.epoch.load(Ordering::Acquire);
        if frame.as_ref().is_some_and(|f| f.epoch != epoch) {
            log::debug!("accelerator: reset dropped a partial frame");
            frame = None;
        }
        if frame.is_none() {
            match AcceleratorConfig::read_back(file.as_ref()).to_plan() {
                Some(plan) => frame = Some(Frame::new(plan, epoch)),
                None => {
                    log::warn!(
                        "accelerator: {} bytes streamed before dimensions were programmed",
                        chunk.len()
                    );
                    continue;
                }
            }
        }
        let Some(current) = frame.as_mut() else {
            continue;
        };
        current.push(&chunk);
        if !current.is_complete() {
            continue;
        }
        if let Some(done) = frame.take() {
            log::trace!(
                "accelerator: frame {}x{} -> {}x{}",
                done.plan.input_height,
                done.plan.input_width,
                done.plan.out_height,
                done.plan.out_width
            );
            match done.emit(&file, &output) {
                Emitted::Done => {
                    file.set_done();
                    file.frames.fetch_add(1, Ordering::AcqRel);
                }
                Emitted::Reset => log::debug!("accelerator: reset cut short frame output"),
                Emitted::Closed => break,
            }
        }
    }
    log::trace!("accelerator: stream closed");
}

/// Simulated accelerator: register file plus streaming worker
///
/// The worker exits once every sender of its input stream is gone.
#[derive(Debug)]
pub struct SimAccelerator {
    file: Arc<RegisterFile>,
    _worker: JoinHandle<()>,
}

impl SimAccelerator {
    /// Start the accelerator between `input` and `output`.
    pub fn spawn(input: Receiver<Vec<u8>>, output: Sender<Vec<u8>>) -> Self {
        let file = Arc::new(RegisterFile::default());
        let worker = {
            let file = Arc::clone(&file);
            thread::spawn(move || run(file, input, output))
        };
        SimAccelerator {
            file,
            _worker: worker,
        }
    }

    /// Number of frames fully emitted so far.
    pub fn frames_completed(&self) -> u64 {
        self.file.frames.load(Ordering::Acquire)
    }

    /// Whether `CTL_DONE` is raised.
    pub fn is_done(&self) -> bool {
        self.file.load_u16(offset::CTL) & CTL_DONE != 0
    }
}

impl AcceleratorRegisters for SimAccelerator {
    fn write_u8(&self, offset: usize, value: u8) {
        self.file.write_u8(offset, value);
    }

    fn write_u16(&self, offset: usize, value: u16) {
        self.file.write_u16(offset, value);
    }

    fn read_u16(&self, offset: usize) -> u16 {
        self.file.read_u16(offset)
    }
}
