//! Accelerator register map and hardware seams
//!
//! | Offset | Register | Width | Contents |
//! |---|---|---|---|
//! | `0x0` | `SX` | 8 | horizontal scale, 3.5 fixed point |
//! | `0x1` | `SY` | 8 | vertical scale, 3.5 fixed point |
//! | `0x2` | `SX_INV` | 16 | horizontal increment, 4.12 fixed point |
//! | `0x4` | `SY_INV` | 16 | vertical increment, 4.12 fixed point |
//! | `0x6` | `WIDTH` | 16 | source columns |
//! | `0x8` | `HEIGHT` | 16 | source rows |
//! | `0xa` | `CTL` | 16 | control/status |
//!
//! The session talks to the accelerator and the two streaming engines only
//! through [`AcceleratorRegisters`] and [`SgdmaEngine`], so the simulated
//! platform and a board driver are interchangeable.

use crate::{DescriptorChain, SgdmaError, SgdmaResult};
use fxscale_core::{COORDINATE_FORMAT, SCALE_FACTOR_FORMAT};
use fxscale_transform::ScalePlan;

/// Register byte offsets.
pub mod offset {
    pub const SX: usize = 0x0;
    pub const SY: usize = 0x1;
    pub const SX_INV: usize = 0x2;
    pub const SY_INV: usize = 0x4;
    pub const WIDTH: usize = 0x6;
    pub const HEIGHT: usize = 0x8;
    pub const CTL: usize = 0xa;
}

/// `CTL` bit: the accelerator finished a frame.
pub const CTL_DONE: u16 = 0x0001;
/// `CTL` bit: clear `DONE` and drop any partially received frame.
pub const CTL_RESET: u16 = 0x0002;

/// Memory-mapped accelerator registers
pub trait AcceleratorRegisters {
    fn write_u8(&self, offset: usize, value: u8);
    fn write_u16(&self, offset: usize, value: u16);
    fn read_u16(&self, offset: usize) -> u16;
}

/// Completion notification installed on an engine.
///
/// Invoked from the engine's interrupt context once its chain is drained.
/// It must only record the event and return.
pub type CompletionCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// A scatter-gather streaming engine
pub trait SgdmaEngine {
    /// Install the completion notification.
    fn register_callback(&mut self, callback: CompletionCallback);

    /// Hand the head of `chain` to the engine and return immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SgdmaError::Busy`] if the engine does not accept the chain.
    fn start(&mut self, chain: &DescriptorChain) -> SgdmaResult<()>;

    /// Halt the engine. Stopping an idle engine is a no-op.
    fn stop(&mut self);

    /// Name used in log messages.
    fn name(&self) -> &str {
        "sgdma"
    }
}

/// Register values for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcceleratorConfig {
    pub sx: u8,
    pub sy: u8,
    pub sx_inv: u16,
    pub sy_inv: u16,
    pub width: u16,
    pub height: u16,
}

fn narrow<T: TryFrom<u32>>(field: &'static str, value: u32, bits: u32) -> SgdmaResult<T> {
    T::try_from(value).map_err(|_| SgdmaError::RegisterOverflow {
        field,
        value: u64::from(value),
        bits,
    })
}

impl AcceleratorConfig {
    /// Register values for `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`SgdmaError::RegisterOverflow`] if the source is larger
    /// than the 16-bit dimension registers or the plan uses formats wider
    /// than the registers.
    pub fn from_plan(plan: &ScalePlan) -> SgdmaResult<Self> {
        Ok(AcceleratorConfig {
            sx: narrow("SX", plan.sx_encoded, 8)?,
            sy: narrow("SY", plan.sy_encoded, 8)?,
            sx_inv: narrow("SX_INV", plan.increment_x, 16)?,
            sy_inv: narrow("SY_INV", plan.increment_y, 16)?,
            width: narrow("WIDTH", plan.input_width, 16)?,
            height: narrow("HEIGHT", plan.input_height, 16)?,
        })
    }

    /// Write the configuration: dimensions, increments, then scale factors.
    pub fn program<R: AcceleratorRegisters + ?Sized>(&self, regs: &R) {
        regs.write_u16(offset::WIDTH, self.width);
        regs.write_u16(offset::HEIGHT, self.height);
        regs.write_u16(offset::SX_INV, self.sx_inv);
        regs.write_u16(offset::SY_INV, self.sy_inv);
        regs.write_u8(offset::SX, self.sx);
        regs.write_u8(offset::SY, self.sy);
    }

    /// Read the configuration back from the register file.
    pub fn read_back<R: AcceleratorRegisters + ?Sized>(regs: &R) -> Self {
        let [sx, sy] = regs.read_u16(offset::SX).to_le_bytes();
        AcceleratorConfig {
            sx,
            sy,
            sx_inv: regs.read_u16(offset::SX_INV),
            sy_inv: regs.read_u16(offset::SY_INV),
            width: regs.read_u16(offset::WIDTH),
            height: regs.read_u16(offset::HEIGHT),
        }
    }

    /// The scale these registers describe, as the accelerator executes it.
    ///
    /// Returns `None` if the source dimensions are not programmed.
    pub fn to_plan(&self) -> Option<ScalePlan> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let sx = SCALE_FACTOR_FORMAT.decode(u32::from(self.sx));
        let sy = SCALE_FACTOR_FORMAT.decode(u32::from(self.sy));
        let extent = |input: u16, scale: f32| (f64::from(input) * f64::from(scale)).floor() as u32;
        Some(ScalePlan {
            input_height: u32::from(self.height),
            input_width: u32::from(self.width),
            sx,
            sy,
            sx_encoded: u32::from(self.sx),
            sy_encoded: u32::from(self.sy),
            sx_quantized: sx,
            sy_quantized: sy,
            out_height: extent(self.height, sy),
            out_width: extent(self.width, sx),
            increment_x: u32::from(self.sx_inv),
            increment_y: u32::from(self.sy_inv),
            scale_format: SCALE_FACTOR_FORMAT,
            coordinate_format: COORDINATE_FORMAT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        writes: RefCell<Vec<(usize, u16)>>,
        file: RefCell<[u8; 12]>,
    }

    impl AcceleratorRegisters for Recorder {
        fn write_u8(&self, offset: usize, value: u8) {
            self.writes.borrow_mut().push((offset, u16::from(value)));
            self.file.borrow_mut()[offset] = value;
        }

        fn write_u16(&self, offset: usize, value: u16) {
            self.writes.borrow_mut().push((offset, value));
            let [lo, hi] = value.to_le_bytes();
            let mut file = self.file.borrow_mut();
            file[offset] = lo;
            file[offset + 1] = hi;
        }

        fn read_u16(&self, offset: usize) -> u16 {
            let file = self.file.borrow();
            u16::from_le_bytes([file[offset], file[offset + 1]])
        }
    }

    #[test]
    fn test_program_order_and_values() {
        let plan = ScalePlan::new(4, 6, 2.0, 0.5).unwrap();
        let cfg = AcceleratorConfig::from_plan(&plan).unwrap();
        let regs = Recorder::default();
        cfg.program(&regs);
        assert_eq!(
            *regs.writes.borrow(),
            vec![
                (offset::WIDTH, 6),
                (offset::HEIGHT, 4),
                (offset::SX_INV, 2048),
                (offset::SY_INV, 8192),
                (offset::SX, 64),
                (offset::SY, 16),
            ]
        );
        assert_eq!(AcceleratorConfig::read_back(&regs), cfg);
    }

    #[test]
    fn test_to_plan_matches_software_plan() {
        let plan = ScalePlan::new(37, 23, 1.3, 2.7).unwrap();
        let cfg = AcceleratorConfig::from_plan(&plan).unwrap();
        let hw = cfg.to_plan().unwrap();
        assert_eq!(hw.output_dimensions(), plan.output_dimensions());
        assert_eq!(hw.increment_x, plan.increment_x);
        assert_eq!(hw.increment_y, plan.increment_y);
    }

    #[test]
    fn test_dimension_overflow() {
        let plan = ScalePlan::new(70_000, 4, 1.0, 1.0).unwrap();
        assert!(matches!(
            AcceleratorConfig::from_plan(&plan),
            Err(SgdmaError::RegisterOverflow { field: "HEIGHT", .. })
        ));
    }

    #[test]
    fn test_unprogrammed_has_no_plan() {
        assert!(AcceleratorConfig::default().to_plan().is_none());
    }
}
