//! Scatter-gather transfer descriptors
//!
//! The layout mirrors the streaming engine's 32-byte descriptor: three
//! 32-bit addresses each followed by a pad word, the transfer length, burst
//! sizes, the length actually transferred, a status byte and a control
//! byte. The engine fetches descriptors from memory, so the layout must
//! stay byte-exact.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Size of one descriptor in bytes, which is also the required alignment
/// of descriptor memory.
pub const DESCRIPTOR_SIZE: usize = 32;

/// Control byte bits.
pub mod control {
    /// Emit end-of-packet after the last byte of this descriptor
    pub const GENERATE_EOP: u8 = 0x01;
    /// Read every byte from the same address
    pub const READ_FIXED_ADDRESS: u8 = 0x02;
    /// Write every byte to the same address
    pub const WRITE_FIXED_ADDRESS: u8 = 0x04;
    /// Stream channel field
    pub const CHANNEL_MASK: u8 = 0x78;
    pub const CHANNEL_SHIFT: u8 = 3;
    /// The engine may process this descriptor; cleared on write-back.
    pub const OWNED_BY_HW: u8 = 0x80;
}

/// Status byte bits written back by the engine.
pub mod status {
    pub const ERROR_CRC: u8 = 0x01;
    pub const ERROR_PARITY: u8 = 0x02;
    pub const ERROR_OVERFLOW: u8 = 0x04;
    pub const ERROR_SYNC: u8 = 0x08;
    pub const ERROR_UEOP: u8 = 0x10;
    pub const ERROR_MEOP: u8 = 0x20;
    pub const ERROR_MSOP: u8 = 0x40;
    /// Any of the error bits
    pub const ERROR: u8 = 0x7f;
    /// The transfer ended on an end-of-packet
    pub const TERMINATED_BY_EOP: u8 = 0x80;
}

/// One transfer descriptor, in the engine's memory layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Zeroable, Pod)]
pub struct Descriptor {
    pub read_addr: u32,
    pub read_addr_pad: u32,
    pub write_addr: u32,
    pub write_addr_pad: u32,
    pub next: u32,
    pub next_pad: u32,
    pub bytes_to_transfer: u16,
    pub read_burst: u8,
    pub write_burst: u8,
    pub actual_bytes_transferred: u16,
    pub status: u8,
    pub control: u8,
}

const_assert_eq!(size_of::<Descriptor>(), DESCRIPTOR_SIZE);

/// A descriptor placed on a descriptor-size boundary.
///
/// Storing chains as `[DescriptorSlot]` makes every element land on a
/// 32-byte boundary, the alignment the engine requires.
#[repr(C, align(32))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Zeroable, Pod)]
pub struct DescriptorSlot(pub Descriptor);

const_assert_eq!(size_of::<DescriptorSlot>(), DESCRIPTOR_SIZE);
const_assert_eq!(align_of::<DescriptorSlot>(), DESCRIPTOR_SIZE);

impl Descriptor {
    /// Memory-to-stream descriptor reading `len` bytes at `read_addr`.
    pub fn memory_to_stream(
        read_addr: u32,
        next: u32,
        len: u16,
        read_fixed: bool,
        generate_eop: bool,
        channel: u8,
    ) -> Self {
        let mut ctl = control::OWNED_BY_HW;
        if read_fixed {
            ctl |= control::READ_FIXED_ADDRESS;
        }
        if generate_eop {
            ctl |= control::GENERATE_EOP;
        }
        ctl |= (channel << control::CHANNEL_SHIFT) & control::CHANNEL_MASK;
        Descriptor {
            read_addr,
            next,
            bytes_to_transfer: len,
            control: ctl,
            ..Descriptor::default()
        }
    }

    /// Stream-to-memory descriptor writing `len` bytes at `write_addr`.
    pub fn stream_to_memory(write_addr: u32, next: u32, len: u16, write_fixed: bool) -> Self {
        let mut ctl = control::OWNED_BY_HW;
        if write_fixed {
            ctl |= control::WRITE_FIXED_ADDRESS;
        }
        Descriptor {
            write_addr,
            next,
            bytes_to_transfer: len,
            control: ctl,
            ..Descriptor::default()
        }
    }

    /// Terminating descriptor: not owned by hardware, so the engine halts.
    pub fn sentinel() -> Self {
        Descriptor::zeroed()
    }

    /// Whether the engine may still process this descriptor.
    #[inline]
    pub fn is_owned_by_hw(&self) -> bool {
        self.control & control::OWNED_BY_HW != 0
    }

    /// Whether the engine reported an error for this descriptor.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.status & status::ERROR != 0
    }

    /// Stream channel encoded in the control byte.
    #[inline]
    pub fn channel(&self) -> u8 {
        (self.control & control::CHANNEL_MASK) >> control::CHANNEL_SHIFT
    }

    /// Record a finished transfer the way the engine writes it back.
    pub fn complete(&mut self, transferred: u16, status: u8) {
        self.actual_bytes_transferred = transferred;
        self.status = status;
        self.control &= !control::OWNED_BY_HW;
    }

    /// Convert every multi-byte field to little-endian.
    ///
    /// Applying it twice restores the original on any host.
    pub fn to_le(self) -> Self {
        Descriptor {
            read_addr: self.read_addr.to_le(),
            read_addr_pad: self.read_addr_pad.to_le(),
            write_addr: self.write_addr.to_le(),
            write_addr_pad: self.write_addr_pad.to_le(),
            next: self.next.to_le(),
            next_pad: self.next_pad.to_le(),
            bytes_to_transfer: self.bytes_to_transfer.to_le(),
            actual_bytes_transferred: self.actual_bytes_transferred.to_le(),
            ..self
        }
    }

    /// The descriptor's 32-byte little-endian memory image.
    pub fn to_le_bytes(&self) -> [u8; DESCRIPTOR_SIZE] {
        bytemuck::cast(self.to_le())
    }

    /// Parse a 32-byte little-endian memory image.
    pub fn from_le_bytes(bytes: [u8; DESCRIPTOR_SIZE]) -> Self {
        bytemuck::cast::<_, Descriptor>(bytes).to_le()
    }
}
