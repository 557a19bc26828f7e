//! Descriptor chain construction
//!
//! A chain holds one descriptor per raster row followed by a sentinel whose
//! control byte is clear, so the engine stops after the last row. Chains
//! live in bus memory: the builder reserves a 32-byte aligned region, links
//! each descriptor to the bus address of the next slot and publishes the
//! memory image there. Starting a transfer is left to the engine.

use crate::bus::BusMap;
use crate::descriptor::{DESCRIPTOR_SIZE, Descriptor, DescriptorSlot};
use crate::{SgdmaError, SgdmaResult};
use fxscale_core::Raster;
use std::fmt;

/// Transfer direction as seen from memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Memory to accelerator (memory-to-stream)
    Transmit,
    /// Accelerator to memory (stream-to-memory)
    Receive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Transmit => f.write_str("transmit"),
            Direction::Receive => f.write_str("receive"),
        }
    }
}

/// A linked chain of descriptors published in bus memory
#[derive(Debug, Clone)]
pub struct DescriptorChain {
    direction: Direction,
    base: u32,
    slots: Vec<DescriptorSlot>,
}

impl DescriptorChain {
    /// Extra descriptor slots reserved beyond `rows + 1` when chain memory
    /// is allocated.
    pub const fn allocation_overhead() -> usize {
        1
    }

    /// Bus bytes reserved for a chain serving `rows` rows.
    pub const fn reserved_bytes(rows: usize) -> usize {
        (rows + 1 + Self::allocation_overhead()) * DESCRIPTOR_SIZE
    }

    /// Direction of the chain.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Bus address of the first descriptor.
    pub fn head_address(&self) -> u32 {
        self.base
    }

    /// Bus address of slot `index`.
    pub fn slot_address(&self, index: usize) -> u32 {
        self.base + (index * DESCRIPTOR_SIZE) as u32
    }

    /// Number of descriptors including the sentinel.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Chains always contain at least the sentinel.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of real transfers (rows).
    pub fn transfer_count(&self) -> usize {
        self.slots.len() - 1
    }

    /// Descriptor `index`, or `None` past the sentinel.
    pub fn descriptor(&self, index: usize) -> Option<&Descriptor> {
        self.slots.get(index).map(|s| &s.0)
    }

    /// Iterate over all descriptors, sentinel last.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.slots.iter().map(|s| &s.0)
    }

    /// Sum of the lengths of the real transfers.
    pub fn total_bytes(&self) -> u64 {
        self.descriptors()
            .map(|d| u64::from(d.bytes_to_transfer))
            .sum()
    }

    /// Number of descriptors the engine has handed back.
    pub fn completed_count(&self) -> usize {
        self.descriptors()
            .take(self.transfer_count())
            .filter(|d| !d.is_owned_by_hw())
            .count()
    }

    /// Number of descriptors whose write-back reports an error.
    pub fn error_count(&self) -> usize {
        self.descriptors().filter(|d| d.has_error()).count()
    }

    /// Little-endian memory image of the chain, as the engine fetches it.
    pub fn to_bytes(&self) -> Vec<u8> {
        let le: Vec<DescriptorSlot> = self
            .slots
            .iter()
            .map(|s| DescriptorSlot(s.0.to_le()))
            .collect();
        bytemuck::cast_slice(le.as_slice()).to_vec()
    }

    /// Copy the chain's memory image to its bus region.
    pub fn publish(&self, bus: &BusMap) -> SgdmaResult<()> {
        bus.write(self.base, &self.to_bytes())
    }

    /// Re-read the descriptors from bus memory, picking up status written
    /// back by the engine.
    pub fn refresh(&mut self, bus: &BusMap) -> SgdmaResult<()> {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let mut bytes = [0u8; DESCRIPTOR_SIZE];
            bus.read(self.base + (i * DESCRIPTOR_SIZE) as u32, &mut bytes)?;
            slot.0 = Descriptor::from_le_bytes(bytes);
        }
        Ok(())
    }
}

fn row_length(raster: &Raster) -> SgdmaResult<u16> {
    u16::try_from(raster.width()).map_err(|_| SgdmaError::RegisterOverflow {
        field: "descriptor length",
        value: u64::from(raster.width()),
        bits: 16,
    })
}

fn build_chain(
    bus: &BusMap,
    raster: &Raster,
    direction: Direction,
) -> SgdmaResult<DescriptorChain> {
    let len = row_length(raster)?;
    let rows = raster.height() as usize;

    // Row addresses first: a missing mapping must not leak chain memory.
    let row_addrs = (0..raster.height())
        .map(|row| bus.row_address(raster, row))
        .collect::<SgdmaResult<Vec<u32>>>()?;

    let base = bus.allocate(DescriptorChain::reserved_bytes(rows))?;
    let mut slots = Vec::with_capacity(rows + 1);
    for (i, addr) in row_addrs.into_iter().enumerate() {
        let next = base + ((i + 1) * DESCRIPTOR_SIZE) as u32;
        let desc = match direction {
            Direction::Transmit => Descriptor::memory_to_stream(addr, next, len, false, false, 0),
            Direction::Receive => Descriptor::stream_to_memory(addr, next, len, false),
        };
        slots.push(DescriptorSlot(desc));
    }
    slots.push(DescriptorSlot(Descriptor::sentinel()));

    let chain = DescriptorChain {
        direction,
        base,
        slots,
    };
    if let Err(e) = chain.publish(bus) {
        bus.unmap(base);
        return Err(e);
    }
    log::debug!(
        "built {} chain: {} descriptors of {} bytes at {:#010x} (+{} reserved slot)",
        direction,
        rows,
        len,
        base,
        DescriptorChain::allocation_overhead()
    );
    Ok(chain)
}

/// Build the memory-to-stream chain reading every row of `raster`.
///
/// The raster's store must already be mapped on `bus`.
///
/// # Errors
///
/// Returns [`SgdmaError::RegisterOverflow`] if a row is longer than a
/// descriptor can describe and [`SgdmaError::Bus`] if the raster is not
/// mapped or chain memory cannot be reserved.
pub fn build_transmit_chain(bus: &BusMap, raster: &Raster) -> SgdmaResult<DescriptorChain> {
    build_chain(bus, raster, Direction::Transmit)
}

/// Build the stream-to-memory chain filling every row of `raster`.
///
/// # Errors
///
/// Same as [`build_transmit_chain`].
pub fn build_receive_chain(bus: &BusMap, raster: &Raster) -> SgdmaResult<DescriptorChain> {
    build_chain(bus, raster, Direction::Receive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::control;

    #[test]
    fn test_transmit_chain_shape() {
        let bus = BusMap::new(0x1000);
        let src = Raster::from_vec(3, 4, (0..12).collect()).unwrap();
        let raster_base = bus.map_raster(&src).unwrap();
        let chain = build_transmit_chain(&bus, &src).unwrap();

        assert_eq!(chain.len(), 4);
        assert_eq!(chain.transfer_count(), 3);
        assert_eq!(chain.head_address() % 32, 0);
        for i in 0..3 {
            let d = chain.descriptor(i).unwrap();
            assert_eq!(d.read_addr, raster_base + 4 * i as u32);
            assert_eq!(d.write_addr, 0);
            assert_eq!(d.bytes_to_transfer, 4);
            assert_eq!(d.next, chain.slot_address(i + 1));
            assert_eq!(d.control, control::OWNED_BY_HW);
        }
        let sentinel = chain.descriptor(3).unwrap();
        assert_eq!(sentinel.control, 0);
        assert_eq!(chain.total_bytes(), 12);
    }

    #[test]
    fn test_receive_chain_targets_rows() {
        let bus = BusMap::new(0);
        let dst = Raster::new(2, 6).unwrap();
        let view = dst.view(0, 1, 2, 4).unwrap();
        let base = bus.map_raster(&dst).unwrap();
        let chain = build_receive_chain(&bus, &view).unwrap();
        assert_eq!(chain.direction(), Direction::Receive);
        assert_eq!(chain.descriptor(0).unwrap().write_addr, base + 1);
        assert_eq!(chain.descriptor(1).unwrap().write_addr, base + 7);
        assert_eq!(chain.descriptor(1).unwrap().read_addr, 0);
        assert_eq!(chain.descriptor(1).unwrap().bytes_to_transfer, 4);
    }

    #[test]
    fn test_chain_published_on_bus() {
        let bus = BusMap::new(0);
        let src = Raster::new(2, 2).unwrap();
        bus.map_raster(&src).unwrap();
        let chain = build_transmit_chain(&bus, &src).unwrap();

        let bytes = chain.to_bytes();
        assert_eq!(bytes.len(), 3 * DESCRIPTOR_SIZE);
        let mut on_bus = vec![0u8; bytes.len()];
        bus.read(chain.head_address(), &mut on_bus).unwrap();
        assert_eq!(on_bus, bytes);
    }

    #[test]
    fn test_refresh_picks_up_write_back() {
        let bus = BusMap::new(0);
        let src = Raster::new(2, 2).unwrap();
        bus.map_raster(&src).unwrap();
        let mut chain = build_transmit_chain(&bus, &src).unwrap();

        let mut d = *chain.descriptor(0).unwrap();
        d.complete(2, 0);
        bus.write(chain.slot_address(0), &d.to_le_bytes()).unwrap();

        assert_eq!(chain.completed_count(), 0);
        chain.refresh(&bus).unwrap();
        assert_eq!(chain.completed_count(), 1);
        assert_eq!(chain.error_count(), 0);
    }

    #[test]
    fn test_unmapped_raster_rejected() {
        let bus = BusMap::new(0);
        let src = Raster::new(2, 2).unwrap();
        assert!(matches!(
            build_transmit_chain(&bus, &src),
            Err(SgdmaError::Bus { .. })
        ));
        assert_eq!(bus.region_count(), 0);
    }

    #[test]
    fn test_row_too_long() {
        let bus = BusMap::new(0);
        let src = Raster::new(1, 70_000).unwrap();
        bus.map_raster(&src).unwrap();
        assert!(matches!(
            build_transmit_chain(&bus, &src),
            Err(SgdmaError::RegisterOverflow { .. })
        ));
    }
}
