//! Bus address map
//!
//! Streaming engines address memory through 32-bit bus addresses. The map
//! hands out 32-byte aligned address ranges for raster stores and for
//! descriptor memory, and resolves engine accesses back to the storage
//! behind them.
//!
//! Address ranges are bump allocated and never reused while anything is
//! mapped; once the map is empty again allocation restarts at the base.

use crate::descriptor::DESCRIPTOR_SIZE;
use crate::{SgdmaError, SgdmaResult};
use fxscale_core::Raster;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, RwLock};

enum Backing {
    /// Alias of a raster; covers the raster's whole store
    Raster(Raster),
    /// Bus-owned memory (descriptor chains)
    Memory(Mutex<Vec<u8>>),
}

struct Region {
    len: usize,
    backing: Backing,
}

struct MapState {
    next: u64,
    regions: BTreeMap<u32, Region>,
}

/// Shared bus address space
pub struct BusMap {
    base: u32,
    state: RwLock<MapState>,
}

impl std::fmt::Debug for BusMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("BusMap")
            .field("base", &format_args!("{:#010x}", self.base))
            .field("regions", &state.regions.len())
            .finish()
    }
}

fn align_up(addr: u64) -> u64 {
    let align = DESCRIPTOR_SIZE as u64;
    addr.div_ceil(align) * align
}

impl BusMap {
    /// Create an empty map whose first region starts at (or just after) `base`.
    pub fn new(base: u32) -> Self {
        BusMap {
            base,
            state: RwLock::new(MapState {
                next: align_up(u64::from(base)),
                regions: BTreeMap::new(),
            }),
        }
    }

    /// Lowest address the map allocates from.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of mapped regions.
    pub fn region_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .regions
            .len()
    }

    fn insert(&self, len: usize, backing: Backing) -> SgdmaResult<u32> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.regions.is_empty() {
            state.next = align_up(u64::from(self.base));
        }
        let start = state.next;
        let end = start + len.max(1) as u64;
        if end > u64::from(u32::MAX) + 1 {
            return Err(SgdmaError::Bus {
                address: start.min(u64::from(u32::MAX)) as u32,
                message: format!("address space exhausted mapping {} bytes", len),
            });
        }
        let addr = start as u32;
        state.next = align_up(end);
        state.regions.insert(addr, Region { len, backing });
        Ok(addr)
    }

    /// Map the whole store behind `raster` and return its base address.
    ///
    /// Mapping a raster whose store is already mapped returns the existing
    /// address.
    pub fn map_raster(&self, raster: &Raster) -> SgdmaResult<u32> {
        self.map_raster_tracked(raster).map(|(addr, _)| addr)
    }

    /// Like [`BusMap::map_raster`], also reporting whether this call
    /// created the mapping (`false` if the store was already mapped).
    pub fn map_raster_tracked(&self, raster: &Raster) -> SgdmaResult<(u32, bool)> {
        if let Some(addr) = self.raster_base(raster) {
            return Ok((addr, false));
        }
        let addr = self.insert(raster.store_len(), Backing::Raster(raster.alias()))?;
        log::trace!(
            "mapped {}-byte raster store at {:#010x}",
            raster.store_len(),
            addr
        );
        Ok((addr, true))
    }

    /// Allocate `len` bytes of zeroed bus memory.
    pub fn allocate(&self, len: usize) -> SgdmaResult<u32> {
        let addr = self.insert(len, Backing::Memory(Mutex::new(vec![0u8; len])))?;
        log::trace!("allocated {} bytes of bus memory at {:#010x}", len, addr);
        Ok(addr)
    }

    /// Remove the region starting at `addr`.
    ///
    /// Returns `false` if nothing was mapped there.
    pub fn unmap(&self, addr: u32) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.regions.remove(&addr).is_some()
    }

    /// Base address of the region aliasing `raster`'s store, if mapped.
    pub fn raster_base(&self, raster: &Raster) -> Option<u32> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.regions.iter().find_map(|(addr, region)| match &region.backing {
            Backing::Raster(r) if r.shares_storage_with(raster) => Some(*addr),
            _ => None,
        })
    }

    /// Bus address of the first sample of `row` of `raster`.
    ///
    /// # Errors
    ///
    /// Returns [`SgdmaError::Bus`] if the raster's store is not mapped, and
    /// [`fxscale_core::Error::IndexOutOfBounds`] (wrapped) for a bad row.
    pub fn row_address(&self, raster: &Raster, row: u32) -> SgdmaResult<u32> {
        let base = self.raster_base(raster).ok_or_else(|| SgdmaError::Bus {
            address: 0,
            message: "raster store is not mapped".to_string(),
        })?;
        let offset = raster
            .row_byte_offset(row)
            .ok_or(fxscale_core::Error::IndexOutOfBounds {
                index: row as usize,
                len: raster.height() as usize,
            })?;
        Ok(base + offset as u32)
    }

    fn with_region<T>(
        &self,
        addr: u32,
        len: usize,
        f: impl FnOnce(&Region, usize) -> SgdmaResult<T>,
    ) -> SgdmaResult<T> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let unmapped = || SgdmaError::Bus {
            address: addr,
            message: format!("{}-byte access is not mapped", len),
        };
        let (&start, region) = state.regions.range(..=addr).next_back().ok_or_else(unmapped)?;
        let offset = (addr - start) as usize;
        if offset + len > region.len {
            return Err(unmapped());
        }
        f(region, offset)
    }

    /// Copy `buf.len()` bytes starting at bus address `addr` into `buf`.
    pub fn read(&self, addr: u32, buf: &mut [u8]) -> SgdmaResult<()> {
        self.with_region(addr, buf.len(), |region, offset| match &region.backing {
            Backing::Raster(r) => Ok(r.read_store_bytes(offset, buf)?),
            Backing::Memory(mem) => {
                let mem = mem.lock().unwrap_or_else(PoisonError::into_inner);
                buf.copy_from_slice(&mem[offset..offset + buf.len()]);
                Ok(())
            }
        })
    }

    /// Copy `data` to bus address `addr`.
    pub fn write(&self, addr: u32, data: &[u8]) -> SgdmaResult<()> {
        self.with_region(addr, data.len(), |region, offset| match &region.backing {
            Backing::Raster(r) => Ok(r.write_store_bytes(offset, data)?),
            Backing::Memory(mem) => {
                let mut mem = mem.lock().unwrap_or_else(PoisonError::into_inner);
                mem[offset..offset + data.len()].copy_from_slice(data);
                Ok(())
            }
        })
    }
}
