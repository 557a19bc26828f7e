//! Raster - the 8-bit single-channel image container
//!
//! A `Raster` is a handle onto a rectangle of a shared, row-major sample
//! store. Two kinds of handles exist:
//!
//! - **owning** rasters, created by [`Raster::new`] and friends, cover their
//!   whole store;
//! - **views**, created by [`Raster::view`], alias a sub-rectangle of another
//!   raster's store without copying pixel data.
//!
//! # Ownership model
//!
//! The store is reference counted, so a view keeps its parent's samples
//! alive. Writes through any handle are visible through every other handle
//! that overlaps the written sample. Access goes through short-lived
//! [`RasterRead`] / [`RasterWrite`] guards, which hand out row slices.
//!
//! All dimensions are given rows first: `(height, width)`, `(row, col)`.

mod access;
mod compare;
mod view;

pub use compare::RasterDiff;

use crate::error::{Error, Result};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared sample storage
#[derive(Debug)]
struct RasterStore {
    /// Samples per stored row
    stride: u32,
    /// Stored rows
    rows: u32,
    /// Row-major samples, `stride * rows` long
    pixels: RwLock<Vec<u8>>,
}

impl RasterStore {
    fn read(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.pixels.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<u8>> {
        self.pixels.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Raster - 8-bit grayscale image
///
/// # Examples
///
/// ```
/// use fxscale_core::Raster;
///
/// let raster = Raster::new(480, 640).unwrap();
/// assert_eq!(raster.height(), 480);
/// assert_eq!(raster.width(), 640);
/// assert_eq!(raster.get(10, 10), Some(0));
/// ```
#[derive(Debug)]
pub struct Raster {
    store: Arc<RasterStore>,
    /// First store row covered by this handle
    row0: u32,
    /// First store column covered by this handle
    col0: u32,
    height: u32,
    width: u32,
    view: bool,
}

impl Raster {
    /// Create a new owning raster with `height` rows of `width` samples.
    ///
    /// The samples are initialized to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(height: u32, width: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let len = (height as usize) * (width as usize);
        Ok(Self::from_store(height, width, vec![0u8; len]))
    }

    /// Create an owning raster from row-major samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] for a zero dimension and
    /// [`Error::InvalidParameter`] if `data.len() != height * width`.
    pub fn from_vec(height: u32, width: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = (height as usize) * (width as usize);
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "sample buffer holds {} bytes, {}x{} raster needs {}",
                data.len(),
                height,
                width,
                expected
            )));
        }
        Ok(Self::from_store(height, width, data))
    }

    /// Create an owning raster from a list of equally long rows.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rows, the rows are empty, or the
    /// rows differ in length.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = u32::try_from(rows.len())
            .map_err(|_| Error::InvalidParameter("too many rows".to_string()))?;
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let width = u32::try_from(width)
            .map_err(|_| Error::InvalidParameter("row too long".to_string()))?;
        let mut data = Vec::with_capacity((height as usize) * (width as usize));
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width as usize {
                return Err(Error::InvalidParameter(format!(
                    "row {} has {} samples, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(height, width, data)
    }

    fn from_store(height: u32, width: u32, data: Vec<u8>) -> Self {
        Raster {
            store: Arc::new(RasterStore {
                stride: width,
                rows: height,
                pixels: RwLock::new(data),
            }),
            row0: 0,
            col0: 0,
            height,
            width,
            view: false,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of samples per row.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// `(height, width)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    /// Number of samples covered by this handle.
    #[inline]
    pub fn len(&self) -> usize {
        (self.height as usize) * (self.width as usize)
    }

    /// Rasters always hold at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Samples per stored row of the underlying store.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.store.stride
    }

    /// Size of the underlying store in bytes.
    #[inline]
    pub fn store_len(&self) -> usize {
        (self.store.stride as usize) * (self.store.rows as usize)
    }

    /// Byte offset of `row` (of this handle) inside the underlying store.
    ///
    /// Returns `None` if `row >= height`.
    pub fn row_byte_offset(&self, row: u32) -> Option<usize> {
        if row >= self.height {
            return None;
        }
        Some(((self.row0 + row) as usize) * (self.store.stride as usize) + self.col0 as usize)
    }

    /// Check whether two handles share the same underlying store.
    pub fn shares_storage_with(&self, other: &Raster) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Number of handles (owning raster plus views) sharing the store.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.store)
    }

    /// Lock the raster for reading.
    pub fn read(&self) -> RasterRead<'_> {
        RasterRead {
            raster: self,
            pixels: self.store.read(),
        }
    }

    /// Lock the raster for writing.
    ///
    /// Only the samples covered by this handle are reachable through the
    /// guard, but the whole store is locked while it is alive.
    pub fn write(&self) -> RasterWrite<'_> {
        RasterWrite {
            raster: self,
            pixels: self.store.write(),
        }
    }

    /// Copy the covered samples into a row-major vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let guard = self.read();
        let mut out = Vec::with_capacity(self.len());
        for row in guard.rows() {
            out.extend_from_slice(row);
        }
        out
    }

    /// Create an independent owning copy of the covered samples.
    ///
    /// Unlike [`Raster::view`], the result shares nothing with `self`.
    pub fn deep_clone(&self) -> Raster {
        Self::from_store(self.height, self.width, self.to_vec())
    }

    /// Copy raw bytes out of the underlying store, starting at `offset`.
    ///
    /// This addresses the whole store, not just this handle's rectangle;
    /// it is the path DMA engines use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the range leaves the store.
    pub fn read_store_bytes(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        let pixels = self.store.read();
        let end = checked_end(offset, buf.len(), pixels.len())?;
        buf.copy_from_slice(&pixels[offset..end]);
        Ok(())
    }

    /// Copy raw bytes into the underlying store, starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the range leaves the store.
    pub fn write_store_bytes(&self, offset: usize, data: &[u8]) -> Result<()> {
        let mut pixels = self.store.write();
        let end = checked_end(offset, data.len(), pixels.len())?;
        pixels[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Write raster metadata to a writer (for debugging).
    pub fn print_info(&self, writer: &mut impl std::io::Write, label: Option<&str>) -> Result<()> {
        if let Some(text) = label {
            writeln!(writer, "  Raster Info for {text}:")?;
        }
        writeln!(
            writer,
            "    height = {}, width = {}, stride = {}",
            self.height, self.width, self.store.stride
        )?;
        if self.view {
            writeln!(
                writer,
                "    view at row {}, col {} of {}x{} store",
                self.row0, self.col0, self.store.rows, self.store.stride
            )?;
        }
        Ok(())
    }
}

fn checked_end(offset: usize, len: usize, store_len: usize) -> Result<usize> {
    match offset.checked_add(len) {
        Some(end) if end <= store_len => Ok(end),
        _ => Err(Error::IndexOutOfBounds {
            index: offset.saturating_add(len),
            len: store_len,
        }),
    }
}

/// Read guard over a raster's samples.
pub struct RasterRead<'a> {
    raster: &'a Raster,
    pixels: RwLockReadGuard<'a, Vec<u8>>,
}

impl RasterRead<'_> {
    /// Number of rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.raster.height
    }

    /// Number of samples per row.
    #[inline]
    pub fn width(&self) -> u32 {
        self.raster.width
    }

    /// Samples of row `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= height`.
    #[inline]
    pub fn row(&self, row: u32) -> &[u8] {
        assert!(row < self.raster.height, "row {row} out of range");
        let start = row_start(self.raster, row);
        &self.pixels[start..start + self.raster.width as usize]
    }

    /// Iterate over all rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.raster.height).map(move |r| self.row(r))
    }

    /// Sample at `(row, col)`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, row: u32, col: u32) -> Option<u8> {
        if row >= self.raster.height || col >= self.raster.width {
            return None;
        }
        Some(self.pixels[row_start(self.raster, row) + col as usize])
    }
}

/// Write guard over a raster's samples.
pub struct RasterWrite<'a> {
    raster: &'a Raster,
    pixels: RwLockWriteGuard<'a, Vec<u8>>,
}

impl RasterWrite<'_> {
    /// Number of rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.raster.height
    }

    /// Number of samples per row.
    #[inline]
    pub fn width(&self) -> u32 {
        self.raster.width
    }

    /// Samples of row `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= height`.
    #[inline]
    pub fn row(&self, row: u32) -> &[u8] {
        assert!(row < self.raster.height, "row {row} out of range");
        let start = row_start(self.raster, row);
        &self.pixels[start..start + self.raster.width as usize]
    }

    /// Mutable samples of row `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= height`.
    #[inline]
    pub fn row_mut(&mut self, row: u32) -> &mut [u8] {
        assert!(row < self.raster.height, "row {row} out of range");
        let start = row_start(self.raster, row);
        let width = self.raster.width as usize;
        &mut self.pixels[start..start + width]
    }

    /// Set every covered sample to `val`.
    pub fn fill(&mut self, val: u8) {
        for row in 0..self.raster.height {
            self.row_mut(row).fill(val);
        }
    }
}

#[inline]
fn row_start(raster: &Raster, row: u32) -> usize {
    ((raster.row0 + row) as usize) * (raster.store.stride as usize) + raster.col0 as usize
}
