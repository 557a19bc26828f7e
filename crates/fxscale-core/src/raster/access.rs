//! Single-sample access
//!
//! Each call takes the store lock for the duration of one access. Loops
//! over many samples should lock once with [`Raster::read`] or
//! [`Raster::write`] instead.

use super::Raster;
use crate::error::{Error, Result};

impl Raster {
    /// Get the sample at `(row, col)`.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    pub fn get(&self, row: u32, col: u32) -> Option<u8> {
        self.read().get(row, col)
    }

    /// Set the sample at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the coordinates are out of bounds.
    pub fn set(&self, row: u32, col: u32, val: u8) -> Result<()> {
        if row >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: row as usize,
                len: self.height as usize,
            });
        }
        if col >= self.width {
            return Err(Error::IndexOutOfBounds {
                index: col as usize,
                len: self.width as usize,
            });
        }
        let mut guard = self.write();
        guard.row_mut(row)[col as usize] = val;
        Ok(())
    }

    /// Set every covered sample to `val`.
    pub fn fill(&self, val: u8) {
        self.write().fill(val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let r = Raster::new(2, 3).unwrap();
        r.set(1, 2, 99).unwrap();
        assert_eq!(r.get(1, 2), Some(99));
        assert_eq!(r.get(0, 0), Some(0));
        assert_eq!(r.get(2, 0), None);
        assert_eq!(r.get(0, 3), None);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let r = Raster::new(2, 3).unwrap();
        assert!(matches!(
            r.set(2, 0, 1),
            Err(Error::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert!(matches!(
            r.set(0, 3, 1),
            Err(Error::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_fill_view_only() {
        let parent = Raster::new(3, 3).unwrap();
        let v = parent.view(1, 1, 2, 2).unwrap();
        v.fill(5);
        assert_eq!(parent.to_vec(), vec![0, 0, 0, 0, 5, 5, 0, 5, 5]);
    }
}
