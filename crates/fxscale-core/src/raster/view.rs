//! Zero-copy sub-rectangle views
//!
//! A view shares its parent's store and covers a sub-rectangle of it.
//! Edits made through the parent inside the rectangle are visible through
//! the view and vice versa.

use super::Raster;
use crate::Rect;
use crate::error::{Error, Result};
use std::sync::Arc;

impl Raster {
    /// Create a view of `rows` x `cols` samples whose upper-left sample is
    /// `(start_row, start_col)` of `self`.
    ///
    /// Views of views are allowed; offsets compose.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if `rows` or `cols` is 0 and
    /// [`Error::OutOfBounds`] if `start_row + rows > height` or
    /// `start_col + cols > width`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxscale_core::Raster;
    ///
    /// let parent = Raster::new(100, 80).unwrap();
    /// let crop = parent.view(10, 20, 40, 30).unwrap();
    /// assert_eq!(crop.dimensions(), (40, 30));
    ///
    /// parent.set(10, 20, 200).unwrap();
    /// assert_eq!(crop.get(0, 0), Some(200));
    /// ```
    pub fn view(&self, start_row: u32, start_col: u32, rows: u32, cols: u32) -> Result<Raster> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimension {
                width: cols,
                height: rows,
            });
        }
        let fits_rows = u64::from(start_row) + u64::from(rows) <= u64::from(self.height);
        let fits_cols = u64::from(start_col) + u64::from(cols) <= u64::from(self.width);
        if !fits_rows || !fits_cols {
            return Err(Error::OutOfBounds {
                start_row,
                start_col,
                rows,
                cols,
                parent_height: self.height,
                parent_width: self.width,
            });
        }
        Ok(Raster {
            store: Arc::clone(&self.store),
            row0: self.row0 + start_row,
            col0: self.col0 + start_col,
            height: rows,
            width: cols,
            view: true,
        })
    }

    /// Create a view covering `rect` (x = column, y = row).
    ///
    /// # Errors
    ///
    /// Same as [`Raster::view`].
    pub fn view_rect(&self, rect: &Rect) -> Result<Raster> {
        self.view(rect.y, rect.x, rect.h, rect.w)
    }

    /// Create a view covering all of `self`.
    ///
    /// Useful when a second handle onto the same samples is needed, for
    /// example to hand the raster to a DMA address map.
    pub fn alias(&self) -> Raster {
        Raster {
            store: Arc::clone(&self.store),
            row0: self.row0,
            col0: self.col0,
            height: self.height,
            width: self.width,
            view: true,
        }
    }

    /// Check whether this handle is a view rather than an owning raster.
    #[inline]
    pub fn is_view(&self) -> bool {
        self.view
    }

    /// Upper-left `(row, col)` of this handle inside the underlying store.
    #[inline]
    pub fn origin(&self) -> (u32, u32) {
        (self.row0, self.col0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(h: u32, w: u32) -> Raster {
        let data = (0..h * w).map(|i| (i % 256) as u8).collect();
        Raster::from_vec(h, w, data).unwrap()
    }

    #[test]
    fn test_view_reads_parent_samples() {
        let parent = ramp(4, 4);
        let v = parent.view(1, 2, 2, 2).unwrap();
        assert_eq!(v.to_vec(), vec![6, 7, 10, 11]);
        assert!(v.is_view());
        assert!(v.shares_storage_with(&parent));
        assert_eq!(v.origin(), (1, 2));
    }

    #[test]
    fn test_view_aliases_writes() {
        let parent = Raster::new(5, 5).unwrap();
        let v = parent.view(1, 1, 3, 3).unwrap();
        parent.set(2, 3, 42).unwrap();
        assert_eq!(v.get(1, 2), Some(42));
        v.set(0, 0, 7).unwrap();
        assert_eq!(parent.get(1, 1), Some(7));
    }

    #[test]
    fn test_view_out_of_bounds() {
        let parent = Raster::new(4, 6).unwrap();
        assert!(matches!(
            parent.view(2, 0, 3, 1),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            parent.view(0, 5, 1, 2),
            Err(Error::OutOfBounds { .. })
        ));
        // Exactly touching the edge is fine
        assert!(parent.view(3, 5, 1, 1).is_ok());
        assert!(parent.view(0, 0, 4, 6).is_ok());
    }

    #[test]
    fn test_view_of_view_composes() {
        let parent = ramp(6, 6);
        let outer = parent.view(1, 1, 4, 4).unwrap();
        let inner = outer.view(1, 1, 2, 2).unwrap();
        assert_eq!(inner.origin(), (2, 2));
        assert_eq!(inner.get(0, 0), parent.get(2, 2));
        // Bounds are checked against the outer view, not the store
        assert!(outer.view(3, 3, 2, 2).is_err());
    }

    #[test]
    fn test_view_keeps_store_alive() {
        let v = {
            let parent = ramp(3, 3);
            parent.view(1, 1, 2, 2).unwrap()
        };
        assert_eq!(v.to_vec(), vec![4, 5, 7, 8]);
    }

    #[test]
    fn test_view_rect() {
        let parent = ramp(4, 8);
        let rect = Rect::from_corners(2, 1, 4, 2).unwrap();
        let v = parent.view_rect(&rect).unwrap();
        assert_eq!(v.dimensions(), (2, 3));
        assert_eq!(v.get(0, 0), Some(10));
    }

    #[test]
    fn test_row_byte_offset() {
        let parent = Raster::new(4, 10).unwrap();
        let v = parent.view(2, 3, 2, 4).unwrap();
        assert_eq!(v.row_byte_offset(0), Some(23));
        assert_eq!(v.row_byte_offset(1), Some(33));
        assert_eq!(v.row_byte_offset(2), None);
    }
}
