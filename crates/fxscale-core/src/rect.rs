//! Rect - crop rectangles in raster coordinates
//!
//! A `Rect` names a sub-rectangle by its upper-left sample and its extent.
//! `x` is a column index, `y` is a row index.

use crate::error::{Error, Result};

/// A rectangle region
///
/// Small and frequently passed around, so this is a plain `Copy` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in columns
    pub w: u32,
    /// Height in rows
    pub h: u32,
}

impl Rect {
    /// Create a new rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Result<Self> {
        if w == 0 || h == 0 {
            return Err(Error::InvalidParameter(format!(
                "rectangle dimensions must be positive: w={}, h={}",
                w, h
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Create a rectangle from its upper-left `(x0, y0)` and lower-right
    /// `(x1, y1)` corners, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `x1 > x0` and `y1 > y0`,
    /// or if an extent does not fit in a `u32`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxscale_core::Rect;
    ///
    /// let r = Rect::from_corners(10, 20, 19, 24).unwrap();
    /// assert_eq!((r.x, r.y, r.w, r.h), (10, 20, 10, 5));
    /// ```
    pub fn from_corners(x0: u32, y0: u32, x1: u32, y1: u32) -> Result<Self> {
        if x1 <= x0 || y1 <= y0 {
            return Err(Error::InvalidParameter(format!(
                "lower-right corner ({}, {}) must lie below and right of upper-left ({}, {})",
                x1, y1, x0, y0
            )));
        }
        let extent = |lo: u32, hi: u32| {
            (hi - lo).checked_add(1).ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "corners {} and {} span more than {} samples",
                    lo,
                    hi,
                    u32::MAX
                ))
            })
        };
        Ok(Self {
            x: x0,
            y: y0,
            w: extent(x0, x1)?,
            h: extent(y0, y1)?,
        })
    }

    /// Right column (exclusive)
    #[inline]
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.w)
    }

    /// Bottom row (exclusive)
    #[inline]
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.h)
    }

    /// Check whether the rectangle fits inside a `width` x `height` area.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= u64::from(width) && self.bottom() <= u64::from(height)
    }

    /// Number of samples covered
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_inclusive() {
        let r = Rect::from_corners(0, 0, 3, 1).unwrap();
        assert_eq!(r.w, 4);
        assert_eq!(r.h, 2);
        assert_eq!(r.area(), 8);
    }

    #[test]
    fn test_from_corners_rejects_inverted() {
        assert!(Rect::from_corners(5, 5, 4, 9).is_err());
        assert!(Rect::from_corners(5, 5, 9, 5).is_err());
    }

    #[test]
    fn test_from_corners_full_range() {
        assert!(matches!(
            Rect::from_corners(0, 0, u32::MAX, 1),
            Err(Error::InvalidParameter(_))
        ));
        assert!(Rect::from_corners(0, 0, 1, u32::MAX).is_err());
        let r = Rect::from_corners(1, 0, u32::MAX, 1).unwrap();
        assert_eq!(r.w, u32::MAX);
        assert_eq!(r.right(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_fits_within() {
        let r = Rect::new(2, 3, 4, 5).unwrap();
        assert!(r.fits_within(6, 8));
        assert!(!r.fits_within(5, 8));
        assert!(!r.fits_within(6, 7));
    }

    #[test]
    fn test_fits_within_no_overflow() {
        let r = Rect::new(u32::MAX, 0, 2, 1).unwrap();
        assert!(!r.fits_within(u32::MAX, 1));
    }

    #[test]
    fn test_zero_rect_rejected() {
        assert!(Rect::new(0, 0, 0, 4).is_err());
    }
}
