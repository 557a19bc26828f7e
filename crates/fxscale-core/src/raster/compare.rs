//! Raster comparison and point operations
//!
//! - Sample difference counting between two equally sized rasters
//! - Exact equality
//! - Photometric inversion

use super::Raster;
use crate::error::{Error, Result};

/// Result of comparing two rasters sample by sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterDiff {
    /// Number of samples that differ
    pub differing: u64,
    /// Total number of samples compared
    pub total: u64,
    /// Largest absolute difference between two corresponding samples
    pub max_abs_diff: u8,
}

impl RasterDiff {
    /// Whether the rasters were identical.
    #[inline]
    pub fn is_identical(&self) -> bool {
        self.differing == 0
    }

    /// Fraction of samples that differ (0.0 to 1.0).
    pub fn fract_diff(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.differing as f64 / self.total as f64
        }
    }
}

impl Raster {
    /// Compare two rasters sample by sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the dimensions differ.
    pub fn compare(&self, other: &Raster) -> Result<RasterDiff> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        let a = self.read();
        let b = other.read();
        let mut differing = 0u64;
        let mut max_abs_diff = 0u8;
        for row in 0..self.height {
            for (&pa, &pb) in a.row(row).iter().zip(b.row(row)) {
                let d = pa.abs_diff(pb);
                if d != 0 {
                    differing += 1;
                    max_abs_diff = max_abs_diff.max(d);
                }
            }
        }
        Ok(RasterDiff {
            differing,
            total: self.len() as u64,
            max_abs_diff,
        })
    }

    /// Check whether two rasters have the same dimensions and samples.
    pub fn equals(&self, other: &Raster) -> bool {
        self.compare(other).is_ok_and(|d| d.is_identical())
    }

    /// Create a new owning raster with every sample `v` replaced by `255 - v`.
    pub fn invert(&self) -> Raster {
        let inverted: Vec<u8> = self.to_vec().into_iter().map(|v| 255 - v).collect();
        Raster::from_store(self.height, self.width, inverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_identical() {
        let a = Raster::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        let b = a.deep_clone();
        let d = a.compare(&b).unwrap();
        assert!(d.is_identical());
        assert_eq!(d.total, 4);
        assert!(a.equals(&b));
    }

    #[test]
    fn test_compare_counts_differences() {
        let a = Raster::from_vec(2, 2, vec![10, 20, 30, 40]).unwrap();
        let b = Raster::from_vec(2, 2, vec![10, 25, 30, 0]).unwrap();
        let d = a.compare(&b).unwrap();
        assert_eq!(d.differing, 2);
        assert_eq!(d.max_abs_diff, 40);
        assert_eq!(d.fract_diff(), 0.5);
        assert!(!a.equals(&b));
    }

    #[test]
    fn test_compare_dimension_mismatch() {
        let a = Raster::new(2, 3).unwrap();
        let b = Raster::new(3, 2).unwrap();
        assert!(matches!(
            a.compare(&b),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(!a.equals(&b));
    }

    #[test]
    fn test_compare_view_with_parent_region() {
        let parent = Raster::from_vec(3, 3, (0..9).collect()).unwrap();
        let v = parent.view(1, 1, 2, 2).unwrap();
        let expected = Raster::from_vec(2, 2, vec![4, 5, 7, 8]).unwrap();
        assert!(v.equals(&expected));
    }

    #[test]
    fn test_invert() {
        let r = Raster::from_vec(1, 3, vec![0, 100, 255]).unwrap();
        let inv = r.invert();
        assert_eq!(inv.to_vec(), vec![255, 155, 0]);
        assert!(!inv.is_view());
    }
}
