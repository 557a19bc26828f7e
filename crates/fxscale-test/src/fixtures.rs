//! Deterministic synthetic rasters

use crate::TestResult;
use fxscale_core::Raster;

/// Raster whose sample at `(r, c)` is `10 * r + c` (wrapping at 256).
pub fn ramp_raster(height: u32, width: u32) -> TestResult<Raster> {
    let data = (0..height)
        .flat_map(|r| (0..width).map(move |c| ((10 * r + c) % 256) as u8))
        .collect();
    Ok(Raster::from_vec(height, width, data)?)
}

/// Smooth diagonal gradient spanning 0..=255.
pub fn gradient_raster(height: u32, width: u32) -> TestResult<Raster> {
    let span = (height + width).saturating_sub(2).max(1);
    let data = (0..height)
        .flat_map(|r| (0..width).map(move |c| ((r + c) * 255 / span) as u8))
        .collect();
    Ok(Raster::from_vec(height, width, data)?)
}

/// Checkerboard of `cell` x `cell` squares alternating 0 and 255.
pub fn checker_raster(height: u32, width: u32, cell: u32) -> TestResult<Raster> {
    let cell = cell.max(1);
    let data = (0..height)
        .flat_map(|r| {
            (0..width).map(move |c| if (r / cell + c / cell) % 2 == 0 { 0 } else { 255 })
        })
        .collect();
    Ok(Raster::from_vec(height, width, data)?)
}
