//! Fixed-point bilinear scaling
//!
//! The kernel works entirely in integer arithmetic so the software model
//! and the accelerator produce bit-identical rasters:
//!
//! 1. each scale factor is encoded in [`SCALE_FACTOR_FORMAT`] and decoded
//!    again; the output size is `floor(input * quantized)` on both axes;
//! 2. per-axis coordinate increments are `encode(1 / scale)` in
//!    [`COORDINATE_FORMAT`], taken from the *unquantized* factor;
//! 3. output row `v` samples at `y = v * inc_y`, output column `u` at
//!    `x = u * inc_x`; the integer part selects the upper-left neighbour and
//!    the fraction weights the blend;
//! 4. the right/bottom neighbour of the last column/row is the sample
//!    itself, so edges are replicated rather than extrapolated;
//! 5. blends are shifted right by `nfrac` after each stage, which truncates.

use crate::{TransformError, TransformResult};
use fxscale_core::{COORDINATE_FORMAT, FixedFormat, Raster, RasterRead, SCALE_FACTOR_FORMAT};

/// Random access to the rows of a source image.
///
/// Implemented for locked rasters and for plain row vectors, which is how
/// the simulated accelerator buffers its input stream.
pub trait RowSource {
    /// Samples of row `row`.
    fn source_row(&self, row: u32) -> &[u8];
}

impl RowSource for RasterRead<'_> {
    fn source_row(&self, row: u32) -> &[u8] {
        self.row(row)
    }
}

impl RowSource for [Vec<u8>] {
    fn source_row(&self, row: u32) -> &[u8] {
        &self[row as usize]
    }
}

impl RowSource for Vec<Vec<u8>> {
    fn source_row(&self, row: u32) -> &[u8] {
        &self[row as usize]
    }
}

/// Everything needed to run one scale operation
///
/// Both the software path and the accelerator configuration are derived
/// from the same plan, so they cannot disagree on output size or
/// increments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalePlan {
    /// Source rows
    pub input_height: u32,
    /// Source columns
    pub input_width: u32,
    /// Requested horizontal scale
    pub sx: f32,
    /// Requested vertical scale
    pub sy: f32,
    /// `sx` encoded in the scale factor format
    pub sx_encoded: u32,
    /// `sy` encoded in the scale factor format
    pub sy_encoded: u32,
    /// Horizontal scale the register can actually hold
    pub sx_quantized: f32,
    /// Vertical scale the register can actually hold
    pub sy_quantized: f32,
    /// Output rows, `floor(input_height * sy_quantized)`
    pub out_height: u32,
    /// Output columns, `floor(input_width * sx_quantized)`
    pub out_width: u32,
    /// Horizontal coordinate step, `encode(1 / sx)` in the coordinate format
    pub increment_x: u32,
    /// Vertical coordinate step, `encode(1 / sy)` in the coordinate format
    pub increment_y: u32,
    /// Format of the scale factors
    pub scale_format: FixedFormat,
    /// Format of coordinates and increments
    pub coordinate_format: FixedFormat,
}

impl ScalePlan {
    /// Plan a scale of an `input_height` x `input_width` raster with the
    /// register formats of the accelerator.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidScaleFactor`] for a non-finite or
    /// non-positive factor and [`TransformError::EmptyOutput`] if a
    /// quantized factor yields zero output rows or columns.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxscale_transform::ScalePlan;
    ///
    /// let plan = ScalePlan::new(4, 4, 2.0, 2.0).unwrap();
    /// assert_eq!((plan.out_height, plan.out_width), (8, 8));
    /// assert_eq!(plan.sx_encoded, 64);
    /// assert_eq!(plan.increment_x, 2048);
    /// ```
    pub fn new(input_height: u32, input_width: u32, sx: f32, sy: f32) -> TransformResult<Self> {
        Self::with_formats(
            input_height,
            input_width,
            sx,
            sy,
            SCALE_FACTOR_FORMAT,
            COORDINATE_FORMAT,
        )
    }

    /// Plan a scale with explicit fixed-point formats.
    ///
    /// The coordinate format may have at most 16 fractional bits so the
    /// blend stays within 32-bit intermediates.
    pub fn with_formats(
        input_height: u32,
        input_width: u32,
        sx: f32,
        sy: f32,
        scale_format: FixedFormat,
        coordinate_format: FixedFormat,
    ) -> TransformResult<Self> {
        if input_height == 0 || input_width == 0 {
            return Err(fxscale_core::Error::InvalidDimension {
                width: input_width,
                height: input_height,
            }
            .into());
        }
        if coordinate_format.nfrac > 16 {
            return Err(fxscale_core::Error::InvalidParameter(format!(
                "coordinate format has {} fractional bits, at most 16 are supported",
                coordinate_format.nfrac
            ))
            .into());
        }
        check_scale_factor("sx", sx)?;
        check_scale_factor("sy", sy)?;

        let sx_encoded = scale_format.encode(sx);
        let sy_encoded = scale_format.encode(sy);
        let sx_quantized = scale_format.decode(sx_encoded);
        let sy_quantized = scale_format.decode(sy_encoded);

        let out_height = output_extent("vertical", input_height, sy, sy_quantized)?;
        let out_width = output_extent("horizontal", input_width, sx, sx_quantized)?;

        let plan = ScalePlan {
            input_height,
            input_width,
            sx,
            sy,
            sx_encoded,
            sy_encoded,
            sx_quantized,
            sy_quantized,
            out_height,
            out_width,
            increment_x: coordinate_format.encode(1.0 / sx),
            increment_y: coordinate_format.encode(1.0 / sy),
            scale_format,
            coordinate_format,
        };
        log::debug!(
            "scale plan {}x{} -> {}x{}: sx {} (reg {:#04x}), sy {} (reg {:#04x}), inc {:#06x}/{:#06x}",
            input_height,
            input_width,
            out_height,
            out_width,
            sx_quantized,
            sx_encoded,
            sy_quantized,
            sy_encoded,
            plan.increment_x,
            plan.increment_y
        );
        Ok(plan)
    }

    /// Coordinate accumulator for output row `v`.
    #[inline]
    pub fn row_coordinate(&self, v: u32) -> u64 {
        u64::from(v) * u64::from(self.increment_y)
    }

    /// Output dimensions as `(height, width)`.
    #[inline]
    pub fn output_dimensions(&self) -> (u32, u32) {
        (self.out_height, self.out_width)
    }
}

fn check_scale_factor(name: &str, value: f32) -> TransformResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TransformError::InvalidScaleFactor(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn output_extent(axis: &'static str, input: u32, scale: f32, quantized: f32) -> TransformResult<u32> {
    let extent = (f64::from(input) * f64::from(quantized)).floor();
    if extent < 1.0 {
        return Err(TransformError::EmptyOutput {
            axis,
            scale,
            quantized,
        });
    }
    if extent > f64::from(u32::MAX) {
        return Err(TransformError::InvalidScaleFactor(format!(
            "{} output extent {} does not fit 32 bits",
            axis, extent
        )));
    }
    Ok(extent as u32)
}

/// Split a coordinate into `(floor, floor + 1)` sample indices plus the
/// fractional weight, replicating the last index at the edge.
#[inline]
fn neighbours(format: FixedFormat, coord: u64, len: u32) -> (usize, usize, u32) {
    let last = u64::from(len - 1);
    let floor = (coord >> format.nfrac).min(last);
    let floor1 = if floor >= last { floor } else { floor + 1 };
    let alpha = (coord & u64::from(format.one() - 1)) as u32;
    (floor as usize, floor1 as usize, alpha)
}

/// Compute output row `v` of `plan` into `out`.
///
/// `y` is the row's coordinate accumulator ([`ScalePlan::row_coordinate`]).
/// Only `out[..plan.out_width]` is written.
///
/// # Panics
///
/// Panics if `out` is shorter than `plan.out_width` or `source` has fewer
/// rows or columns than the plan's input.
pub fn interpolate_row<S: RowSource + ?Sized>(source: &S, plan: &ScalePlan, y: u64, out: &mut [u8]) {
    let fmt = plan.coordinate_format;
    let shift = fmt.nfrac;
    let one = fmt.one();

    let (fy, fy1, ay) = neighbours(fmt, y, plan.input_height);
    let top = source.source_row(fy as u32);
    let bottom = source.source_row(fy1 as u32);

    let mut x = 0u64;
    for sample in out[..plan.out_width as usize].iter_mut() {
        let (fx, fx1, ax) = neighbours(fmt, x, plan.input_width);

        let tl = (one - ax) * u32::from(top[fx]);
        let tr = ax * u32::from(top[fx1]);
        let bl = (one - ax) * u32::from(bottom[fx]);
        let br = ax * u32::from(bottom[fx1]);

        let subp_top = (one - ay) * ((tl + tr) >> shift);
        let subp_bottom = ay * ((bl + br) >> shift);
        *sample = ((subp_top + subp_bottom) >> shift) as u8;

        x += u64::from(plan.increment_x);
    }
}

/// Scale a raster by `(sx, sy)` with fixed-point bilinear interpolation.
///
/// # Errors
///
/// See [`ScalePlan::new`].
///
/// # Examples
///
/// ```
/// use fxscale_core::Raster;
/// use fxscale_transform::scale_bilinear;
///
/// let src = Raster::from_vec(2, 2, vec![0, 100, 100, 200]).unwrap();
/// let out = scale_bilinear(&src, 1.0, 1.0).unwrap();
/// assert!(out.equals(&src));
/// ```
pub fn scale_bilinear(raster: &Raster, sx: f32, sy: f32) -> TransformResult<Raster> {
    let plan = ScalePlan::new(raster.height(), raster.width(), sx, sy)?;
    scale_with_plan(raster, &plan)
}

/// Run a previously computed plan on `raster`.
///
/// # Errors
///
/// Returns [`fxscale_core::Error::DimensionMismatch`] (wrapped) if the
/// raster is not the size the plan was made for.
pub fn scale_with_plan(raster: &Raster, plan: &ScalePlan) -> TransformResult<Raster> {
    if raster.dimensions() != (plan.input_height, plan.input_width) {
        return Err(fxscale_core::Error::DimensionMismatch {
            expected: (plan.input_height, plan.input_width),
            actual: raster.dimensions(),
        }
        .into());
    }
    let out = Raster::new(plan.out_height, plan.out_width)?;
    {
        let src = raster.read();
        let mut dst = out.write();
        for v in 0..plan.out_height {
            interpolate_row(&src, plan, plan.row_coordinate(v), dst.row_mut(v));
        }
    }
    Ok(out)
}
