//! fxscale-transform - Fixed-point bilinear scaling
//!
//! [`ScalePlan`] turns a source size and a pair of scale factors into the
//! quantized output size and fixed-point coordinate increments;
//! [`interpolate_row`] is the integer-only kernel shared by the software
//! path ([`scale_bilinear`]) and the simulated accelerator.

mod error;
pub mod scale;

pub use error::{TransformError, TransformResult};
pub use scale::{RowSource, ScalePlan, interpolate_row, scale_bilinear, scale_with_plan};
