//! Fixed-point regression test
//!
//! Register encodings for the scale factors the interactive driver is
//! usually run with, and the quantization they imply.

use fxscale_core::{COORDINATE_FORMAT, SCALE_FACTOR_FORMAT, from_fixed_point, to_fixed_point};
use fxscale_test::RegParams;

#[test]
fn fixed_reg() {
    let mut rp = RegParams::new("fixed");

    let cases: &[(f32, u32, u32)] = &[
        // (scale, SX register, SX_INV register)
        (1.0, 32, 4096),
        (2.0, 64, 2048),
        (0.5, 16, 8192),
        (1.5, 48, 2730),
        (0.75, 24, 5461),
        (3.3, 105, 1241),
    ];
    for &(scale, sx_reg, inc_reg) in cases {
        rp.compare_values(sx_reg as f64, SCALE_FACTOR_FORMAT.encode(scale) as f64, 0.0);
        rp.compare_values(
            inc_reg as f64,
            COORDINATE_FORMAT.encode(1.0 / scale) as f64,
            0.0,
        );
    }

    // 3.3 is not representable with five fractional bits
    rp.compare_values(3.28125, SCALE_FACTOR_FORMAT.quantize(3.3) as f64, 0.0);

    // Free functions agree with the format methods
    rp.compare_values(
        SCALE_FACTOR_FORMAT.encode(2.7) as f64,
        to_fixed_point(2.7, 3, 5) as f64,
        0.0,
    );
    rp.compare_values(2.5, from_fixed_point(80, 5) as f64, 0.0);

    // Coordinate accumulator splits into integer and fractional parts
    let acc = 3 * 2730;
    rp.compare_values(1.0, COORDINATE_FORMAT.int_part(acc) as f64, 0.0);
    rp.compare_values(4094.0, COORDINATE_FORMAT.frac_part(acc) as f64, 0.0);

    assert!(rp.cleanup(), "fixed regression test failed");
}
