//! Unsigned fixed-point encoding
//!
//! Values are stored as `nint` integer bits followed by `nfrac` fractional
//! bits. Encoding multiplies by `2^nfrac`, truncates toward zero and masks
//! the result to `nint + nfrac` bits; values outside the representable range
//! wrap silently, exactly like the narrow accelerator registers they feed.
//!
//! Two formats are in use at the same time:
//!
//! | Format | Bits | Used for |
//! |---|---|---|
//! | [`SCALE_FACTOR_FORMAT`] | 3.5 | the user-supplied scale factor (`SX`, `SY` registers) |
//! | [`COORDINATE_FORMAT`] | 4.12 | per-sample coordinate increments (`SX_INV`, `SY_INV`) |
//!
//! Output sizes must always be derived from the *quantized* scale factor
//! (`decode(encode(s))`) so the software model and the accelerator agree on
//! the destination dimensions.

/// Layout of an unsigned fixed-point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedFormat {
    /// Integer bits
    pub nint: u32,
    /// Fractional bits
    pub nfrac: u32,
}

/// Scale factor register format: 3 integer bits, 5 fractional bits.
///
/// Covers `[0, 8)` with a granularity of 1/32.
pub const SCALE_FACTOR_FORMAT: FixedFormat = FixedFormat::new(3, 5);

/// Coordinate increment format: 4 integer bits, 12 fractional bits (16 bits total).
pub const COORDINATE_FORMAT: FixedFormat = FixedFormat::new(4, 12);

impl FixedFormat {
    /// Create a format with `nint` integer and `nfrac` fractional bits.
    ///
    /// `nint + nfrac` must not exceed 32.
    pub const fn new(nint: u32, nfrac: u32) -> Self {
        assert!(nint + nfrac <= 32, "fixed-point format wider than 32 bits");
        Self { nint, nfrac }
    }

    /// Total width of the encoding in bits.
    #[inline]
    pub const fn total_bits(self) -> u32 {
        self.nint + self.nfrac
    }

    /// Mask selecting the `nint + nfrac` low bits.
    #[inline]
    pub const fn mask(self) -> u32 {
        match self.total_bits() {
            32 => u32::MAX,
            bits => (1u32 << bits) - 1,
        }
    }

    /// The value 1.0 in this format.
    #[inline]
    pub const fn one(self) -> u32 {
        1u32 << self.nfrac
    }

    /// Encode a real value. Truncates, then wraps to the format width.
    #[inline]
    pub fn encode(self, value: f32) -> u32 {
        to_fixed_point(value, self.nint, self.nfrac)
    }

    /// Decode an encoded value back to a real number.
    #[inline]
    pub fn decode(self, encoded: u32) -> f32 {
        from_fixed_point(encoded, self.nfrac)
    }

    /// Round-trip a value through the format, keeping only the precision a
    /// register of this width can hold.
    #[inline]
    pub fn quantize(self, value: f32) -> f32 {
        self.decode(self.encode(value))
    }

    /// Fractional bits of an encoded value (still scaled by `2^nfrac`).
    #[inline]
    pub const fn frac_part(self, encoded: u32) -> u32 {
        encoded & (self.one() - 1)
    }

    /// Integer part of an encoded value.
    #[inline]
    pub const fn int_part(self, encoded: u32) -> u32 {
        encoded >> self.nfrac
    }
}

/// Encode `input` with `nint` integer and `nfrac` fractional bits.
///
/// The product `input * 2^nfrac` is truncated toward zero and masked to
/// `nint + nfrac` bits. No overflow check is made: callers must keep values
/// inside the format's range. Negative and NaN inputs encode as 0.
pub fn to_fixed_point(input: f32, nint: u32, nfrac: u32) -> u32 {
    let scaled = input * (1u64 << nfrac) as f32;
    // Truncate through u64 so values just past the range wrap instead of saturating.
    let raw = scaled as u64;
    let mask = if nint + nfrac >= 32 {
        u64::from(u32::MAX)
    } else {
        (1u64 << (nint + nfrac)) - 1
    };
    (raw & mask) as u32
}

/// Decode a value with `nfrac` fractional bits.
pub fn from_fixed_point(input: u32, nfrac: u32) -> f32 {
    input as f32 / (1u64 << nfrac) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_scale_factors() {
        assert_eq!(SCALE_FACTOR_FORMAT.encode(1.0), 32);
        assert_eq!(SCALE_FACTOR_FORMAT.encode(2.0), 64);
        assert_eq!(SCALE_FACTOR_FORMAT.encode(0.5), 16);
        // 1.3 * 32 = 41.6 truncates to 41
        assert_eq!(SCALE_FACTOR_FORMAT.encode(1.3), 41);
    }

    #[test]
    fn test_encode_wraps_silently() {
        // 8.0 needs a fourth integer bit: 256 & 0xff == 0
        assert_eq!(SCALE_FACTOR_FORMAT.encode(8.0), 0);
        assert_eq!(SCALE_FACTOR_FORMAT.encode(9.0), 32);
        // 1/0.05 = 20.0 does not fit 4 integer bits
        assert_eq!(COORDINATE_FORMAT.encode(20.0), (20 * 4096) & 0xffff);
    }

    #[test]
    fn test_negative_encodes_as_zero() {
        assert_eq!(SCALE_FACTOR_FORMAT.encode(-1.5), 0);
        assert_eq!(SCALE_FACTOR_FORMAT.encode(f32::NAN), 0);
    }

    #[test]
    fn test_decode() {
        assert_eq!(SCALE_FACTOR_FORMAT.decode(41), 41.0 / 32.0);
        assert_eq!(COORDINATE_FORMAT.decode(2048), 0.5);
        assert_eq!(from_fixed_point(96, 5), 3.0);
    }

    #[test]
    fn test_quantize_loses_precision() {
        let q = SCALE_FACTOR_FORMAT.quantize(1.3);
        assert_eq!(q, 1.28125);
        assert!(q <= 1.3);
    }

    #[test]
    fn test_parts() {
        let v = COORDINATE_FORMAT.encode(3.25);
        assert_eq!(COORDINATE_FORMAT.int_part(v), 3);
        assert_eq!(COORDINATE_FORMAT.frac_part(v), 1024);
        assert_eq!(COORDINATE_FORMAT.one(), 4096);
        assert_eq!(COORDINATE_FORMAT.mask(), 0xffff);
        assert_eq!(SCALE_FACTOR_FORMAT.mask(), 0xff);
    }

    #[test]
    fn test_free_functions_match_format() {
        for v in [0.0f32, 0.25, 1.0, 1.7, 3.99, 7.96875] {
            assert_eq!(to_fixed_point(v, 3, 5), SCALE_FACTOR_FORMAT.encode(v));
        }
    }
}
