//! IEEE-754 minimizer: shrink/widen between half, single, and double
//! precision without losing information.
//!
//! Three direction-preserving conversions, all implemented with integer bit
//! math only (`f32`/`f64::to_bits`/`from_bits`, shifts, masks) so this
//! module runs correctly on targets without an FPU and never risks the
//! rounding surprises of going through `<math.h>`-style arithmetic:
//!
//! - half ↔ double widening/narrowing (and, by the same generic code,
//!   single ↔ double and half ↔ single — "half" here just means a 16-bit
//!   IEEE-754 binary16 bit pattern; this crate has no need for a dedicated
//!   `f16` type beyond that).
//! - double → integer, for deterministic CBOR integer encoding.
//! - u64 → double, succeeding only when the conversion is exact.

use crate::buf::{bits_to_f32, bits_to_f64, f32_to_bits, f64_to_bits};

/// Describes an IEEE-754 binary floating-point layout: how many exponent
/// and mantissa bits it has. Sign is always the implicit top bit.
#[derive(Debug, Clone, Copy)]
struct FloatFormat {
    exp_bits: u32,
    mant_bits: u32,
}

impl FloatFormat {
    const fn bias(&self) -> i64 {
        (1i64 << (self.exp_bits - 1)) - 1
    }

    const fn max_biased_exp(&self) -> u64 {
        (1u64 << self.exp_bits) - 1
    }
}

const F64_FORMAT: FloatFormat = FloatFormat {
    exp_bits: 11,
    mant_bits: 52,
};
const F32_FORMAT: FloatFormat = FloatFormat {
    exp_bits: 8,
    mant_bits: 23,
};
const F16_FORMAT: FloatFormat = FloatFormat {
    exp_bits: 5,
    mant_bits: 10,
};

/// The smallest encoding a finite/NaN/infinite double can be losslessly
/// represented in, as produced by [`shrink_double_as_smallest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmallestFloat {
    /// IEEE-754 binary16 bit pattern.
    Half(u16),
    /// IEEE-754 binary32 bit pattern.
    Single(u32),
    /// Full-width IEEE-754 binary64 bit pattern (no shrink was lossless).
    Double(u64),
}

/// Result of a lossless double→integer conversion, used to pick the
/// smallest CBOR integer major type that represents a double exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleToInt {
    /// Fits a signed 64-bit integer.
    Signed(i64),
    /// A positive integer ≥ 2^63, representable only as unsigned 64-bit.
    Unsigned(u64),
    /// A negative integer below `i64::MIN` (down to and including `-2^64`).
    /// CBOR's negative-integer major type encodes value `-1 - n` for `n` up
    /// to `u64::MAX`, which covers this entire range — including the exact
    /// `-2^64` edge case — as a single `n` value, with no separate "can't
    /// represent" bucket needed. See `DESIGN.md` for the reasoning behind
    /// folding that edge case into this one variant instead of a dedicated
    /// one.
    NegativeLarge(u64),
}

// ─────────────────────────────────────────────────────────────────────────────
// Widening (always lossless: half→double, half→single, single→double)
// ─────────────────────────────────────────────────────────────────────────────

fn widen(bits: u64, src: &FloatFormat, dst: &FloatFormat) -> u64 {
    let sign = (bits >> (src.exp_bits + src.mant_bits)) & 1;
    let mant_mask = (1u64 << src.mant_bits) - 1;
    let exp_mask = (1u64 << src.exp_bits) - 1;
    let mut mant = bits & mant_mask;
    let exp = (bits >> src.mant_bits) & exp_mask;
    let sign_bit = sign << (dst.exp_bits + dst.mant_bits);
    let shift = dst.mant_bits - src.mant_bits;

    if exp == 0 {
        if mant == 0 {
            return sign_bit;
        }
        // Subnormal source: renormalize by shifting left until the implicit
        // leading bit appears, adjusting the exponent to match.
        let mut e: i64 = -1;
        loop {
            e += 1;
            mant <<= 1;
            if mant & (1u64 << src.mant_bits) != 0 {
                break;
            }
        }
        mant &= mant_mask;
        let biased = (dst.bias() - src.bias()) - e;
        return sign_bit | ((biased as u64) << dst.mant_bits) | (mant << shift);
    }
    if exp == exp_mask {
        // Infinity or NaN: widen the payload, preserving the quiet bit
        // (the mantissa's top bit stays the mantissa field's top bit since
        // we only ever append zero bits below it).
        return sign_bit | (dst.max_biased_exp() << dst.mant_bits) | (mant << shift);
    }
    let biased = exp as i64 + (dst.bias() - src.bias());
    sign_bit | ((biased as u64) << dst.mant_bits) | (mant << shift)
}

/// Widen a half-precision (binary16) bit pattern to `f64`. Always lossless.
pub fn half_bits_to_f64(half: u16) -> f64 {
    let bits = widen(half as u64, &F16_FORMAT, &F64_FORMAT);
    bits_to_f64(bits)
}

/// Widen a half-precision (binary16) bit pattern to `f32`. Always lossless.
pub fn half_bits_to_f32(half: u16) -> f32 {
    let bits = widen(half as u64, &F16_FORMAT, &F32_FORMAT) as u32;
    bits_to_f32(bits)
}

// ─────────────────────────────────────────────────────────────────────────────
// Shrinking (may fail: double→single, single→half, and the double→half
// composition used by `shrink_double_as_smallest`)
// ─────────────────────────────────────────────────────────────────────────────

/// Attempt to narrow `bits` (in `src` format) to `dst` format without losing
/// any information. Returns `None` when the narrowing would not be
/// bit-exact.
///
/// `allow_nan_payload`: when `true`, a NaN only shrinks if the bits that
/// would be dropped are all zero (preserving the payload and the
/// quiet/signaling bit exactly). When `false`, any NaN shrinks
/// unconditionally to a canonical quiet NaN of the target size (payload
/// discarded).
fn shrink(bits: u64, src: &FloatFormat, dst: &FloatFormat, allow_nan_payload: bool) -> Option<u64> {
    let sign = (bits >> (src.exp_bits + src.mant_bits)) & 1;
    let mant_mask = (1u64 << src.mant_bits) - 1;
    let exp_mask = (1u64 << src.exp_bits) - 1;
    let mant = bits & mant_mask;
    let exp = (bits >> src.mant_bits) & exp_mask;
    let sign_bit = sign << (dst.exp_bits + dst.mant_bits);
    let drop = src.mant_bits - dst.mant_bits;

    if exp == 0 {
        if mant == 0 {
            return Some(sign_bit); // zero always shrinks
        }
        return None; // subnormal source never shrinks
    }

    if exp == exp_mask {
        if mant == 0 {
            return Some(sign_bit | (dst.max_biased_exp() << dst.mant_bits)); // infinity
        }
        if allow_nan_payload {
            let dropped_mask = (1u64 << drop) - 1;
            if mant & dropped_mask != 0 {
                return None;
            }
            let new_mant = mant >> drop;
            return Some(sign_bit | (dst.max_biased_exp() << dst.mant_bits) | new_mant);
        }
        let canonical_quiet = 1u64 << (dst.mant_bits - 1);
        return Some(sign_bit | (dst.max_biased_exp() << dst.mant_bits) | canonical_quiet);
    }

    // Finite, normal in the source format.
    let true_exp = exp as i64 - src.bias();
    let dst_bias = dst.bias();
    let dst_min_normal_exp = 1 - dst_bias;
    let dst_max_normal_exp = dst.max_biased_exp() as i64 - 1 - dst_bias;

    if true_exp >= dst_min_normal_exp && true_exp <= dst_max_normal_exp {
        let dropped_mask = (1u64 << drop) - 1;
        if mant & dropped_mask != 0 {
            return None;
        }
        let new_mant = mant >> drop;
        let biased = (true_exp + dst_bias) as u64;
        return Some(sign_bit | (biased << dst.mant_bits) | new_mant);
    }

    let dst_subnormal_floor = dst_min_normal_exp - dst.mant_bits as i64;
    if true_exp >= dst_subnormal_floor && true_exp < dst_min_normal_exp {
        // Renormalize: reintroduce the implicit leading one, then shift
        // right into the target's subnormal representation.
        let full_mant = mant | (1u64 << src.mant_bits);
        let shift = (dst_min_normal_exp - true_exp) as u32 + drop;
        if shift >= 64 {
            return None;
        }
        let dropped_mask = (1u64 << shift) - 1;
        if full_mant & dropped_mask != 0 {
            return None;
        }
        let new_mant = full_mant >> shift;
        if new_mant > mant_subnormal_max(dst) {
            return None;
        }
        return Some(sign_bit | new_mant);
    }

    None
}

fn mant_subnormal_max(fmt: &FloatFormat) -> u64 {
    (1u64 << fmt.mant_bits) - 1
}

/// Shrink a double-precision bit pattern to single precision, if lossless.
pub fn shrink_f64_to_f32_bits(bits: u64, allow_nan_payload: bool) -> Option<u32> {
    shrink(bits, &F64_FORMAT, &F32_FORMAT, allow_nan_payload).map(|b| b as u32)
}

/// Shrink a single-precision bit pattern to half precision, if lossless.
pub fn shrink_f32_to_half_bits(bits: u32, allow_nan_payload: bool) -> Option<u16> {
    shrink(bits as u64, &F32_FORMAT, &F16_FORMAT, allow_nan_payload).map(|b| b as u16)
}

/// Shrink a double-precision bit pattern directly to half precision, if
/// lossless. Equivalent to (but computed without the intermediate rounding
/// pitfalls of) `shrink_f32_to_half_bits(shrink_f64_to_f32_bits(..)?, ..)`
/// when the double is exactly representable in the half's range.
pub fn shrink_f64_to_half_bits(bits: u64, allow_nan_payload: bool) -> Option<u16> {
    shrink(bits, &F64_FORMAT, &F16_FORMAT, allow_nan_payload).map(|b| b as u16)
}

/// Find the smallest of {half, single, double} that losslessly represents
/// `d`, backing the `add_double_as_smallest` encoder operation. NaN and
/// infinity are permitted to shrink all the way to half.
pub fn shrink_double_as_smallest(d: f64, allow_nan_payload: bool) -> SmallestFloat {
    let bits = f64_to_bits(d);
    if let Some(half) = shrink_f64_to_half_bits(bits, allow_nan_payload) {
        return SmallestFloat::Half(half);
    }
    if let Some(single) = shrink_f64_to_f32_bits(bits, allow_nan_payload) {
        return SmallestFloat::Single(single);
    }
    SmallestFloat::Double(bits)
}

// ─────────────────────────────────────────────────────────────────────────────
// double <-> integer
// ─────────────────────────────────────────────────────────────────────────────

const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

const F64_EXP_MASK: u64 = 0x7FF;
const F64_MANT_BITS: u32 = 52;
const F64_MANT_MASK: u64 = (1u64 << F64_MANT_BITS) - 1;
const F64_BIAS: i64 = 1023;
const TWO_POW_63_U128: u128 = 1u128 << 63;
const TWO_POW_64_U128: u128 = 1u128 << 64;

/// Convert a double to the smallest/most natural CBOR-representable integer
/// form, or `None` if `d` is not an integral, in-range value (NaN, infinite,
/// subnormal-but-nonzero, fractional, or of magnitude ≥ 2^64 other than the
/// exact `-2^64` edge case).
///
/// Classifies `d` by decomposing its IEEE-754 bit pattern directly (sign,
/// biased exponent, mantissa) rather than through `fract`/`trunc` — those are
/// `<math.h>`-backed `std` calls, unavailable to the no-FPU targets this
/// module is meant to support.
pub fn double_to_int(d: f64) -> Option<DoubleToInt> {
    let bits = f64_to_bits(d);
    let sign_negative = (bits >> 63) & 1 == 1;
    let biased_exp = (bits >> F64_MANT_BITS) & F64_EXP_MASK;
    let mantissa = bits & F64_MANT_MASK;

    if biased_exp == F64_EXP_MASK {
        return None; // infinity or NaN
    }
    if biased_exp == 0 {
        // Zero (either sign) is the only subnormal-range value that is integral.
        return if mantissa == 0 { Some(DoubleToInt::Signed(0)) } else { None };
    }

    let true_exp = biased_exp as i64 - F64_BIAS;
    if true_exp < 0 {
        return None; // 0 < |d| < 1: never integral
    }

    // `significand` is the 53-bit value 1.mantissa, representing
    // d's magnitude as significand * 2^(true_exp - F64_MANT_BITS).
    let significand = mantissa | (1u64 << F64_MANT_BITS);

    let magnitude: u128 = if true_exp as u32 >= F64_MANT_BITS {
        let shift = true_exp as u32 - F64_MANT_BITS;
        if shift >= 128 {
            return None;
        }
        (significand as u128) << shift
    } else {
        let shift = F64_MANT_BITS - true_exp as u32;
        let dropped_mask = (1u64 << shift) - 1;
        if significand & dropped_mask != 0 {
            return None; // nonzero bits below the binary point: fractional
        }
        (significand as u128) >> shift
    };

    if !sign_negative {
        if magnitude >= TWO_POW_64_U128 {
            return None;
        }
        return Some(if magnitude < TWO_POW_63_U128 {
            DoubleToInt::Signed(magnitude as i64)
        } else {
            DoubleToInt::Unsigned(magnitude as u64)
        });
    }

    // d < 0.0
    if magnitude > TWO_POW_64_U128 {
        return None;
    }
    if magnitude <= TWO_POW_63_U128 {
        return Some(DoubleToInt::Signed(if magnitude == TWO_POW_63_U128 {
            i64::MIN
        } else {
            -(magnitude as i64)
        }));
    }
    let n = if magnitude == TWO_POW_64_U128 {
        u64::MAX
    } else {
        (magnitude as u64) - 1
    };
    Some(DoubleToInt::NegativeLarge(n))
}

/// Convert a `u64` to `f64` only if the conversion is exact (the integer has
/// at most 53 significant bits — i.e. fits the double's mantissa without
/// rounding).
pub fn u64_to_f64_exact(n: u64) -> Option<f64> {
    if n == 0 {
        return Some(0.0);
    }
    let significant_bits = 64 - n.leading_zeros() - n.trailing_zeros();
    if significant_bits <= 53 {
        Some(n as f64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_widens_to_double_exactly() {
        // 1.5 in half: sign 0, exp 15 (bias), mantissa 0x200 -> 0x3E00
        assert_eq!(half_bits_to_f64(0x3E00), 1.5);
        assert_eq!(half_bits_to_f64(0x0000), 0.0);
        assert_eq!(half_bits_to_f64(0x8000), -0.0);
        assert!(half_bits_to_f64(0x7C00).is_infinite());
        assert!(half_bits_to_f64(0x7C01).is_nan());
    }

    #[test]
    fn half_subnormal_widens_correctly() {
        // Smallest half subnormal: mantissa=1, exp=0 -> 2^-24
        let v = half_bits_to_f64(0x0001);
        assert_eq!(v, 2f64.powi(-24));
    }

    #[test]
    fn shrink_double_as_smallest_matches_scenarios() {
        // S4: 1.5 -> half 0x3E00
        assert_eq!(
            shrink_double_as_smallest(1.5, true),
            SmallestFloat::Half(0x3E00)
        );
        // S5: pi-ish value must remain double.
        let bits = f64_to_bits(3.1415926535);
        assert_eq!(
            shrink_double_as_smallest(3.1415926535, true),
            SmallestFloat::Double(bits)
        );
    }

    #[test]
    fn shrink_rejects_subnormal_source() {
        let tiny_subnormal_f32 = f32_to_bits(1.0e-40_f32);
        assert!(shrink_f32_to_half_bits(tiny_subnormal_f32, true).is_none());
    }

    #[test]
    fn shrink_nan_requires_zero_dropped_bits() {
        let nan_with_low_bit = f64_to_bits(f64::NAN) | 1; // set a low mantissa bit
        assert!(shrink_f64_to_f32_bits(nan_with_low_bit, true).is_none());
        assert!(shrink_f64_to_f32_bits(nan_with_low_bit, false).is_some());
    }

    #[test]
    fn double_to_int_classifies_correctly() {
        assert_eq!(double_to_int(0.0), Some(DoubleToInt::Signed(0)));
        assert_eq!(double_to_int(-1.0), Some(DoubleToInt::Signed(-1)));
        assert_eq!(
            double_to_int(TWO_POW_63),
            Some(DoubleToInt::Unsigned(1u64 << 63))
        );
        assert_eq!(
            double_to_int(-TWO_POW_64),
            Some(DoubleToInt::NegativeLarge(u64::MAX))
        );
        assert_eq!(double_to_int(1.5), None);
        assert_eq!(double_to_int(f64::NAN), None);
        assert_eq!(double_to_int(f64::INFINITY), None);
        assert_eq!(double_to_int(TWO_POW_64), None);
    }

    #[test]
    fn u64_to_f64_exactness() {
        assert_eq!(u64_to_f64_exact(0), Some(0.0));
        assert_eq!(u64_to_f64_exact(1u64 << 53), Some((1u64 << 53) as f64));
        assert_eq!(u64_to_f64_exact((1u64 << 53) + 1), None);
        // A large power of two has 1 significant bit, always exact.
        assert_eq!(u64_to_f64_exact(1u64 << 63), Some((1u64 << 63) as f64));
    }
}
