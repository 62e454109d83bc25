//! Property-based tests (spec §8) driven by `proptest` instead of literal
//! fixtures — covers properties 2, 3, and 5 across the space of inputs
//! rather than a handful of hand-picked values.

use proptest::prelude::*;
use qcbor::float::{double_to_int, u64_to_f64_exact, DoubleToInt};
use qcbor::{Encoder, ItemValue};

/// Property 3: minimal integer encoding. For every `u64`, the encoder picks
/// the shortest of {1,2,3,5,9}-byte forms.
fn expected_uint_len(n: u64) -> usize {
    match n {
        0..=23 => 1,
        24..=0xFF => 2,
        0x100..=0xFFFF => 3,
        0x1_0000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

proptest! {
    #[test]
    fn minimal_uint_encoding(n: u64) {
        let mut storage = [0u8; 16];
        let mut enc = Encoder::new(&mut storage);
        enc.add_uint64(n);
        let out = enc.finish().unwrap();
        prop_assert_eq!(out.len(), expected_uint_len(n));
    }

    #[test]
    fn minimal_int_encoding_for_negatives(n in i64::MIN..0i64) {
        let mut storage = [0u8; 16];
        let mut enc = Encoder::new(&mut storage);
        enc.add_int64(n);
        let out = enc.finish().unwrap();
        // CBOR encodes negative n as major type 1 with argument (-1 - n),
        // which has the same minimal-length table as an unsigned value.
        let magnitude = (-1i128 - n as i128) as u64;
        prop_assert_eq!(out.len(), expected_uint_len(magnitude));
    }

    /// Property 2: size-only fidelity. The length `finish()` reports in
    /// size-only mode must equal the length a real buffer would produce,
    /// for any sequence of scalar adds.
    #[test]
    fn size_only_matches_real_buffer(values in prop::collection::vec(any::<u64>(), 0..32)) {
        let mut storage = vec![0u8; values.len() * 9 + 8];
        let mut real = Encoder::new(&mut storage);
        real.open_array().unwrap();
        for &v in &values {
            real.add_uint64(v);
        }
        real.close_array().unwrap();
        let real_len = real.finish().unwrap().len();

        let mut size_only = Encoder::new_size_only(values.len() * 9 + 8);
        size_only.open_array().unwrap();
        for &v in &values {
            size_only.add_uint64(v);
        }
        size_only.close_array().unwrap();
        size_only.finish().unwrap();
        prop_assert_eq!(size_only.size(), real_len);
    }

    /// Property 5: double <-> integer conversion exactness. Every in-range
    /// integral double round-trips back to the same value through
    /// `double_to_int`, and `u64_to_f64_exact` only ever produces an exact
    /// conversion.
    #[test]
    fn double_to_int_exact_for_i64_range(n: i64) {
        let d = n as f64;
        // f64 cannot represent every i64 exactly once magnitude exceeds
        // 2^53; only assert round-trip for values that survive the f64
        // cast unchanged.
        if d as i64 == n {
            prop_assert_eq!(double_to_int(d), Some(DoubleToInt::Signed(n)));
        }
    }

    #[test]
    fn u64_to_f64_exact_never_lies(n: u64) {
        if let Some(d) = u64_to_f64_exact(n) {
            prop_assert_eq!(d as u64, n);
            prop_assert!(d.fract() == 0.0);
        }
    }

    /// Property 1 (narrow slice): round-tripping a flat array of u64s
    /// through encode/decode reproduces the same values in the same order.
    #[test]
    fn flat_array_roundtrip(values in prop::collection::vec(any::<u64>(), 0..64)) {
        let mut storage = vec![0u8; values.len() * 9 + 8];
        let mut enc = Encoder::new(&mut storage);
        enc.open_array().unwrap();
        for &v in &values {
            enc.add_uint64(v);
        }
        enc.close_array().unwrap();
        let out = enc.finish().unwrap();
        let bytes = out.as_slice().unwrap().to_vec();

        let mut dec = qcbor::Decoder::new(&bytes);
        let header = dec.get_next().unwrap().unwrap();
        prop_assert_eq!(
            header.value,
            ItemValue::Count(qcbor::ContainerCount::Definite(values.len() as u64))
        );
        for &expected in &values {
            let item = dec.get_next().unwrap().unwrap();
            prop_assert_eq!(item.value, ItemValue::Uint64(expected));
        }
        prop_assert!(dec.get_next().unwrap().is_none());
        dec.finish().unwrap();
    }
}
