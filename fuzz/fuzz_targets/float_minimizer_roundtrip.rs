#![no_main]
use libfuzzer_sys::fuzz_target;
use qcbor::{Decoder, Encoder, ItemValue};

// Float minimization losslessness (testable property 4): for every finite
// double, decoding `add_double_as_smallest`'s output must reproduce the
// exact original bit pattern. NaNs are exempt from bit-exact comparison
// (many distinct NaN bit patterns are equally "correct") but must still
// decode back to some NaN rather than a finite value or an error.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let bits = u64::from_be_bytes(data[..8].try_into().unwrap());
    let d = f64::from_bits(bits);

    let mut storage = [0u8; 16];
    let mut enc = Encoder::new(&mut storage);
    enc.add_double_as_smallest(d, true);
    let Ok(out) = enc.finish() else { return };
    let bytes = out.as_slice().unwrap();

    let mut dec = Decoder::new(bytes);
    let item = dec
        .get_next()
        .expect("a freshly encoded scalar must decode without error")
        .expect("exactly one item was encoded");
    dec.finish().expect("nothing should remain after one scalar");

    let decoded = match item.value {
        ItemValue::Double(v) => v,
        ItemValue::Float(v) => v as f64,
        other => panic!("unexpected decoded value shape: {other:?}"),
    };

    if d.is_nan() {
        assert!(decoded.is_nan(), "NaN must decode back to some NaN");
    } else {
        assert_eq!(
            d.to_bits(),
            decoded.to_bits(),
            "double bit pattern changed across add_double_as_smallest round-trip"
        );
    }
});
