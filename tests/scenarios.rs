//! The eight worked scenarios used throughout review/testing: S1-S6 exercise
//! the encoder, S7 and S8 the decoder. Kept as their own file since they're
//! referenced by name elsewhere rather than folded into `encode.rs`/`decode.rs`.

use qcbor::{Decoder, Encoder, ItemKind, ItemLabel, ItemValue, MallocStringPool};

#[test]
fn s1_tagged_date_in_a_labeled_map() {
    let mut storage = [0u8; 32];
    let mut enc = Encoder::new(&mut storage);
    enc.open_map().unwrap();
    enc.add_text(b"BirthDate");
    enc.add_tag(1);
    enc.add_int64(1_477_263_730);
    enc.close_map().unwrap();
    let out = enc.finish().unwrap();

    let mut expected = vec![0xA1, 0x69];
    expected.extend_from_slice(b"BirthDate");
    expected.push(0xC1); // tag(1)
    expected.push(0x1A); // uint32 head
    expected.extend_from_slice(&1_477_263_730u32.to_be_bytes());
    assert_eq!(out.as_slice(), Some(&expected[..]));
}

#[test]
fn s2_add_u64_zero() {
    let mut storage = [0u8; 4];
    let mut enc = Encoder::new(&mut storage);
    enc.add_uint64(0);
    assert_eq!(enc.finish().unwrap().as_slice(), Some(&[0x00][..]));
}

#[test]
fn s3_add_i64_minus_one() {
    let mut storage = [0u8; 4];
    let mut enc = Encoder::new(&mut storage);
    enc.add_int64(-1);
    assert_eq!(enc.finish().unwrap().as_slice(), Some(&[0x20][..]));
}

#[test]
fn s4_add_double_as_smallest_shrinks_to_half() {
    let mut storage = [0u8; 16];
    let mut enc = Encoder::new(&mut storage);
    enc.add_double_as_smallest(1.5, true);
    assert_eq!(enc.finish().unwrap().as_slice(), Some(&[0xF9, 0x3E, 0x00][..]));
}

#[test]
fn s5_add_double_as_smallest_keeps_full_precision() {
    // half and single would both lose bits here, so this stays a double.
    let value = 3.1415926535_f64;
    let mut storage = [0u8; 16];
    let mut enc = Encoder::new(&mut storage);
    enc.add_double_as_smallest(value, true);
    let out = enc.finish().unwrap();

    let mut expected = vec![0xFB];
    expected.extend_from_slice(&value.to_bits().to_be_bytes());
    assert_eq!(out.as_slice(), Some(&expected[..]));
}

#[test]
fn s6_array_of_two_bools() {
    let mut storage = [0u8; 8];
    let mut enc = Encoder::new(&mut storage);
    enc.open_array().unwrap();
    enc.add_bool(true);
    enc.add_bool(false);
    enc.close_array().unwrap();
    assert_eq!(
        enc.finish().unwrap().as_slice(),
        Some(&[0x82, 0xF5, 0xF4][..])
    );
}

#[test]
fn s7_decodes_nested_map_sequence() {
    // A26161016162820203 -> {"a": 1, "b": [2, 3]}
    let bytes = hex("A26161016162820203");
    let mut dec = Decoder::new(&bytes);

    let map = dec.get_next().unwrap().unwrap();
    assert_eq!(map.kind, ItemKind::Map);

    let a = dec.get_next().unwrap().unwrap();
    assert_eq!(a.value, ItemValue::Uint64(1));
    assert!(matches!(a.label, Some(ItemLabel::Text(t)) if t == b"a"));

    let b_header = dec.get_next().unwrap().unwrap();
    assert_eq!(b_header.kind, ItemKind::Array);
    assert!(matches!(b_header.label, Some(ItemLabel::Text(t)) if t == b"b"));

    let two = dec.get_next().unwrap().unwrap();
    assert_eq!(two.value, ItemValue::Uint64(2));
    let three = dec.get_next().unwrap().unwrap();
    assert_eq!(three.value, ItemValue::Uint64(3));
    assert_eq!(three.next_nesting_level, 0);

    assert!(dec.get_next().unwrap().is_none());
    dec.finish().unwrap();
}

#[test]
fn s8_indefinite_string_streams_through_a_pool() {
    // (_ "strea", "ming") with a string pool configured -> one TextString "streaming".
    let bytes = [
        0x7F, 0x65, b's', b't', b'r', b'e', b'a', 0x64, b'm', b'i', b'n', b'g', 0xFF,
    ];
    let pool = MallocStringPool::new();
    let mut dec = Decoder::new(&bytes).with_string_pool(&pool);
    let item = dec.get_next().unwrap().unwrap();
    assert_eq!(item.kind, ItemKind::TextString);
    match item.value {
        ItemValue::Text(t) => assert_eq!(t.as_bytes(), b"streaming"),
        other => panic!("expected text, got {other:?}"),
    }
    assert!(item.allocated_data);
    assert!(dec.get_next().unwrap().is_none());
    dec.finish().unwrap();
}

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}
