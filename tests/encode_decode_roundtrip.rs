//! spec §8 property 1: encode then decode yields back the same item
//! sequence, covering a representative mix of scalar and container shapes.

use qcbor::{Decoder, Encoder, ItemKind, ItemValue};

#[test]
fn flat_scalars_round_trip() {
    let mut storage = [0u8; 64];
    let mut enc = Encoder::new(&mut storage);
    enc.add_uint64(42);
    enc.add_int64(-17);
    enc.add_bytes(b"\x01\x02\x03");
    enc.add_text(b"hello");
    enc.add_bool(true);
    enc.add_null();
    let out = enc.finish().unwrap();
    let bytes = out.as_slice().unwrap().to_vec();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.get_next().unwrap().unwrap().value, ItemValue::Uint64(42));
    assert_eq!(dec.get_next().unwrap().unwrap().value, ItemValue::Int64(-17));
    match dec.get_next().unwrap().unwrap().value {
        ItemValue::Bytes(b) => assert_eq!(b, b"\x01\x02\x03"),
        other => panic!("expected bytes, got {other:?}"),
    }
    match dec.get_next().unwrap().unwrap().value {
        ItemValue::Text(t) => assert_eq!(t.as_bytes(), b"hello"),
        other => panic!("expected text, got {other:?}"),
    }
    assert_eq!(dec.get_next().unwrap().unwrap().kind, ItemKind::True);
    assert_eq!(dec.get_next().unwrap().unwrap().kind, ItemKind::Null);
    assert!(dec.get_next().unwrap().is_none());
    dec.finish().unwrap();
}

#[test]
fn nested_containers_round_trip() {
    // {"values": [1, 2, 3], "nested": {"x": true}}
    let mut storage = [0u8; 128];
    let mut enc = Encoder::new(&mut storage);
    enc.open_map().unwrap();
    enc.add_text(b"values");
    enc.open_array().unwrap();
    enc.add_uint64(1);
    enc.add_uint64(2);
    enc.add_uint64(3);
    enc.close_array().unwrap();
    enc.add_text(b"nested");
    enc.open_map().unwrap();
    enc.add_text(b"x");
    enc.add_bool(true);
    enc.close_map().unwrap();
    enc.close_map().unwrap();
    let out = enc.finish().unwrap();
    let bytes = out.as_slice().unwrap().to_vec();

    let mut dec = Decoder::new(&bytes);
    let outer = dec.get_next().unwrap().unwrap();
    assert_eq!(outer.kind, ItemKind::Map);

    let values_array = dec.get_next().unwrap().unwrap();
    assert_eq!(values_array.kind, ItemKind::Array);
    for expected in [1u64, 2, 3] {
        assert_eq!(dec.get_next().unwrap().unwrap().value, ItemValue::Uint64(expected));
    }

    let nested_map = dec.get_next().unwrap().unwrap();
    assert_eq!(nested_map.kind, ItemKind::Map);
    let x = dec.get_next().unwrap().unwrap();
    assert_eq!(x.kind, ItemKind::True);
    assert_eq!(x.next_nesting_level, 0);

    assert!(dec.get_next().unwrap().is_none());
    dec.finish().unwrap();
}

#[test]
fn bstr_wrap_round_trips_as_an_opaque_byte_string() {
    let mut storage = [0u8; 32];
    let mut enc = Encoder::new(&mut storage);
    enc.open_bstr_wrap().unwrap();
    enc.add_uint64(7);
    enc.add_text(b"abc");
    let wrapped = enc.close_bstr_wrap().unwrap().as_slice().unwrap().to_vec();
    enc.finish().unwrap();

    // Decoding the wrapped region on its own yields its unwrapped contents.
    let mut dec = Decoder::new(&wrapped);
    match dec.get_next().unwrap().unwrap().value {
        ItemValue::Bytes(inner) => {
            let mut inner_dec = Decoder::new(inner);
            assert_eq!(inner_dec.get_next().unwrap().unwrap().value, ItemValue::Uint64(7));
            match inner_dec.get_next().unwrap().unwrap().value {
                ItemValue::Text(t) => assert_eq!(t.as_bytes(), b"abc"),
                other => panic!("expected text, got {other:?}"),
            }
            inner_dec.finish().unwrap();
        }
        other => panic!("expected a byte string, got {other:?}"),
    }
}
