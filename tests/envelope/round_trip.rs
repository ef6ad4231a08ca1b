//! Primitive Round-Trip Tests
//!
//! Every primitive written at the root reads back as the same value and tag.

use crate::*;
use zera::{DecodeError, Tag};

#[test]
fn test_null_and_bools() {
    for value in [Value::Null, Value::Bool(true), Value::Bool(false)] {
        let buf = encode_one(&value);
        assert_eq!(decode_all(&buf), value);
    }

    let buf = build(|w| w.boolean(false).unwrap());
    let r = Reader::new(&buf).unwrap();
    assert_eq!(r.tag(), Tag::Bool);
    assert!(!r.as_bool().unwrap());
}

#[test]
fn test_signed_spread() {
    let samples = [0i64, 1, -1, 127, -128, 65_535, -65_536, i32::MAX as i64, i64::MIN, i64::MAX];
    for v in samples {
        let buf = build(|w| w.int64(v).unwrap());
        let r = Reader::new(&buf).unwrap();
        assert_eq!(r.tag(), Tag::I64);
        assert_eq!(r.as_i64().unwrap(), v);
    }
}

#[test]
fn test_unsigned_only_values() {
    for v in [i64::MAX as u64 + 1, u64::MAX - 1, u64::MAX] {
        let buf = build(|w| w.uint64(v).unwrap());
        let r = Reader::new(&buf).unwrap();
        assert_eq!(r.tag(), Tag::U64);
        assert_eq!(r.as_u64().unwrap(), v);
        assert!(matches!(
            r.as_i64(),
            Err(DecodeError::IntegerOutOfRange { target: "int64", .. })
        ));
        assert_eq!(decode_all(&buf), Value::UInt(v));
    }
}

#[test]
fn test_unsigned_small_values_read_as_signed() {
    let buf = build(|w| w.uint64(42).unwrap());
    let r = Reader::new(&buf).unwrap();
    assert_eq!(r.as_i64().unwrap(), 42);
    assert_eq!(r.as_u8().unwrap(), 42);
}

#[test]
fn test_doubles() {
    let samples = [
        0.0f64,
        -0.0,
        -1.5,
        f64::MIN_POSITIVE,
        5e-324,
        1e300,
        f64::MAX,
        f64::INFINITY,
        f64::NEG_INFINITY,
    ];
    for v in samples {
        let buf = build(|w| w.double(v).unwrap());
        let r = Reader::new(&buf).unwrap();
        assert_eq!(r.tag(), Tag::F64);
        assert_eq!(r.as_f64().unwrap().to_bits(), v.to_bits());
    }
}

#[test]
fn test_nan_bits_preserved() {
    let nan = f64::from_bits(0x7ff8_0000_dead_beef);
    let buf = build(|w| w.double(nan).unwrap());
    let r = Reader::new(&buf).unwrap();
    assert_eq!(r.as_f64().unwrap().to_bits(), nan.to_bits());
}

#[test]
fn test_accessor_on_wrong_tag_fails() {
    let buf = build(|w| w.double(1.0).unwrap());
    let r = Reader::new(&buf).unwrap();
    assert!(matches!(r.as_i64(), Err(DecodeError::WrongType { .. })));
    assert!(matches!(r.as_str(), Err(DecodeError::WrongType { .. })));
    assert!(matches!(r.array_len(), Err(DecodeError::WrongType { .. })));
}

#[test]
fn test_empty_writer_is_null_root() {
    let buf = Writer::new().finish().unwrap();
    let r = Reader::new(&buf).unwrap();
    assert!(r.is_null());
    assert_eq!(r.to_string(), "Zera(null)");
}
