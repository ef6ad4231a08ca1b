//! Idempotence Tests
//!
//! Reading never mutates the buffer and independent readers agree.

use crate::*;
use std::thread;

fn sample() -> ZBuffer {
    encode_one(&Value::Object(vec![
        ("ints".into(), Value::Array((0..20).map(Value::Int).collect())),
        ("text".into(), "not inlined because it is long".into()),
        ("raw".into(), Value::Bytes(vec![0xAB; 33])),
        ("big".into(), Value::UInt(u64::MAX)),
    ]))
}

#[test]
fn test_two_readers_agree() {
    let buf = sample();
    let before = buf.to_vec();

    let a = Reader::new(&buf).unwrap().to_value().unwrap();
    let b = Reader::new(&buf).unwrap().to_value().unwrap();
    assert_eq!(a, b);
    assert_eq!(buf.as_slice(), &before[..]);
}

#[test]
fn test_views_are_independent_copies() {
    let buf = sample();
    let r = Reader::new(&buf).unwrap();
    let ints = r.get("ints").unwrap();
    let copy = ints;
    assert_eq!(ints.at(3).unwrap().as_i64().unwrap(), 3);
    assert_eq!(copy.at(19).unwrap().as_i64().unwrap(), 19);
    assert_eq!(ints.to_string(), copy.to_string());
}

#[test]
fn test_concurrent_readers() {
    let buf = sample();
    let expected = decode_all(&buf);
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    assert_eq!(decode_all(&buf), expected);
                }
            });
        }
    });
}
