//! Object Tests
//!
//! Lookup is a linear scan in encoded order. Duplicate keys are accepted by
//! the writer; lookup returns the first match and iteration yields them all.

use crate::*;
use zera::DecodeError;

fn keyed(m: usize) -> ZBuffer {
    build(|w| {
        w.begin_map(m).unwrap();
        for i in 0..m {
            w.key(&format!("key_{:04}", i)).unwrap();
            w.uint64(i as u64).unwrap();
        }
        w.end_map().unwrap();
    })
}

#[test]
fn test_every_inserted_key_found() {
    for m in [0usize, 1, 5, 200] {
        let buf = keyed(m);
        let r = Reader::new(&buf).unwrap();
        assert_eq!(r.map_len().unwrap(), m);
        for i in 0..m {
            let k = format!("key_{:04}", i);
            assert!(r.contains(&k).unwrap());
            assert_eq!(r.get(&k).unwrap().as_u64().unwrap(), i as u64);
        }
        assert!(!r.contains("never_inserted").unwrap());
        assert_eq!(
            r.get("never_inserted").unwrap_err(),
            DecodeError::KeyNotFound("never_inserted".into())
        );
        assert!(r.find("never_inserted").unwrap().is_none());
    }
}

#[test]
fn test_keys_in_encoded_order() {
    let buf = build(|w| {
        w.begin_map(3).unwrap();
        for k in ["zeta", "alpha", "mid"] {
            w.key(k).unwrap();
            w.null().unwrap();
        }
        w.end_map().unwrap();
    });
    let r = Reader::new(&buf).unwrap();
    let keys: Vec<&str> = r.keys().unwrap().map(|k| k.unwrap()).collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
}

#[test]
fn test_duplicate_keys_first_wins() {
    let buf = build(|w| {
        w.begin_map(3).unwrap();
        w.key("dup").unwrap();
        w.string("first").unwrap();
        w.key("other").unwrap();
        w.null().unwrap();
        w.key("dup").unwrap();
        w.string("second").unwrap();
        w.end_map().unwrap();
    });
    let r = Reader::new(&buf).unwrap();
    assert_eq!(r.map_len().unwrap(), 3);
    assert_eq!(r.get("dup").unwrap().as_str().unwrap(), "first");

    let dups: Vec<&str> = r
        .entries()
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|(k, _)| *k == b"dup")
        .map(|(_, v)| v.as_str().unwrap())
        .collect();
    assert_eq!(dups, ["first", "second"]);
}

#[test]
fn test_empty_and_long_keys() {
    let long = "k".repeat(300);
    let buf = build(|w| {
        w.begin_map(2).unwrap();
        w.key("").unwrap();
        w.int64(1).unwrap();
        w.key(&long).unwrap();
        w.int64(2).unwrap();
        w.end_map().unwrap();
    });
    let r = Reader::new(&buf).unwrap();
    assert_eq!(r.get("").unwrap().as_i64().unwrap(), 1);
    assert_eq!(r.get(&long).unwrap().as_i64().unwrap(), 2);
}

#[test]
fn test_lookup_on_non_map() {
    let buf = build(|w| w.int64(3).unwrap());
    let r = Reader::new(&buf).unwrap();
    assert!(!r.contains("x").unwrap());
    assert!(matches!(r.get("x"), Err(DecodeError::WrongType { .. })));
}
