//! String Storage Tests
//!
//! Strings up to twelve bytes live inside their value reference; longer ones
//! live in the arena. Both read back identically.

use crate::*;
use zera::WriterOptions;

#[test]
fn test_twelve_bytes_inline() {
    let s = "abcdefghijkl";
    assert_eq!(s.len(), 12);
    let buf = build(|w| w.string(s).unwrap());
    let r = Reader::new(&buf).unwrap();
    assert!(r.is_inline_string());
    assert_eq!(r.as_str().unwrap(), s);
    assert_eq!(r.header().arena_ofs as usize, buf.len());
}

#[test]
fn test_thirteen_bytes_in_arena() {
    let s = "abcdefghijklm";
    let buf = build(|w| w.string(s).unwrap());
    let r = Reader::new(&buf).unwrap();
    assert!(r.is_string());
    assert!(!r.is_inline_string());
    assert_eq!(r.as_str().unwrap(), s);
    assert_eq!(buf.len() - r.header().arena_ofs as usize, 13);
}

#[test]
fn test_boundary_content_identical() {
    let short = "x".repeat(12);
    let long = "x".repeat(13);
    let buf = build(|w| {
        w.begin_array(2).unwrap();
        w.string(&short).unwrap();
        w.string(&long).unwrap();
        w.end_array().unwrap();
    });
    let r = Reader::new(&buf).unwrap();
    assert_eq!(r.at(0).unwrap().as_str().unwrap(), &long[..12]);
    assert_eq!(r.at(1).unwrap().as_str().unwrap(), long);
}

#[test]
fn test_empty_and_multibyte() {
    for s in ["", "é", "日本語のテキスト", "emoji 🦀🦀🦀"] {
        let buf = build(|w| w.string(s).unwrap());
        let r = Reader::new(&buf).unwrap();
        assert_eq!(r.as_str().unwrap(), s);
        assert_eq!(r.as_str_bytes().unwrap(), s.as_bytes());
    }
}

#[test]
fn test_lowered_threshold_moves_to_arena() {
    let mut w = Writer::with_options(WriterOptions::new().inline_string_max(4)).unwrap();
    w.begin_array(2).unwrap();
    w.string("four").unwrap();
    w.string("fives").unwrap();
    w.end_array().unwrap();
    let buf = w.finish().unwrap();

    let r = Reader::new(&buf).unwrap();
    assert!(r.at(0).unwrap().is_inline_string());
    assert!(!r.at(1).unwrap().is_inline_string());
    assert_eq!(r.at(1).unwrap().as_str().unwrap(), "fives");
}

#[test]
fn test_threshold_above_limit_rejected() {
    let mut w = Writer::new();
    assert!(w.set_inline_string_threshold(13).is_err());
    assert!(w.set_inline_string_threshold(0).is_ok());
    w.string("a").unwrap();
    let buf = w.finish().unwrap();
    assert!(!Reader::new(&buf).unwrap().is_inline_string());
}
