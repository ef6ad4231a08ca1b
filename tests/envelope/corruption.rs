//! Corruption Rejection Tests
//!
//! Damaged buffers fail at construction or at the accessor that follows the
//! damaged offset. Nothing reads past the end of the slice.

use crate::*;
use zera::format::{HEADER_SIZE, MAGIC};
use zera::DecodeError;

fn sample() -> ZBuffer {
    build(|w| {
        w.begin_map(3).unwrap();
        w.key("name").unwrap();
        w.string("a name that is long enough for the arena").unwrap();
        w.key("blob").unwrap();
        w.binary(&[7u8; 40]).unwrap();
        w.key("list").unwrap();
        w.begin_array(2).unwrap();
        w.int64(1).unwrap();
        w.int64(2).unwrap();
        w.end_array().unwrap();
        w.end_map().unwrap();
    })
}

fn patch_u32(bytes: &mut [u8], at: usize, v: u32) {
    bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

#[test]
fn test_truncated_before_envelope_end() {
    let buf = sample();
    let env_end = HEADER_SIZE + Reader::new(&buf).unwrap().header().env_size as usize;
    for cut in [0, 3, HEADER_SIZE - 1, HEADER_SIZE, env_end - 1] {
        assert!(Reader::new(&buf[..cut]).is_err(), "cut at {}", cut);
    }
    assert!(matches!(
        Reader::new(&buf[..10]),
        Err(DecodeError::TruncatedHeader { needed: 20, have: 10 })
    ));
}

#[test]
fn test_truncated_arena_fails_at_accessor() {
    let buf = sample();
    let arena_ofs = Reader::new(&buf).unwrap().header().arena_ofs as usize;
    let cut = &buf[..arena_ofs + 8];
    let r = Reader::new(cut).unwrap();
    assert!(matches!(
        r.get("name").unwrap().as_str(),
        Err(DecodeError::OutOfBounds { region: "arena", .. })
    ));
    assert_eq!(r.get("list").unwrap().at(1).unwrap().as_i64().unwrap(), 2);
}

#[test]
fn test_bad_magic() {
    let mut bytes = sample().to_vec();
    bytes[0] ^= 0x01;
    assert_eq!(
        Reader::new(&bytes).unwrap_err(),
        DecodeError::BadMagic { found: MAGIC ^ 0x01 }
    );
}

#[test]
fn test_bad_version_and_flags() {
    let mut bytes = sample().to_vec();
    bytes[4] = 2;
    assert!(matches!(
        Reader::new(&bytes),
        Err(DecodeError::UnsupportedVersion { found: 2 })
    ));

    let mut bytes = sample().to_vec();
    bytes[6] = 0x03;
    assert!(matches!(
        Reader::new(&bytes),
        Err(DecodeError::BadFlags { found: 3 })
    ));
}

#[test]
fn test_unaligned_arena_ofs() {
    let mut bytes = sample().to_vec();
    let arena_ofs = Reader::new(&bytes).unwrap().header().arena_ofs;
    patch_u32(&mut bytes, 16, arena_ofs + 8);
    assert!(matches!(
        Reader::new(&bytes),
        Err(DecodeError::ArenaMisaligned { align: 16, .. })
    ));
}

#[test]
fn test_root_outside_envelope() {
    let mut bytes = sample().to_vec();
    let env_size = Reader::new(&bytes).unwrap().header().env_size;
    patch_u32(&mut bytes, 8, env_size - 8);
    assert!(matches!(
        Reader::new(&bytes),
        Err(DecodeError::OutOfBounds { region: "envelope", .. })
    ));
}

#[test]
fn test_blob_offset_past_arena() {
    let buf = build(|w| w.binary(&[1u8; 32]).unwrap());
    let mut bytes = buf.to_vec();
    let root = HEADER_SIZE + Reader::new(&bytes).unwrap().header().root_ofs as usize;
    // value reference field a holds the arena offset
    patch_u32(&mut bytes, root + 4, 1 << 20);
    let r = Reader::new(&bytes).unwrap();
    assert!(r.is_blob());
    assert!(matches!(
        r.as_blob(),
        Err(DecodeError::OutOfBounds { region: "arena", .. })
    ));
}

#[test]
fn test_random_garbage_never_panics() {
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    for len in 0..256usize {
        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            bytes.push((state >> 33) as u8);
        }
        if let Ok(r) = Reader::new(&bytes) {
            let _ = r.to_value();
        }
    }
}
