//! Little-endian byte helpers
//!
//! Every multi-byte field in the format is little-endian regardless of host.
//! Readers take an already bounds-checked slice; callers are responsible for
//! checking the span first.

use byteorder::{ByteOrder, LittleEndian};

/// Read a `u16` from the first two bytes of `buf`
#[inline]
pub fn read_u16(buf: &[u8]) -> u16 {
    LittleEndian::read_u16(buf)
}

/// Read a `u32` from the first four bytes of `buf`
#[inline]
pub fn read_u32(buf: &[u8]) -> u32 {
    LittleEndian::read_u32(buf)
}

/// Read a `u64` from the first eight bytes of `buf`
#[inline]
pub fn read_u64(buf: &[u8]) -> u64 {
    LittleEndian::read_u64(buf)
}

/// Append a `u16`
#[inline]
pub fn put_u16(out: &mut Vec<u8>, v: u16) {
    let mut b = [0u8; 2];
    LittleEndian::write_u16(&mut b, v);
    out.extend_from_slice(&b);
}

/// Append a `u32`
#[inline]
pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    let mut b = [0u8; 4];
    LittleEndian::write_u32(&mut b, v);
    out.extend_from_slice(&b);
}

/// Append a `u64`
#[inline]
pub fn put_u64(out: &mut Vec<u8>, v: u64) {
    let mut b = [0u8; 8];
    LittleEndian::write_u64(&mut b, v);
    out.extend_from_slice(&b);
}

/// Overwrite a `u16` at `at`
#[inline]
pub fn patch_u16(out: &mut [u8], at: usize, v: u16) {
    LittleEndian::write_u16(&mut out[at..at + 2], v);
}

/// Overwrite a `u32` at `at`
#[inline]
pub fn patch_u32(out: &mut [u8], at: usize, v: u32) {
    LittleEndian::write_u32(&mut out[at..at + 4], v);
}

/// Split a 64-bit payload into its low and high 32-bit halves
#[inline]
pub fn split_u64(v: u64) -> (u32, u32) {
    (v as u32, (v >> 32) as u32)
}

/// Join low and high 32-bit halves
#[inline]
pub fn join_u64(lo: u32, hi: u32) -> u64 {
    u64::from(lo) | (u64::from(hi) << 32)
}
