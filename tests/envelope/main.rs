//! Envelope Integration Tests
//!
//! End-to-end tests over the public facade: writing buffers, reading them
//! back through lazy views, rejecting corrupted input, and the zero-copy
//! decision for typed payloads.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test envelope
//! cargo test --test envelope alignment_sweep::
//! ```

use zera::{Reader, Value, Writer, ZBuffer};

mod alignment_sweep;
mod corruption;
mod idempotence;
mod objects;
mod persistence;
mod properties;
mod round_trip;
mod strings;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Encode a single value with default options
pub fn encode_one(value: &Value) -> ZBuffer {
    zera::encode(value).unwrap()
}

/// Build a buffer with the writer calls in `build`
pub fn build<F>(build: F) -> ZBuffer
where
    F: FnOnce(&mut Writer),
{
    let mut w = Writer::new();
    build(&mut w);
    w.finish().unwrap()
}

/// Decode a buffer fully
pub fn decode_all(buf: &[u8]) -> Value {
    Reader::new(buf).unwrap().to_value().unwrap()
}

/// Copy `bytes` into 8-aligned storage starting `offset` bytes in
///
/// Returns the backing storage; the copy lives at
/// `bytemuck::cast_slice::<u64, u8>(&backing)[offset..offset + bytes.len()]`.
pub fn rehost(bytes: &[u8], offset: usize) -> Vec<u64> {
    let words = (offset + bytes.len()) / 8 + 1;
    let mut backing = vec![0u64; words];
    let raw: &mut [u8] = bytemuck::cast_slice_mut(&mut backing);
    raw[offset..offset + bytes.len()].copy_from_slice(bytes);
    backing
}
