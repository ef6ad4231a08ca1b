//! Alignment Sweep Tests
//!
//! A finished buffer is re-hosted at every byte offset 0..15 inside 8-aligned
//! storage. Typed payloads sit at 16-aligned positions relative to the buffer
//! start, so an f64 tensor is aligned for exactly two of the sixteen offsets
//! (0 and 8) and must be copied for the other fourteen. Both paths yield the
//! same elements.

use crate::*;
use zera::{TensorLayout, TensorView, ViewReason};

const SHAPE: [u64; 2] = [3, 4];

fn elements() -> Vec<f64> {
    (0..12).map(|i| i as f64 * 0.25 - 1.0).collect()
}

fn tensor_buffer(layout: TensorLayout) -> ZBuffer {
    build(|w| zera::write_tensor(w, &SHAPE, &elements(), layout).unwrap())
}

fn native_buffer() -> ZBuffer {
    build(|w| w.typed_array::<f64>(&SHAPE, &elements()).unwrap())
}

/// Returns (zero-copy count, copied count)
fn sweep(buf: &ZBuffer) -> (usize, usize) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let expected = elements();
    let mut zero_copy = 0;
    let mut copied = 0;
    for offset in 0..16 {
        let backing = rehost(buf, offset);
        let raw: &[u8] = bytemuck::cast_slice(&backing);
        let hosted = &raw[offset..offset + buf.len()];

        let r = Reader::new(hosted).unwrap();
        let t = TensorView::<f64>::from_view(&r).unwrap();
        let info = *t.view_info();

        assert_eq!(t.shape(), &SHAPE);
        assert_eq!(info.required_alignment, 8);
        assert_eq!(info.byte_size, 12 * 8);
        assert_eq!(info.zero_copy, info.address % 8 == 0, "offset {}", offset);
        assert_eq!(t.as_slice(), &expected[..], "offset {}", offset);

        if info.zero_copy {
            assert_eq!(info.reason, ViewReason::Ok);
            assert_eq!(t.as_slice().as_ptr() as usize, info.address);
            zero_copy += 1;
        } else {
            assert_eq!(info.reason, ViewReason::Misaligned);
            copied += 1;
        }
    }
    (zero_copy, copied)
}

#[test]
fn test_tensor_array_layout_sweep() {
    assert_eq!(sweep(&tensor_buffer(TensorLayout::Array)), (2, 14));
}

#[test]
fn test_tensor_map_layout_sweep() {
    assert_eq!(sweep(&tensor_buffer(TensorLayout::Map)), (2, 14));
}

#[test]
fn test_native_typed_array_sweep() {
    assert_eq!(sweep(&native_buffer()), (2, 14));
}

#[test]
fn test_zero_copy_offsets_are_multiples_of_eight() {
    let buf = native_buffer();
    for offset in [0usize, 8] {
        let backing = rehost(&buf, offset);
        let raw: &[u8] = bytemuck::cast_slice(&backing);
        let r = Reader::new(&raw[offset..offset + buf.len()]).unwrap();
        assert!(TensorView::<f64>::from_view(&r).unwrap().is_zero_copy());
    }
}

#[test]
fn test_f32_sweep_aligned_every_four() {
    let data: Vec<f32> = (0..6).map(|i| i as f32).collect();
    let buf = build(|w| w.typed_array::<f32>(&[2, 3], &data).unwrap());
    let mut zero_copy = 0;
    for offset in 0..16 {
        let backing = rehost(&buf, offset);
        let raw: &[u8] = bytemuck::cast_slice(&backing);
        let r = Reader::new(&raw[offset..offset + buf.len()]).unwrap();
        let t = TensorView::<f32>::from_view(&r).unwrap();
        assert_eq!(t.as_slice(), &data[..]);
        if t.is_zero_copy() {
            zero_copy += 1;
        }
    }
    assert_eq!(zero_copy, 4);
}

#[test]
fn test_copied_view_outlives_nothing_borrowed() {
    let buf = native_buffer();
    let backing = rehost(&buf, 3);
    let raw: &[u8] = bytemuck::cast_slice(&backing);
    let r = Reader::new(&raw[3..3 + buf.len()]).unwrap();
    let owned = TensorView::<f64>::from_view(&r).unwrap().into_vec();
    drop(backing);
    assert_eq!(owned, elements());
}
