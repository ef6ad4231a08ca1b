//! Buffer Ownership and File Tests

use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_file_round_trip() -> zera::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("payload.zera");
    let value = Value::Array(vec![Value::Int(-4), "persisted".into(), Value::Bytes(vec![1, 2, 3])]);

    zera::encode(&value)?.write_to(&path)?;
    let loaded = ZBuffer::read_from(&path)?;
    assert!(loaded.is_owned());
    assert_eq!(zera::decode(&loaded)?, value);
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err: zera::Error = ZBuffer::read_from(&dir.path().join("absent")).unwrap_err().into();
    assert!(err.is_io());
}

#[test]
fn test_foreign_buffer_released_once_after_reading() {
    let bytes = encode_one(&Value::from("borrowed from elsewhere")).into_vec();
    let released = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&released);

    let boxed: Box<[u8]> = bytes.into_boxed_slice();
    let len = boxed.len();
    let ptr = Box::into_raw(boxed) as *mut u8;
    let buf = unsafe {
        ZBuffer::from_raw_parts(ptr, len, move |p, n| {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(p, n)));
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }
    .unwrap();
    assert!(!buf.is_owned());

    {
        let r = Reader::new(&buf).unwrap();
        assert_eq!(r.as_str().unwrap(), "borrowed from elsewhere");
    }
    assert_eq!(released.load(Ordering::SeqCst), 0);
    drop(buf);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_display_and_hexdump() {
    let buf = Writer::new().finish().unwrap();
    assert_eq!(buf.to_string(), format!("<ZBuffer {} bytes, owned=true>", buf.len()));
    assert!(buf.hexdump(16).starts_with("00000000  5a 45 4e 56 01 00 01 00"));
}
