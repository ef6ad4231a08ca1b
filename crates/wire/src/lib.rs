//! Zera encoding and decoding
//!
//! This crate implements the envelope/arena format described in
//! [`zera_core::format`]:
//!
//! - [`Writer`]: single-pass builder producing one contiguous [`ZBuffer`]
//! - [`Reader`] / [`View`]: lazy, bounds-checked, allocation-free decoding
//! - [`Value`]: owned tree for materialization and equality checks
//! - [`write_view`] / [`transcode`]: replay a view into another writer
//!
//! ## Value encoding
//!
//! | Value | Writer call | Reader accessor |
//! |-------|-------------|-----------------|
//! | Null | `null()` | `is_null()` |
//! | Bool | `boolean(b)` | `as_bool()` |
//! | I64 | `int64(v)` | `as_i64()`, `as_i32()`, ... |
//! | U64 | `uint64(v)` | `as_u64()`, `as_u32()`, ... |
//! | F64 | `double(v)` | `as_f64()`, `as_f32()` |
//! | String | `string(s)` | `as_str()`, `as_str_bytes()` |
//! | Blob | `binary(b)` | `as_blob()` |
//! | Typed array | `typed_array(shape, data)` | `as_typed_array()` |
//! | Array | `begin_array` / `end_array` | `array_len()`, `at(i)`, `iter()` |
//! | Map | `begin_map` / `key` / `end_map` | `get(k)`, `contains(k)`, `keys()`, `entries()` |
//!
//! ## Examples
//!
//! ```
//! use zera_wire::{Reader, Writer};
//!
//! let mut w = Writer::new();
//! w.begin_array(3).unwrap();
//! w.int64(-1).unwrap();
//! w.uint64(u64::MAX).unwrap();
//! w.binary(b"raw").unwrap();
//! w.end_array().unwrap();
//! let buf = w.finish().unwrap();
//!
//! let r = Reader::new(&buf).unwrap();
//! assert_eq!(r.array_len().unwrap(), 3);
//! assert_eq!(r.at(1).unwrap().as_u64().unwrap(), u64::MAX);
//! assert_eq!(r.at(2).unwrap().as_blob().unwrap(), b"raw");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod reader;
pub mod transcode;
pub mod typed;
pub mod value;
pub mod writer;

pub use reader::{ArrayIter, Entries, Keys, Reader, View};
pub use transcode::{transcode, write_view, write_view_bounded, TranscodeError};
pub use typed::{ShapeRef, TypedArrayRef};
pub use value::Value;
pub use writer::Writer;

pub use zera_core::{
    DType, DecodeError, DecodeResult, EncodeError, EncodeResult, ReaderOptions, WriterOptions,
    ZBuffer,
};
