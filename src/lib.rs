//! # Zera
//!
//! A binary format for JSON-like values and numeric tensors, read lazily
//! straight out of the encoded bytes.
//!
//! A buffer is a fixed header, a compact envelope of 16-byte value
//! references and container payloads, and a 16-byte aligned arena holding
//! long strings, blobs and typed arrays. Readers decode on demand and
//! bounds-check every offset; typed payloads are borrowed in place when
//! alignment allows and copied otherwise.
//!
//! ## Quick Start
//!
//! ```
//! use zera::prelude::*;
//!
//! let mut w = Writer::new();
//! w.begin_map(2)?;
//! w.key("name")?;
//! w.string("sensor-7")?;
//! w.key("samples")?;
//! write_tensor(&mut w, &[2, 2], &[0.5f64, 1.5, 2.5, 3.5], TensorLayout::Array)?;
//! w.end_map()?;
//! let buf = w.finish()?;
//!
//! let r = Reader::new(&buf)?;
//! assert_eq!(r.get("name")?.as_str()?, "sensor-7");
//! let t = TensorView::<f64>::from_view(&r.get("samples")?)?;
//! assert_eq!(t.shape(), &[2, 2]);
//! # Ok::<(), zera::Error>(())
//! ```
//!
//! ## Crates
//!
//! - [`zera_core`]: format constants, value references, buffers, errors, options
//! - [`zera_wire`]: [`Writer`], [`Reader`], [`View`], [`Value`], transcoding
//! - [`zera_tensor`]: [`TensorView`] and the zero-copy decision layer

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;

pub mod prelude;

pub use error::{Error, Result};

pub use zera_core::{
    format, BufferError, DType, DecodeError, Element, EncodeError, ForeignBytes, Header,
    ReaderOptions, Tag, ValueRef, WriterOptions, ZBuffer,
};
pub use zera_tensor::{
    align_slice, is_tensor, write_tensor, AlignedSlice, BlobSource, TensorLayout, TensorView,
    ViewInfo, ViewReason,
};
pub use zera_wire::{
    transcode, write_view, ArrayIter, Entries, Keys, Reader, ShapeRef, TranscodeError,
    TypedArrayRef, Value, View, Writer,
};

/// Encode an owned value with default options
pub fn encode(value: &Value) -> Result<ZBuffer> {
    encode_with(value, WriterOptions::default())
}

/// Encode an owned value with the given writer options
pub fn encode_with(value: &Value, options: WriterOptions) -> Result<ZBuffer> {
    let mut w = Writer::with_options(options)?;
    w.value(value)?;
    Ok(w.finish()?)
}

/// Decode a whole buffer into an owned value
pub fn decode(buf: &[u8]) -> Result<Value> {
    decode_with(buf, ReaderOptions::default())
}

/// Decode with the given reader options
pub fn decode_with(buf: &[u8], options: ReaderOptions) -> Result<Value> {
    Ok(Reader::with_options(buf, options)?.to_value()?)
}
