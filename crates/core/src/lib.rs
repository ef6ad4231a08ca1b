//! Core types for Zera
//!
//! This crate defines the pieces shared by the writer, the reader and the
//! tensor layer:
//!
//! - [`format`]: header layout, tags, dtypes and alignment constants
//! - [`ValueRef`]: the 16-byte value reference, decoded into one variant per tag
//! - [`ZBuffer`]: immutable byte buffer with single ownership
//! - [`WriterOptions`] / [`ReaderOptions`]: configuration
//! - [`DecodeError`] / [`EncodeError`]: the two error families
//!
//! ## Buffer layout
//!
//! | Region | Start | Contents |
//! |--------|-------|----------|
//! | Header | 0 | 20 bytes, see [`Header`] |
//! | Envelope | 20 | value references, container payloads, shapes |
//! | Arena | `arena_ofs` (16-aligned) | string and blob bytes |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod error;
pub mod format;
pub mod le;
pub mod options;
pub mod value_ref;

pub use buffer::{ForeignBytes, ZBuffer};
pub use error::{BufferError, DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use format::{
    align_up, DType, Element, Header, Tag, ARENA_BASE_ALIGN, ENTRY_HEADER_SIZE,
    FLAG_LITTLE_ENDIAN, FORMAT_VERSION, HEADER_SIZE, INLINE_MAX, MAGIC, RANK_MAX, VALUE_REF_SIZE,
};
pub use options::{
    check_alignment, ReaderOptions, WriterOptions, DEFAULT_MAX_DEPTH, MAX_BLOB_ALIGNMENT,
};
pub use value_ref::{StringRef, ValueRef, FLAG_INLINE};
