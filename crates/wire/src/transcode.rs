//! Reader to writer bridge
//!
//! [`write_view`] walks a view and replays it into a writer without
//! materializing it. Key order, duplicate keys, integer signedness, float
//! bits, dtypes and shapes are all preserved; only the physical layout
//! (inline threshold, blob alignment) follows the target writer's options.

use crate::reader::{Reader, View};
use crate::writer::Writer;
use thiserror::Error;
use zera_core::{
    DecodeError, EncodeError, ReaderOptions, ValueRef, WriterOptions, ZBuffer, DEFAULT_MAX_DEPTH,
};

/// Transcoding error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranscodeError {
    /// Source buffer is malformed
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),

    /// Target writer rejected the value
    #[error("encode: {0}")]
    Encode(#[from] EncodeError),
}

/// Replay `view` into `writer` as one value
pub fn write_view(view: &View<'_>, writer: &mut Writer) -> Result<(), TranscodeError> {
    write_view_bounded(view, writer, DEFAULT_MAX_DEPTH)
}

/// Like [`write_view`] with an explicit container nesting limit
pub fn write_view_bounded(
    view: &View<'_>,
    writer: &mut Writer,
    max_depth: usize,
) -> Result<(), TranscodeError> {
    replay(view, writer, 0, max_depth)
}

/// Re-encode a whole buffer with different writer options
pub fn transcode(
    buf: &[u8],
    reader_options: ReaderOptions,
    writer_options: WriterOptions,
) -> Result<ZBuffer, TranscodeError> {
    let max_depth = reader_options.max_depth;
    let reader = Reader::with_options(buf, reader_options)?;
    let mut writer = Writer::with_options(writer_options)?;
    replay(&reader.root(), &mut writer, 0, max_depth)?;
    Ok(writer.finish()?)
}

fn replay(view: &View<'_>, w: &mut Writer, depth: usize, max_depth: usize) -> Result<(), TranscodeError> {
    match view.value_ref() {
        ValueRef::Null => w.null()?,
        ValueRef::Bool(v) => w.boolean(v)?,
        ValueRef::I64(v) => w.int64(v)?,
        ValueRef::U64(v) => w.uint64(v)?,
        ValueRef::F64(v) => w.double(v)?,
        ValueRef::String(_) => w.string(view.as_str()?)?,
        ValueRef::TypedArray { .. } if view.is_blob() => w.binary(view.as_blob()?)?,
        ValueRef::TypedArray { .. } => {
            let arr = view.as_typed_array()?;
            w.typed_array_raw(arr.dtype, &arr.shape.to_vec(), arr.bytes)?
        }
        ValueRef::Array { .. } => {
            if depth >= max_depth {
                return Err(DecodeError::DepthLimitExceeded(max_depth).into());
            }
            w.begin_array(view.array_len()?)?;
            for item in view.iter()? {
                replay(&item?, w, depth + 1, max_depth)?;
            }
            w.end_array()?
        }
        ValueRef::Object { .. } => {
            if depth >= max_depth {
                return Err(DecodeError::DepthLimitExceeded(max_depth).into());
            }
            w.begin_map(view.map_len()?)?;
            for (key, entry) in view.keys()?.zip(view.entries()?) {
                let (_, value) = entry?;
                w.key(key?)?;
                replay(&value, w, depth + 1, max_depth)?;
            }
            w.end_map()?
        }
    }
    Ok(())
}
