//! Bounds-checked lazy reader
//!
//! [`Reader::new`] validates the header once. After that every accessor
//! checks the exact span it touches against its region (envelope or arena)
//! before reading it. Nothing is decoded until asked for, and nothing is
//! allocated except error messages.
//!
//! A [`View`] is a `Copy` handle: the envelope and arena slices plus the
//! offset of one value reference. Sub-views share the same slices, so they
//! are as cheap as the parent and live as long as the buffer.
//!
//! Object lookup is a linear scan over the entries in encoded order; the
//! first entry whose key matches byte-for-byte wins.

use crate::typed::{ShapeRef, TypedArrayRef};
use std::fmt;
use std::ops::Deref;
use tracing::debug;
use zera_core::le;
use zera_core::{
    DType, DecodeError, DecodeResult, Header, ReaderOptions, StringRef, Tag, ValueRef,
    ENTRY_HEADER_SIZE, HEADER_SIZE, RANK_MAX, VALUE_REF_SIZE,
};

/// Validated entry point over a Zera buffer
#[derive(Clone)]
pub struct Reader<'a> {
    header: Header,
    options: ReaderOptions,
    root: View<'a>,
}

impl<'a> Reader<'a> {
    /// Validate the header and decode the root reference
    pub fn new(buf: &'a [u8]) -> DecodeResult<Self> {
        Self::with_options(buf, ReaderOptions::default())
    }

    /// Like [`Reader::new`] with explicit options
    pub fn with_options(buf: &'a [u8], options: ReaderOptions) -> DecodeResult<Self> {
        match Self::open(buf, options) {
            Ok(reader) => {
                debug!(
                    len = buf.len(),
                    root_ofs = reader.header.root_ofs,
                    env_size = reader.header.env_size,
                    arena_ofs = reader.header.arena_ofs,
                    "zera buffer opened"
                );
                Ok(reader)
            }
            Err(e) => {
                debug!(len = buf.len(), error = %e, "zera buffer rejected");
                Err(e)
            }
        }
    }

    fn open(buf: &'a [u8], options: ReaderOptions) -> DecodeResult<Self> {
        let header = Header::parse(buf)?;
        header.validate(buf.len())?;
        let env = &buf[HEADER_SIZE..HEADER_SIZE + header.env_size as usize];
        let arena = &buf[header.arena_ofs as usize..];
        let root = View::decode_at(env, arena, header.root_ofs as usize)?;
        Ok(Reader {
            header,
            options,
            root,
        })
    }

    /// Parsed header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Options in effect
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Root value
    pub fn root(&self) -> View<'a> {
        self.root
    }
}

impl<'a> Deref for Reader<'a> {
    type Target = View<'a>;

    fn deref(&self) -> &View<'a> {
        &self.root
    }
}

impl fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("header", &self.header)
            .field("root", &self.root)
            .finish()
    }
}

impl fmt::Display for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

fn span<'a>(region: &'static str, bytes: &'a [u8], offset: usize, len: usize) -> DecodeResult<&'a [u8]> {
    offset
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .map(|end| &bytes[offset..end])
        .ok_or(DecodeError::OutOfBounds {
            region,
            offset,
            len,
            limit: bytes.len(),
        })
}

macro_rules! narrowing_accessors {
    ($($name:ident => $t:ty, $via:ident, $target:literal;)*) => {
        $(
            #[doc = concat!("Integer value narrowed to `", stringify!($t), "`")]
            pub fn $name(&self) -> DecodeResult<$t> {
                let v = self.$via()?;
                <$t>::try_from(v).map_err(|_| DecodeError::IntegerOutOfRange {
                    target: $target,
                    value: v.to_string(),
                })
            }
        )*
    };
}

/// A value inside a Zera buffer
#[derive(Clone, Copy)]
pub struct View<'a> {
    env: &'a [u8],
    arena: &'a [u8],
    /// Envelope offset of this value's reference
    at: usize,
    vr: ValueRef,
}

impl<'a> View<'a> {
    fn decode_at(env: &'a [u8], arena: &'a [u8], at: usize) -> DecodeResult<Self> {
        let raw = span("envelope", env, at, VALUE_REF_SIZE)?;
        let vr = ValueRef::decode(raw)?;
        Ok(View { env, arena, at, vr })
    }

    fn child(&self, at: usize) -> DecodeResult<View<'a>> {
        View::decode_at(self.env, self.arena, at)
    }

    fn env_span(&self, offset: usize, len: usize) -> DecodeResult<&'a [u8]> {
        span("envelope", self.env, offset, len)
    }

    fn arena_span(&self, offset: usize, len: usize) -> DecodeResult<&'a [u8]> {
        span("arena", self.arena, offset, len)
    }

    fn wrong_type(&self, expected: &'static str) -> DecodeError {
        DecodeError::WrongType {
            expected,
            actual: self.type_name(),
        }
    }

    /// Decoded value reference
    pub fn value_ref(&self) -> ValueRef {
        self.vr
    }

    /// Tag of this value
    pub fn tag(&self) -> Tag {
        self.vr.tag()
    }

    /// Type name, as used in error messages
    pub fn type_name(&self) -> &'static str {
        if self.is_blob() {
            return "blob";
        }
        self.vr.tag().name()
    }

    /// True for null
    pub fn is_null(&self) -> bool {
        matches!(self.vr, ValueRef::Null)
    }

    /// True for a boolean
    pub fn is_bool(&self) -> bool {
        matches!(self.vr, ValueRef::Bool(_))
    }

    /// True for a signed integer (I64 tag)
    pub fn is_int(&self) -> bool {
        matches!(self.vr, ValueRef::I64(_))
    }

    /// True for an unsigned integer (U64 tag)
    pub fn is_uint(&self) -> bool {
        matches!(self.vr, ValueRef::U64(_))
    }

    /// True for a float
    pub fn is_float(&self) -> bool {
        matches!(self.vr, ValueRef::F64(_))
    }

    /// True for a string
    pub fn is_string(&self) -> bool {
        matches!(self.vr, ValueRef::String(_))
    }

    /// True for a string stored inside its reference
    pub fn is_inline_string(&self) -> bool {
        matches!(self.vr, ValueRef::String(StringRef::Inline { .. }))
    }

    /// True for an array
    pub fn is_array(&self) -> bool {
        matches!(self.vr, ValueRef::Array { .. })
    }

    /// True for a map
    pub fn is_map(&self) -> bool {
        matches!(self.vr, ValueRef::Object { .. })
    }

    /// True for a rank-1 typed array of bytes
    ///
    /// A `u8` typed array of any other rank is a plain typed array.
    pub fn is_blob(&self) -> bool {
        match self.vr {
            ValueRef::TypedArray { dtype, shape, .. } if dtype == DType::U8.code() => self
                .env_span(shape as usize, 4)
                .map_or(false, |rank| le::read_u32(rank) == 1),
            _ => false,
        }
    }

    /// True for any typed array, blobs included
    pub fn is_typed_array(&self) -> bool {
        matches!(self.vr, ValueRef::TypedArray { .. })
    }

    /// Boolean value
    pub fn as_bool(&self) -> DecodeResult<bool> {
        match self.vr {
            ValueRef::Bool(v) => Ok(v),
            _ => Err(self.wrong_type("bool")),
        }
    }

    /// Signed value; a U64 value must not exceed `i64::MAX`
    pub fn as_i64(&self) -> DecodeResult<i64> {
        match self.vr {
            ValueRef::I64(v) => Ok(v),
            ValueRef::U64(v) => i64::try_from(v).map_err(|_| DecodeError::IntegerOutOfRange {
                target: "int64",
                value: v.to_string(),
            }),
            _ => Err(self.wrong_type("integer")),
        }
    }

    /// Unsigned value; an I64 value must not be negative
    pub fn as_u64(&self) -> DecodeResult<u64> {
        match self.vr {
            ValueRef::U64(v) => Ok(v),
            ValueRef::I64(v) => u64::try_from(v).map_err(|_| DecodeError::IntegerOutOfRange {
                target: "uint64",
                value: v.to_string(),
            }),
            _ => Err(self.wrong_type("integer")),
        }
    }

    narrowing_accessors! {
        as_i8 => i8, as_i64, "int8";
        as_i16 => i16, as_i64, "int16";
        as_i32 => i32, as_i64, "int32";
        as_u8 => u8, as_u64, "uint8";
        as_u16 => u16, as_u64, "uint16";
        as_u32 => u32, as_u64, "uint32";
    }

    /// Float value, bit-exact
    pub fn as_f64(&self) -> DecodeResult<f64> {
        match self.vr {
            ValueRef::F64(v) => Ok(v),
            _ => Err(self.wrong_type("float64")),
        }
    }

    /// Float value narrowed to `f32`
    pub fn as_f32(&self) -> DecodeResult<f32> {
        self.as_f64().map(|v| v as f32)
    }

    /// Raw string bytes, borrowed from the envelope (inline) or the arena
    pub fn as_str_bytes(&self) -> DecodeResult<&'a [u8]> {
        match self.vr {
            ValueRef::String(StringRef::Inline { len, .. }) => {
                self.env_span(self.at + 4, len as usize)
            }
            ValueRef::String(StringRef::Arena { offset, len }) => {
                self.arena_span(offset as usize, len as usize)
            }
            _ => Err(self.wrong_type("string")),
        }
    }

    /// String value, checked to be UTF-8
    pub fn as_str(&self) -> DecodeResult<&'a str> {
        let bytes = self.as_str_bytes()?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
            offset: match self.vr {
                ValueRef::String(StringRef::Arena { offset, .. }) => offset as usize,
                _ => self.at + 4,
            },
        })
    }

    /// Typed array with a validated shape and byte length
    pub fn as_typed_array(&self) -> DecodeResult<TypedArrayRef<'a>> {
        let (code, offset, byte_len, shape) = match self.vr {
            ValueRef::TypedArray {
                dtype,
                offset,
                byte_len,
                shape,
            } => (dtype, offset, byte_len, shape),
            _ => return Err(self.wrong_type("typed array")),
        };
        let dtype = DType::from_code(code).ok_or(DecodeError::UnknownDType(code))?;
        let shape = self.shape_at(shape as usize)?;
        let bytes = self.arena_span(offset as usize, byte_len as usize)?;
        TypedArrayRef::new(dtype, shape, bytes)
    }

    /// Blob bytes; `dim0` must equal the length
    pub fn as_blob(&self) -> DecodeResult<&'a [u8]> {
        if !self.is_blob() {
            return Err(self.wrong_type("blob"));
        }
        Ok(self.as_typed_array()?.bytes)
    }

    fn shape_at(&self, offset: usize) -> DecodeResult<ShapeRef<'a>> {
        let rank = le::read_u32(self.env_span(offset, 4)?);
        if rank as usize > RANK_MAX {
            return Err(DecodeError::RankTooLarge {
                rank,
                max: RANK_MAX,
            });
        }
        let dims = self.env_span(offset + 4, 8 * rank as usize)?;
        Ok(ShapeRef::new(dims))
    }

    /// Payload offset and element count of an array, whole span checked
    fn array_header(&self) -> DecodeResult<(usize, usize)> {
        let payload = match self.vr {
            ValueRef::Array { payload } => payload as usize,
            _ => return Err(self.wrong_type("array")),
        };
        let count = le::read_u32(self.env_span(payload, 4)?) as usize;
        let body = count.checked_mul(VALUE_REF_SIZE).ok_or(DecodeError::OutOfBounds {
            region: "envelope",
            offset: payload,
            len: usize::MAX,
            limit: self.env.len(),
        })?;
        self.env_span(payload + 4, body)?;
        Ok((payload, count))
    }

    fn map_header(&self) -> DecodeResult<(usize, usize)> {
        let payload = match self.vr {
            ValueRef::Object { payload } => payload as usize,
            _ => return Err(self.wrong_type("map")),
        };
        let count = le::read_u32(self.env_span(payload, 4)?) as usize;
        Ok((payload, count))
    }

    /// Number of array elements
    pub fn array_len(&self) -> DecodeResult<usize> {
        self.array_header().map(|(_, count)| count)
    }

    /// Number of map entries, duplicates included
    pub fn map_len(&self) -> DecodeResult<usize> {
        self.map_header().map(|(_, count)| count)
    }

    /// Array element `index`, computed directly from the index
    pub fn at(&self, index: usize) -> DecodeResult<View<'a>> {
        let (payload, count) = self.array_header()?;
        if index >= count {
            return Err(DecodeError::IndexOutOfBounds { index, len: count });
        }
        self.child(payload + 4 + VALUE_REF_SIZE * index)
    }

    /// Value of the first entry whose key equals `key`
    pub fn get(&self, key: &str) -> DecodeResult<View<'a>> {
        self.find(key)?
            .ok_or_else(|| DecodeError::KeyNotFound(key.to_string()))
    }

    /// Like [`View::get`] but `Ok(None)` when the key is absent
    ///
    /// Skipped entries have their slot bounds-checked but their value is
    /// not decoded.
    pub fn find(&self, key: &str) -> DecodeResult<Option<View<'a>>> {
        let (payload, count) = self.map_header()?;
        let mut next = payload + 4;
        for _ in 0..count {
            let (k, value_at) = self.entry_at(next)?;
            if k == key.as_bytes() {
                return self.child(value_at).map(Some);
            }
            next = value_at + VALUE_REF_SIZE;
        }
        Ok(None)
    }

    /// Key bytes and value slot offset of the entry at `at`
    fn entry_at(&self, at: usize) -> DecodeResult<(&'a [u8], usize)> {
        let head = self.env_span(at, ENTRY_HEADER_SIZE)?;
        let key_len = le::read_u16(head) as usize;
        let key_at = at + ENTRY_HEADER_SIZE;
        let key = self.env_span(key_at, key_len)?;
        let value_at = key_at + key_len;
        self.env_span(value_at, VALUE_REF_SIZE)?;
        Ok((key, value_at))
    }

    /// True if this is a map holding `key`; false for any other type
    pub fn contains(&self, key: &str) -> DecodeResult<bool> {
        if !self.is_map() {
            return Ok(false);
        }
        Ok(self.find(key)?.is_some())
    }

    /// Iterate over array elements
    pub fn iter(&self) -> DecodeResult<ArrayIter<'a>> {
        let (payload, count) = self.array_header()?;
        Ok(ArrayIter {
            parent: *self,
            next: payload + 4,
            remaining: count,
        })
    }

    /// Iterate over map entries as `(key bytes, value)` in encoded order
    pub fn entries(&self) -> DecodeResult<Entries<'a>> {
        let (payload, count) = self.map_header()?;
        Ok(Entries {
            parent: *self,
            next: payload + 4,
            remaining: count,
        })
    }

    /// Iterate over map keys in encoded order
    pub fn keys(&self) -> DecodeResult<Keys<'a>> {
        Ok(Keys {
            inner: self.entries()?,
        })
    }
}

/// Array elements
#[derive(Clone)]
pub struct ArrayIter<'a> {
    parent: View<'a>,
    next: usize,
    remaining: usize,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = DecodeResult<View<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let at = self.next;
        self.next += VALUE_REF_SIZE;
        Some(self.parent.child(at))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ArrayIter<'_> {}

/// Map entries as `(key bytes, value)`
///
/// Stops after the first error.
#[derive(Clone)]
pub struct Entries<'a> {
    parent: View<'a>,
    next: usize,
    remaining: usize,
}

impl<'a> Entries<'a> {
    fn step(&mut self) -> DecodeResult<(&'a [u8], View<'a>)> {
        let (key, value_at) = self.parent.entry_at(self.next)?;
        let value = self.parent.child(value_at)?;
        self.next = value_at + VALUE_REF_SIZE;
        Ok((key, value))
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = DecodeResult<(&'a [u8], View<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let item = self.step();
        if item.is_err() {
            self.remaining = 0;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Map keys as UTF-8 strings
#[derive(Clone)]
pub struct Keys<'a> {
    inner: Entries<'a>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = DecodeResult<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.inner.next + ENTRY_HEADER_SIZE;
        self.inner.next().map(|entry| {
            let (key, _) = entry?;
            std::str::from_utf8(key).map_err(|_| DecodeError::InvalidUtf8 { offset: at })
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Display for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Zera(")?;
        match self.vr {
            ValueRef::Null => f.write_str("null")?,
            ValueRef::Bool(v) => write!(f, "{}", v)?,
            ValueRef::I64(v) => write!(f, "{}", v)?,
            ValueRef::U64(v) => write!(f, "{}", v)?,
            ValueRef::F64(v) => write!(f, "{}", v)?,
            ValueRef::String(s) => write!(f, "str[len={}]", s.len())?,
            ValueRef::Array { .. } => match self.array_len() {
                Ok(n) => write!(f, "arr[n={}]", n)?,
                Err(_) => f.write_str("arr[invalid]")?,
            },
            ValueRef::Object { .. } => f.write_str("map")?,
            ValueRef::TypedArray { byte_len, .. } if self.is_blob() => {
                write!(f, "blob[len={}]", byte_len)?
            }
            ValueRef::TypedArray { byte_len, .. } => write!(f, "typed[len={}]", byte_len)?,
        }
        f.write_str(")")
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("at", &self.at)
            .field("value", &self.vr)
            .finish()
    }
}
