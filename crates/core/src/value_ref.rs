//! Value references
//!
//! On the wire every value is a fixed 16-byte record:
//!
//! ```text
//! [tag:u8][flags:u8][aux:u16][a:u32][b:u32][c:u32]
//! ```
//!
//! The meaning of `aux`, `a`, `b` and `c` depends on the tag. [`ValueRef`]
//! gives each tag its own variant; the packed layout only exists inside
//! [`ValueRef::encode`] and [`ValueRef::decode`].
//!
//! | Tag | Fields |
//! |-----|--------|
//! | Bool | `aux` in {0, 1} |
//! | I64 / U64 / F64 | low half in `a`, high half in `b` |
//! | String (inline, flags bit0) | length in `aux`, bytes in `a..c` |
//! | String (arena) | arena offset in `a`, length in `b` |
//! | Array / Object | envelope offset of the payload in `a` |
//! | TypedArray | dtype in `aux`, arena offset `a`, byte length `b`, shape offset `c` |

use crate::error::{DecodeError, DecodeResult};
use crate::format::{Tag, INLINE_MAX, VALUE_REF_SIZE};
use crate::le;

/// Flag bit marking a string as stored inside its reference
pub const FLAG_INLINE: u8 = 1;

/// Where a string's bytes live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringRef {
    /// Up to 12 bytes stored in the reference itself
    Inline {
        /// Byte length
        len: u8,
        /// Payload, zero-padded
        bytes: [u8; INLINE_MAX],
    },
    /// Bytes stored in the arena
    Arena {
        /// Arena offset
        offset: u32,
        /// Byte length
        len: u32,
    },
}

impl StringRef {
    /// Build an inline reference; `None` if `s` does not fit
    pub fn inline(s: &[u8]) -> Option<StringRef> {
        if s.len() > INLINE_MAX {
            return None;
        }
        let mut bytes = [0u8; INLINE_MAX];
        bytes[..s.len()].copy_from_slice(s);
        Some(StringRef::Inline {
            len: s.len() as u8,
            bytes,
        })
    }

    /// Byte length of the string
    pub fn len(&self) -> usize {
        match self {
            StringRef::Inline { len, .. } => *len as usize,
            StringRef::Arena { len, .. } => *len as usize,
        }
    }

    /// True for the empty string
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded 16-byte value reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef {
    /// Null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    I64(i64),
    /// Unsigned integer
    U64(u64),
    /// Float, bit-exact
    F64(f64),
    /// String
    String(StringRef),
    /// Array payload at an envelope offset
    Array {
        /// Envelope offset of `[count][ValueRef x count]`
        payload: u32,
    },
    /// Object payload at an envelope offset
    Object {
        /// Envelope offset of `[count][entries...]`
        payload: u32,
    },
    /// Arena-backed typed array
    TypedArray {
        /// Raw dtype code, checked when the array is accessed
        dtype: u16,
        /// Arena offset of the element bytes
        offset: u32,
        /// Byte length of the element bytes
        byte_len: u32,
        /// Envelope offset of `[rank][dim x rank]`
        shape: u32,
    },
}

impl ValueRef {
    /// Tag of this reference
    pub fn tag(&self) -> Tag {
        match self {
            ValueRef::Null => Tag::Null,
            ValueRef::Bool(_) => Tag::Bool,
            ValueRef::I64(_) => Tag::I64,
            ValueRef::U64(_) => Tag::U64,
            ValueRef::F64(_) => Tag::F64,
            ValueRef::String(_) => Tag::String,
            ValueRef::Array { .. } => Tag::Array,
            ValueRef::Object { .. } => Tag::Object,
            ValueRef::TypedArray { .. } => Tag::TypedArray,
        }
    }

    /// Pack into the 16-byte wire layout
    pub fn encode(&self) -> [u8; VALUE_REF_SIZE] {
        let (flags, aux, a, b, c) = match *self {
            ValueRef::Null => (0, 0, 0, 0, 0),
            ValueRef::Bool(v) => (0, u16::from(v), 0, 0, 0),
            ValueRef::I64(v) => {
                let (lo, hi) = le::split_u64(v as u64);
                (0, 0, lo, hi, 0)
            }
            ValueRef::U64(v) => {
                let (lo, hi) = le::split_u64(v);
                (0, 0, lo, hi, 0)
            }
            ValueRef::F64(v) => {
                let (lo, hi) = le::split_u64(v.to_bits());
                (0, 0, lo, hi, 0)
            }
            ValueRef::String(StringRef::Inline { len, bytes }) => {
                let mut packed = [0u8; VALUE_REF_SIZE];
                packed[0] = Tag::String as u8;
                packed[1] = FLAG_INLINE;
                le::patch_u16(&mut packed, 2, u16::from(len));
                packed[4..].copy_from_slice(&bytes);
                return packed;
            }
            ValueRef::String(StringRef::Arena { offset, len }) => (0, 0, offset, len, 0),
            ValueRef::Array { payload } => (0, 0, payload, 0, 0),
            ValueRef::Object { payload } => (0, 0, payload, 0, 0),
            ValueRef::TypedArray {
                dtype,
                offset,
                byte_len,
                shape,
            } => (0, dtype, offset, byte_len, shape),
        };

        let mut bytes = [0u8; VALUE_REF_SIZE];
        bytes[0] = self.tag() as u8;
        bytes[1] = flags;
        le::patch_u16(&mut bytes, 2, aux);
        le::patch_u32(&mut bytes, 4, a);
        le::patch_u32(&mut bytes, 8, b);
        le::patch_u32(&mut bytes, 12, c);
        bytes
    }

    /// Unpack and validate a 16-byte reference
    ///
    /// Rejects unknown tags, flags other than the inline-string bit, bool
    /// payloads other than 0/1 and inline lengths above 12. Offsets are not
    /// checked here; they are checked against their region when followed.
    pub fn decode(raw: &[u8]) -> DecodeResult<ValueRef> {
        if raw.len() < VALUE_REF_SIZE {
            return Err(DecodeError::OutOfBounds {
                region: "value reference",
                offset: 0,
                len: VALUE_REF_SIZE,
                limit: raw.len(),
            });
        }
        let tag = Tag::try_from(raw[0])?;
        let flags = raw[1];
        let aux = le::read_u16(&raw[2..]);
        let a = le::read_u32(&raw[4..]);
        let b = le::read_u32(&raw[8..]);
        let c = le::read_u32(&raw[12..]);

        if tag == Tag::String {
            if flags & !FLAG_INLINE != 0 {
                return Err(DecodeError::InvalidValueRef(format!(
                    "unknown string flags 0x{:02x}",
                    flags
                )));
            }
        } else if flags != 0 {
            return Err(DecodeError::InvalidValueRef(format!(
                "{} reference has flags 0x{:02x} set",
                tag.name(),
                flags
            )));
        }

        Ok(match tag {
            Tag::Null => ValueRef::Null,
            Tag::Bool => match aux {
                0 => ValueRef::Bool(false),
                1 => ValueRef::Bool(true),
                other => {
                    return Err(DecodeError::InvalidValueRef(format!(
                        "invalid bool payload {}",
                        other
                    )))
                }
            },
            Tag::I64 => ValueRef::I64(le::join_u64(a, b) as i64),
            Tag::U64 => ValueRef::U64(le::join_u64(a, b)),
            Tag::F64 => ValueRef::F64(f64::from_bits(le::join_u64(a, b))),
            Tag::String if flags & FLAG_INLINE != 0 => {
                let len = aux as usize;
                if len > INLINE_MAX {
                    return Err(DecodeError::InvalidValueRef(format!(
                        "inline string length {} exceeds {}",
                        len, INLINE_MAX
                    )));
                }
                let mut bytes = [0u8; INLINE_MAX];
                bytes.copy_from_slice(&raw[4..VALUE_REF_SIZE]);
                ValueRef::String(StringRef::Inline {
                    len: len as u8,
                    bytes,
                })
            }
            Tag::String => ValueRef::String(StringRef::Arena { offset: a, len: b }),
            Tag::Array => ValueRef::Array { payload: a },
            Tag::Object => ValueRef::Object { payload: a },
            Tag::TypedArray => ValueRef::TypedArray {
                dtype: aux,
                offset: a,
                byte_len: b,
                shape: c,
            },
        })
    }
}
