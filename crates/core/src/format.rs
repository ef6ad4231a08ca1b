//! Zera v1 byte layout
//!
//! ```text
//! +----------------+------------------------+---------+------------------+
//! | header (20 B)  | envelope (env_size B)  | padding | arena            |
//! +----------------+------------------------+---------+------------------+
//! 0                20                                 arena_ofs (16-aligned)
//! ```
//!
//! ## Header (little-endian)
//!
//! | Offset | Field | Type |
//! |--------|-------|------|
//! | 0 | magic | u32 (`ZENV`) |
//! | 4 | version | u16 |
//! | 6 | flags | u16 (bit0 = little-endian, others reserved) |
//! | 8 | root_ofs | u32 (envelope offset of the root value reference) |
//! | 12 | env_size | u32 |
//! | 16 | arena_ofs | u32 (from buffer start) |
//!
//! ## Tag table
//!
//! Tags 0-7 are the published v1 set. `U64 = 8` is an extension that keeps
//! unsigned values above `i64::MAX` lossless; readers of the baseline table
//! will reject it as an unknown tag.

use crate::error::{DecodeError, DecodeResult};
use crate::le;
use serde::{Deserialize, Serialize};

/// Header magic, `ZENV` read as a little-endian u32
pub const MAGIC: u32 = 0x564E_455A;

/// Current format version
pub const FORMAT_VERSION: u16 = 1;

/// Header flag: payload is little-endian. The only legal flags value.
pub const FLAG_LITTLE_ENDIAN: u16 = 1;

/// Size of the fixed header
pub const HEADER_SIZE: usize = 20;

/// Size of every value reference
pub const VALUE_REF_SIZE: usize = 16;

/// Alignment of the arena base relative to the buffer start
pub const ARENA_BASE_ALIGN: usize = 16;

/// Longest string stored inside its value reference
pub const INLINE_MAX: usize = 12;

/// Maximum typed array rank
pub const RANK_MAX: usize = 8;

/// Size of an object entry header (`key_len:u16`, `reserved:u16`)
pub const ENTRY_HEADER_SIZE: usize = 4;

/// Round `x` up to a multiple of `align` (`align == 0` is treated as 1)
#[inline]
pub fn align_up(x: usize, align: usize) -> usize {
    if align <= 1 {
        return x;
    }
    match x % align {
        0 => x,
        r => x + (align - r),
    }
}

/// Value reference tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Null
    Null = 0,
    /// Boolean in `aux`
    Bool = 1,
    /// Signed 64-bit integer split across `a`/`b`
    I64 = 2,
    /// IEEE-754 bit pattern split across `a`/`b`
    F64 = 3,
    /// Inline or arena-backed UTF-8 string
    String = 4,
    /// Envelope offset of an array payload in `a`
    Array = 5,
    /// Envelope offset of an object payload in `a`
    Object = 6,
    /// Arena-backed typed array or blob
    TypedArray = 7,
    /// Unsigned 64-bit integer (extension)
    U64 = 8,
}

impl Tag {
    /// Parse a tag byte
    pub fn from_u8(b: u8) -> Option<Tag> {
        Some(match b {
            0 => Tag::Null,
            1 => Tag::Bool,
            2 => Tag::I64,
            3 => Tag::F64,
            4 => Tag::String,
            5 => Tag::Array,
            6 => Tag::Object,
            7 => Tag::TypedArray,
            8 => Tag::U64,
            _ => return None,
        })
    }

    /// Type name for error messages
    pub fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::Bool => "bool",
            Tag::I64 => "int64",
            Tag::F64 => "float64",
            Tag::String => "string",
            Tag::Array => "array",
            Tag::Object => "map",
            Tag::TypedArray => "typed array",
            Tag::U64 => "uint64",
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = DecodeError;

    fn try_from(b: u8) -> DecodeResult<Tag> {
        Tag::from_u8(b).ok_or_else(|| DecodeError::InvalidValueRef(format!("unknown tag {}", b)))
    }
}

/// Typed array element type, stored in the value reference `aux` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum DType {
    /// i8
    I8 = 1,
    /// u8 (blobs)
    U8 = 2,
    /// i16
    I16 = 3,
    /// u16
    U16 = 4,
    /// i32
    I32 = 5,
    /// u32
    U32 = 6,
    /// i64
    I64 = 7,
    /// u64
    U64 = 8,
    /// f32
    F32 = 9,
    /// f64
    F64 = 10,
}

impl DType {
    /// Parse a dtype code
    pub fn from_code(code: u16) -> Option<DType> {
        Some(match code {
            1 => DType::I8,
            2 => DType::U8,
            3 => DType::I16,
            4 => DType::U16,
            5 => DType::I32,
            6 => DType::U32,
            7 => DType::I64,
            8 => DType::U64,
            9 => DType::F32,
            10 => DType::F64,
            _ => return None,
        })
    }

    /// Wire code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Element size in bytes
    pub fn size(self) -> usize {
        match self {
            DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 => 8,
        }
    }

    /// Natural alignment of one element
    pub fn alignment(self) -> usize {
        self.size()
    }

    /// Element type name
    pub fn name(self) -> &'static str {
        match self {
            DType::I8 => "int8",
            DType::U8 => "uint8",
            DType::I16 => "int16",
            DType::U16 => "uint16",
            DType::I32 => "int32",
            DType::U32 => "uint32",
            DType::I64 => "int64",
            DType::U64 => "uint64",
            DType::F32 => "float",
            DType::F64 => "double",
        }
    }
}

/// Scalar types that can back a typed array
///
/// `TENSOR_CODE` is the element code used by the `[dtype, shape, data]`
/// tensor layout, which predates the dtype table and numbers types
/// differently.
pub trait Element: bytemuck::Pod {
    /// Typed array element code
    const DTYPE: DType;
    /// Element code in the tensor layout
    const TENSOR_CODE: i64;
}

macro_rules! impl_element {
    ($($t:ty => $dtype:ident, $code:expr;)*) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$dtype;
                const TENSOR_CODE: i64 = $code;
            }
        )*
    };
}

impl_element! {
    i8 => I8, 0;
    i16 => I16, 1;
    i32 => I32, 2;
    i64 => I64, 3;
    u8 => U8, 4;
    u16 => U16, 5;
    u32 => U32, 6;
    u64 => U64, 7;
    f32 => F32, 10;
    f64 => F64, 11;
}

/// Parsed buffer header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Magic number
    pub magic: u32,
    /// Format version
    pub version: u16,
    /// Flags (bit0 = little-endian)
    pub flags: u16,
    /// Envelope offset of the root value reference
    pub root_ofs: u32,
    /// Envelope size in bytes
    pub env_size: u32,
    /// Arena offset from the buffer start
    pub arena_ofs: u32,
}

impl Header {
    /// Header for a freshly written buffer
    pub fn new(root_ofs: u32, env_size: u32, arena_ofs: u32) -> Self {
        Header {
            magic: MAGIC,
            version: FORMAT_VERSION,
            flags: FLAG_LITTLE_ENDIAN,
            root_ofs,
            env_size,
            arena_ofs,
        }
    }

    /// Read the raw header fields without validating them
    pub fn parse(buf: &[u8]) -> DecodeResult<Header> {
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::TruncatedHeader {
                needed: HEADER_SIZE,
                have: buf.len(),
            });
        }
        Ok(Header {
            magic: le::read_u32(&buf[0..]),
            version: le::read_u16(&buf[4..]),
            flags: le::read_u16(&buf[6..]),
            root_ofs: le::read_u32(&buf[8..]),
            env_size: le::read_u32(&buf[12..]),
            arena_ofs: le::read_u32(&buf[16..]),
        })
    }

    /// Check every header invariant against a buffer of `buf_len` bytes
    ///
    /// - magic, version and flags are exact
    /// - the envelope lies inside the buffer and holds the root reference
    /// - the arena is 16-aligned, inside the buffer, and after the envelope
    pub fn validate(&self, buf_len: usize) -> DecodeResult<()> {
        if self.magic != MAGIC {
            return Err(DecodeError::BadMagic { found: self.magic });
        }
        if self.version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                found: self.version,
            });
        }
        if self.flags != FLAG_LITTLE_ENDIAN {
            return Err(DecodeError::BadFlags { found: self.flags });
        }

        let env_size = self.env_size as usize;
        let envelope_end = HEADER_SIZE
            .checked_add(env_size)
            .filter(|end| *end <= buf_len)
            .ok_or(DecodeError::OutOfBounds {
                region: "buffer",
                offset: HEADER_SIZE,
                len: env_size,
                limit: buf_len,
            })?;

        let root = self.root_ofs as usize;
        if root
            .checked_add(VALUE_REF_SIZE)
            .map_or(true, |end| end > env_size)
        {
            return Err(DecodeError::OutOfBounds {
                region: "envelope",
                offset: root,
                len: VALUE_REF_SIZE,
                limit: env_size,
            });
        }

        let arena_ofs = self.arena_ofs as usize;
        if arena_ofs > buf_len {
            return Err(DecodeError::OutOfBounds {
                region: "buffer",
                offset: arena_ofs,
                len: 0,
                limit: buf_len,
            });
        }
        if arena_ofs % ARENA_BASE_ALIGN != 0 {
            return Err(DecodeError::ArenaMisaligned {
                arena_ofs: self.arena_ofs,
                align: ARENA_BASE_ALIGN,
            });
        }
        if arena_ofs < envelope_end {
            return Err(DecodeError::ArenaOverlapsEnvelope {
                arena_ofs: self.arena_ofs,
                envelope_end,
            });
        }
        Ok(())
    }

    /// Serialize to the 20-byte wire layout
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        le::patch_u32(&mut bytes, 0, self.magic);
        le::patch_u16(&mut bytes, 4, self.version);
        le::patch_u16(&mut bytes, 6, self.flags);
        le::patch_u32(&mut bytes, 8, self.root_ofs);
        le::patch_u32(&mut bytes, 12, self.env_size);
        le::patch_u32(&mut bytes, 16, self.arena_ofs);
        bytes
    }
}
