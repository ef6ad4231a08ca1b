//! Error types for Zera
//!
//! Two disjoint families:
//!
//! - [`DecodeError`]: malformed or untrusted input. Every reader accessor
//!   returns it; callers parsing bytes from outside the process are expected
//!   to handle it.
//! - [`EncodeError`]: misuse of the writer (container nesting, multiple
//!   roots, 32-bit size overflow). A violation is a bug in the caller, not
//!   bad data.
//!
//! [`BufferError`] covers construction of a [`ZBuffer`](crate::ZBuffer) from
//! foreign memory.

use thiserror::Error;

/// Decode error types
///
/// Raised at the point of detection with the region, offset and length
/// involved. Nothing is ever silently defaulted or truncated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Buffer is shorter than the fixed header
    #[error("truncated header: need {needed} bytes, have {have}")]
    TruncatedHeader {
        /// Bytes required
        needed: usize,
        /// Bytes available
        have: usize,
    },

    /// Magic number does not match
    #[error("bad magic: 0x{found:08x}")]
    BadMagic {
        /// Magic found in the header
        found: u32,
    },

    /// Format version is not supported
    #[error("unsupported version: {found}")]
    UnsupportedVersion {
        /// Version found in the header
        found: u16,
    },

    /// Header flags are not exactly the little-endian bit
    #[error("invalid header flags: 0x{found:04x} (expected little-endian bit0 only)")]
    BadFlags {
        /// Flags found in the header
        found: u16,
    },

    /// An offset/length pair falls outside its owning region
    #[error("{region} span out of bounds: offset {offset} + len {len} > {limit}")]
    OutOfBounds {
        /// Region the span was checked against
        region: &'static str,
        /// Start offset within the region
        offset: usize,
        /// Length of the span
        len: usize,
        /// Size of the region
        limit: usize,
    },

    /// Arena offset is not a multiple of the arena base alignment
    #[error("arena_ofs {arena_ofs} is not {align}-byte aligned")]
    ArenaMisaligned {
        /// Arena offset from the header
        arena_ofs: u32,
        /// Required alignment
        align: usize,
    },

    /// Arena starts inside the header or envelope
    #[error("arena_ofs {arena_ofs} overlaps envelope ending at {envelope_end}")]
    ArenaOverlapsEnvelope {
        /// Arena offset from the header
        arena_ofs: u32,
        /// First byte after the envelope
        envelope_end: usize,
    },

    /// Accessor called on a value of another type
    #[error("wrong type: expected {expected}, found {actual}")]
    WrongType {
        /// Type the accessor requires
        expected: &'static str,
        /// Type actually stored
        actual: &'static str,
    },

    /// A 16-byte value reference is internally inconsistent
    #[error("invalid value reference: {0}")]
    InvalidValueRef(String),

    /// Integer does not fit the requested target type
    #[error("integer {value} out of range for {target}")]
    IntegerOutOfRange {
        /// Requested target type
        target: &'static str,
        /// Stored value, rendered for diagnostics
        value: String,
    },

    /// String or key bytes are not valid UTF-8
    #[error("invalid UTF-8 at envelope/arena offset {offset}")]
    InvalidUtf8 {
        /// Offset of the offending payload
        offset: usize,
    },

    /// Object does not contain the requested key
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Array index past the end
    #[error("array index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Array length
        len: usize,
    },

    /// Typed array element code is not in the dtype table
    #[error("unknown dtype code: {0}")]
    UnknownDType(u16),

    /// Shape rank exceeds the format limit
    #[error("rank {rank} exceeds maximum {max}")]
    RankTooLarge {
        /// Declared rank
        rank: u32,
        /// Maximum supported rank
        max: usize,
    },

    /// Declared shape disagrees with the payload
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Byte length disagrees with the element count
    #[error("size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch {
        /// Bytes implied by shape and element type
        expected: usize,
        /// Bytes actually present
        actual: usize,
    },

    /// Whole-tree walk exceeded the configured nesting depth
    #[error("nesting depth limit {0} exceeded")]
    DepthLimitExceeded(usize),

    /// Value does not follow the tensor layout
    #[error("not a tensor: {0}")]
    NotATensor(String),
}

/// Writer misuse errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// `key()` outside an open map
    #[error("key() called outside a map")]
    KeyWithoutMap,

    /// `key()` twice without a value in between
    #[error("key() called twice without a value")]
    DuplicatePendingKey,

    /// Value delivered to a map with no pending key
    #[error("map value written without a preceding key()")]
    ValueWithoutKey,

    /// `end_array`/`end_map` does not match the open container
    #[error("{called} called but the open container is {open}")]
    MismatchedEnd {
        /// The closing call
        called: &'static str,
        /// What is actually open
        open: &'static str,
    },

    /// `end_map` with a key still waiting for its value
    #[error("end_map() with a dangling key")]
    DanglingKey,

    /// `finish()` with containers still open
    #[error("finish() called with {depth} unterminated container(s)")]
    UnterminatedContainer {
        /// Number of open containers
        depth: usize,
    },

    /// More than one value written at depth 0
    #[error("multiple root values")]
    MultipleRoots,

    /// A size or offset does not fit its wire field
    #[error("{what} too large: {size}")]
    TooLarge {
        /// Which quantity overflowed
        what: &'static str,
        /// The offending size
        size: usize,
    },

    /// Typed array data disagrees with its declared shape
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Writer options out of range
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Buffer construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Non-zero length with a null pointer
    #[error("non-zero size ({0} bytes) requires a non-null pointer")]
    NullPointer(usize),
}

/// Result type for decode operations
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Result type for encode operations
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
