//! Writer and reader options
//!
//! Use the builder pattern to configure options:
//!
//! ```
//! use zera_core::{ReaderOptions, WriterOptions};
//!
//! let w = WriterOptions::new().inline_string_max(8).blob_alignment(64);
//! assert!(w.validate().is_ok());
//!
//! let r = ReaderOptions::new().max_depth(32);
//! assert_eq!(r.max_depth, 32);
//! ```

use crate::error::{EncodeError, EncodeResult};
use crate::format::{ARENA_BASE_ALIGN, INLINE_MAX};
use serde::{Deserialize, Serialize};

/// Largest accepted blob alignment
pub const MAX_BLOB_ALIGNMENT: usize = 4096;

/// Default nesting limit for whole-tree walks
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Writer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Strings up to this many bytes are stored inline (at most 12)
    pub inline_string_max: usize,
    /// Arena alignment for blobs; a power of two
    pub blob_alignment: usize,
    /// Initial envelope capacity in bytes
    pub envelope_capacity: usize,
    /// Initial arena capacity in bytes
    pub arena_capacity: usize,
}

impl WriterOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte-packed blobs, no alignment padding in the arena
    pub fn compact() -> Self {
        WriterOptions {
            blob_alignment: 1,
            ..Default::default()
        }
    }

    /// Cache-line aligned blobs and a larger arena reservation
    pub fn tensor() -> Self {
        WriterOptions {
            blob_alignment: 64,
            arena_capacity: 64 * 1024,
            ..Default::default()
        }
    }

    /// Every string goes to the arena
    pub fn no_inline() -> Self {
        WriterOptions {
            inline_string_max: 0,
            ..Default::default()
        }
    }

    /// Set the inline string threshold
    pub fn inline_string_max(mut self, max: usize) -> Self {
        self.inline_string_max = max;
        self
    }

    /// Set the blob alignment
    pub fn blob_alignment(mut self, align: usize) -> Self {
        self.blob_alignment = align;
        self
    }

    /// Set the initial envelope capacity
    pub fn envelope_capacity(mut self, bytes: usize) -> Self {
        self.envelope_capacity = bytes;
        self
    }

    /// Set the initial arena capacity
    pub fn arena_capacity(mut self, bytes: usize) -> Self {
        self.arena_capacity = bytes;
        self
    }

    /// Check ranges
    pub fn validate(&self) -> EncodeResult<()> {
        if self.inline_string_max > INLINE_MAX {
            return Err(EncodeError::InvalidOption(format!(
                "inline_string_max {} exceeds {}",
                self.inline_string_max, INLINE_MAX
            )));
        }
        check_alignment("blob_alignment", self.blob_alignment)
    }
}

/// Arena alignments must be powers of two up to [`MAX_BLOB_ALIGNMENT`]
pub fn check_alignment(what: &str, align: usize) -> EncodeResult<()> {
    if !align.is_power_of_two() || align > MAX_BLOB_ALIGNMENT {
        return Err(EncodeError::InvalidOption(format!(
            "{} {} must be a power of two <= {}",
            what, align, MAX_BLOB_ALIGNMENT
        )));
    }
    Ok(())
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            inline_string_max: INLINE_MAX,
            blob_alignment: ARENA_BASE_ALIGN,
            envelope_capacity: 256,
            arena_capacity: 0,
        }
    }
}

/// Reader options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Nesting limit for whole-tree walks (materialization, transcoding)
    pub max_depth: usize,
}

impl ReaderOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
