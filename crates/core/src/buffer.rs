//! Byte buffer ownership
//!
//! [`ZBuffer`] is what the writer hands back and what readers are usually
//! built from. It exposes one immutable `&[u8]` view over either
//!
//! - an owned `Vec<u8>`, or
//! - foreign memory wrapped in a [`ForeignBytes`] guard whose release routine
//!   runs exactly once, when the guard is dropped.
//!
//! A buffer is always exactly one of the two.

use crate::error::BufferError;
use std::fmt;
use std::io::{self, Read, Write};
use std::ops::Deref;
use std::path::Path;

type ReleaseFn = Box<dyn FnOnce(*mut u8, usize) + Send>;

/// RAII guard over bytes owned by a foreign allocator
///
/// The release routine receives the original pointer and length and is
/// invoked exactly once, from `Drop`.
pub struct ForeignBytes {
    ptr: *mut u8,
    len: usize,
    release: Option<ReleaseFn>,
}

impl ForeignBytes {
    /// Take ownership of `len` bytes at `ptr`
    ///
    /// A null `ptr` is accepted only when `len == 0`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` bytes and the bytes must not be
    /// mutated or freed by anyone else until `release` is called.
    pub unsafe fn new<F>(ptr: *mut u8, len: usize, release: F) -> Result<Self, BufferError>
    where
        F: FnOnce(*mut u8, usize) + Send + 'static,
    {
        if ptr.is_null() && len > 0 {
            return Err(BufferError::NullPointer(len));
        }
        Ok(ForeignBytes {
            ptr,
            len,
            release: Some(Box::new(release)),
        })
    }

    fn as_slice(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: non-null and valid for `len` reads per the constructor contract
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl Drop for ForeignBytes {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.ptr, self.len);
        }
    }
}

// SAFETY: the bytes are immutable for the guard's lifetime and the release
// routine is `Send` and only ever touched from `Drop`.
unsafe impl Send for ForeignBytes {}
unsafe impl Sync for ForeignBytes {}

enum Storage {
    Owned(Vec<u8>),
    Foreign(ForeignBytes),
}

/// Immutable byte buffer with explicit single ownership
pub struct ZBuffer {
    storage: Storage,
}

impl ZBuffer {
    /// Empty owned buffer
    pub fn new() -> Self {
        ZBuffer {
            storage: Storage::Owned(Vec::new()),
        }
    }

    /// Take ownership of a vector
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        ZBuffer {
            storage: Storage::Owned(bytes),
        }
    }

    /// Wrap a foreign allocation guard
    pub fn from_foreign(bytes: ForeignBytes) -> Self {
        ZBuffer {
            storage: Storage::Foreign(bytes),
        }
    }

    /// Take ownership of foreign memory with a release routine
    ///
    /// # Safety
    ///
    /// Same contract as [`ForeignBytes::new`].
    pub unsafe fn from_raw_parts<F>(ptr: *mut u8, len: usize, release: F) -> Result<Self, BufferError>
    where
        F: FnOnce(*mut u8, usize) + Send + 'static,
    {
        Ok(Self::from_foreign(ForeignBytes::new(ptr, len, release)?))
    }

    /// Byte view
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(v) => v,
            Storage::Foreign(f) => f.as_slice(),
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True when the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when backed by an owned vector
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Copy the bytes out
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Convert into a vector, copying only when the bytes are foreign
    pub fn into_vec(self) -> Vec<u8> {
        match self.storage {
            Storage::Owned(v) => v,
            Storage::Foreign(f) => f.as_slice().to_vec(),
        }
    }

    /// `hexdump -C` style rendering: offset, hex bytes, ASCII column
    pub fn hexdump(&self, bytes_per_row: usize) -> String {
        let bytes = self.as_slice();
        if bytes.is_empty() {
            return "(empty)\n".to_string();
        }
        let per_row = bytes_per_row.max(1);
        let mut out = String::new();
        for (row, chunk) in bytes.chunks(per_row).enumerate() {
            out.push_str(&format!("{:08x}  ", row * per_row));
            for j in 0..per_row {
                match chunk.get(j) {
                    Some(b) => out.push_str(&format!("{:02x} ", b)),
                    None => out.push_str("   "),
                }
                if j == 7 {
                    out.push(' ');
                }
            }
            out.push_str(" |");
            for &b in chunk {
                out.push(if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                });
            }
            out.push_str("|\n");
        }
        out
    }

    /// Write the bytes to `path`, replacing any existing file
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.as_slice())?;
        file.sync_all()
    }

    /// Read a whole file into an owned buffer
    pub fn read_from(path: &Path) -> io::Result<ZBuffer> {
        let mut file = std::fs::File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(ZBuffer::from_vec(bytes))
    }
}

impl Default for ZBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for ZBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        ZBuffer::from_vec(bytes)
    }
}

impl Deref for ZBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for ZBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Display for ZBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ZBuffer {} bytes, owned={}>", self.len(), self.is_owned())
    }
}

impl fmt::Debug for ZBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZBuffer")
            .field("len", &self.len())
            .field("owned", &self.is_owned())
            .finish()
    }
}
