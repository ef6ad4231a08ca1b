//! Unified error type for Zera.
//!
//! Wraps the per-crate errors so callers mixing reading, writing and file
//! persistence can use a single `?`.

use thiserror::Error;
use zera_core::{BufferError, DecodeError, EncodeError};
use zera_wire::TranscodeError;

/// All Zera errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or untrusted input
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Writer misuse
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Buffer construction misuse
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Zera operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the input bytes were rejected.
    ///
    /// Decode errors are expected for data from outside the process and
    /// should be handled, not treated as bugs.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Check if this is caller misuse of the writer or buffer API.
    pub fn is_logic(&self) -> bool {
        matches!(self, Error::Encode(_) | Error::Buffer(_))
    }

    /// Check if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

// Split transcoding errors back into their kinds
impl From<TranscodeError> for Error {
    fn from(e: TranscodeError) -> Self {
        match e {
            TranscodeError::Decode(e) => Error::Decode(e),
            TranscodeError::Encode(e) => Error::Encode(e),
        }
    }
}
