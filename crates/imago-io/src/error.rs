//! Error types for I/O operations.
//!
//! Every facade operation reports exactly one [`IoError`]. Storage failures
//! pass through as [`IoError::Io`] holding the very `io::Error` the storage
//! produced, so callers can inspect its kind or downcast its payload.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// The format could not be resolved from a name, or is not compiled in.
    #[error("unsupported image format")]
    UnsupportedFormat,

    /// Storage or stream failure, passed through unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Decoded sample layout that has no source representation.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Source image geometry rejected before encoding.
    #[error(transparent)]
    Core(#[from] imago_core::Error),
}

impl IoError {
    /// Creates a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Creates an encode error.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::EncodeError(msg.into())
    }

    /// Returns `true` for the unsupported-format sentinel.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat)
    }

    /// Returns the underlying storage error, if any.
    pub fn as_io(&self) -> Option<&io::Error> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
