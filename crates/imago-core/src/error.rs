//! Error types for imago-core.
//!
//! Conversion itself never fails. Errors come from the validating
//! constructors ([`NrgbaImage::from_raw`](crate::NrgbaImage::from_raw)) and
//! from [`SourceImage::validate`](crate::SourceImage::validate), which the
//! encoders call before touching a caller-supplied buffer.
//!
//! # Usage
//!
//! ```rust
//! use imago_core::{Error, NrgbaImage};
//!
//! let err = NrgbaImage::from_raw(2, 2, vec![0; 3]).unwrap_err();
//! assert!(matches!(err, Error::BufferTooSmall { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or validating pixel buffers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid image dimensions.
    ///
    /// Returned when a buffer size computation would overflow.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Stride is too small for the given width and pixel size.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride
        stride: usize,
        /// Minimum required stride
        min_stride: usize,
        /// Image width
        width: u32,
    },

    /// Pixel buffer is shorter than its geometry requires.
    #[error("{plane} buffer holds {actual} bytes, geometry needs {required}")]
    BufferTooSmall {
        /// Which plane was short ("pixel", "Y", "Cb", "Cr")
        plane: &'static str,
        /// Minimum byte count
        required: usize,
        /// Actual byte count
        actual: usize,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidStride`] error.
    #[inline]
    pub fn invalid_stride(stride: usize, min_stride: usize, width: u32) -> Self {
        Self::InvalidStride {
            stride,
            min_stride,
            width,
        }
    }

    /// Creates an [`Error::BufferTooSmall`] error.
    #[inline]
    pub fn buffer_too_small(plane: &'static str, required: usize, actual: usize) -> Self {
        Self::BufferTooSmall {
            plane,
            required,
            actual,
        }
    }
}
