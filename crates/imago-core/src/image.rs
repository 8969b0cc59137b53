//! The canonical image: 8-bit, non-premultiplied RGBA.
//!
//! [`NrgbaImage`] is the single output type of every conversion path.
//! Pixels are stored row-major, four bytes each:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  ← Row 0 (stride bytes)
//!         [R G B A R G B A ...]  ← Row 1
//!         ...
//! ```
//!
//! The rectangle always starts at the origin. An image with zero width or
//! height has an empty pixel buffer.
//!
//! # Usage
//!
//! ```rust
//! use imago_core::{Nrgba, NrgbaImage};
//!
//! let img = NrgbaImage::filled(3, 2, Nrgba::new(0x01, 0x23, 0x45, 0x67));
//! assert_eq!(img.width(), 3);
//! assert_eq!(img.pixel(2, 1), Nrgba::new(0x01, 0x23, 0x45, 0x67));
//! ```

use crate::{Error, Nrgba, Rect, Result};

/// Bytes per canonical pixel.
pub const NRGBA_BYTES: usize = 4;

/// Creates a `width` x `height` image filled with `color`.
///
/// Non-positive dimensions produce an empty image with a zero-size
/// rectangle instead of an error.
///
/// ```rust
/// use imago_core::{new_image, Nrgba};
///
/// assert!(new_image(0, 0, Nrgba::WHITE).is_empty());
/// assert!(new_image(-3, 2, Nrgba::WHITE).is_empty());
/// assert_eq!(new_image(2, 1, Nrgba::WHITE).pix(), &[0xff; 8]);
/// ```
pub fn new_image(width: i32, height: i32, color: Nrgba) -> NrgbaImage {
    if width <= 0 || height <= 0 {
        return NrgbaImage::default();
    }
    NrgbaImage::filled(width as u32, height as u32, color)
}

/// Owned 8-bit non-premultiplied RGBA image with origin-normalized geometry.
///
/// Instances come from [`clone_image`](crate::clone_image),
/// [`NrgbaImage::filled`] and the validating [`NrgbaImage::from_raw`].
/// There are no mutating accessors; the buffer is owned outright and never
/// aliases a source image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NrgbaImage {
    rect: Rect,
    stride: usize,
    pix: Vec<u8>,
}

impl NrgbaImage {
    /// Creates a transparent-black image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Nrgba::TRANSPARENT)
    }

    /// Creates an image where every pixel is `color`.
    ///
    /// Zero width or height produces an empty image.
    pub fn filled(width: u32, height: u32, color: Nrgba) -> Self {
        if width == 0 || height == 0 {
            return Self::default();
        }
        let count = width as usize * height as usize;
        let pix = color.to_array().repeat(count);
        Self {
            rect: Rect::from_size(width, height),
            stride: width as usize * NRGBA_BYTES,
            pix,
        }
    }

    /// Wraps a tightly packed RGBA buffer.
    ///
    /// # Errors
    ///
    /// [`Error::BufferTooSmall`] if `pix` is not exactly `width * height * 4`
    /// bytes long, [`Error::InvalidDimensions`] if that size overflows.
    pub fn from_raw(width: u32, height: u32, pix: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Ok(Self::default());
        }
        let required = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(NRGBA_BYTES))
            .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))?;
        if pix.len() != required {
            return Err(Error::buffer_too_small("pixel", required, pix.len()));
        }
        Ok(Self {
            rect: Rect::from_size(width, height),
            stride: width as usize * NRGBA_BYTES,
            pix,
        })
    }

    /// Builds an image from parts already laid out by the converter.
    pub(crate) fn from_parts(rect: Rect, stride: usize, pix: Vec<u8>) -> Self {
        debug_assert_eq!(rect.min, crate::Point::ZERO);
        debug_assert_eq!(pix.len(), stride * rect.height() as usize);
        Self { rect, stride, pix }
    }

    /// Image bounds; the minimum corner is always (0, 0).
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.height()
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw pixel bytes, `stride * height` long.
    #[inline]
    pub fn pix(&self) -> &[u8] {
        &self.pix
    }

    /// Consumes the image and returns its pixel buffer.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.pix
    }

    /// Returns `true` if the image has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pix.is_empty()
    }

    /// Returns one row of `width * 4` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.pix[start..start + self.width() as usize * NRGBA_BYTES]
    }

    /// Reads the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Nrgba {
        assert!(x < self.width() && y < self.height(), "pixel ({x}, {y}) out of bounds");
        let i = y as usize * self.stride + x as usize * NRGBA_BYTES;
        Nrgba::new(self.pix[i], self.pix[i + 1], self.pix[i + 2], self.pix[i + 3])
    }

    /// Returns `true` if every pixel has alpha 0xFF.
    pub fn is_opaque(&self) -> bool {
        (0..self.height()).all(|y| self.row(y).chunks_exact(NRGBA_BYTES).all(|px| px[3] == 0xff))
    }

    /// Packs the image into tight rows of three bytes per pixel,
    /// dropping alpha.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width() as usize * self.height() as usize * 3);
        for y in 0..self.height() {
            for px in self.row(y).chunks_exact(NRGBA_BYTES) {
                out.extend_from_slice(&px[..3]);
            }
        }
        out
    }

    /// Packs the image into tight rows of four bytes per pixel.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let row_len = self.width() as usize * NRGBA_BYTES;
        if self.stride == row_len {
            return self.pix.clone();
        }
        let mut out = Vec::with_capacity(row_len * self.height() as usize);
        for y in 0..self.height() {
            out.extend_from_slice(self.row(y));
        }
        out
    }
}
