//! Source pixel representations handed out by decoders.
//!
//! A decoder returns whichever layout its format stores natively; nothing
//! is canonicalized at load time. [`SourceImage`] is the closed set of
//! layouts that [`clone_image`](crate::clone_image) knows how to
//! normalize.
//!
//! Every variant carries its own rectangle and stride(s). Neither is
//! assumed to match canonical geometry: the rectangle may start anywhere
//! (including negative coordinates) and rows may be padded.
//!
//! 16-bit samples are stored as big-endian byte pairs.

use crate::{Error, NrgbaImage, Point, Rect, Result, Rgba};
use std::fmt;

/// Interleaved pixel storage shared by the packed variants of
/// [`SourceImage`].
///
/// Pixel (x, y) starts at byte `(y - min.y) * stride + (x - min.x) * bpp`,
/// where `bpp` depends on the variant holding the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    /// Bounds of the pixel data
    pub rect: Rect,
    /// Bytes between the starts of consecutive rows
    pub stride: usize,
    /// Pixel bytes
    pub pix: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a buffer from its parts.
    pub fn new(rect: Rect, stride: usize, pix: Vec<u8>) -> Self {
        Self { rect, stride, pix }
    }

    /// Allocates a zeroed, tightly packed buffer.
    pub fn zeroed(rect: Rect, bytes_per_pixel: usize) -> Self {
        let stride = rect.width() as usize * bytes_per_pixel;
        Self {
            rect,
            stride,
            pix: vec![0; stride * rect.height() as usize],
        }
    }

    /// Byte offset of the pixel at (x, y) in image coordinates.
    #[inline]
    pub fn offset(&self, x: i32, y: i32, bytes_per_pixel: usize) -> usize {
        (y - self.rect.min.y) as usize * self.stride + (x - self.rect.min.x) as usize * bytes_per_pixel
    }

    fn validate(&self, bytes_per_pixel: usize) -> Result<()> {
        check_plane("pixel", self.rect, self.stride, bytes_per_pixel, self.pix.len())
    }
}

/// Checks that a plane covering `rect` fits in `len` bytes.
fn check_plane(
    plane: &'static str,
    rect: Rect,
    stride: usize,
    bytes_per_pixel: usize,
    len: usize,
) -> Result<()> {
    if rect.is_empty() {
        return Ok(());
    }
    let row = rect.width() as usize * bytes_per_pixel;
    if stride < row {
        return Err(Error::invalid_stride(stride, row, rect.width()));
    }
    let required = (rect.height() as usize - 1) * stride + row;
    if len < required {
        return Err(Error::buffer_too_small(plane, required, len));
    }
    Ok(())
}

/// Chroma subsampling ratio of a [`YCbCrImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Subsampling {
    /// Full-resolution chroma.
    #[default]
    Ratio444,
    /// Half horizontal chroma resolution.
    Ratio422,
    /// Half horizontal and half vertical chroma resolution.
    Ratio420,
    /// Half vertical chroma resolution.
    Ratio440,
}

impl Subsampling {
    /// Horizontal and vertical chroma subsampling factors.
    #[inline]
    pub const fn factors(self) -> (i32, i32) {
        match self {
            Subsampling::Ratio444 => (1, 1),
            Subsampling::Ratio422 => (2, 1),
            Subsampling::Ratio420 => (2, 2),
            Subsampling::Ratio440 => (1, 2),
        }
    }
}

impl fmt::Display for Subsampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Subsampling::Ratio444 => "4:4:4",
            Subsampling::Ratio422 => "4:2:2",
            Subsampling::Ratio420 => "4:2:0",
            Subsampling::Ratio440 => "4:4:0",
        };
        f.write_str(s)
    }
}

/// Planar luma/chroma image with subsampled chroma.
///
/// Each plane is 8-bit. The chroma planes share `c_stride`; their sample
/// for pixel (x, y) is found by integer-dividing the coordinates by the
/// subsampling factors (see [`YCbCrImage::c_offset`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YCbCrImage {
    /// Bounds of the luma plane
    pub rect: Rect,
    /// Chroma subsampling ratio
    pub ratio: Subsampling,
    /// Luma row stride
    pub y_stride: usize,
    /// Chroma row stride
    pub c_stride: usize,
    /// Luma plane
    pub y: Vec<u8>,
    /// Blue-difference plane
    pub cb: Vec<u8>,
    /// Red-difference plane
    pub cr: Vec<u8>,
}

impl YCbCrImage {
    /// Allocates zeroed planes sized for `rect` and `ratio`.
    pub fn new(rect: Rect, ratio: Subsampling) -> Self {
        let (cw, ch) = chroma_size(rect, ratio);
        let w = rect.width() as usize;
        let h = rect.height() as usize;
        Self {
            rect,
            ratio,
            y_stride: w,
            c_stride: cw,
            y: vec![0; w * h],
            cb: vec![0; cw * ch],
            cr: vec![0; cw * ch],
        }
    }

    /// Luma offset of the pixel at (x, y).
    #[inline]
    pub fn y_offset(&self, x: i32, y: i32) -> usize {
        (y - self.rect.min.y) as usize * self.y_stride + (x - self.rect.min.x) as usize
    }

    /// Chroma offset of the pixel at (x, y).
    #[inline]
    pub fn c_offset(&self, x: i32, y: i32) -> usize {
        let (fx, fy) = self.ratio.factors();
        let Point { x: x0, y: y0 } = self.rect.min;
        (y / fy - y0 / fy) as usize * self.c_stride + (x / fx - x0 / fx) as usize
    }

    fn validate(&self) -> Result<()> {
        if self.rect.is_empty() {
            return Ok(());
        }
        check_plane("Y", self.rect, self.y_stride, 1, self.y.len())?;
        let (cw, _) = chroma_size(self.rect, self.ratio);
        if self.c_stride < cw {
            return Err(Error::invalid_stride(self.c_stride, cw, self.rect.width()));
        }
        let required = self.c_offset(self.rect.max.x - 1, self.rect.max.y - 1) + 1;
        if self.cb.len() < required {
            return Err(Error::buffer_too_small("Cb", required, self.cb.len()));
        }
        if self.cr.len() < required {
            return Err(Error::buffer_too_small("Cr", required, self.cr.len()));
        }
        Ok(())
    }
}

/// Chroma plane width and height for a luma rectangle.
fn chroma_size(rect: Rect, ratio: Subsampling) -> (usize, usize) {
    if rect.is_empty() {
        return (0, 0);
    }
    let half_x = ((rect.max.x + 1) / 2 - rect.min.x / 2) as usize;
    let half_y = ((rect.max.y + 1) / 2 - rect.min.y / 2) as usize;
    let (w, h) = (rect.width() as usize, rect.height() as usize);
    match ratio {
        Subsampling::Ratio444 => (w, h),
        Subsampling::Ratio422 => (half_x, h),
        Subsampling::Ratio420 => (half_x, half_y),
        Subsampling::Ratio440 => (w, half_y),
    }
}

/// Palette-indexed image: one byte per pixel indexing `palette`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PalettedImage {
    /// Bounds of the index data
    pub rect: Rect,
    /// Bytes between the starts of consecutive rows
    pub stride: usize,
    /// Palette indices
    pub pix: Vec<u8>,
    /// Color table, premultiplied
    pub palette: Vec<Rgba>,
}

impl PalettedImage {
    /// Byte offset of the pixel at (x, y).
    #[inline]
    pub fn offset(&self, x: i32, y: i32) -> usize {
        (y - self.rect.min.y) as usize * self.stride + (x - self.rect.min.x) as usize
    }
}

/// Any pixel layout a decoder may produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceImage {
    /// Premultiplied RGBA, 8 bits per channel.
    Rgba(PixelBuffer),
    /// Premultiplied RGBA, 16 bits per channel.
    Rgba64(PixelBuffer),
    /// Non-premultiplied RGBA, 8 bits per channel.
    Nrgba(PixelBuffer),
    /// Non-premultiplied RGBA, 16 bits per channel.
    Nrgba64(PixelBuffer),
    /// 8-bit grayscale.
    Gray(PixelBuffer),
    /// 16-bit grayscale.
    Gray16(PixelBuffer),
    /// 8-bit alpha mask.
    Alpha(PixelBuffer),
    /// 16-bit alpha mask.
    Alpha16(PixelBuffer),
    /// CMYK, 8 bits per channel.
    Cmyk(PixelBuffer),
    /// Luma/chroma planes.
    YCbCr(YCbCrImage),
    /// Palette indices.
    Paletted(PalettedImage),
}

impl SourceImage {
    /// Bounds of the image in its own coordinates.
    pub fn rect(&self) -> Rect {
        match self {
            SourceImage::Rgba(b)
            | SourceImage::Rgba64(b)
            | SourceImage::Nrgba(b)
            | SourceImage::Nrgba64(b)
            | SourceImage::Gray(b)
            | SourceImage::Gray16(b)
            | SourceImage::Alpha(b)
            | SourceImage::Alpha16(b)
            | SourceImage::Cmyk(b) => b.rect,
            SourceImage::YCbCr(img) => img.rect,
            SourceImage::Paletted(img) => img.rect,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.rect().width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.rect().height()
    }

    /// Short name of the color model, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceImage::Rgba(_) => "RGBA",
            SourceImage::Rgba64(_) => "RGBA64",
            SourceImage::Nrgba(_) => "NRGBA",
            SourceImage::Nrgba64(_) => "NRGBA64",
            SourceImage::Gray(_) => "Gray",
            SourceImage::Gray16(_) => "Gray16",
            SourceImage::Alpha(_) => "Alpha",
            SourceImage::Alpha16(_) => "Alpha16",
            SourceImage::Cmyk(_) => "CMYK",
            SourceImage::YCbCr(_) => "YCbCr",
            SourceImage::Paletted(_) => "Paletted",
        }
    }

    /// Bytes per pixel of the interleaved variants, `None` for planar and
    /// paletted layouts.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            SourceImage::Gray(_) | SourceImage::Alpha(_) => Some(1),
            SourceImage::Gray16(_) | SourceImage::Alpha16(_) => Some(2),
            SourceImage::Rgba(_) | SourceImage::Nrgba(_) | SourceImage::Cmyk(_) => Some(4),
            SourceImage::Rgba64(_) | SourceImage::Nrgba64(_) => Some(8),
            SourceImage::YCbCr(_) | SourceImage::Paletted(_) => None,
        }
    }

    /// Checks that every buffer is large enough for the declared geometry.
    ///
    /// [`clone_image`](crate::clone_image) assumes a valid image and panics
    /// on short buffers; call this first for data from untrusted callers.
    pub fn validate(&self) -> Result<()> {
        match self {
            SourceImage::YCbCr(img) => img.validate(),
            SourceImage::Paletted(img) => {
                check_plane("pixel", img.rect, img.stride, 1, img.pix.len())
            }
            SourceImage::Rgba(b)
            | SourceImage::Rgba64(b)
            | SourceImage::Nrgba(b)
            | SourceImage::Nrgba64(b)
            | SourceImage::Gray(b)
            | SourceImage::Gray16(b)
            | SourceImage::Alpha(b)
            | SourceImage::Alpha16(b)
            | SourceImage::Cmyk(b) => {
                // interleaved variants always report a size
                b.validate(self.bytes_per_pixel().unwrap_or(1))
            }
        }
    }
}

impl From<NrgbaImage> for SourceImage {
    fn from(img: NrgbaImage) -> Self {
        let rect = img.rect();
        let stride = img.stride();
        SourceImage::Nrgba(PixelBuffer::new(rect, stride, img.into_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_offset() {
        let buf = PixelBuffer::new(Rect::new(-1, -1, 1, 1), 8, vec![0; 16]);
        assert_eq!(buf.offset(-1, -1, 4), 0);
        assert_eq!(buf.offset(0, -1, 4), 4);
        assert_eq!(buf.offset(-1, 0, 4), 8);
    }

    #[test]
    fn test_c_offset_ratios() {
        let rect = Rect::from_size(4, 4);
        let img = YCbCrImage::new(rect, Subsampling::Ratio420);
        assert_eq!(img.c_stride, 2);
        assert_eq!(img.c_offset(3, 3), 3);
        assert_eq!(img.c_offset(1, 2), 2);

        let img = YCbCrImage::new(rect, Subsampling::Ratio440);
        assert_eq!(img.c_stride, 4);
        assert_eq!(img.cb.len(), 8);
        assert_eq!(img.c_offset(3, 3), 7);

        let img = YCbCrImage::new(rect, Subsampling::Ratio422);
        assert_eq!(img.cb.len(), 8);
        assert_eq!(img.c_offset(3, 3), 7);
    }

    #[test]
    fn test_chroma_size_odd_origin() {
        let (cw, ch) = chroma_size(Rect::new(-1, -1, 2, 2), Subsampling::Ratio420);
        // columns -1 and 0 share index 0, 1 maps to 0 as well; 2 rows likewise
        assert_eq!((cw, ch), (1, 1));
    }

    #[test]
    fn test_validate_short_buffer() {
        let img = SourceImage::Gray16(PixelBuffer::new(Rect::from_size(2, 2), 4, vec![0; 7]));
        assert_eq!(img.validate(), Err(Error::buffer_too_small("pixel", 8, 7)));
    }

    #[test]
    fn test_validate_stride() {
        let img = SourceImage::Nrgba(PixelBuffer::new(Rect::from_size(2, 1), 4, vec![0; 8]));
        assert!(matches!(img.validate(), Err(Error::InvalidStride { .. })));
    }

    #[test]
    fn test_validate_ycbcr() {
        let mut img = YCbCrImage::new(Rect::from_size(4, 4), Subsampling::Ratio420);
        assert!(SourceImage::YCbCr(img.clone()).validate().is_ok());
        img.cr.truncate(3);
        assert_eq!(
            SourceImage::YCbCr(img).validate(),
            Err(Error::buffer_too_small("Cr", 4, 3))
        );
    }

    #[test]
    fn test_from_nrgba_image() {
        let img = NrgbaImage::filled(2, 1, crate::Nrgba::WHITE);
        let src = SourceImage::from(img);
        assert_eq!(src.kind(), "NRGBA");
        assert_eq!(src.rect(), Rect::from_size(2, 1));
        assert!(src.validate().is_ok());
    }
}
