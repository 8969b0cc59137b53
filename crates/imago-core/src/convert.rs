//! Conversion of any [`SourceImage`] into the canonical [`NrgbaImage`].
//!
//! One rule per color model:
//!
//! | Source | Rule |
//! |--------|------|
//! | RGBA / RGBA64 | unpremultiply, 16-bit keeps the high byte |
//! | NRGBA | row copy |
//! | NRGBA64 | high byte of each channel |
//! | Gray / Gray16 | replicate into RGB, opaque |
//! | Alpha / Alpha16 | white, alpha from source |
//! | CMYK | subtractive mix, opaque |
//! | YCbCr | fixed-point matrix, opaque |
//! | Paletted | palette lookup, unpremultiplied |
//!
//! Output pixel (x, y) reads the source pixel at
//! `(x + rect.min.x, y + rect.min.y)`, so the result always starts at the
//! origin.

use crate::color::{unpremultiply16, unpremultiply8};
use crate::image::NRGBA_BYTES;
use crate::{NrgbaImage, PixelBuffer, Rect, SourceImage};
use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

/// Converts a source image into a freshly allocated canonical image.
///
/// The result never aliases `src`. A zero-area source yields an empty image
/// at the origin.
///
/// # Panics
///
/// Panics if a buffer of `src` is shorter than its geometry requires; see
/// [`SourceImage::validate`].
///
/// # Example
///
/// ```rust
/// use imago_core::{clone_image, Nrgba, PixelBuffer, Rect, SourceImage};
///
/// let gray = SourceImage::Gray(PixelBuffer::new(Rect::new(-1, -1, 0, 1), 1, vec![0x11, 0xee]));
/// let img = clone_image(&gray);
/// assert_eq!(img.rect(), Rect::from_size(1, 2));
/// assert_eq!(img.pixel(0, 1), Nrgba::new(0xee, 0xee, 0xee, 0xff));
/// ```
pub fn clone_image(src: &SourceImage) -> NrgbaImage {
    let rect = src.rect();
    trace!(kind = src.kind(), width = rect.width(), height = rect.height(), "clone_image");

    if rect.is_empty() {
        return NrgbaImage::default();
    }

    let stride = rect.width() as usize * NRGBA_BYTES;
    let mut pix = vec![0u8; stride * rect.height() as usize];

    match src {
        SourceImage::Nrgba(b) => copy_rows(b, rect, stride, &mut pix),
        SourceImage::Rgba(b) => fill(rect, stride, &mut pix, |x, y, d| {
            let i = b.offset(x, y, 4);
            let s = &b.pix[i..i + 4];
            let a = s[3];
            d[0] = unpremultiply8(s[0], a);
            d[1] = unpremultiply8(s[1], a);
            d[2] = unpremultiply8(s[2], a);
            d[3] = a;
        }),
        SourceImage::Rgba64(b) => fill(rect, stride, &mut pix, |x, y, d| {
            let i = b.offset(x, y, 8);
            let s = &b.pix[i..i + 8];
            let a = BigEndian::read_u16(&s[6..8]);
            d[0] = unpremultiply16(BigEndian::read_u16(&s[0..2]), a);
            d[1] = unpremultiply16(BigEndian::read_u16(&s[2..4]), a);
            d[2] = unpremultiply16(BigEndian::read_u16(&s[4..6]), a);
            d[3] = s[6];
        }),
        SourceImage::Nrgba64(b) => fill(rect, stride, &mut pix, |x, y, d| {
            let i = b.offset(x, y, 8);
            let s = &b.pix[i..i + 8];
            d.copy_from_slice(&[s[0], s[2], s[4], s[6]]);
        }),
        SourceImage::Gray(b) => fill(rect, stride, &mut pix, |x, y, d| {
            let g = b.pix[b.offset(x, y, 1)];
            d.copy_from_slice(&[g, g, g, 0xff]);
        }),
        SourceImage::Gray16(b) => fill(rect, stride, &mut pix, |x, y, d| {
            let g = b.pix[b.offset(x, y, 2)];
            d.copy_from_slice(&[g, g, g, 0xff]);
        }),
        SourceImage::Alpha(b) => fill(rect, stride, &mut pix, |x, y, d| {
            let a = b.pix[b.offset(x, y, 1)];
            d.copy_from_slice(&[0xff, 0xff, 0xff, a]);
        }),
        SourceImage::Alpha16(b) => fill(rect, stride, &mut pix, |x, y, d| {
            let a = b.pix[b.offset(x, y, 2)];
            d.copy_from_slice(&[0xff, 0xff, 0xff, a]);
        }),
        SourceImage::Cmyk(b) => fill(rect, stride, &mut pix, |x, y, d| {
            let i = b.offset(x, y, 4);
            let s = &b.pix[i..i + 4];
            let [r, g, bl] = cmyk_to_rgb(s[0], s[1], s[2], s[3]);
            d.copy_from_slice(&[r, g, bl, 0xff]);
        }),
        SourceImage::YCbCr(img) => fill(rect, stride, &mut pix, |x, y, d| {
            let yy = img.y[img.y_offset(x, y)];
            let ci = img.c_offset(x, y);
            let [r, g, bl] = ycbcr_to_rgb(yy, img.cb[ci], img.cr[ci]);
            d.copy_from_slice(&[r, g, bl, 0xff]);
        }),
        SourceImage::Paletted(img) => {
            let palette: Vec<[u8; 4]> = img
                .palette
                .iter()
                .map(|&c| crate::Nrgba::from(c).to_array())
                .collect();
            fill(rect, stride, &mut pix, |x, y, d| {
                let index = img.pix[img.offset(x, y)] as usize;
                // out-of-range indices stay transparent black
                if let Some(c) = palette.get(index) {
                    d.copy_from_slice(c);
                }
            })
        }
    }

    NrgbaImage::from_parts(rect.at_origin(), stride, pix)
}

/// Visits every destination pixel with its source coordinates.
fn fill<F>(rect: Rect, stride: usize, pix: &mut [u8], mut f: F)
where
    F: FnMut(i32, i32, &mut [u8]),
{
    for (row, y) in pix.chunks_exact_mut(stride).zip(rect.min.y..rect.max.y) {
        for (d, x) in row.chunks_exact_mut(NRGBA_BYTES).zip(rect.min.x..rect.max.x) {
            f(x, y, d);
        }
    }
}

/// Copies already-canonical rows, dropping any row padding.
fn copy_rows(b: &PixelBuffer, rect: Rect, stride: usize, pix: &mut [u8]) {
    for (row, y) in pix.chunks_exact_mut(stride).zip(rect.min.y..rect.max.y) {
        let i = b.offset(rect.min.x, y, NRGBA_BYTES);
        row.copy_from_slice(&b.pix[i..i + stride]);
    }
}

/// Converts one Y'CbCr sample to RGB.
///
/// JFIF full-range coefficients in 16.16 fixed point:
///
/// ```text
/// R = Y + 1.40200 * (Cr - 128)
/// G = Y - 0.34414 * (Cb - 128) - 0.71414 * (Cr - 128)
/// B = Y + 1.77200 * (Cb - 128)
/// ```
///
/// Scaling Y by `0x10101` instead of `0x10000` folds the rounding bias into
/// the luma term. Each sum is clamped to `[0, 0xFFFFFF]` before the shift.
///
/// ```
/// use imago_core::ycbcr_to_rgb;
///
/// assert_eq!(ycbcr_to_rgb(0x7f, 0x80, 0x80), [0x7f, 0x7f, 0x7f]);
/// assert_eq!(ycbcr_to_rgb(0x4b, 0x56, 0x4b), [0x00, 0x7f, 0x00]);
/// ```
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let yy = y as i32 * 0x10101;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;

    let r = yy + 91881 * cr;
    let g = yy - 22554 * cb - 46802 * cr;
    let b = yy + 116130 * cb;

    [clamp_fixed(r), clamp_fixed(g), clamp_fixed(b)]
}

#[inline]
fn clamp_fixed(v: i32) -> u8 {
    (v.clamp(0, 0xff_ffff) >> 16) as u8
}

/// Converts one CMYK sample to RGB.
///
/// ```
/// use imago_core::cmyk_to_rgb;
///
/// assert_eq!(cmyk_to_rgb(0, 0, 0, 0), [0xff, 0xff, 0xff]);
/// assert_eq!(cmyk_to_rgb(0xff, 0, 0, 0), [0x00, 0xff, 0xff]);
/// assert_eq!(cmyk_to_rgb(0, 0, 0, 0xff), [0x00, 0x00, 0x00]);
/// ```
#[inline]
pub fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let w = 0xffff - k as u32 * 0x101;
    let mix = |v: u8| (((0xffff - v as u32 * 0x101) * w / 0xffff) >> 8) as u8;
    [mix(c), mix(m), mix(y)]
}
