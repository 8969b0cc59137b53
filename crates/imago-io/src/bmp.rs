//! BMP format support via the `image` crate.
//!
//! 24-bit files decode to an opaque `Nrgba` buffer, 32-bit files keep
//! their alpha, grayscale-palette files decode to `Gray`. Opaque images
//! are written as 24-bit, everything else as 32-bit.

use crate::{EncodeOptions, IoError, IoResult};
use image::codecs::bmp::BmpEncoder;
use image::{DynamicImage, ExtendedColorType, ImageFormat, ImageReader};
use imago_core::{NrgbaImage, PixelBuffer, Rect, SourceImage};
use std::io::Cursor;

/// Decodes a BMP stream.
pub fn decode(data: &[u8]) -> IoResult<SourceImage> {
    let img = ImageReader::with_format(Cursor::new(data), ImageFormat::Bmp)
        .decode()
        .map_err(|e| IoError::decode(e.to_string()))?;

    Ok(dynamic_to_source(img))
}

/// Converts a decoded image into the closest source layout.
fn dynamic_to_source(img: DynamicImage) -> SourceImage {
    let (width, height) = (img.width(), img.height());
    let rect = Rect::from_size(width, height);
    let w = width as usize;

    match img {
        DynamicImage::ImageRgb8(rgb) => {
            let mut pix = Vec::with_capacity(w * height as usize * 4);
            for px in rgb.into_raw().chunks_exact(3) {
                pix.extend_from_slice(&[px[0], px[1], px[2], 0xff]);
            }
            SourceImage::Nrgba(PixelBuffer::new(rect, w * 4, pix))
        }
        DynamicImage::ImageLuma8(gray) => SourceImage::Gray(PixelBuffer::new(rect, w, gray.into_raw())),
        DynamicImage::ImageRgba8(rgba) => SourceImage::Nrgba(PixelBuffer::new(rect, w * 4, rgba.into_raw())),
        other => {
            // Convert to RGBA8 for other layouts
            SourceImage::Nrgba(PixelBuffer::new(rect, w * 4, other.to_rgba8().into_raw()))
        }
    }
}

/// Encodes a canonical image as BMP.
pub fn encode(img: &NrgbaImage, _opts: &EncodeOptions) -> IoResult<Vec<u8>> {
    let (data, color) = if img.is_opaque() {
        (img.to_rgb_bytes(), ExtendedColorType::Rgb8)
    } else {
        (img.to_rgba_bytes(), ExtendedColorType::Rgba8)
    };

    let mut out = Cursor::new(Vec::new());
    BmpEncoder::new(&mut out)
        .encode(&data, img.width(), img.height(), color)
        .map_err(|e| IoError::encode(e.to_string()))?;
    Ok(out.into_inner())
}
