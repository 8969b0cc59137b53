//! JPEG format support.
//!
//! Decoding keeps the decoder's native layout: 8-bit color becomes an
//! opaque `Nrgba` buffer, grayscale becomes `Gray` or `Gray16`, and
//! four-component files become `Cmyk`. Encoding always writes 8-bit RGB;
//! alpha is dropped.

use crate::{EncodeOptions, IoError, IoResult};
use imago_core::{NrgbaImage, PixelBuffer, Rect, SourceImage};
use jpeg_encoder::{ColorType as JpegColorType, Encoder, SamplingFactor};

/// Decodes a JPEG stream.
pub fn decode(data: &[u8]) -> IoResult<SourceImage> {
    let mut decoder = jpeg_decoder::Decoder::new(data);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::decode(e.to_string()))?;

    let info = decoder
        .info()
        .ok_or_else(|| IoError::decode("missing JPEG info"))?;

    let width = info.width as u32;
    let height = info.height as u32;
    let rect = Rect::from_size(width, height);
    let w = width as usize;

    let img = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => {
            let mut pix = Vec::with_capacity(w * height as usize * 4);
            for rgb in pixels.chunks_exact(3) {
                pix.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 0xff]);
            }
            SourceImage::Nrgba(PixelBuffer::new(rect, w * 4, pix))
        }
        jpeg_decoder::PixelFormat::L8 => SourceImage::Gray(PixelBuffer::new(rect, w, pixels)),
        // high byte first
        jpeg_decoder::PixelFormat::L16 => SourceImage::Gray16(PixelBuffer::new(rect, w * 2, pixels)),
        jpeg_decoder::PixelFormat::CMYK32 => SourceImage::Cmyk(PixelBuffer::new(rect, w * 4, pixels)),
    };

    tracing::trace!(kind = img.kind(), width, height, "decoded JPEG");
    Ok(img)
}

/// Encodes a canonical image as baseline JPEG without chroma subsampling.
pub fn encode(img: &NrgbaImage, opts: &EncodeOptions) -> IoResult<Vec<u8>> {
    let width = u16::try_from(img.width())
        .map_err(|_| IoError::encode(format!("width {} exceeds JPEG limit", img.width())))?;
    let height = u16::try_from(img.height())
        .map_err(|_| IoError::encode(format!("height {} exceeds JPEG limit", img.height())))?;

    let data = img.to_rgb_bytes();
    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, opts.jpeg_quality());
    // chroma at full resolution
    encoder.set_sampling_factor(SamplingFactor::R_4_4_4);
    encoder
        .encode(&data, width, height, JpegColorType::Rgb)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::encode(e.to_string()))?;

    Ok(buffer)
}
