//! PNG format support.
//!
//! Decoding expands palettes, low bit depths and `tRNS` chunks, then maps
//! the result onto the closest source layout:
//!
//! | PNG | Source |
//! |-----|--------|
//! | Gray 8 / 16 | `Gray` / `Gray16` |
//! | Gray+alpha, RGB, RGBA, 8-bit | `Nrgba` |
//! | Gray+alpha, RGB, RGBA, 16-bit | `Nrgba64` |
//!
//! Encoding writes RGB when the image is opaque and RGBA otherwise.

use crate::{EncodeOptions, IoError, IoResult, PngCompression};
use imago_core::{NrgbaImage, PixelBuffer, Rect, SourceImage};
use std::io::Cursor;

/// Decodes a PNG stream.
pub fn decode(data: &[u8]) -> IoResult<SourceImage> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::decode(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::decode("cannot determine output buffer size"))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::decode(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let rect = Rect::from_size(info.width, info.height);
    let stride = info.line_size;

    let img = match (info.color_type, info.bit_depth) {
        (png::ColorType::Grayscale, png::BitDepth::Eight) => {
            SourceImage::Gray(PixelBuffer::new(rect, stride, buf))
        }
        (png::ColorType::Grayscale, png::BitDepth::Sixteen) => {
            SourceImage::Gray16(PixelBuffer::new(rect, stride, buf))
        }
        (png::ColorType::Rgba, png::BitDepth::Eight) => {
            SourceImage::Nrgba(PixelBuffer::new(rect, stride, buf))
        }
        (png::ColorType::Rgba, png::BitDepth::Sixteen) => {
            SourceImage::Nrgba64(PixelBuffer::new(rect, stride, buf))
        }
        (png::ColorType::Rgb, png::BitDepth::Eight) => {
            SourceImage::Nrgba(expand(rect, stride, &buf, (3, 4), |s, d| {
                d[..3].copy_from_slice(&s[..3]);
                d[3] = 0xff;
            }))
        }
        (png::ColorType::Rgb, png::BitDepth::Sixteen) => {
            SourceImage::Nrgba64(expand(rect, stride, &buf, (6, 8), |s, d| {
                d[..6].copy_from_slice(&s[..6]);
                d[6..8].copy_from_slice(&[0xff, 0xff]);
            }))
        }
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => {
            SourceImage::Nrgba(expand(rect, stride, &buf, (2, 4), |s, d| {
                d.copy_from_slice(&[s[0], s[0], s[0], s[1]]);
            }))
        }
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Sixteen) => {
            SourceImage::Nrgba64(expand(rect, stride, &buf, (4, 8), |s, d| {
                d.copy_from_slice(&[s[0], s[1], s[0], s[1], s[0], s[1], s[2], s[3]]);
            }))
        }
        (ct, bd) => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "PNG {:?} {:?}",
                ct, bd
            )));
        }
    };

    tracing::trace!(kind = img.kind(), width = info.width, height = info.height, "decoded PNG");
    Ok(img)
}

/// Re-packs rows of `bpp_in`-byte pixels into tight `bpp_out`-byte pixels.
fn expand(
    rect: Rect,
    stride: usize,
    src: &[u8],
    (bpp_in, bpp_out): (usize, usize),
    px: impl Fn(&[u8], &mut [u8]),
) -> PixelBuffer {
    let mut out = PixelBuffer::zeroed(rect, bpp_out);
    let row_in = rect.width() as usize * bpp_in;
    for (src_row, dst_row) in src.chunks(stride).zip(out.pix.chunks_exact_mut(out.stride)) {
        for (s, d) in src_row[..row_in]
            .chunks_exact(bpp_in)
            .zip(dst_row.chunks_exact_mut(bpp_out))
        {
            px(s, d);
        }
    }
    out
}

/// Encodes a canonical image as PNG.
pub fn encode(img: &NrgbaImage, opts: &EncodeOptions) -> IoResult<Vec<u8>> {
    let (color_type, data) = if img.is_opaque() {
        (png::ColorType::Rgb, img.to_rgb_bytes())
    } else {
        (png::ColorType::Rgba, img.to_rgba_bytes())
    };

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, img.width(), img.height());
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(compression(opts.png_compression()));

        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::encode(e.to_string()))?;
        writer
            .write_image_data(&data)
            .map_err(|e| IoError::encode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| IoError::encode(e.to_string()))?;
    }
    Ok(out)
}

fn compression(c: PngCompression) -> png::Compression {
    match c {
        PngCompression::Default => png::Compression::Balanced,
        PngCompression::Fast => png::Compression::Fast,
        PngCompression::Best => png::Compression::High,
        PngCompression::None => png::Compression::NoCompression,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imago_core::{clone_image, Nrgba};

    fn gradient(w: u32, h: u32, alpha: bool) -> NrgbaImage {
        let mut pix = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let a = if alpha { (x * 40 + y) as u8 } else { 0xff };
                pix.extend_from_slice(&[(x * 30) as u8, (y * 50) as u8, 0x80, a]);
            }
        }
        NrgbaImage::from_raw(w, h, pix).unwrap()
    }

    #[test]
    fn test_roundtrip_rgb() {
        let img = gradient(5, 3, false);
        let bytes = encode(&img, &EncodeOptions::default()).unwrap();
        let src = decode(&bytes).unwrap();
        assert_eq!(src.kind(), "NRGBA");
        assert_eq!(clone_image(&src), img);
    }

    #[test]
    fn test_roundtrip_rgba() {
        let img = gradient(4, 4, true);
        for c in [PngCompression::None, PngCompression::Fast, PngCompression::Best] {
            let opts = EncodeOptions::new().with_png_compression(c);
            let bytes = encode(&img, &opts).unwrap();
            assert_eq!(clone_image(&decode(&bytes).unwrap()), img, "{c:?}");
        }
    }

    #[test]
    fn test_decode_gray16() {
        let mut out = Vec::new();
        {
            let mut enc = png::Encoder::new(&mut out, 2, 1);
            enc.set_color(png::ColorType::Grayscale);
            enc.set_depth(png::BitDepth::Sixteen);
            let mut w = enc.write_header().unwrap();
            w.write_image_data(&[0x12, 0x34, 0xab, 0xcd]).unwrap();
            w.finish().unwrap();
        }
        let src = decode(&out).unwrap();
        assert_eq!(src.kind(), "Gray16");
        let img = clone_image(&src);
        assert_eq!(img.pixel(0, 0), Nrgba::new(0x12, 0x12, 0x12, 0xff));
        assert_eq!(img.pixel(1, 0), Nrgba::new(0xab, 0xab, 0xab, 0xff));
    }

    #[test]
    fn test_decode_gray_alpha() {
        let mut out = Vec::new();
        {
            let mut enc = png::Encoder::new(&mut out, 1, 2);
            enc.set_color(png::ColorType::GrayscaleAlpha);
            enc.set_depth(png::BitDepth::Eight);
            let mut w = enc.write_header().unwrap();
            w.write_image_data(&[0x40, 0x80, 0xc0, 0xff]).unwrap();
            w.finish().unwrap();
        }
        let img = clone_image(&decode(&out).unwrap());
        assert_eq!(img.pix(), &[0x40, 0x40, 0x40, 0x80, 0xc0, 0xc0, 0xc0, 0xff]);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode(b"bad data"), Err(IoError::DecodeError(_))));
    }
}
