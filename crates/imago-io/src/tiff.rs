//! TIFF format support.
//!
//! Reads the first directory of 8- and 16-bit gray, gray+alpha, RGB, RGBA
//! and CMYK files. 16-bit samples are kept at full precision in the source
//! image; conversion to the canonical image drops the low byte.
//!
//! Writes 8-bit RGB for opaque images and 8-bit RGBA otherwise, with LZW or
//! no compression.

use crate::{EncodeOptions, IoError, IoResult, TiffCompression};
use byteorder::{BigEndian, ByteOrder};
use imago_core::{NrgbaImage, PixelBuffer, Rect, SourceImage};
use std::io::Cursor;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, Compression, TiffEncoder};
use tiff::ColorType;

/// Decodes a TIFF stream.
pub fn decode(data: &[u8]) -> IoResult<SourceImage> {
    let mut decoder = Decoder::new(Cursor::new(data))
        .map_err(|e: tiff::TiffError| IoError::decode(e.to_string()))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e: tiff::TiffError| IoError::decode(e.to_string()))?;
    let color_type = decoder
        .colortype()
        .map_err(|e: tiff::TiffError| IoError::decode(e.to_string()))?;
    let result = decoder
        .read_image()
        .map_err(|e: tiff::TiffError| IoError::decode(e.to_string()))?;

    let rect = Rect::from_size(width, height);
    let w = width as usize;

    let img = match (color_type, result) {
        (ColorType::Gray(8), DecodingResult::U8(buf)) => {
            SourceImage::Gray(PixelBuffer::new(rect, w, buf))
        }
        (ColorType::Gray(16), DecodingResult::U16(buf)) => {
            SourceImage::Gray16(PixelBuffer::new(rect, w * 2, be_bytes(&buf)))
        }
        (ColorType::GrayA(8), DecodingResult::U8(buf)) => {
            let pix = buf.chunks_exact(2).flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]]).collect();
            SourceImage::Nrgba(PixelBuffer::new(rect, w * 4, pix))
        }
        (ColorType::RGB(8), DecodingResult::U8(buf)) => {
            let pix = buf.chunks_exact(3).flat_map(|c| [c[0], c[1], c[2], 0xff]).collect();
            SourceImage::Nrgba(PixelBuffer::new(rect, w * 4, pix))
        }
        (ColorType::RGBA(8), DecodingResult::U8(buf)) => {
            SourceImage::Nrgba(PixelBuffer::new(rect, w * 4, buf))
        }
        (ColorType::RGB(16), DecodingResult::U16(buf)) => {
            let rgba: Vec<u16> = buf.chunks_exact(3).flat_map(|c| [c[0], c[1], c[2], 0xffff]).collect();
            SourceImage::Nrgba64(PixelBuffer::new(rect, w * 8, be_bytes(&rgba)))
        }
        (ColorType::RGBA(16), DecodingResult::U16(buf)) => {
            SourceImage::Nrgba64(PixelBuffer::new(rect, w * 8, be_bytes(&buf)))
        }
        (ColorType::CMYK(8), DecodingResult::U8(buf)) => {
            SourceImage::Cmyk(PixelBuffer::new(rect, w * 4, buf))
        }
        (ct, _) => {
            return Err(IoError::UnsupportedBitDepth(format!("TIFF {:?}", ct)));
        }
    };

    tracing::trace!(kind = img.kind(), width, height, "decoded TIFF");
    Ok(img)
}

fn be_bytes(samples: &[u16]) -> Vec<u8> {
    let mut out = vec![0u8; samples.len() * 2];
    BigEndian::write_u16_into(samples, &mut out);
    out
}

/// Encodes a canonical image as TIFF.
pub fn encode(img: &NrgbaImage, opts: &EncodeOptions) -> IoResult<Vec<u8>> {
    let compression = match opts.tiff_compression() {
        TiffCompression::Lzw => Compression::Lzw,
        TiffCompression::None => Compression::Uncompressed,
    };

    let mut out = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut out)
            .map_err(|e| IoError::encode(e.to_string()))?
            .with_compression(compression);
        let (w, h) = (img.width(), img.height());

        let result = if img.is_opaque() {
            encoder.write_image::<colortype::RGB8>(w, h, &img.to_rgb_bytes())
        } else {
            encoder.write_image::<colortype::RGBA8>(w, h, &img.to_rgba_bytes())
        };
        result.map_err(|e| IoError::encode(e.to_string()))?;
    }
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imago_core::{clone_image, Nrgba};

    fn sample(alpha: u8) -> NrgbaImage {
        let mut pix = Vec::new();
        for i in 0..12u8 {
            pix.extend_from_slice(&[i * 20, 255 - i * 20, i, alpha]);
        }
        NrgbaImage::from_raw(4, 3, pix).unwrap()
    }

    #[test]
    fn test_roundtrip_compressions() {
        for alpha in [0xff, 0x7f] {
            for c in [TiffCompression::None, TiffCompression::Lzw] {
                let img = sample(alpha);
                let bytes = encode(&img, &EncodeOptions::new().with_tiff_compression(c)).unwrap();
                assert_eq!(clone_image(&decode(&bytes).unwrap()), img, "{c:?} alpha {alpha}");
            }
        }
    }

    #[test]
    fn test_lzw_shrinks_flat_image() {
        let img = NrgbaImage::filled(64, 64, Nrgba::new(10, 20, 30, 0xff));
        let raw = encode(&img, &EncodeOptions::new().with_tiff_compression(TiffCompression::None)).unwrap();
        let lzw = encode(&img, &EncodeOptions::default()).unwrap();
        assert!(raw.len() > 64 * 64 * 3);
        assert!(lzw.len() < raw.len() / 4, "lzw {} raw {}", lzw.len(), raw.len());
        assert_eq!(clone_image(&decode(&lzw).unwrap()), img);
    }

    #[test]
    fn test_decode_gray16() {
        let mut out = Cursor::new(Vec::new());
        {
            let mut enc = TiffEncoder::new(&mut out).unwrap();
            enc.write_image::<colortype::Gray16>(2, 1, &[0x1234, 0xfedc]).unwrap();
        }
        let src = decode(out.get_ref()).unwrap();
        assert_eq!(src.kind(), "Gray16");
        let img = clone_image(&src);
        assert_eq!(img.pixel(0, 0), Nrgba::new(0x12, 0x12, 0x12, 0xff));
        assert_eq!(img.pixel(1, 0), Nrgba::new(0xfe, 0xfe, 0xfe, 0xff));
    }

    #[test]
    fn test_decode_rgb16_keeps_high_byte() {
        let mut out = Cursor::new(Vec::new());
        {
            let mut enc = TiffEncoder::new(&mut out).unwrap();
            enc.write_image::<colortype::RGB16>(1, 1, &[0xaaaa, 0x5555, 0x0101]).unwrap();
        }
        let img = clone_image(&decode(out.get_ref()).unwrap());
        assert_eq!(img.pixel(0, 0), Nrgba::new(0xaa, 0x55, 0x01, 0xff));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode(b"II*\0garbage").is_err());
    }
}
