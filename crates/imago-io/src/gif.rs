//! GIF format support.
//!
//! Only the first frame is read. It decodes to a `Paletted` source whose
//! rectangle is the frame's position on the logical screen, so it need not
//! start at the origin. The transparent index, if any, maps to transparent
//! black.
//!
//! GIF supports only 1-bit transparency and at most 256 colors. Encoding
//! writes an exact palette when the image fits in one (pixels with
//! alpha below 0x80 share a single transparent entry) and falls back to
//! NeuQuant quantization otherwise.

use crate::{EncodeOptions, IoError, IoResult};
use gif::{ColorOutput, DecodeOptions, Encoder, Frame, Repeat};
use imago_core::{NrgbaImage, PalettedImage, Rect, Rgba, SourceImage};
use std::collections::HashMap;

const MAX_COLORS: usize = 256;

/// Decodes the first frame of a GIF stream.
pub fn decode(data: &[u8]) -> IoResult<SourceImage> {
    let mut options = DecodeOptions::new();
    options.set_color_output(ColorOutput::Indexed);
    let mut decoder = options
        .read_info(data)
        .map_err(|e| IoError::decode(e.to_string()))?;

    let global = decoder.global_palette().map(<[u8]>::to_vec);
    let frame = decoder
        .read_next_frame()
        .map_err(|e| IoError::decode(e.to_string()))?
        .ok_or_else(|| IoError::decode("GIF has no frames"))?;

    let table = frame
        .palette
        .as_deref()
        .or(global.as_deref())
        .ok_or_else(|| IoError::decode("GIF frame has no color table"))?;

    let palette: Vec<Rgba> = table
        .chunks_exact(3)
        .enumerate()
        .map(|(i, rgb)| {
            if frame.transparent == Some(i as u8) {
                Rgba::new(0, 0, 0, 0)
            } else {
                Rgba::new(rgb[0], rgb[1], rgb[2], 0xff)
            }
        })
        .collect();

    let left = i32::from(frame.left);
    let top = i32::from(frame.top);
    let rect = Rect::new(
        left,
        top,
        left + i32::from(frame.width),
        top + i32::from(frame.height),
    );

    tracing::trace!(%rect, colors = palette.len(), "decoded GIF frame");
    Ok(SourceImage::Paletted(PalettedImage {
        rect,
        stride: usize::from(frame.width),
        pix: frame.buffer.to_vec(),
        palette,
    }))
}

/// Encodes a canonical image as a single-frame GIF.
pub fn encode(img: &NrgbaImage, opts: &EncodeOptions) -> IoResult<Vec<u8>> {
    let width = u16::try_from(img.width())
        .map_err(|_| IoError::encode(format!("width {} exceeds GIF limit", img.width())))?;
    let height = u16::try_from(img.height())
        .map_err(|_| IoError::encode(format!("height {} exceeds GIF limit", img.height())))?;

    let frame = match exact_palette(img) {
        Some((indices, mut rgb, transparent)) => {
            pad_palette(&mut rgb);
            Frame::from_palette_pixels(width, height, indices, rgb, transparent)
        }
        None => {
            tracing::debug!(speed = opts.gif_speed(), "quantizing GIF palette");
            let mut rgba = img.to_rgba_bytes();
            Frame::from_rgba_speed(width, height, &mut rgba, opts.gif_speed())
        }
    };

    let mut output = Vec::new();
    {
        let mut encoder = Encoder::new(&mut output, width, height, &[])
            .map_err(|e| IoError::encode(e.to_string()))?;
        encoder
            .set_repeat(Repeat::Finite(0))
            .map_err(|e| IoError::encode(e.to_string()))?;
        encoder
            .write_frame(&frame)
            .map_err(|e| IoError::encode(e.to_string()))?;
    }
    Ok(output)
}

/// Builds palette indices if the image has at most 256 colors.
///
/// Returns the indices, the RGB table and the transparent index.
fn exact_palette(img: &NrgbaImage) -> Option<(Vec<u8>, Vec<u8>, Option<u8>)> {
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut rgb = Vec::new();
    let mut transparent = None;
    let mut indices = Vec::with_capacity(img.width() as usize * img.height() as usize);

    for y in 0..img.height() {
        for px in img.row(y).chunks_exact(4) {
            let index = if px[3] < 0x80 {
                match transparent {
                    Some(i) => i,
                    None => {
                        let i = next_index(&rgb)?;
                        rgb.extend_from_slice(&[0, 0, 0]);
                        transparent = Some(i);
                        i
                    }
                }
            } else {
                let key = [px[0], px[1], px[2]];
                match lookup.get(&key) {
                    Some(&i) => i,
                    None => {
                        let i = next_index(&rgb)?;
                        rgb.extend_from_slice(&key);
                        lookup.insert(key, i);
                        i
                    }
                }
            };
            indices.push(index);
        }
    }
    Some((indices, rgb, transparent))
}

fn next_index(rgb: &[u8]) -> Option<u8> {
    let used = rgb.len() / 3;
    (used < MAX_COLORS).then(|| used as u8)
}

/// Pads an RGB table to a power-of-two entry count, at least two.
fn pad_palette(rgb: &mut Vec<u8>) {
    let entries = (rgb.len() / 3).max(2).next_power_of_two();
    rgb.resize(entries * 3, 0);
}
