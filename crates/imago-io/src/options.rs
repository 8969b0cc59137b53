//! Encoder configuration.
//!
//! One [`EncodeOptions`] value carries the settings of every encoder; each
//! codec reads only its own fields.
//!
//! ```rust
//! use imago_io::{EncodeOptions, PngCompression};
//!
//! let opts = EncodeOptions::new()
//!     .with_jpeg_quality(80)
//!     .with_png_compression(PngCompression::Best);
//! assert_eq!(opts.jpeg_quality(), 80);
//! ```

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Default NeuQuant sampling speed for GIF quantization.
pub const DEFAULT_GIF_SPEED: i32 = 10;

/// PNG deflate effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PngCompression {
    /// Encoder default.
    #[default]
    Default,
    /// Fastest compression.
    Fast,
    /// Smallest output.
    Best,
    /// Stored blocks, no compression.
    None,
}

/// TIFF compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// Uncompressed strips.
    None,
    /// LZW compression (lossless).
    #[default]
    Lzw,
}

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    jpeg_quality: u8,
    png_compression: PngCompression,
    gif_speed: i32,
    tiff_compression: TiffCompression,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_compression: PngCompression::Default,
            gif_speed: DEFAULT_GIF_SPEED,
            tiff_compression: TiffCompression::Lzw,
        }
    }
}

impl EncodeOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Sets PNG compression.
    pub fn with_png_compression(mut self, compression: PngCompression) -> Self {
        self.png_compression = compression;
        self
    }

    /// Sets GIF quantizer speed, clamped to 1-30 (1 is slowest and best).
    pub fn with_gif_speed(mut self, speed: i32) -> Self {
        self.gif_speed = speed.clamp(1, 30);
        self
    }

    /// Sets TIFF compression.
    pub fn with_tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = compression;
        self
    }

    /// JPEG quality, 1-100.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// PNG compression.
    pub fn png_compression(&self) -> PngCompression {
        self.png_compression
    }

    /// GIF quantizer speed, 1-30.
    pub fn gif_speed(&self) -> i32 {
        self.gif_speed
    }

    /// TIFF compression.
    pub fn tiff_compression(&self) -> TiffCompression {
        self.tiff_compression
    }
}
