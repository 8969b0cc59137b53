//! Format identification.
//!
//! Resolves image formats from file extensions, magic bytes and integer
//! indices.

use std::fmt;
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// JPEG format.
    Jpeg,
    /// PNG format.
    Png,
    /// GIF format.
    Gif,
    /// TIFF format.
    Tiff,
    /// Windows bitmap.
    Bmp,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Every known format, in index order.
    pub const ALL: [Format; 5] = [Format::Jpeg, Format::Png, Format::Gif, Format::Tiff, Format::Bmp];

    /// Maps an integer index to a format.
    ///
    /// `0..=4` are JPEG, PNG, GIF, TIFF and BMP; any other value, negative
    /// or too large, is [`Format::Unknown`].
    pub fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Format::Unknown)
    }

    /// Detects format from file extension only, ignoring case.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => Format::Jpeg,
            Some("png") => Format::Png,
            Some("gif") => Format::Gif,
            Some("bmp") => Format::Bmp,
            Some("tif") | Some("tiff") => Format::Tiff,
            _ => Format::Unknown,
        }
    }

    /// Detects format from raw bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        // PNG: 0x89 'P' 'N' 'G' CR LF SUB LF
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Format::Png;
        }

        // JPEG: SOI followed by a marker
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Format::Jpeg;
        }

        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Format::Gif;
        }

        if bytes.starts_with(b"BM") && bytes.len() >= 14 {
            return Format::Bmp;
        }

        // TIFF: II (little-endian) or MM (big-endian)
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
            return Format::Tiff;
        }

        Format::Unknown
    }

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Jpeg => "jpg",
            Format::Png => "png",
            Format::Gif => "gif",
            Format::Bmp => "bmp",
            Format::Tiff => "tif",
            Format::Unknown => "",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Jpeg => "image/jpeg",
            Format::Png => "image/png",
            Format::Gif => "image/gif",
            Format::Bmp => "image/bmp",
            Format::Tiff => "image/tiff",
            Format::Unknown => "application/octet-stream",
        }
    }

    /// Returns true if this format can store transparency.
    ///
    /// GIF stores a single transparent palette entry, not a full channel.
    pub fn supports_alpha(&self) -> bool {
        matches!(self, Format::Png | Format::Gif | Format::Bmp | Format::Tiff)
    }

    /// Returns true if the format is lossy.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Format::Jpeg)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Jpeg => "JPEG",
            Format::Png => "PNG",
            Format::Gif => "GIF",
            Format::Bmp => "BMP",
            Format::Tiff => "TIFF",
            Format::Unknown => "Unsupported",
        };
        f.write_str(name)
    }
}
