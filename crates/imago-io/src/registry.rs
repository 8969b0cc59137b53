//! Format registry: maps each [`Format`] to its codec functions.
//!
//! Built-in codecs are registered according to the enabled cargo features.
//! A format whose feature is off stays in the [`Format`] enum but has no
//! entry here, so every operation on it reports
//! [`IoError::UnsupportedFormat`].
//!
//! # Example
//!
//! ```rust
//! use imago_io::FormatRegistry;
//!
//! let registry = FormatRegistry::global();
//! # #[cfg(feature = "png")]
//! assert!(registry.supports_extension("PNG"));
//! assert_eq!(registry.detect_format(b"bad data"), None);
//! ```

use crate::{EncodeOptions, Format, IoError, IoResult};
use imago_core::{NrgbaImage, SourceImage};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Format information entry in the registry.
#[derive(Clone, Copy)]
pub struct FormatInfo {
    /// Format identifier.
    pub format: Format,
    /// Human-readable format name.
    pub name: &'static str,
    /// File extensions without dots, lowercase.
    pub extensions: &'static [&'static str],
    /// Checks whether header bytes match this format.
    pub can_read: fn(&[u8]) -> bool,
    /// Decodes a complete stream.
    pub decode: fn(&[u8]) -> IoResult<SourceImage>,
    /// Encodes a canonical image.
    pub encode: fn(&NrgbaImage, &EncodeOptions) -> IoResult<Vec<u8>>,
}

impl std::fmt::Debug for FormatInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatInfo")
            .field("format", &self.format)
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl FormatInfo {
    /// Encodes `img` with this format's encoder.
    ///
    /// # Errors
    ///
    /// [`IoError::EncodeError`] for a zero-area image, whatever the format,
    /// otherwise whatever the codec reports.
    pub fn encode_image(&self, img: &NrgbaImage, opts: &EncodeOptions) -> IoResult<Vec<u8>> {
        if img.is_empty() {
            return Err(IoError::encode(format!("cannot write an empty {} image", self.name)));
        }
        (self.encode)(img, opts)
    }
}

/// Central registry for image format handlers.
///
/// The global instance is built once and shared read-only between threads.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    formats: HashMap<Format, FormatInfo>,
    by_extension: HashMap<&'static str, Format>,
}

impl FormatRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the global registry instance with built-in formats.
    pub fn global() -> &'static FormatRegistry {
        static INSTANCE: OnceLock<FormatRegistry> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let mut registry = FormatRegistry::new();
            registry.register_builtin_formats();
            registry
        })
    }

    /// Registers built-in formats based on enabled features.
    fn register_builtin_formats(&mut self) {
        #[cfg(feature = "jpeg")]
        self.register(FormatInfo {
            format: Format::Jpeg,
            name: "JPEG",
            extensions: &["jpg", "jpeg"],
            can_read: |h| Format::from_bytes(h) == Format::Jpeg,
            decode: crate::jpeg::decode,
            encode: crate::jpeg::encode,
        });

        #[cfg(feature = "png")]
        self.register(FormatInfo {
            format: Format::Png,
            name: "PNG",
            extensions: &["png"],
            can_read: |h| Format::from_bytes(h) == Format::Png,
            decode: crate::png::decode,
            encode: crate::png::encode,
        });

        #[cfg(feature = "gif")]
        self.register(FormatInfo {
            format: Format::Gif,
            name: "GIF",
            extensions: &["gif"],
            can_read: |h| Format::from_bytes(h) == Format::Gif,
            decode: crate::gif::decode,
            encode: crate::gif::encode,
        });

        #[cfg(feature = "tiff")]
        self.register(FormatInfo {
            format: Format::Tiff,
            name: "TIFF",
            extensions: &["tif", "tiff"],
            can_read: |h| Format::from_bytes(h) == Format::Tiff,
            decode: crate::tiff::decode,
            encode: crate::tiff::encode,
        });

        #[cfg(feature = "bmp")]
        self.register(FormatInfo {
            format: Format::Bmp,
            name: "BMP",
            extensions: &["bmp"],
            can_read: |h| Format::from_bytes(h) == Format::Bmp,
            decode: crate::bmp::decode,
            encode: crate::bmp::encode,
        });
    }

    /// Registers a format, replacing any previous entry for it.
    pub fn register(&mut self, info: FormatInfo) {
        for &ext in info.extensions {
            self.by_extension.insert(ext, info.format);
        }
        self.formats.insert(info.format, info);
    }

    /// Returns an iterator over registered formats.
    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.formats.keys().copied()
    }

    /// Returns format info, if the format is registered.
    pub fn get(&self, format: Format) -> Option<&FormatInfo> {
        self.formats.get(&format)
    }

    /// Returns format info by file extension, ignoring case.
    pub fn get_by_extension(&self, ext: &str) -> Option<&FormatInfo> {
        let ext_lower = ext.to_lowercase();
        self.by_extension
            .get(ext_lower.as_str())
            .and_then(|format| self.formats.get(format))
    }

    /// Checks if an extension is supported.
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.get_by_extension(ext).is_some()
    }

    /// Detects a registered format from header bytes.
    pub fn detect_format(&self, header: &[u8]) -> Option<Format> {
        self.formats
            .values()
            .find(|info| (info.can_read)(header))
            .map(|info| info.format)
    }

    /// Decodes `data` as `format`.
    ///
    /// # Errors
    ///
    /// [`IoError::UnsupportedFormat`] if the format is not registered,
    /// otherwise whatever the codec reports.
    pub fn decode(&self, format: Format, data: &[u8]) -> IoResult<SourceImage> {
        let info = self.get(format).ok_or(IoError::UnsupportedFormat)?;
        (info.decode)(data)
    }

    /// Encodes `img` as `format`.
    ///
    /// # Errors
    ///
    /// [`IoError::UnsupportedFormat`] if the format is not registered,
    /// otherwise as [`FormatInfo::encode_image`].
    pub fn encode(&self, format: Format, img: &NrgbaImage, opts: &EncodeOptions) -> IoResult<Vec<u8>> {
        let info = self.get(format).ok_or(IoError::UnsupportedFormat)?;
        info.encode_image(img, opts)
    }
}
