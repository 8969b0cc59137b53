//! # imago-io
//!
//! Image I/O for imago: loads JPEG, PNG, GIF, BMP and TIFF into source
//! images, and writes canonical images back out.
//!
//! # Architecture
//!
//! - [`Format`] - format identification by extension, magic bytes or index
//! - [`FormatRegistry`] - per-format decode/encode functions
//! - [`Storage`] - where named streams come from ([`FileStorage`],
//!   [`MemoryStorage`], or your own)
//! - [`ImageIo`] - open/save bound to one storage
//! - [`open`] / [`save`] / [`encode`] / [`decode`] - convenience functions
//!   over the filesystem and plain streams
//!
//! Decoders return a [`SourceImage`] in whatever layout the file stores;
//! [`clone_image`] turns it into an [`NrgbaImage`]. Encoders accept either.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use imago_io::{clone_image, open, save, EncodeOptions};
//!
//! let src = open("input.png")?;
//! let img = clone_image(&src);
//! save(&img, "output.jpg", &EncodeOptions::new().with_jpeg_quality(85))?;
//! # Ok::<(), imago_io::IoError>(())
//! ```
//!
//! # Supported Formats
//!
//! | Format | Decodes to | Writes |
//! |--------|------------|--------|
//! | JPEG | NRGBA, Gray, Gray16, CMYK | RGB, quality 1-100 |
//! | PNG | NRGBA, NRGBA64, Gray, Gray16 | RGB or RGBA |
//! | GIF | Paletted (first frame) | exact or quantized palette |
//! | BMP | NRGBA, Gray | RGB or RGBA |
//! | TIFF | NRGBA, NRGBA64, Gray, Gray16, CMYK | RGB or RGBA, LZW |
//!
//! # Feature Flags
//!
//! - `jpeg` - JPEG support (default)
//! - `png` - PNG support (default)
//! - `gif` - GIF support (default)
//! - `bmp` - BMP support (default)
//! - `tiff` - TIFF support (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod format;
mod options;
pub mod registry;
pub mod storage;

#[cfg(feature = "bmp")]
pub mod bmp;

#[cfg(feature = "gif")]
pub mod gif;

#[cfg(feature = "jpeg")]
pub mod jpeg;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "tiff")]
pub mod tiff;

pub use error::{IoError, IoResult};
pub use format::Format;
pub use options::{EncodeOptions, PngCompression, TiffCompression};
pub use registry::{FormatInfo, FormatRegistry};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageWriter};

pub use imago_core::{clone_image, new_image, Nrgba, NrgbaImage, SourceImage};

use std::borrow::Cow;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Anything that can be encoded: a canonical image as is, or a source
/// image after conversion.
pub trait Encodable {
    /// Returns the canonical pixels to encode.
    ///
    /// # Errors
    ///
    /// [`IoError::Core`] if a source image's buffers do not match its
    /// geometry.
    fn to_canonical(&self) -> IoResult<Cow<'_, NrgbaImage>>;
}

impl Encodable for NrgbaImage {
    fn to_canonical(&self) -> IoResult<Cow<'_, NrgbaImage>> {
        Ok(Cow::Borrowed(self))
    }
}

impl Encodable for SourceImage {
    fn to_canonical(&self) -> IoResult<Cow<'_, NrgbaImage>> {
        self.validate()?;
        Ok(Cow::Owned(clone_image(self)))
    }
}

/// Image loader and saver bound to a [`Storage`].
///
/// The storage is the only source of streams, so substituting it (for
/// instance with a failure-injecting test double) affects exactly this
/// instance.
///
/// ```rust
/// use imago_io::{ImageIo, MemoryStorage, EncodeOptions, new_image, Nrgba};
///
/// let io = ImageIo::with_storage(MemoryStorage::new());
/// let img = new_image(2, 2, Nrgba::new(1, 2, 3, 4));
/// # #[cfg(feature = "png")]
/// # {
/// io.save(&img, "a.png", &EncodeOptions::default()).unwrap();
/// assert!(io.storage().contains("a.png"));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImageIo<S = FileStorage> {
    storage: S,
}

impl ImageIo<FileStorage> {
    /// Creates an instance over the local filesystem.
    pub fn new() -> Self {
        Self::with_storage(FileStorage)
    }
}

impl<S: Storage> ImageIo<S> {
    /// Creates an instance over `storage`.
    pub fn with_storage(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Opens the image stored under `path`.
    ///
    /// The format comes from the file extension, not the content. The
    /// image is returned in the decoder's native layout.
    ///
    /// # Errors
    ///
    /// - [`IoError::UnsupportedFormat`] for an unknown extension
    /// - [`IoError::Io`] with the storage's own error if the stream cannot
    ///   be opened or read
    /// - the codec's error if decoding fails
    pub fn open(&self, path: impl AsRef<Path>) -> IoResult<SourceImage> {
        let path = path.as_ref();
        let format = Format::from_extension(path);
        let info = FormatRegistry::global()
            .get(format)
            .ok_or(IoError::UnsupportedFormat)?;

        debug!(path = %path.display(), %format, "open");
        let data = {
            let mut reader = self.storage.open(path)?;
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            data
        };

        (info.decode)(&data)
    }

    /// Saves `img` under `path`, in the format given by the extension.
    ///
    /// The stream is always closed once created. An encoding or write
    /// failure is reported in preference to a close failure; otherwise a
    /// close failure is the result.
    ///
    /// Zero-area images are rejected with [`IoError::EncodeError`] for
    /// every format. The stream is still created and closed, so the
    /// storage may be left holding an empty entry.
    ///
    /// # Errors
    ///
    /// - [`IoError::UnsupportedFormat`] for an unknown extension
    /// - [`IoError::Io`] with the storage's own error if the stream cannot
    ///   be created, written or closed
    /// - the codec's error if encoding fails
    pub fn save<I>(&self, img: &I, path: impl AsRef<Path>, opts: &EncodeOptions) -> IoResult<()>
    where
        I: Encodable + ?Sized,
    {
        let path = path.as_ref();
        let format = Format::from_extension(path);
        let info = FormatRegistry::global()
            .get(format)
            .ok_or(IoError::UnsupportedFormat)?;

        debug!(path = %path.display(), %format, "save");
        let mut writer = self.storage.create(path)?;
        let written = img
            .to_canonical()
            .and_then(|canonical| info.encode_image(&canonical, opts))
            .and_then(|bytes| writer.write_all(&bytes).map_err(IoError::from));
        let closed = writer.close();

        match (written, closed) {
            (Err(e), Err(close_err)) => {
                warn!(path = %path.display(), error = %close_err, "close failed after save error");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(close_err)) => Err(close_err.into()),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}

/// Opens an image file from the local filesystem.
///
/// See [`ImageIo::open`].
pub fn open(path: impl AsRef<Path>) -> IoResult<SourceImage> {
    ImageIo::new().open(path)
}

/// Saves an image to the local filesystem.
///
/// See [`ImageIo::save`].
pub fn save<I>(img: &I, path: impl AsRef<Path>, opts: &EncodeOptions) -> IoResult<()>
where
    I: Encodable + ?Sized,
{
    ImageIo::new().save(img, path, opts)
}

/// Encodes `img` as `format` into `writer`.
///
/// # Errors
///
/// [`IoError::UnsupportedFormat`] for [`Format::Unknown`] or a format that
/// is not compiled in; [`IoError::EncodeError`] for a zero-area image;
/// otherwise codec or write errors.
pub fn encode<W, I>(mut writer: W, img: &I, format: Format, opts: &EncodeOptions) -> IoResult<()>
where
    W: Write,
    I: Encodable + ?Sized,
{
    let info = FormatRegistry::global()
        .get(format)
        .ok_or(IoError::UnsupportedFormat)?;
    let canonical = img.to_canonical()?;
    let bytes = info.encode_image(&canonical, opts)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Decodes an image from `reader`, identifying the format by its magic
/// bytes.
///
/// # Errors
///
/// [`IoError::DecodeError`] if the data matches no registered format or is
/// malformed; [`IoError::Io`] if reading fails.
pub fn decode<R: Read>(mut reader: R) -> IoResult<SourceImage> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let registry = FormatRegistry::global();
    let format = registry
        .detect_format(&data)
        .ok_or_else(|| IoError::decode("unknown image format"))?;
    debug!(%format, len = data.len(), "decode");
    registry.decode(format, &data)
}
