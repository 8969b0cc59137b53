//! # imago-core
//!
//! Core types for imago: pixel layouts and their normalization.
//!
//! - [`SourceImage`] - every pixel layout a decoder may hand out
//! - [`NrgbaImage`] - the canonical 8-bit non-premultiplied RGBA image
//! - [`clone_image`] - converts any source into the canonical image
//! - [`new_image`] - solid-fill constructor
//! - [`Rect`], [`Point`] - signed image geometry
//! - [`Nrgba`], [`Rgba`] - straight and premultiplied colors
//!
//! ## Crate Structure
//!
//! ```text
//! imago-core (this crate)
//!    ^
//!    |
//!    +-- imago-io (codecs, storage, open/save/encode/decode)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use imago_core::{clone_image, Nrgba, PixelBuffer, Rect, SourceImage};
//!
//! // premultiplied half-transparent red
//! let src = SourceImage::Rgba(PixelBuffer::new(Rect::from_size(1, 1), 4, vec![0x80, 0, 0, 0x80]));
//! let img = clone_image(&src);
//! assert_eq!(img.pixel(0, 0), Nrgba::new(0xff, 0, 0, 0x80));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod convert;
pub mod error;
pub mod image;
pub mod rect;
pub mod source;

// Re-exports for convenience
pub use color::{unpremultiply16, unpremultiply8, Nrgba, Rgba};
pub use convert::{clone_image, cmyk_to_rgb, ycbcr_to_rgb};
pub use error::{Error, Result};
pub use image::{new_image, NrgbaImage};
pub use rect::{Point, Rect};
pub use source::{PalettedImage, PixelBuffer, SourceImage, Subsampling, YCbCrImage};
