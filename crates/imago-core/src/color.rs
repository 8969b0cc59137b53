//! 8-bit color values and the alpha (un)premultiplication primitives.
//!
//! Two color types exist because decoders hand out both flavors:
//!
//! - [`Nrgba`] - straight (non-premultiplied) alpha, the canonical space
//! - [`Rgba`] - premultiplied alpha, as stored in palettes and in
//!   premultiplied source buffers
//!
//! Every conversion path that needs to divide alpha back out goes through
//! [`unpremultiply8`] or [`unpremultiply16`].
//!
//! # Example
//!
//! ```
//! use imago_core::{Nrgba, Rgba};
//!
//! let straight = Nrgba::new(0xff, 0x00, 0x00, 0x80);
//! let premul = Rgba::from(straight);
//! assert_eq!(premul, Rgba::new(0x80, 0x00, 0x00, 0x80));
//! assert_eq!(Nrgba::from(premul), straight);
//! ```

/// Non-premultiplied 8-bit RGBA color.
///
/// Channels are independent of alpha: `Nrgba::new(0x88, 0x88, 0x88, 0)`
/// keeps its gray value even though it is fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Nrgba {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Nrgba {
    /// Opaque black.
    pub const BLACK: Nrgba = Nrgba::new(0, 0, 0, 0xff);
    /// Opaque white.
    pub const WHITE: Nrgba = Nrgba::new(0xff, 0xff, 0xff, 0xff);
    /// Fully transparent black.
    pub const TRANSPARENT: Nrgba = Nrgba::new(0, 0, 0, 0);

    /// Creates a color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the channels as `[R, G, B, A]`.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns `true` if alpha is 0xFF.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 0xff
    }
}

impl From<[u8; 4]> for Nrgba {
    #[inline]
    fn from(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }
}

impl From<Rgba> for Nrgba {
    #[inline]
    fn from(c: Rgba) -> Self {
        Self::new(
            unpremultiply8(c.r, c.a),
            unpremultiply8(c.g, c.a),
            unpremultiply8(c.b, c.a),
            c.a,
        )
    }
}

/// Premultiplied 8-bit RGBA color.
///
/// Each color channel has already been scaled by alpha, so a well-formed
/// value never has a channel greater than its alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red (premultiplied)
    pub r: u8,
    /// Green (premultiplied)
    pub g: u8,
    /// Blue (premultiplied)
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Rgba {
    /// Creates a color from its premultiplied channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Nrgba> for Rgba {
    #[inline]
    fn from(c: Nrgba) -> Self {
        Self::new(
            premultiply8(c.r, c.a),
            premultiply8(c.g, c.a),
            premultiply8(c.b, c.a),
            c.a,
        )
    }
}

/// Scales a straight channel by alpha, rounding to nearest.
#[inline]
pub fn premultiply8(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}

/// Recovers a straight 8-bit channel from a premultiplied one.
///
/// Alpha 0xFF copies the channel, alpha 0 yields 0, anything else computes
/// `round(c * 255 / a)` clamped to 255.
///
/// ```
/// use imago_core::unpremultiply8;
///
/// assert_eq!(unpremultiply8(0x11, 0x33), 0x55);
/// assert_eq!(unpremultiply8(0x42, 0x00), 0x00);
/// assert_eq!(unpremultiply8(0x42, 0xff), 0x42);
/// ```
#[inline]
pub fn unpremultiply8(c: u8, a: u8) -> u8 {
    match a {
        0xff => c,
        0 => 0,
        _ => {
            let a = a as u32;
            ((c as u32 * 0xff + a / 2) / a).min(0xff) as u8
        }
    }
}

/// Recovers a straight channel from a premultiplied 16-bit one and
/// truncates it to 8 bits.
///
/// The division is done at 16-bit precision (`round(c * 65535 / a)`,
/// clamped), then bits 15..8 are kept. There is no divide-by-257 step.
///
/// ```
/// use imago_core::unpremultiply16;
///
/// assert_eq!(unpremultiply16(0x1111, 0x3333), 0x55);
/// assert_eq!(unpremultiply16(0xccdd, 0xffff), 0xcc);
/// ```
#[inline]
pub fn unpremultiply16(c: u16, a: u16) -> u8 {
    match a {
        0xffff => (c >> 8) as u8,
        0 => 0,
        _ => {
            let a = a as u64;
            let straight = ((c as u64 * 0xffff + a / 2) / a).min(0xffff);
            (straight >> 8) as u8
        }
    }
}
