//! Points and rectangles in image space.
//!
//! Source images produced by decoders do not always start at the origin
//! (a GIF frame may sit at an offset inside its logical screen, a sub-image
//! keeps the coordinates of its parent). Geometry is therefore signed and
//! expressed as a half-open `[min, max)` box.
//!
//! # Coordinate System
//!
//! ```text
//! (min.x,min.y) ──────► X
//!   │
//!   │   ┌──────────┐
//!   │   │  Image   │
//!   │   │  Region  │
//!   │   └──────────┘ (max.x,max.y) exclusive
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use imago_core::Rect;
//!
//! let rect = Rect::new(-1, -1, 5, 0);
//! assert_eq!(rect.width(), 6);
//! assert_eq!(rect.height(), 1);
//! assert_eq!(rect.at_origin(), Rect::from_size(6, 1));
//! ```

/// A point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// The origin (0, 0).
    pub const ZERO: Point = Point { x: 0, y: 0 };

    /// Creates a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle defined by an inclusive minimum corner and an exclusive
/// maximum corner.
///
/// # Invariants
///
/// `min.x <= max.x` and `min.y <= max.y`. [`Rect::new`] swaps coordinates
/// that are given in the wrong order. A rectangle with zero width or height
/// is empty.
///
/// # Example
///
/// ```rust
/// use imago_core::Rect;
///
/// let rect = Rect::new(10, 20, 110, 70);
/// assert_eq!(rect.width(), 100);
/// assert_eq!(rect.height(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Top-left corner (inclusive)
    pub min: Point,
    /// Bottom-right corner (exclusive)
    pub max: Point,
}

impl Rect {
    /// Creates a rectangle from two corners `(x0, y0)` and `(x1, y1)`.
    ///
    /// If coordinates are swapped, they will be normalized.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    /// Creates a rectangle at the origin with the given dimensions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use imago_core::{Point, Rect};
    ///
    /// let rect = Rect::from_size(1920, 1080);
    /// assert_eq!(rect.min, Point::ZERO);
    /// ```
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self {
            min: Point::ZERO,
            max: Point::new(width as i32, height as i32),
        }
    }

    /// Width in pixels; zero for an inverted span.
    #[inline]
    pub const fn width(&self) -> u32 {
        span(self.min.x, self.max.x)
    }

    /// Height in pixels; zero for an inverted span.
    #[inline]
    pub const fn height(&self) -> u32 {
        span(self.min.y, self.max.y)
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Returns a rectangle of the same size with its minimum corner at (0, 0).
    ///
    /// Empty rectangles collapse to the zero rectangle.
    #[inline]
    pub const fn at_origin(&self) -> Rect {
        if self.is_empty() {
            return Rect::from_size(0, 0);
        }
        Rect::from_size(self.width(), self.height())
    }
}

#[inline]
const fn span(lo: i32, hi: i32) -> u32 {
    if hi > lo { hi.abs_diff(lo) } else { 0 }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_new_normalizes() {
        let r = Rect::new(10, 70, 110, 20);
        assert_eq!(r.min, Point::new(10, 20));
        assert_eq!(r.max, Point::new(110, 70));
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 50);
    }

    #[test]
    fn test_rect_negative_origin() {
        let r = Rect::new(-1, -1, 0, 1);
        assert_eq!(r.width(), 1);
        assert_eq!(r.height(), 2);
        assert_eq!(r.at_origin(), Rect::from_size(1, 2));
    }

    #[test]
    fn test_rect_empty() {
        assert!(Rect::from_size(0, 0).is_empty());
        assert!(Rect::new(3, 3, 3, 10).is_empty());
        assert_eq!(Rect::new(3, 3, 3, 10).at_origin(), Rect::from_size(0, 0));
        assert!(!Rect::from_size(1, 1).is_empty());
    }

    #[test]
    fn test_rect_extreme_span() {
        let r = Rect::new(i32::MIN, 0, i32::MAX, 1);
        assert_eq!(r.width(), u32::MAX);
        assert_eq!(r.height(), 1);

        // fields are public, so an inverted rect can still be built
        let inverted = Rect {
            min: Point::new(i32::MAX, 5),
            max: Point::new(i32::MIN, 0),
        };
        assert_eq!(inverted.width(), 0);
        assert_eq!(inverted.height(), 0);
        assert!(inverted.is_empty());
        assert_eq!(inverted.at_origin(), Rect::from_size(0, 0));
    }
}
