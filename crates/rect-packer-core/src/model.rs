use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
///
/// A rectangle with zero width or height is the "no placement" sentinel returned
/// by the packers when an item does not fit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    /// The zero-area sentinel.
    pub const EMPTY: Rect = Rect {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    };

    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge (`x + w`).
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Exclusive bottom edge (`y + h`).
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// True for the zero-area sentinel (and any other degenerate rectangle).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Returns true if the interiors of `self` and `other` overlap.
    /// Rectangles that merely share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x >= other.right()
            || other.x >= self.right()
            || self.y >= other.bottom()
            || other.y >= self.bottom())
    }

    /// Returns true if `r` is fully inside `self` (shared edges count as inside).
    #[inline]
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }

    /// Same rectangle with width and height swapped (90° rotation in place).
    #[inline]
    pub fn rotated(&self) -> Rect {
        Rect::new(self.x, self.y, self.h, self.w)
    }
}

/// Width/height pair for batch inserts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RectSize {
    pub w: u32,
    pub h: u32,
}

impl RectSize {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

impl From<(u32, u32)> for RectSize {
    fn from((w, h): (u32, u32)) -> Self {
        Self { w, h }
    }
}

/// Length of the overlap of the half-open intervals `[a1, a2)` and `[b1, b2)`.
pub(crate) fn overlap_1d(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    let start = a1.max(b1);
    let end = a2.min(b2);
    end.saturating_sub(start)
}
