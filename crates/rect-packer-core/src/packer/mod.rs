use crate::error::{PackError, Result, check_dimensions};
use crate::model::Rect;

pub mod guillotine;
pub mod maxrects;
pub mod shelf;
pub mod skyline;

/// A packer places rectangles one at a time into a single fixed-size bin.
///
/// Implementations must ensure no overlaps and keep every placement inside the bin.
/// `insert_with` returns `Ok(Rect::EMPTY)` when the item does not fit; errors are
/// reserved for misuse (uninitialized bin, zero-sized item) and never mutate state.
pub trait Packer {
    /// Per-call placement parameters.
    type Heuristic: Copy;

    /// Binds the bin dimensions of a packer created without them.
    fn init(&mut self, width: u32, height: u32) -> Result<()>;
    fn is_initialized(&self) -> bool;
    fn insert_with(&mut self, width: u32, height: u32, heuristic: Self::Heuristic) -> Result<Rect>;
    /// Placements so far, in insertion order.
    fn used_rects(&self) -> &[Rect];
    /// Ratio of placed area to bin area, `0.0` when uninitialized.
    fn occupancy(&self) -> f32;
}

/// Live free-space state of one bin.
pub(crate) trait Bin {
    fn size(&self) -> (u32, u32);
}

/// Lifecycle of a packer: dimensions unknown, or a live bin.
#[derive(Debug, Clone)]
pub(crate) enum BinState<B> {
    Uninitialized,
    Ready(B),
}

impl<B> Default for BinState<B> {
    fn default() -> Self {
        BinState::Uninitialized
    }
}

impl<B: Bin> BinState<B> {
    /// `Uninitialized -> Ready`. A second call is rejected; there is no reset.
    pub(crate) fn init(&mut self, width: u32, height: u32, build: impl FnOnce() -> B) -> Result<()> {
        if let BinState::Ready(b) = self {
            let (width, height) = b.size();
            return Err(PackError::AlreadyInitialized { width, height });
        }
        check_dimensions(width, height)?;
        *self = BinState::Ready(build());
        Ok(())
    }

    pub(crate) fn get(&self) -> Result<&B> {
        match self {
            BinState::Ready(b) => Ok(b),
            BinState::Uninitialized => Err(PackError::Uninitialized),
        }
    }

    pub(crate) fn get_mut(&mut self) -> Result<&mut B> {
        match self {
            BinState::Ready(b) => Ok(b),
            BinState::Uninitialized => Err(PackError::Uninitialized),
        }
    }

    pub(crate) fn ready(&self) -> Option<&B> {
        self.get().ok()
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self, BinState::Ready(_))
    }
}

/// Ratio of placed area to bin area.
pub(crate) fn occupancy_of(used_area: u64, width: u32, height: u32) -> f32 {
    let total = width as u64 * height as u64;
    if total == 0 {
        0.0
    } else {
        (used_area as f64 / total as f64) as f32
    }
}

/// Leftover measures shared by the free-rectangle scorers: (short side, long side, area).
///
/// Computed in `i128`: a full `u32` bin has an area above `i64::MAX`.
#[inline]
pub(crate) fn leftovers(fr: &Rect, w: u32, h: u32) -> (i128, i128, i128) {
    let leftover_h = (fr.w as i128 - w as i128).abs();
    let leftover_v = (fr.h as i128 - h as i128).abs();
    let short_fit = leftover_h.min(leftover_v);
    let long_fit = leftover_h.max(leftover_v);
    let area_fit = fr.area() as i128 - (w as u64 * h as u64) as i128;
    (short_fit, long_fit, area_fit)
}
