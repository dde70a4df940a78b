use super::{Bin, BinState, Packer, occupancy_of};
use crate::config::{PackerConfig, ShelfHeuristic};
use crate::error::{Result, check_dimensions};
use crate::model::Rect;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A horizontal strip of the bin; items are packed into it left to right.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shelf {
    /// Top edge of the shelf.
    pub y: u32,
    pub height: u32,
    /// Width consumed from the left edge so far.
    pub used_width: u32,
}

/// Shelf packer. Only the most recently opened shelf is open: it may still grow
/// in height while earlier shelves are frozen.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    allow_rotation: bool,
    state: BinState<ShelfBin>,
}

#[derive(Debug, Clone)]
struct ShelfBin {
    width: u32,
    height: u32,
    shelves: Vec<Shelf>,
    used: Vec<Rect>,
    used_area: u64,
}

impl Bin for ShelfBin {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for ShelfPacker {
    fn default() -> Self {
        Self {
            allow_rotation: true,
            state: BinState::Uninitialized,
        }
    }
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32, allow_rotation: bool) -> Result<Self> {
        let mut p = Self {
            allow_rotation,
            state: BinState::Uninitialized,
        };
        p.init(width, height)?;
        Ok(p)
    }

    pub fn from_config(cfg: &PackerConfig) -> Result<Self> {
        cfg.validate()?;
        Self::new(cfg.bin_width, cfg.bin_height, cfg.allow_rotation)
    }

    pub fn allow_rotation(&self) -> bool {
        self.allow_rotation
    }

    pub fn bin_size(&self) -> Option<(u32, u32)> {
        self.state.ready().map(Bin::size)
    }

    /// Shelves in opening order (empty when uninitialized).
    pub fn shelves(&self) -> &[Shelf] {
        self.state
            .ready()
            .map(|b| b.shelves.as_slice())
            .unwrap_or_default()
    }

    /// Places a `width x height` item on a shelf picked by `heuristic`, opening a new
    /// shelf when none admits it. Returns `Rect::EMPTY` if the bin has no room left.
    pub fn insert(&mut self, width: u32, height: u32, heuristic: ShelfHeuristic) -> Result<Rect> {
        let allow_rotation = self.allow_rotation;
        let bin = self.state.get_mut()?;
        check_dimensions(width, height)?;
        match bin.insert(width, height, heuristic, allow_rotation) {
            Some(node) => {
                trace!(x = node.x, y = node.y, w = node.w, h = node.h, "shelf placed");
                Ok(node)
            }
            None => {
                debug!(width, height, ?heuristic, "shelf: no fit");
                Ok(Rect::EMPTY)
            }
        }
    }
}

impl Packer for ShelfPacker {
    type Heuristic = ShelfHeuristic;

    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        self.state.init(width, height, || ShelfBin {
            width,
            height,
            shelves: Vec::new(),
            used: Vec::new(),
            used_area: 0,
        })?;
        debug!(width, height, "shelf bin initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_ready()
    }

    fn insert_with(&mut self, width: u32, height: u32, heuristic: ShelfHeuristic) -> Result<Rect> {
        self.insert(width, height, heuristic)
    }

    fn used_rects(&self) -> &[Rect] {
        self.state
            .ready()
            .map(|b| b.used.as_slice())
            .unwrap_or_default()
    }

    fn occupancy(&self) -> f32 {
        self.state
            .ready()
            .map_or(0.0, |b| occupancy_of(b.used_area, b.width, b.height))
    }
}

impl ShelfBin {
    fn insert(
        &mut self,
        w: u32,
        h: u32,
        heuristic: ShelfHeuristic,
        allow_rotation: bool,
    ) -> Option<Rect> {
        let chosen = match heuristic {
            ShelfHeuristic::NextFit => self
                .shelves
                .len()
                .checked_sub(1)
                .and_then(|i| self.fits(i, w, h, allow_rotation).next().map(|o| (i, o))),
            ShelfHeuristic::FirstFit => (0..self.shelves.len())
                .find_map(|i| self.fits(i, w, h, allow_rotation).next().map(|o| (i, o))),
            _ => {
                let mut best: Option<(usize, (u32, u32), i128)> = None;
                for i in 0..self.shelves.len() {
                    for (rw, rh) in self.fits(i, w, h, allow_rotation) {
                        let s = self.score(i, rw, rh, heuristic);
                        if best.is_none_or(|(.., b)| s < b) {
                            best = Some((i, (rw, rh), s));
                        }
                    }
                }
                best.map(|(i, o, _)| (i, o))
            }
        };
        if let Some((i, (rw, rh))) = chosen {
            return Some(self.add_to_shelf(i, rw, rh));
        }

        let (rw, rh) = self.new_shelf_orientation(w, h, allow_rotation)?;
        let y = self.shelves.last().map_or(0, |s| s.y + s.height);
        self.shelves.push(Shelf {
            y,
            height: rh,
            used_width: 0,
        });
        Some(self.add_to_shelf(self.shelves.len() - 1, rw, rh))
    }

    /// Orientations of the item that fit on shelf `i`, preferred one first.
    fn fits(&self, i: usize, w: u32, h: u32, allow_rotation: bool) -> impl Iterator<Item = (u32, u32)> {
        let shelf = self.shelves[i];
        let free_w = self.width - shelf.used_width;
        // the open (last) shelf may grow up to the bin's bottom edge
        let max_h = if i + 1 == self.shelves.len() {
            self.height - shelf.y
        } else {
            shelf.height
        };
        let preferred = if allow_rotation && prefers_rotation(&shelf, free_w, w, h) {
            (h, w)
        } else {
            (w, h)
        };
        let other = (allow_rotation && w != h).then_some((preferred.1, preferred.0));
        std::iter::once(preferred)
            .chain(other)
            .filter(move |&(rw, rh)| rw <= free_w && rh <= max_h)
    }

    /// Lower is better.
    fn score(&self, i: usize, rw: u32, rh: u32, heuristic: ShelfHeuristic) -> i128 {
        let shelf = &self.shelves[i];
        // widened: free width times shelf height can exceed `i64::MAX`
        let free_w = (self.width - shelf.used_width) as i128;
        let eff_h = shelf.height.max(rh) as i128;
        let area_left = free_w * eff_h - rw as i128 * rh as i128;
        let width_left = free_w - rw as i128;
        match heuristic {
            ShelfHeuristic::BestAreaFit => area_left,
            ShelfHeuristic::WorstAreaFit => -area_left,
            ShelfHeuristic::BestHeightFit => shelf.height.saturating_sub(rh) as i128,
            ShelfHeuristic::BestWidthFit => width_left,
            ShelfHeuristic::WorstWidthFit => -width_left,
            ShelfHeuristic::NextFit | ShelfHeuristic::FirstFit => 0,
        }
    }

    /// New shelves lay the item wide side down when rotation is allowed.
    fn new_shelf_orientation(&self, w: u32, h: u32, allow_rotation: bool) -> Option<(u32, u32)> {
        let y = self.shelves.last().map_or(0, |s| s.y + s.height);
        let room = self.height - y;
        let preferred = if allow_rotation && w < h { (h, w) } else { (w, h) };
        let other = (allow_rotation && w != h).then_some((preferred.1, preferred.0));
        std::iter::once(preferred)
            .chain(other)
            .find(|&(rw, rh)| rw <= self.width && rh <= room)
    }

    fn add_to_shelf(&mut self, i: usize, rw: u32, rh: u32) -> Rect {
        let shelf = &mut self.shelves[i];
        let node = Rect::new(shelf.used_width, shelf.y, rw, rh);
        shelf.used_width += rw;
        shelf.height = shelf.height.max(rh);
        self.used.push(node);
        self.used_area += node.area();
        node
    }
}

/// Stand tall items up to fill the shelf height, lay them down when too wide or too tall.
fn prefers_rotation(shelf: &Shelf, free_w: u32, w: u32, h: u32) -> bool {
    (w > h && w > free_w)
        || (w > h && w < shelf.height)
        || (w < h && h > shelf.height && h <= free_w)
}
