use super::guillotine::GuillotineBin;
use super::{Bin, BinState, Packer, occupancy_of};
use crate::config::{GuillotineChoice, GuillotineSplit, PackerConfig, SkylineHeuristic};
use crate::error::{Result, check_dimensions};
use crate::model::{Rect, RectSize};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// One step of the skyline: `[x, x + width)` is occupied from the top of the bin down to `height`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkylineSegment {
    pub x: u32,
    pub width: u32,
    pub height: u32,
}

impl SkylineSegment {
    #[inline]
    fn right(&self) -> u32 {
        self.x + self.width
    }
}

/// Skyline packer: free space is the region below a piecewise-constant profile
/// whose segments always tile `[0, bin_width)`.
#[derive(Debug, Clone)]
pub struct SkylinePacker {
    allow_rotation: bool,
    use_waste_map: bool,
    state: BinState<SkylineBin>,
}

#[derive(Debug, Clone)]
struct SkylineBin {
    width: u32,
    height: u32,
    skyline: Vec<SkylineSegment>,
    used: Vec<Rect>,
    used_area: u64,
    waste: Option<GuillotineBin>,
}

impl Bin for SkylineBin {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Lower is better in both components.
type Score = (u64, u64);

impl Default for SkylinePacker {
    fn default() -> Self {
        Self {
            allow_rotation: true,
            use_waste_map: false,
            state: BinState::Uninitialized,
        }
    }
}

impl SkylinePacker {
    pub fn new(width: u32, height: u32, allow_rotation: bool) -> Result<Self> {
        let mut p = Self {
            allow_rotation,
            use_waste_map: false,
            state: BinState::Uninitialized,
        };
        p.init(width, height)?;
        Ok(p)
    }

    /// Honors `use_waste_map`: gaps left under placements become reusable free space.
    pub fn from_config(cfg: &PackerConfig) -> Result<Self> {
        cfg.validate()?;
        let mut p = Self {
            allow_rotation: cfg.allow_rotation,
            use_waste_map: cfg.use_waste_map,
            state: BinState::Uninitialized,
        };
        p.init(cfg.bin_width, cfg.bin_height)?;
        Ok(p)
    }

    pub fn allow_rotation(&self) -> bool {
        self.allow_rotation
    }

    pub fn uses_waste_map(&self) -> bool {
        self.use_waste_map
    }

    pub fn bin_size(&self) -> Option<(u32, u32)> {
        self.state.ready().map(Bin::size)
    }

    /// Segments left to right (empty when uninitialized).
    pub fn skyline(&self) -> &[SkylineSegment] {
        self.state
            .ready()
            .map(|b| b.skyline.as_slice())
            .unwrap_or_default()
    }

    /// Free rectangles recovered into the waste map (empty when disabled).
    pub fn waste_rects(&self) -> &[Rect] {
        self.state
            .ready()
            .and_then(|b| b.waste.as_ref())
            .map(GuillotineBin::free_rects)
            .unwrap_or_default()
    }

    /// Places a `width x height` item on the skyline (or in the waste map first,
    /// when enabled). Returns `Rect::EMPTY` if no valid position exists.
    pub fn insert(&mut self, width: u32, height: u32, heuristic: SkylineHeuristic) -> Result<Rect> {
        let allow_rotation = self.allow_rotation;
        let bin = self.state.get_mut()?;
        check_dimensions(width, height)?;
        if let Some(node) = bin.insert_waste(width, height, allow_rotation) {
            trace!(x = node.x, y = node.y, w = node.w, h = node.h, "skyline placed in waste map");
            return Ok(node);
        }
        match bin.find_position(width, height, heuristic, allow_rotation) {
            Some((idx, node, _)) => {
                bin.add_skyline_level(idx, node);
                trace!(x = node.x, y = node.y, w = node.w, h = node.h, "skyline placed");
                Ok(node)
            }
            None => {
                debug!(width, height, ?heuristic, "skyline: no fit");
                Ok(Rect::EMPTY)
            }
        }
    }

    /// Places as many of `sizes` as possible. Each round the waste map (if any) is
    /// offered the remaining items in order; otherwise the item whose best skyline
    /// position scores best is committed.
    ///
    /// The result is aligned with `sizes`; `None` marks items that did not fit.
    #[instrument(skip_all, fields(count = sizes.len()))]
    pub fn insert_batch(
        &mut self,
        sizes: &[RectSize],
        heuristic: SkylineHeuristic,
    ) -> Result<Vec<Option<Rect>>> {
        let allow_rotation = self.allow_rotation;
        let bin = self.state.get_mut()?;
        for s in sizes {
            check_dimensions(s.w, s.h)?;
        }
        let mut out = vec![None; sizes.len()];
        let mut remaining: Vec<usize> = (0..sizes.len()).collect();
        'rounds: while !remaining.is_empty() {
            for slot in 0..remaining.len() {
                let s = sizes[remaining[slot]];
                if let Some(node) = bin.insert_waste(s.w, s.h, allow_rotation) {
                    out[remaining.remove(slot)] = Some(node);
                    continue 'rounds;
                }
            }
            let mut best: Option<(usize, usize, Rect, Score)> = None;
            for (slot, &idx) in remaining.iter().enumerate() {
                let s = sizes[idx];
                if let Some((seg, node, score)) = bin.find_position(s.w, s.h, heuristic, allow_rotation) {
                    if best.is_none_or(|(.., b)| score < b) {
                        best = Some((slot, seg, node, score));
                    }
                }
            }
            let Some((slot, seg, node, _)) = best else {
                break;
            };
            bin.add_skyline_level(seg, node);
            out[remaining.remove(slot)] = Some(node);
        }
        debug!(
            placed = sizes.len() - remaining.len(),
            unplaced = remaining.len(),
            "skyline batch done"
        );
        Ok(out)
    }
}

impl Packer for SkylinePacker {
    type Heuristic = SkylineHeuristic;

    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        let use_waste_map = self.use_waste_map;
        self.state.init(width, height, || SkylineBin {
            width,
            height,
            skyline: vec![SkylineSegment {
                x: 0,
                width,
                height: 0,
            }],
            used: Vec::new(),
            used_area: 0,
            waste: use_waste_map.then(|| GuillotineBin::waste_map(width, height)),
        })?;
        debug!(width, height, use_waste_map, "skyline bin initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_ready()
    }

    fn insert_with(&mut self, width: u32, height: u32, heuristic: SkylineHeuristic) -> Result<Rect> {
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

impl SkylineBin {
    fn insert_waste(&mut self, w: u32, h: u32, allow_rotation: bool) -> Option<Rect> {
        let node = self.waste.as_mut()?.insert(
            w,
            h,
            allow_rotation,
            true,
            GuillotineChoice::BestShortSideFit,
            GuillotineSplit::SplitMaximizeArea,
        )?;
        self.record(node);
        Some(node)
    }

    fn record(&mut self, node: Rect) {
        self.used.push(node);
        self.used_area += node.area();
    }

    /// Top edge at which a `w x h` item starting at segment `i` rests, if it stays inside the bin.
    fn rectangle_fits(&self, i: usize, w: u32, h: u32) -> Option<u32> {
        let x = self.skyline[i].x;
        if w > self.width - x {
            return None;
        }
        let mut width_left = w;
        let mut y = 0;
        for seg in &self.skyline[i..] {
            y = y.max(seg.height);
            if h > self.height - y {
                return None;
            }
            if seg.width >= width_left {
                return Some(y);
            }
            width_left -= seg.width;
        }
        None
    }

    /// Area between the skyline and the bottom edge `y` of an item spanning `[x, x + w)`.
    fn wasted_area(&self, i: usize, w: u32, y: u32) -> u64 {
        let right = self.skyline[i].x + w;
        self.skyline[i..]
            .iter()
            .take_while(|seg| seg.x < right)
            .map(|seg| {
                let span = right.min(seg.right()) - seg.x;
                span as u64 * (y - seg.height) as u64
            })
            .sum()
    }

    fn find_position(
        &self,
        w: u32,
        h: u32,
        heuristic: SkylineHeuristic,
        allow_rotation: bool,
    ) -> Option<(usize, Rect, Score)> {
        let mut best: Option<(usize, Rect, Score)> = None;
        for i in 0..self.skyline.len() {
            let rotated = (allow_rotation && w != h).then_some((h, w));
            for (rw, rh) in std::iter::once((w, h)).chain(rotated) {
                let Some(y) = self.rectangle_fits(i, rw, rh) else {
                    continue;
                };
                let node = Rect::new(self.skyline[i].x, y, rw, rh);
                let top = node.bottom() as u64;
                let score = match heuristic {
                    SkylineHeuristic::BottomLeft => (top, node.x as u64),
                    SkylineHeuristic::MinWasteFit => (self.wasted_area(i, rw, y), top),
                };
                if best.is_none_or(|(.., b)| score < b) {
                    best = Some((i, node, score));
                }
            }
        }
        best
    }

    /// Raises the skyline under `rect`, which starts at segment `index`.
    fn add_skyline_level(&mut self, index: usize, rect: Rect) {
        if self.waste.is_some() {
            self.add_waste_areas(index, &rect);
        }
        self.skyline.insert(
            index,
            SkylineSegment {
                x: rect.x,
                width: rect.w,
                height: rect.bottom(),
            },
        );

        // trim or drop the segments now covered by the new one
        let i = index + 1;
        while i < self.skyline.len() {
            let prev_right = self.skyline[i - 1].right();
            let seg = &mut self.skyline[i];
            if seg.x >= prev_right {
                break;
            }
            let shrink = prev_right - seg.x;
            if seg.width <= shrink {
                self.skyline.remove(i);
            } else {
                seg.x += shrink;
                seg.width -= shrink;
                break;
            }
        }
        self.merge();
        self.record(rect);
    }

    /// Hands the gaps between the skyline and `rect`'s bottom edge to the waste map.
    fn add_waste_areas(&mut self, index: usize, rect: &Rect) {
        let Some(wm) = self.waste.as_mut() else {
            return;
        };
        for seg in self.skyline[index..]
            .iter()
            .take_while(|seg| seg.x < rect.right())
        {
            if seg.height < rect.y {
                let w = rect.right().min(seg.right()) - seg.x;
                wm.add_free(Rect::new(seg.x, seg.height, w, rect.y - seg.height));
            }
        }
    }

    fn merge(&mut self) {
        let mut i = 1;
        while i < self.skyline.len() {
            if self.skyline[i - 1].height == self.skyline[i].height {
                let w = self.skyline[i].width;
                self.skyline[i - 1].width += w;
                self.skyline.remove(i);
            } else {
                i += 1;
            }
        }
    }
}
