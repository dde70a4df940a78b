use super::{Bin, BinState, Packer, leftovers, occupancy_of};
use crate::config::{GuillotineChoice, GuillotineSplit, PackerConfig};
use crate::error::{Result, check_dimensions};
use crate::model::{Rect, RectSize};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Guillotine packer: free space is a list of pairwise-disjoint rectangles.
///
/// Each placement goes into the corner of one free rectangle and the L-shaped
/// leftover is cut in two by a single straight cut.
#[derive(Debug, Clone)]
pub struct GuillotinePacker {
    allow_rotation: bool,
    state: BinState<GuillotineBin>,
}

/// Parameters of one guillotine insert, bundled for [`Packer::insert_with`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuillotineHeuristic {
    pub allow_merge: bool,
    pub choice: GuillotineChoice,
    pub split: GuillotineSplit,
}

impl Default for GuillotineHeuristic {
    fn default() -> Self {
        Self {
            allow_merge: true,
            choice: GuillotineChoice::BestAreaFit,
            split: GuillotineSplit::SplitShorterLeftoverAxis,
        }
    }
}

/// Free/used lists of a guillotine bin. Also serves as the skyline waste map,
/// where only the free list is live.
#[derive(Debug, Clone)]
pub(crate) struct GuillotineBin {
    width: u32,
    height: u32,
    free: Vec<Rect>,
    used: Vec<Rect>,
    used_area: u64,
}

impl Bin for GuillotineBin {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for GuillotinePacker {
    /// An uninitialized packer with rotation enabled; call [`Packer::init`] before inserting.
    fn default() -> Self {
        Self {
            allow_rotation: true,
            state: BinState::Uninitialized,
        }
    }
}

impl GuillotinePacker {
    /// Bin of `width x height` with 90° rotation allowed.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_rotation(width, height, true)
    }

    pub fn with_rotation(width: u32, height: u32, allow_rotation: bool) -> Result<Self> {
        let mut p = Self {
            allow_rotation,
            state: BinState::Uninitialized,
        };
        p.init(width, height)?;
        Ok(p)
    }

    pub fn from_config(cfg: &PackerConfig) -> Result<Self> {
        cfg.validate()?;
        Self::with_rotation(cfg.bin_width, cfg.bin_height, cfg.allow_rotation)
    }

    pub fn allow_rotation(&self) -> bool {
        self.allow_rotation
    }

    pub fn bin_size(&self) -> Option<(u32, u32)> {
        self.state.ready().map(Bin::size)
    }

    /// Current disjoint free rectangles (empty when uninitialized).
    pub fn free_rects(&self) -> &[Rect] {
        self.state
            .ready()
            .map(GuillotineBin::free_rects)
            .unwrap_or_default()
    }

    /// Places a `width x height` item. Returns `Rect::EMPTY` if it fits nowhere,
    /// in which case the free list is left untouched.
    pub fn insert(
        &mut self,
        width: u32,
        height: u32,
        allow_merge: bool,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Result<Rect> {
        let allow_rotation = self.allow_rotation;
        let bin = self.state.get_mut()?;
        check_dimensions(width, height)?;
        match bin.insert(width, height, allow_rotation, allow_merge, choice, split) {
            Some(node) => {
                bin.record(node);
                trace!(x = node.x, y = node.y, w = node.w, h = node.h, "guillotine placed");
                Ok(node)
            }
            None => {
                debug!(width, height, ?choice, "guillotine: no fit");
                Ok(Rect::EMPTY)
            }
        }
    }

    /// Places as many of `sizes` as possible, each round committing the
    /// (free rect, item) pair that scores best; an exact fit is taken at once.
    ///
    /// The result is aligned with `sizes`; `None` marks items that did not fit.
    #[instrument(skip_all, fields(count = sizes.len()))]
    pub fn insert_batch(
        &mut self,
        sizes: &[RectSize],
        allow_merge: bool,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Result<Vec<Option<Rect>>> {
        let allow_rotation = self.allow_rotation;
        let bin = self.state.get_mut()?;
        for s in sizes {
            check_dimensions(s.w, s.h)?;
        }
        let mut out = vec![None; sizes.len()];
        let mut remaining: Vec<usize> = (0..sizes.len()).collect();
        while !remaining.is_empty() {
            let mut best: Option<(usize, usize, Rect, i128)> = None;
            'search: for (fi, fr) in bin.free.iter().enumerate() {
                for (slot, &idx) in remaining.iter().enumerate() {
                    let s = sizes[idx];
                    for (w, h) in orientations(s.w, s.h, allow_rotation) {
                        if w == fr.w && h == fr.h {
                            best = Some((fi, slot, Rect::new(fr.x, fr.y, w, h), i128::MIN));
                            break 'search;
                        }
                        if w <= fr.w && h <= fr.h {
                            let score = score_choice(choice, fr, w, h);
                            if best.is_none_or(|(.., b)| score < b) {
                                best = Some((fi, slot, Rect::new(fr.x, fr.y, w, h), score));
                            }
                        }
                    }
                }
            }
            let Some((fi, slot, node, _)) = best else {
                break;
            };
            bin.place(fi, node, allow_merge, split);
            bin.record(node);
            out[remaining.remove(slot)] = Some(node);
        }
        debug!(
            placed = sizes.len() - remaining.len(),
            unplaced = remaining.len(),
            "guillotine batch done"
        );
        Ok(out)
    }

    /// Runs the merge pass on demand, e.g. after inserts made with `allow_merge = false`.
    pub fn merge_free_rects(&mut self) -> Result<()> {
        self.state.get_mut()?.merge_free_list();
        Ok(())
    }
}

impl Packer for GuillotinePacker {
    type Heuristic = GuillotineHeuristic;

    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        self.state.init(width, height, || GuillotineBin::new(width, height))?;
        debug!(width, height, "guillotine bin initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_ready()
    }

    fn insert_with(&mut self, width: u32, height: u32, heuristic: GuillotineHeuristic) -> Result<Rect> {
        self.insert(
            width,
            height,
            heuristic.allow_merge,
            heuristic.choice,
            heuristic.split,
        )
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

/// Unrotated first; the rotated form only when it differs.
fn orientations(w: u32, h: u32, allow_rotation: bool) -> impl Iterator<Item = (u32, u32)> {
    let rotated = (allow_rotation && w != h).then_some((h, w));
    std::iter::once((w, h)).chain(rotated)
}

/// Lower is better; Worst variants negate the Best ones.
fn score_choice(choice: GuillotineChoice, fr: &Rect, w: u32, h: u32) -> i128 {
    let (short_fit, long_fit, area_fit) = leftovers(fr, w, h);
    match choice {
        GuillotineChoice::BestAreaFit => area_fit,
        GuillotineChoice::BestShortSideFit => short_fit,
        GuillotineChoice::BestLongSideFit => long_fit,
        GuillotineChoice::WorstAreaFit => -area_fit,
        GuillotineChoice::WorstShortSideFit => -short_fit,
        GuillotineChoice::WorstLongSideFit => -long_fit,
    }
}

impl GuillotineBin {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let mut bin = Self::waste_map(width, height);
        bin.free.push(Rect::new(0, 0, width, height));
        bin
    }

    /// A bin with no free space yet; areas are donated through [`GuillotineBin::add_free`].
    pub(crate) fn waste_map(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            free: Vec::new(),
            used: Vec::new(),
            used_area: 0,
        }
    }

    pub(crate) fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    /// Adds a free area disjoint from every existing free rect.
    pub(crate) fn add_free(&mut self, r: Rect) {
        if !r.is_empty() {
            debug_assert!(self.free.iter().all(|f| !f.intersects(&r)));
            self.free.push(r);
        }
    }

    pub(crate) fn insert(
        &mut self,
        w: u32,
        h: u32,
        allow_rotation: bool,
        allow_merge: bool,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Option<Rect> {
        let (idx, node) = self.choose(w, h, allow_rotation, choice)?;
        self.place(idx, node, allow_merge, split);
        Some(node)
    }

    fn choose(
        &self,
        w: u32,
        h: u32,
        allow_rotation: bool,
        choice: GuillotineChoice,
    ) -> Option<(usize, Rect)> {
        let mut best: Option<(usize, Rect, i128)> = None;
        for (i, fr) in self.free.iter().enumerate() {
            for (rw, rh) in orientations(w, h, allow_rotation) {
                if rw == fr.w && rh == fr.h {
                    return Some((i, Rect::new(fr.x, fr.y, rw, rh)));
                }
                if rw <= fr.w && rh <= fr.h {
                    let s = score_choice(choice, fr, rw, rh);
                    if best.is_none_or(|(.., b)| s < b) {
                        best = Some((i, Rect::new(fr.x, fr.y, rw, rh), s));
                    }
                }
            }
        }
        best.map(|(i, r, _)| (i, r))
    }

    fn place(&mut self, idx: usize, placed: Rect, allow_merge: bool, split: GuillotineSplit) {
        let fr = self.free.remove(idx);
        let (a, b) = split_free_rect(split, &fr, &placed);
        self.free.extend(a);
        self.free.extend(b);
        if allow_merge {
            self.merge_free_list();
        }
    }

    /// Placements are tracked by the owning packer only; the waste map never records.
    fn record(&mut self, node: Rect) {
        self.used.push(node);
        self.used_area += node.area();
    }

    /// Coalesces free rects sharing a full edge until no such pair remains.
    fn merge_free_list(&mut self) {
        'restart: loop {
            for i in 0..self.free.len() {
                for j in i + 1..self.free.len() {
                    if let Some(m) = merge_pair(&self.free[i], &self.free[j]) {
                        self.free[i] = m;
                        self.free.remove(j);
                        continue 'restart;
                    }
                }
            }
            break;
        }
    }
}

fn merge_pair(a: &Rect, b: &Rect) -> Option<Rect> {
    // horizontal merge (same y, height, contiguous in x)
    if a.y == b.y && a.h == b.h {
        if a.right() == b.x {
            return Some(Rect::new(a.x, a.y, a.w + b.w, a.h));
        }
        if b.right() == a.x {
            return Some(Rect::new(b.x, a.y, a.w + b.w, a.h));
        }
    }
    // vertical merge (same x, width, contiguous in y)
    if a.x == b.x && a.w == b.w {
        if a.bottom() == b.y {
            return Some(Rect::new(a.x, a.y, a.w, a.h + b.h));
        }
        if b.bottom() == a.y {
            return Some(Rect::new(a.x, b.y, a.w, a.h + b.h));
        }
    }
    None
}

/// Cuts the leftover of `fr` around `placed` (top-left corner) into a bottom and a right piece.
fn split_free_rect(split: GuillotineSplit, fr: &Rect, placed: &Rect) -> (Option<Rect>, Option<Rect>) {
    let w = (fr.w - placed.w) as u64;
    let h = (fr.h - placed.h) as u64;
    let (pw, ph) = (placed.w as u64, placed.h as u64);

    // Horizontal cut: the bottom piece spans the full free width.
    let split_horizontal = match split {
        GuillotineSplit::SplitShorterLeftoverAxis => w <= h,
        GuillotineSplit::SplitLongerLeftoverAxis => w > h,
        GuillotineSplit::SplitMinimizeArea => pw * h > w * ph,
        GuillotineSplit::SplitMaximizeArea => pw * h <= w * ph,
        GuillotineSplit::SplitShorterAxis => fr.w <= fr.h,
        GuillotineSplit::SplitLongerAxis => fr.w > fr.h,
    };

    let mut bottom = Rect::new(fr.x, placed.bottom(), 0, fr.h - placed.h);
    let mut right = Rect::new(placed.right(), fr.y, fr.w - placed.w, 0);
    if split_horizontal {
        bottom.w = fr.w;
        right.h = placed.h;
    } else {
        bottom.w = placed.w;
        right.h = fr.h;
    }
    (
        (!bottom.is_empty()).then_some(bottom),
        (!right.is_empty()).then_some(right),
    )
}
