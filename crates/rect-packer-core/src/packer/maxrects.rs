use super::{Bin, BinState, Packer, leftovers, occupancy_of};
use crate::config::{MaxRectsHeuristic, PackerConfig};
use crate::error::{Result, check_dimensions};
use crate::model::{Rect, RectSize, overlap_1d};
use tracing::{debug, instrument, trace};

/// MaxRects packer: keeps every maximal free rectangle of the bin.
///
/// Free rectangles may overlap each other; after each placement the ones that
/// intersect the new rectangle are split into up to four maximal pieces and any
/// piece contained in another free rectangle is pruned.
#[derive(Debug, Clone)]
pub struct MaxRectsPacker {
    allow_rotation: bool,
    state: BinState<MaxRectsBin>,
}

#[derive(Debug, Clone)]
struct MaxRectsBin {
    width: u32,
    height: u32,
    free: Vec<Rect>,
    used: Vec<Rect>,
    used_area: u64,
}

impl Bin for MaxRectsBin {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Lower is better in both components.
type Score = (i128, i128);

impl Default for MaxRectsPacker {
    /// An uninitialized packer with rotation enabled; call [`Packer::init`] before inserting.
    fn default() -> Self {
        Self {
            allow_rotation: true,
            state: BinState::Uninitialized,
        }
    }
}

impl MaxRectsPacker {
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

    /// Current maximal free rectangles (empty when uninitialized).
    pub fn free_rects(&self) -> &[Rect] {
        self.state
            .ready()
            .map(|b| b.free.as_slice())
            .unwrap_or_default()
    }

    /// Places a `width x height` item. Returns `Rect::EMPTY` if it fits nowhere,
    /// in which case the free list is left untouched.
    pub fn insert(&mut self, width: u32, height: u32, heuristic: MaxRectsHeuristic) -> Result<Rect> {
        let allow_rotation = self.allow_rotation;
        let bin = self.state.get_mut()?;
        check_dimensions(width, height)?;
        match bin.find_position(width, height, heuristic, allow_rotation) {
            Some((node, _)) => {
                bin.place_rect(node);
                trace!(x = node.x, y = node.y, w = node.w, h = node.h, "maxrects placed");
                Ok(node)
            }
            None => {
                debug!(width, height, ?heuristic, "maxrects: no fit");
                Ok(Rect::EMPTY)
            }
        }
    }

    /// Places as many of `sizes` as possible, each round committing the item whose
    /// best position scores best across all remaining items.
    ///
    /// The result is aligned with `sizes`; `None` marks items that did not fit.
    #[instrument(skip_all, fields(count = sizes.len()))]
    pub fn insert_batch(
        &mut self,
        sizes: &[RectSize],
        heuristic: MaxRectsHeuristic,
    ) -> Result<Vec<Option<Rect>>> {
        let allow_rotation = self.allow_rotation;
        let bin = self.state.get_mut()?;
        for s in sizes {
            check_dimensions(s.w, s.h)?;
        }
        let mut out = vec![None; sizes.len()];
        let mut remaining: Vec<usize> = (0..sizes.len()).collect();
        while !remaining.is_empty() {
            let mut best: Option<(usize, Rect, Score)> = None;
            for (slot, &idx) in remaining.iter().enumerate() {
                let s = sizes[idx];
                if let Some((node, score)) = bin.find_position(s.w, s.h, heuristic, allow_rotation) {
                    if best.is_none_or(|(_, _, b)| score < b) {
                        best = Some((slot, node, score));
                    }
                }
            }
            let Some((slot, node, _)) = best else {
                break;
            };
            bin.place_rect(node);
            out[remaining.remove(slot)] = Some(node);
        }
        debug!(
            placed = sizes.len() - remaining.len(),
            unplaced = remaining.len(),
            "maxrects batch done"
        );
        Ok(out)
    }
}

impl Packer for MaxRectsPacker {
    type Heuristic = MaxRectsHeuristic;

    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        self.state.init(width, height, || MaxRectsBin::new(width, height))?;
        debug!(width, height, "maxrects bin initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_ready()
    }

    fn insert_with(&mut self, width: u32, height: u32, heuristic: MaxRectsHeuristic) -> Result<Rect> {
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

impl MaxRectsBin {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            free: vec![Rect::new(0, 0, width, height)],
            used: Vec::new(),
            used_area: 0,
        }
    }

    fn find_position(
        &self,
        w: u32,
        h: u32,
        heuristic: MaxRectsHeuristic,
        allow_rotation: bool,
    ) -> Option<(Rect, Score)> {
        let mut best: Option<(Rect, Score)> = None;
        let mut consider = |node: Rect, score: Score| {
            if best.is_none_or(|(_, b)| score < b) {
                best = Some((node, score));
            }
        };
        for fr in &self.free {
            if fr.w >= w && fr.h >= h {
                let node = Rect::new(fr.x, fr.y, w, h);
                consider(node, self.score(fr, &node, heuristic));
            }
            if allow_rotation && w != h && fr.w >= h && fr.h >= w {
                let node = Rect::new(fr.x, fr.y, h, w);
                consider(node, self.score(fr, &node, heuristic));
            }
        }
        best
    }

    fn score(&self, fr: &Rect, node: &Rect, heuristic: MaxRectsHeuristic) -> Score {
        let (short_fit, long_fit, area_fit) = leftovers(fr, node.w, node.h);
        match heuristic {
            MaxRectsHeuristic::BestShortSideFit => (short_fit, long_fit),
            MaxRectsHeuristic::BestLongSideFit => (long_fit, short_fit),
            MaxRectsHeuristic::BestAreaFit => (area_fit, short_fit),
            MaxRectsHeuristic::BottomLeftRule => (node.bottom() as i128, node.x as i128),
            // maximize contact: negate for minimization
            MaxRectsHeuristic::ContactPointRule => (-(self.contact_point_score(node) as i128), 0),
        }
    }

    /// Length of `node`'s perimeter that touches the bin border or a placed rectangle.
    fn contact_point_score(&self, node: &Rect) -> u64 {
        let mut score = 0u64;
        if node.x == 0 {
            score += node.h as u64;
        }
        if node.right() == self.width {
            score += node.h as u64;
        }
        if node.y == 0 {
            score += node.w as u64;
        }
        if node.bottom() == self.height {
            score += node.w as u64;
        }
        for u in &self.used {
            // vertical contact (left/right edges)
            if node.x == u.right() || u.x == node.right() {
                score += overlap_1d(node.y, node.bottom(), u.y, u.bottom()) as u64;
            }
            // horizontal contact (top/bottom edges)
            if node.y == u.bottom() || u.y == node.bottom() {
                score += overlap_1d(node.x, node.right(), u.x, u.right()) as u64;
            }
        }
        score
    }

    fn place_rect(&mut self, node: Rect) {
        let mut new_free: Vec<Rect> = Vec::new();
        self.free.retain(|fr| {
            if fr.intersects(&node) {
                split_free_node(fr, &node, &mut new_free);
                false
            } else {
                true
            }
        });
        prune_within(&mut new_free);
        // new pieces dominated by survivors, and survivors dominated by new pieces
        new_free.retain(|nr| !self.free.iter().any(|of| of.contains(nr)));
        self.free.retain(|of| !new_free.iter().any(|nr| nr.contains(of)));
        self.free.append(&mut new_free);

        self.used.push(node);
        self.used_area += node.area();
    }
}

/// Pushes the maximal pieces of `fr` lying above, below, left and right of `node`.
fn split_free_node(fr: &Rect, node: &Rect, out: &mut Vec<Rect>) {
    // Top
    if node.y > fr.y && node.y < fr.bottom() {
        out.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
    }
    // Bottom
    if node.bottom() < fr.bottom() {
        out.push(Rect::new(fr.x, node.bottom(), fr.w, fr.bottom() - node.bottom()));
    }
    // Left
    if node.x > fr.x && node.x < fr.right() {
        out.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
    }
    // Right
    if node.right() < fr.right() {
        out.push(Rect::new(node.right(), fr.y, fr.right() - node.right(), fr.h));
    }
}

/// Removes rects contained in another rect of the same list (keeps one of any duplicates).
fn prune_within(v: &mut Vec<Rect>) {
    let mut i = 0;
    while i < v.len() {
        let a = v[i];
        let dominated = v.iter().enumerate().any(|(j, b)| j != i && b.contains(&a));
        if a.is_empty() || dominated {
            v.remove(i);
        } else {
            i += 1;
        }
    }
}
