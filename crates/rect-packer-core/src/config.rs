//! Heuristics and bin configuration.
//! Key notes:
//!   - heuristics are per-call values passed to `insert`, never stored by a packer
//!   - `PackerConfig` carries only what is fixed for the lifetime of a bin
//!   - every enum parses from its long name or a short abbreviation, case-insensitive

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// MaxRects free-rectangle choice heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MaxRectsHeuristic {
    /// Smallest leftover on the shorter side, then on the longer side.
    BestShortSideFit,
    /// Smallest leftover on the longer side, then on the shorter side.
    BestLongSideFit,
    /// Smallest leftover area, then shorter-side leftover.
    BestAreaFit,
    /// Lowest top edge (`y + h`), then lowest `x` (Tetris-style placement).
    BottomLeftRule,
    /// Longest perimeter touching placed rectangles or the bin border.
    ContactPointRule,
}

impl FromStr for MaxRectsHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bl" | "bottomleft" | "bottomleftrule" => Ok(Self::BottomLeftRule),
            "cp" | "contactpoint" | "contactpointrule" => Ok(Self::ContactPointRule),
            _ => Err(()),
        }
    }
}

/// Guillotine free-rect choice heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineChoice {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl FromStr for GuillotineChoice {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "waf" | "worstareafit" => Ok(Self::WorstAreaFit),
            "wssf" | "worstshortsidefit" => Ok(Self::WorstShortSideFit),
            "wlsf" | "worstlongsidefit" => Ok(Self::WorstLongSideFit),
            _ => Err(()),
        }
    }
}

/// Guillotine split axis heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineSplit {
    SplitShorterLeftoverAxis,
    SplitLongerLeftoverAxis,
    SplitMinimizeArea,
    SplitMaximizeArea,
    SplitShorterAxis,
    SplitLongerAxis,
}

impl FromStr for GuillotineSplit {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "splitshorterleftoveraxis" => Ok(Self::SplitShorterLeftoverAxis),
            "llas" | "splitlongerleftoveraxis" => Ok(Self::SplitLongerLeftoverAxis),
            "minas" | "splitminimizearea" => Ok(Self::SplitMinimizeArea),
            "maxas" | "splitmaximizearea" => Ok(Self::SplitMaximizeArea),
            "sas" | "splitshorteraxis" => Ok(Self::SplitShorterAxis),
            "las" | "splitlongeraxis" => Ok(Self::SplitLongerAxis),
            _ => Err(()),
        }
    }
}

/// Shelf choice heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShelfHeuristic {
    /// Only the most recently opened shelf is considered.
    NextFit,
    /// First shelf, in opening order, that admits the item.
    FirstFit,
    /// Shelf with the least remaining area.
    BestAreaFit,
    /// Shelf with the most remaining area.
    WorstAreaFit,
    /// Shelf whose height exceeds the item's by the least.
    BestHeightFit,
    /// Shelf with the least remaining width after placement.
    BestWidthFit,
    /// Shelf with the most remaining width after placement.
    WorstWidthFit,
}

impl FromStr for ShelfHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nf" | "nextfit" => Ok(Self::NextFit),
            "ff" | "firstfit" => Ok(Self::FirstFit),
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "waf" | "worstareafit" => Ok(Self::WorstAreaFit),
            "bhf" | "bestheightfit" => Ok(Self::BestHeightFit),
            "bwf" | "bestwidthfit" => Ok(Self::BestWidthFit),
            "wwf" | "worstwidthfit" => Ok(Self::WorstWidthFit),
            _ => Err(()),
        }
    }
}

/// Skyline placement heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SkylineHeuristic {
    BottomLeft,
    MinWasteFit,
}

impl FromStr for SkylineHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bl" | "bottomleft" | "levelbottomleft" => Ok(Self::BottomLeft),
            "mw" | "minwaste" | "minwastefit" | "levelminwastefit" => Ok(Self::MinWasteFit),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackerConfig {
    /// Bin width in pixels.
    pub bin_width: u32,
    /// Bin height in pixels.
    pub bin_height: u32,
    /// Allow 90° rotations for placements where beneficial.
    #[serde(default = "default_allow_rotation")]
    pub allow_rotation: bool,
    /// Skyline only: recover the gaps left under placements through a guillotine free list.
    #[serde(default)]
    pub use_waste_map: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            bin_width: 1024,
            bin_height: 1024,
            allow_rotation: default_allow_rotation(),
            use_waste_map: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if either bin dimension is zero.
    pub fn validate(&self) -> crate::error::Result<()> {
        crate::error::check_dimensions(self.bin_width, self.bin_height)
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn default_allow_rotation() -> bool {
    true
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_bin_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.bin_width = w;
        self.cfg.bin_height = h;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn use_waste_map(mut self, v: bool) -> Self {
        self.cfg.use_waste_map = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}
