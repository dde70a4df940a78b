//! Online rectangle bin packing into a single fixed-size bin.
//!
//! - Algorithms: MaxRects (BSSF/BLSF/BAF/BL/CP), Guillotine (choice + split, optional merge),
//!   Shelf (NF/FF/BAF/WAF/BHF/BWF/WWF), Skyline (BL/MW + optional waste map)
//! - Each packer owns one bin; items are placed one at a time and never moved afterwards.
//! - A placement that does not fit comes back as the zero-area `Rect::EMPTY`; `Err` is
//!   reserved for misuse (uninitialized bin, zero-sized item).
//!
//! Quick example:
//! ```
//! use rect_packer_core::prelude::*;
//! # fn main() -> rect_packer_core::Result<()> {
//! let mut bin = MaxRectsPacker::new(100, 100)?;
//! let r = bin.insert(20, 20, MaxRectsHeuristic::BestShortSideFit)?;
//! assert_eq!(r.h, 20);
//! let r = bin.insert(200, 20, MaxRectsHeuristic::BestShortSideFit)?;
//! assert!(r.is_empty());
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod packer;

pub use config::*;
pub use error::*;
pub use model::*;
pub use packer::*;

/// Convenience prelude for common types and functions.
/// Importing `rect_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, PackerConfig, PackerConfigBuilder,
        ShelfHeuristic, SkylineHeuristic,
    };
    pub use crate::error::{PackError, Result};
    pub use crate::model::{Rect, RectSize};
    pub use crate::packer::guillotine::{GuillotineHeuristic, GuillotinePacker};
    pub use crate::packer::maxrects::MaxRectsPacker;
    pub use crate::packer::shelf::{Shelf, ShelfPacker};
    pub use crate::packer::skyline::{SkylinePacker, SkylineSegment};
    pub use crate::packer::Packer;
}
