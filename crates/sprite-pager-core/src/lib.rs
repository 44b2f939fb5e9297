//! Core library for packing sprite rectangles onto as few, as small pages as possible.
//!
//! - Algorithm: MaxRects with five heuristics (BSSF/BLSF/BAF/BL/CP), all tried per page size
//! - Search: binary search over page width and height, optionally over powers of two
//! - Pipeline: `pack_sprites` pads the inputs and fills pages until every sprite is placed
//! - Writers: line-oriented descriptor (`descriptor`) and JSON (`export`)
//!
//! Quick example:
//! ```
//! use sprite_pager_core::{PackerConfig, pack_layout};
//! # fn main() -> sprite_pager_core::Result<()> {
//! let cfg = PackerConfig::builder()
//!     .with_max_dimensions(256, 256)
//!     .padding(0, 0)
//!     .build();
//! let atlas = pack_layout(vec![("hero", 100, 100), ("coin", 50, 50), ("gem", 50, 50)], cfg)?;
//! assert_eq!(atlas.pages.len(), 1);
//! # Ok(()) }
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod search;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `sprite_pager_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{MaxRectsHeuristic, PackMode, PackerConfig, PackerConfigBuilder};
    pub use crate::descriptor::{Canvas, to_descriptor};
    pub use crate::model::{Alias, Atlas, Meta, PackStats, Page, Rect, Region, Sprite};
    pub use crate::packer::maxrects::MaxRectsPacker;
    pub use crate::{SpriteInput, pack_layout, pack_pages, pack_sprites};
}
