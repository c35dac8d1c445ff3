//! Core library for packing sprites into a single fixed-size atlas.
//!
//! - Algorithm: guillotine partition tree with a greedy two-list candidate search
//!   (tallest items first, first fit, "right" candidates before "bottom" ones)
//! - Pipeline: `pack_sprites` takes in-memory images and returns the rendered atlas + layout
//! - Layout model is serde-serializable; JSON helpers live in `export`.
//!
//! Quick example:
//! ```
//! use spritepack_core::Packer;
//!
//! let mut packer = Packer::new(100, 100, 0);
//! packer.add("a", 40, 40)?;
//! packer.add("b", 40, 30)?;
//! packer.pack()?;
//! let origins: Vec<(u32, u32)> = packer.tree().placements().map(|n| (n.x(), n.y())).collect();
//! assert_eq!(origins, vec![(0, 0), (40, 0)]);
//! # Ok::<(), spritepack_core::SpritePackError>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod render;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use render::*;

/// Convenience prelude for common types and functions.
/// Importing `spritepack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackerConfig, PackerConfigBuilder};
    pub use crate::error::{Result, SpritePackError};
    pub use crate::model::{Bounds, Layout, Meta, PackStats, Placement};
    pub use crate::packer::{Content, NodeId, NodeState, Packer, PartitionNode, PartitionTree};
    pub use crate::{
        InputSprite, PackOutput, RenderOptions, SpritePixels, draw_debug_overlay, pack_sprites,
        render_atlas,
    };
}
