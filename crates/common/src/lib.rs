//! Shared types for the tileview camera and tile rendering pipeline.
//!
//! # Invariants
//! - Sprite handles are opaque; only the asset layer mints valid ones.
//! - World bounds are axis-aligned in the centred, +Y up world space.

mod bounds;
mod types;

pub use bounds::WorldBounds;
pub use types::{Color, SpriteHandle, TextureId, Tile};

pub fn crate_info() -> &'static str {
    "tileview-common v0.1.0"
}
