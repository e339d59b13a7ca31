//! Tilemap: sparse chunked tile storage and chunk-level visibility culling.
//!
//! # Invariants
//! - A chunk exists iff a tile inside it has been written; absent chunks
//!   never allocate.
//! - Chunks are only destroyed through explicit `remove_chunk` / `clear`.
//! - Culling never misses a stored chunk whose extent meets the view
//!   bounds; extra chunks just outside are allowed.
//!
//! Per-frame culling cost is bounded by the visible chunk range (or by the
//! number of stored chunks, whichever is smaller), never by world size.

mod cull;
mod generate;
mod grid;

pub use cull::{ChunkCuller, ChunkRange, CullError, CullStats};
pub use generate::WorldGen;
pub use grid::{CHUNK_AREA, CHUNK_SIZE, Chunk, ChunkCoord, ChunkGrid, TileCoord};

pub fn crate_info() -> &'static str {
    "tileview-tilemap v0.1.0"
}
