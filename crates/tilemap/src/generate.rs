use tileview_common::{SpriteHandle, Tile};

use crate::grid::{CHUNK_SIZE, ChunkGrid, TileCoord};

/// Splitmix64 step: fast, deterministic mixing of a 64-bit state.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn hash2(seed: u64, x: i32, y: i32) -> u64 {
    let packed = ((x as u32 as u64) << 32) | y as u32 as u64;
    splitmix64(seed ^ splitmix64(packed))
}

/// Deterministic procedural tile world for demos and benchmarks.
///
/// Chunks in a square of `radius_chunks` around the origin are populated;
/// a seeded fraction of chunks is left out entirely so the grid stays
/// sparse, and the rest are filled at `density`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldGen {
    pub seed: u64,
    pub radius_chunks: i32,
    /// Chance in `[0, 1]` that a cell in a populated chunk holds a tile.
    pub density: f32,
    /// Chance in `[0, 1]` that a chunk is skipped entirely.
    pub hole_chance: f32,
}

impl Default for WorldGen {
    fn default() -> Self {
        Self {
            seed: 42,
            radius_chunks: 8,
            density: 0.85,
            hole_chance: 0.2,
        }
    }
}

fn chance(hash: u64, p: f32) -> bool {
    ((hash >> 40) as f32 / (1u64 << 24) as f32) < p
}

impl WorldGen {
    /// Build the world, picking each tile's sprite from `palette`.
    ///
    /// The first palette entry is marked solid. An empty palette yields an
    /// empty grid.
    pub fn generate(&self, palette: &[SpriteHandle]) -> ChunkGrid {
        let _span = tracing::debug_span!("generate_world", seed = self.seed).entered();
        let mut grid = ChunkGrid::new();
        if palette.is_empty() {
            tracing::warn!("empty palette, generated world is empty");
            return grid;
        }

        let r = self.radius_chunks.max(0);
        for cy in -r..r {
            for cx in -r..r {
                if chance(hash2(self.seed ^ 0xc0ff_ee00, cx, cy), self.hole_chance) {
                    continue;
                }
                for ly in 0..CHUNK_SIZE {
                    for lx in 0..CHUNK_SIZE {
                        let coord = TileCoord::new(cx * CHUNK_SIZE + lx, cy * CHUNK_SIZE + ly);
                        let h = hash2(self.seed, coord.x, coord.y);
                        if !chance(h, self.density) {
                            continue;
                        }
                        let index = (h % palette.len() as u64) as usize;
                        let tile = if index == 0 {
                            Tile::solid(palette[index])
                        } else {
                            Tile::new(palette[index])
                        };
                        grid.set_tile(coord, tile);
                    }
                }
            }
        }

        tracing::debug!(
            chunks = grid.chunk_count(),
            tiles = grid.tile_count(),
            "world generated"
        );
        grid
    }
}
