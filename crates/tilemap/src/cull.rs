use tileview_common::WorldBounds;

use crate::grid::{CHUNK_SIZE, ChunkCoord, ChunkGrid};

/// Errors from configuring a culler.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CullError {
    #[error("tile size must be a positive finite number, got {0}")]
    InvalidTileSize(f32),
}

/// Inclusive rectangle of chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl ChunkRange {
    /// Chunks that may intersect `bounds`: floor of the low edges, ceil of
    /// the high edges. Float-to-int conversion saturates.
    pub fn from_bounds(bounds: &WorldBounds, chunk_world_size: f32) -> Self {
        Self {
            start_x: (bounds.left / chunk_world_size).floor() as i32,
            start_y: (bounds.bottom / chunk_world_size).floor() as i32,
            end_x: (bounds.right / chunk_world_size).ceil() as i32,
            end_y: (bounds.top / chunk_world_size).ceil() as i32,
        }
    }

    /// Number of coordinates in the range.
    pub fn cell_count(&self) -> u64 {
        let w = i64::from(self.end_x) - i64::from(self.start_x) + 1;
        let h = i64::from(self.end_y) - i64::from(self.start_y) + 1;
        if w <= 0 || h <= 0 {
            return 0;
        }
        (w as u64).saturating_mul(h as u64)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        coord.x >= self.start_x
            && coord.x <= self.end_x
            && coord.y >= self.start_y
            && coord.y <= self.end_y
    }

    /// Coordinates in row-major order (y, then x).
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        (self.start_y..=self.end_y)
            .flat_map(move |y| (self.start_x..=self.end_x).map(move |x| ChunkCoord::new(x, y)))
    }
}

/// Result of the most recent cull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    /// Coordinates covered by the view's chunk range.
    pub range_cells: u64,
    /// Stored chunks returned.
    pub visible: usize,
}

/// Maps camera world bounds to the stored chunks that may be visible.
///
/// Keeps its output buffer between frames.
#[derive(Debug, Clone)]
pub struct ChunkCuller {
    chunk_world_size: f32,
    visible: Vec<ChunkCoord>,
    stats: CullStats,
}

impl ChunkCuller {
    /// Culler for tiles of `tile_size` world units.
    pub fn new(tile_size: f32) -> Result<Self, CullError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            tracing::warn!(tile_size, "rejected culler tile size");
            return Err(CullError::InvalidTileSize(tile_size));
        }
        Ok(Self {
            chunk_world_size: CHUNK_SIZE as f32 * tile_size,
            visible: Vec::new(),
            stats: CullStats::default(),
        })
    }

    /// World units per chunk edge.
    pub fn chunk_world_size(&self) -> f32 {
        self.chunk_world_size
    }

    pub fn last_stats(&self) -> CullStats {
        self.stats
    }

    /// Stored chunks in the range covering `bounds`, row-major.
    pub fn cull(&mut self, grid: &ChunkGrid, bounds: &WorldBounds) -> &[ChunkCoord] {
        self.visible.clear();

        if bounds.to_array().iter().any(|v| v.is_nan()) {
            tracing::warn!(?bounds, "cannot cull against NaN bounds");
            self.stats = CullStats::default();
            return &self.visible;
        }

        let range = ChunkRange::from_bounds(bounds, self.chunk_world_size);
        let range_cells = range.cell_count();

        if range_cells <= grid.chunk_count() as u64 {
            self.visible
                .extend(range.iter().filter(|c| grid.has_chunk(*c)));
        } else {
            // Zoomed far out: fewer stored chunks than coordinates in view.
            self.visible
                .extend(grid.chunks().map(|c| c.coord()).filter(|c| range.contains(*c)));
            self.visible.sort_unstable_by_key(|c| (c.y, c.x));
        }

        self.stats = CullStats {
            range_cells,
            visible: self.visible.len(),
        };
        tracing::trace!(
            range_cells,
            visible = self.visible.len(),
            stored = grid.chunk_count(),
            "chunks culled"
        );
        &self.visible
    }
}
