use std::collections::HashMap;

use tileview_common::{Tile, WorldBounds};

/// Tiles per chunk edge.
pub const CHUNK_SIZE: i32 = 16;
/// Tiles per chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Integer tile position in the unbounded world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing this tile. Floor division, so `-1` lands in chunk `-1`.
    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord {
            x: self.x.div_euclid(CHUNK_SIZE),
            y: self.y.div_euclid(CHUNK_SIZE),
        }
    }

    /// Offset inside the owning chunk, each component in `0..CHUNK_SIZE`.
    pub fn local(self) -> (usize, usize) {
        (
            self.x.rem_euclid(CHUNK_SIZE) as usize,
            self.y.rem_euclid(CHUNK_SIZE) as usize,
        )
    }
}

/// Chunk address in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile coordinate of the chunk's bottom-left cell.
    pub fn origin_tile(self) -> TileCoord {
        TileCoord::new(self.x * CHUNK_SIZE, self.y * CHUNK_SIZE)
    }

    /// World extent of this chunk for a chunk edge of `chunk_world_size` units.
    pub fn world_bounds(self, chunk_world_size: f32) -> WorldBounds {
        let left = self.x as f32 * chunk_world_size;
        let bottom = self.y as f32 * chunk_world_size;
        WorldBounds::new(left, bottom, left + chunk_world_size, bottom + chunk_world_size)
    }
}

/// Fixed-size square block of tile cells.
#[derive(Debug, Clone)]
pub struct Chunk {
    coord: ChunkCoord,
    cells: Box<[Option<Tile>]>,
    occupied: usize,
}

impl Chunk {
    fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            cells: vec![None; CHUNK_AREA].into_boxed_slice(),
            occupied: 0,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Number of occupied cells.
    pub fn tile_count(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Tile at a local offset, `None` when empty or out of range.
    pub fn get_local(&self, x: usize, y: usize) -> Option<&Tile> {
        if x >= CHUNK_SIZE as usize || y >= CHUNK_SIZE as usize {
            return None;
        }
        self.cells[y * CHUNK_SIZE as usize + x].as_ref()
    }

    /// Occupied cells with their world tile coordinates, row by row from the
    /// bottom.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        let origin = self.coord.origin_tile();
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref().map(|tile| {
                let lx = (i % CHUNK_SIZE as usize) as i32;
                let ly = (i / CHUNK_SIZE as usize) as i32;
                (TileCoord::new(origin.x + lx, origin.y + ly), tile)
            })
        })
    }

    fn index(coord: TileCoord) -> usize {
        let (x, y) = coord.local();
        y * CHUNK_SIZE as usize + x
    }

    fn set(&mut self, coord: TileCoord, tile: Tile) -> Option<Tile> {
        let previous = self.cells[Self::index(coord)].replace(tile);
        if previous.is_none() {
            self.occupied += 1;
        }
        previous
    }

    fn take(&mut self, coord: TileCoord) -> Option<Tile> {
        let previous = self.cells[Self::index(coord)].take();
        if previous.is_some() {
            self.occupied -= 1;
        }
        previous
    }
}

/// Sparse, conceptually unbounded tile grid partitioned into chunks.
///
/// Chunks are keyed by coordinate in a hash map; lookup is O(1) and empty
/// regions cost nothing.
#[derive(Debug, Clone, Default)]
pub struct ChunkGrid {
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a tile, creating its chunk on first write. Returns the tile
    /// previously in that cell.
    pub fn set_tile(&mut self, coord: TileCoord, tile: Tile) -> Option<Tile> {
        let chunk_coord = coord.chunk();
        let chunk = self.chunks.entry(chunk_coord).or_insert_with(|| {
            tracing::trace!(?chunk_coord, "chunk created");
            Chunk::new(chunk_coord)
        });
        chunk.set(coord, tile)
    }

    /// Tile at a world tile coordinate. Absent chunks read as empty.
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        let (x, y) = coord.local();
        self.chunks.get(&coord.chunk())?.get_local(x, y)
    }

    /// Empty one cell. The chunk stays allocated even if it becomes empty.
    pub fn clear_tile(&mut self, coord: TileCoord) -> Option<Tile> {
        self.chunks.get_mut(&coord.chunk())?.take(coord)
    }

    pub fn has_chunk(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn remove_chunk(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Number of allocated chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of occupied cells across all chunks.
    pub fn tile_count(&self) -> usize {
        self.chunks.values().map(Chunk::tile_count).sum()
    }

    /// All allocated chunks, in no particular order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }
}
