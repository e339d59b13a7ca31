use glam::Vec2;
use tileview_tilemap::{ChunkCuller, ChunkGrid, CullError, CullStats};
use tileview_view::Camera;

use crate::backend::DrawBackend;
use crate::batch::{BatchStats, SpriteBatch, SpriteDraw};

/// Per-frame counters from [`TileRenderer::render_frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub cull: CullStats,
    pub batch: BatchStats,
}

/// Feeds the tiles of visible chunks into a [`SpriteBatch`].
///
/// Tile `(tx, ty)` covers `[tx * s, (tx + 1) * s) x [ty * s, (ty + 1) * s)`
/// in world units, with `s` the tile size.
#[derive(Debug, Clone)]
pub struct TileRenderer {
    tile_size: f32,
    tile_z: f32,
    culler: ChunkCuller,
}

impl TileRenderer {
    /// Fails if `tile_size` is not a positive finite number.
    pub fn new(tile_size: f32) -> Result<Self, CullError> {
        Ok(Self {
            tile_size,
            tile_z: 0.0,
            culler: ChunkCuller::new(tile_size)?,
        })
    }

    /// Depth tiles are submitted at. Defaults to 0.
    pub fn with_tile_z(mut self, z: f32) -> Self {
        self.tile_z = z;
        self
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn tile_z(&self) -> f32 {
        self.tile_z
    }

    pub fn culler(&self) -> &ChunkCuller {
        &self.culler
    }

    /// Cull against the camera and submit every tile of every visible chunk.
    ///
    /// The batch must be recording; see [`SpriteBatch::begin`].
    pub fn submit_visible(
        &mut self,
        camera: &Camera,
        grid: &ChunkGrid,
        batch: &mut SpriteBatch,
    ) -> CullStats {
        let size = self.tile_size;
        let z = self.tile_z;
        let bounds = camera.world_bounds();

        for coord in self.culler.cull(grid, &bounds) {
            let Some(chunk) = grid.chunk(*coord) else {
                continue;
            };
            for (tile_coord, tile) in chunk.tiles() {
                let position = Vec2::new(tile_coord.x as f32 * size, tile_coord.y as f32 * size);
                batch.submit(
                    SpriteDraw::new(tile.sprite, position, Vec2::splat(size))
                        .with_origin(Vec2::ZERO)
                        .with_z(z),
                );
            }
        }

        self.culler.last_stats()
    }

    /// One full pass: begin, submit visible tiles, end into `backend`.
    pub fn render_frame<B: DrawBackend + ?Sized>(
        &mut self,
        camera: &Camera,
        grid: &ChunkGrid,
        batch: &mut SpriteBatch,
        backend: &mut B,
    ) -> FrameStats {
        let _span = tracing::debug_span!("render_frame").entered();

        batch.begin();
        let cull = self.submit_visible(camera, grid, batch);
        let batch = batch.end(backend);

        tracing::trace!(
            chunks = cull.visible,
            sprites = batch.drawn,
            runs = batch.runs,
            "frame submitted"
        );
        FrameStats { cull, batch }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DebugTextBackend;
    use tileview_common::{SpriteHandle, TextureId, Tile};
    use tileview_tilemap::TileCoord;
    use tileview_view::ViewportConfig;

    fn camera() -> Camera {
        // 640x480 game, ortho 240 => view spans [-320, 320] x [-240, 240].
        let vp = ViewportConfig::new(640, 480, 640, 480).unwrap();
        Camera::new(&vp)
    }

    fn tile(texture: u32) -> Tile {
        Tile::new(SpriteHandle::new(TextureId(texture), 16, 16))
    }

    #[test]
    fn tiles_placed_at_bottom_left_of_their_cell() {
        let mut grid = ChunkGrid::new();
        grid.set_tile(TileCoord::new(2, -3), tile(1));

        let mut renderer = TileRenderer::new(16.0).unwrap().with_tile_z(-5.0);
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();
        let stats = renderer.render_frame(&camera(), &grid, &mut batch, &mut backend);

        assert_eq!(stats.batch.drawn, 1);
        let d = backend.draw_order()[0];
        assert_eq!(d.position, Vec2::new(32.0, -48.0));
        assert_eq!(d.size, Vec2::splat(16.0));
        assert_eq!(d.z, -5.0);
        assert_eq!(d.corners()[2], Vec2::new(48.0, -32.0));
    }

    #[test]
    fn far_away_chunks_not_submitted() {
        let mut grid = ChunkGrid::new();
        grid.set_tile(TileCoord::new(0, 0), tile(1));
        grid.set_tile(TileCoord::new(10_000, 10_000), tile(1));

        let mut renderer = TileRenderer::new(16.0).unwrap();
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();
        let stats = renderer.render_frame(&camera(), &grid, &mut batch, &mut backend);

        assert_eq!(stats.cull.visible, 1);
        assert_eq!(stats.batch.drawn, 1);
    }

    #[test]
    fn null_tiles_are_skipped() {
        let mut grid = ChunkGrid::new();
        grid.set_tile(TileCoord::new(0, 0), Tile::new(SpriteHandle::NULL));
        grid.set_tile(TileCoord::new(1, 0), tile(2));

        let mut renderer = TileRenderer::new(16.0).unwrap();
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();
        let stats = renderer.render_frame(&camera(), &grid, &mut batch, &mut backend);

        assert_eq!(stats.batch.submitted, 2);
        assert_eq!(stats.batch.skipped, 1);
        assert_eq!(stats.batch.drawn, 1);
    }

    #[test]
    fn submit_visible_composes_with_scene_sprites() {
        let mut grid = ChunkGrid::new();
        grid.set_tile(TileCoord::new(0, 0), tile(1));

        let mut renderer = TileRenderer::new(16.0).unwrap();
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();

        batch.begin();
        let player = SpriteHandle::new(TextureId(9), 16, 16);
        batch.submit(SpriteDraw::new(player, Vec2::ZERO, Vec2::splat(16.0)).with_z(1.0));
        renderer.submit_visible(&camera(), &grid, &mut batch);
        let stats = batch.end(&mut backend);

        assert_eq!(stats.runs, 2);
        let order = backend.draw_order();
        assert_eq!(order[0].sprite.texture, TextureId(1));
        assert_eq!(order[1].sprite.texture, TextureId(9));
    }

    #[test]
    fn non_positive_tile_size_is_rejected() {
        assert_eq!(
            TileRenderer::new(0.0).unwrap_err(),
            CullError::InvalidTileSize(0.0)
        );
        assert!(TileRenderer::new(-1.0).is_err());
    }
}
