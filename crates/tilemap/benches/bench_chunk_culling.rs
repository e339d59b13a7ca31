use std::hint::black_box;
use std::time::Instant;

use tileview_common::{SpriteHandle, TextureId, Tile, WorldBounds};
use tileview_tilemap::{CHUNK_SIZE, ChunkCuller, ChunkGrid, TileCoord};

const TILE_SIZE: f32 = 16.0;

/// Square world of `side` x `side` chunks, one tile per chunk.
fn make_grid(side: i32) -> ChunkGrid {
    let mut grid = ChunkGrid::new();
    let tile = Tile::new(SpriteHandle::new(TextureId(1), 16, 16));
    for cx in -side / 2..side / 2 {
        for cy in -side / 2..side / 2 {
            grid.set_tile(TileCoord::new(cx * CHUNK_SIZE, cy * CHUNK_SIZE), tile);
        }
    }
    grid
}

fn bench_cull(side: i32, view_w: f32, view_h: f32, iterations: usize) {
    let grid = make_grid(side);
    let mut culler = ChunkCuller::new(TILE_SIZE).expect("valid tile size");

    let start = Instant::now();
    for i in 0..iterations {
        // Simulate a panning camera
        let x = (i % 64) as f32 * 8.0;
        let bounds = WorldBounds::new(x, 0.0, x + view_w, view_h);
        let _ = black_box(culler.cull(black_box(&grid), black_box(&bounds)).len());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  cull ({} chunks, view {view_w}x{view_h}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}, visible {}",
        grid.chunk_count(),
        culler.last_stats().visible
    );
}

fn bench_tile_writes(tiles_per_side: i32) {
    let tile = Tile::new(SpriteHandle::new(TextureId(1), 16, 16));
    let mut grid = ChunkGrid::new();

    let start = Instant::now();
    for x in 0..tiles_per_side {
        for y in 0..tiles_per_side {
            grid.set_tile(black_box(TileCoord::new(x, y)), tile);
        }
    }
    let elapsed = start.elapsed();
    println!(
        "  set_tile ({} tiles, {} chunks): total {elapsed:?}",
        grid.tile_count(),
        grid.chunk_count()
    );
}

fn main() {
    println!("=== Chunk Culling Benchmarks ===\n");

    println!("Cull, fixed view, growing world:");
    bench_cull(16, 640.0, 480.0, 10000);
    bench_cull(48, 640.0, 480.0, 10000);
    bench_cull(96, 640.0, 480.0, 10000);

    println!("\nCull, zoomed-out view:");
    bench_cull(48, 16384.0, 12288.0, 1000);
    bench_cull(96, 32768.0, 24576.0, 100);

    println!("\nTile writes:");
    bench_tile_writes(256);
    bench_tile_writes(1024);

    println!("\n=== Done ===");
}
