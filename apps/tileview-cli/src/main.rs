use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use glam::{Vec2, Vec3};
use tileview_common::{SpriteHandle, TextureId};
use tileview_render::{DebugTextBackend, SpriteBatch, TileRenderer};
use tileview_tilemap::{ChunkRange, WorldGen};
use tileview_view::{Camera, ViewSettings, ViewportConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tileview-cli", about = "CLI tool for tileview view and culling operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML view settings; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Camera placement shared by the view commands.
#[derive(Args, Debug, Clone, Copy)]
struct CameraArgs {
    /// Camera centre, world x
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    cam_x: f32,
    /// Camera centre, world y
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    cam_y: f32,
    /// Rotation in degrees, counter-clockwise
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    rotation: f32,
    /// Zoom multiplier; overrides the configured zoom
    #[arg(long)]
    zoom: Option<f32>,
}

/// Procedural world shared by the culling commands.
#[derive(Args, Debug, Clone, Copy)]
struct WorldArgs {
    /// World generation seed
    #[arg(short, long, default_value = "42")]
    seed: u64,
    /// Half-width of the generated world in chunks
    #[arg(long, default_value = "16")]
    radius: i32,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and the effective settings
    Info,
    /// Trace a window point through window -> game -> NDC -> world and back
    Convert {
        #[arg(short, long, allow_hyphen_values = true)]
        x: f32,
        #[arg(short, long, allow_hyphen_values = true)]
        y: f32,
        /// Window size as WIDTHxHEIGHT; defaults to the configured window
        #[arg(long, value_parser = parse_size)]
        window: Option<(u32, u32)>,
        #[command(flatten)]
        camera: CameraArgs,
    },
    /// Cull a procedural world against the camera and report the visible chunks
    ///
    /// Culling depends only on the game resolution and the camera; the window
    /// size sets the reported scale and where the view bounds land on screen.
    Cull {
        /// Window width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Window height in pixels
        #[arg(long)]
        height: Option<u32>,
        #[command(flatten)]
        camera: CameraArgs,
        #[command(flatten)]
        world: WorldArgs,
    },
    /// Run one frame through the text backend and print the draw listing
    Frame {
        /// Print at most this many lines of the listing
        #[arg(long, default_value = "40")]
        lines: usize,
        #[command(flatten)]
        camera: CameraArgs,
        #[command(flatten)]
        world: WorldArgs,
    },
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn describe_viewport(viewport: &ViewportConfig) -> String {
    format!(
        "viewport: window {}x{}, game {}x{}, scale {:.4}, offset ({:.2}, {:.2})",
        viewport.window_width(),
        viewport.window_height(),
        viewport.game_width(),
        viewport.game_height(),
        viewport.scale(),
        viewport.offset_x(),
        viewport.offset_y()
    )
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<ViewSettings> {
    match path {
        Some(path) => ViewSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(ViewSettings::default()),
    }
}

fn build_camera(settings: &ViewSettings, viewport: &ViewportConfig, args: CameraArgs) -> Camera {
    let mut camera = settings.camera(viewport);
    camera.set_position(Vec3::new(args.cam_x, args.cam_y, 0.0));
    camera.set_rotation(args.rotation);
    if let Some(zoom) = args.zoom {
        camera.set_zoom(zoom);
    }
    camera
}

/// Four atlas cells of texture 1.
fn palette() -> Vec<SpriteHandle> {
    (0..4)
        .map(|i| {
            let u = i as f32 * 0.25;
            SpriteHandle::new(TextureId(1), 16, 16).with_uv([u, 0.0, u + 0.25, 1.0])
        })
        .collect()
}

fn generate(world: WorldArgs) -> tileview_tilemap::ChunkGrid {
    WorldGen {
        seed: world.seed,
        radius_chunks: world.radius,
        ..WorldGen::default()
    }
    .generate(&palette())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = load_settings(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("tileview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tileview_common::crate_info());
            println!("view: {}", tileview_view::crate_info());
            println!("tilemap: {}", tileview_tilemap::crate_info());
            println!("render: {}", tileview_render::crate_info());
            println!("--- settings ---");
            print!("{}", settings.to_yaml_string()?);
        }
        Commands::Convert {
            x,
            y,
            window,
            camera,
        } => {
            let mut viewport = settings.viewport()?;
            if let Some((w, h)) = window {
                viewport.set_window_size(w, h);
            }
            let camera = build_camera(&settings, &viewport, camera);

            let screen = Vec2::new(x, y);
            let game = camera.window_to_game(&viewport, screen);
            let ndc = camera.game_to_ndc(game);
            let world = camera.ndc_to_world(ndc, camera.position().z);
            let back = camera.world_to_screen_point(&viewport, world);

            println!("{}", describe_viewport(&viewport));
            println!("window: ({:.3}, {:.3})", screen.x, screen.y);
            println!(
                "game:   ({:.3}, {:.3}) inside={}",
                game.x,
                game.y,
                viewport.is_in_game_viewport(x, y)
            );
            println!("ndc:    ({:.4}, {:.4})", ndc.x, ndc.y);
            println!("world:  ({:.3}, {:.3}, {:.3})", world.x, world.y, world.z);
            println!("back:   ({:.3}, {:.3})", back.x, back.y);
        }
        Commands::Cull {
            width,
            height,
            camera,
            world,
        } => {
            let mut viewport = settings.viewport()?;
            viewport.set_window_size(
                width.unwrap_or(settings.window_width),
                height.unwrap_or(settings.window_height),
            );
            let camera = build_camera(&settings, &viewport, camera);
            let grid = generate(world);

            let mut renderer = TileRenderer::new(settings.tile_size)?;
            let mut batch = SpriteBatch::new();
            batch.begin();
            let stats = renderer.submit_visible(&camera, &grid, &mut batch);
            let tiles = batch.len();
            let mut sink = DebugTextBackend::new();
            batch.end(&mut sink);

            let bounds = camera.world_bounds();
            let range = ChunkRange::from_bounds(&bounds, renderer.culler().chunk_world_size());
            println!("{}", describe_viewport(&viewport));
            println!(
                "bounds: left={:.2} bottom={:.2} right={:.2} top={:.2}",
                bounds.left, bounds.bottom, bounds.right, bounds.top
            );
            let top_left = camera.world_to_screen_point(&viewport, Vec3::new(bounds.left, bounds.top, 0.0));
            let bottom_right =
                camera.world_to_screen_point(&viewport, Vec3::new(bounds.right, bounds.bottom, 0.0));
            println!(
                "bounds on screen: ({:.1}, {:.1}) .. ({:.1}, {:.1})",
                top_left.x, top_left.y, bottom_right.x, bottom_right.y
            );
            println!(
                "chunk range: x {}..={} y {}..={} ({} cells)",
                range.start_x,
                range.end_x,
                range.start_y,
                range.end_y,
                stats.range_cells
            );
            println!(
                "world: {} chunks, {} tiles",
                grid.chunk_count(),
                grid.tile_count()
            );
            println!("visible: {} chunks, {} tiles submitted", stats.visible, tiles);
        }
        Commands::Frame {
            lines,
            camera,
            world,
        } => {
            let viewport = settings.viewport()?;
            let camera = build_camera(&settings, &viewport, camera);
            let grid = generate(world);

            let mut renderer = TileRenderer::new(settings.tile_size)?;
            let mut batch = SpriteBatch::with_capacity(4096);
            let mut backend = DebugTextBackend::new();
            let stats = renderer.render_frame(&camera, &grid, &mut batch, &mut backend);

            for line in backend.render_text().lines().take(lines) {
                println!("{line}");
            }
            println!(
                "frame: chunks={} submitted={} skipped={} drawn={} runs={}",
                stats.cull.visible,
                stats.batch.submitted,
                stats.batch.skipped,
                stats.batch.drawn,
                stats.batch.runs
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_accepts_wxh() {
        assert_eq!(parse_size("1280x480"), Ok((1280, 480)));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "tileview-cli",
            "convert",
            "--x",
            "320",
            "--y",
            "0",
            "--window",
            "1280x480",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert { x, y, window, .. } => {
                assert_eq!((x, y), (320.0, 0.0));
                assert_eq!(window, Some((1280, 480)));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn cull_window_size_shows_in_viewport_report() {
        let cli = Cli::try_parse_from(["tileview-cli", "cull", "--width", "1280", "--height", "480"])
            .unwrap();
        let Commands::Cull { width, height, .. } = cli.command else {
            panic!("expected cull");
        };
        assert_eq!((width, height), (Some(1280), Some(480)));

        let settings = ViewSettings::default();
        let mut viewport = settings.viewport().unwrap();
        viewport.set_window_size(1280, 480);
        let line = describe_viewport(&viewport);
        assert!(line.contains("window 1280x480"), "{line}");
        assert!(line.contains("scale 1.0000, offset (320.00, 0.00)"), "{line}");
    }

    #[test]
    fn camera_args_applied() {
        let settings = ViewSettings::default();
        let viewport = settings.viewport().unwrap();
        let camera = build_camera(
            &settings,
            &viewport,
            CameraArgs {
                cam_x: 10.0,
                cam_y: -5.0,
                rotation: 45.0,
                zoom: Some(2.0),
            },
        );
        assert_eq!(camera.position(), Vec3::new(10.0, -5.0, 0.0));
        assert_eq!(camera.rotation(), 45.0);
        assert_eq!(camera.zoom(), 2.0);
    }
}
