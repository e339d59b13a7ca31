use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use tileview_common::{Color, SpriteHandle, TextureId};
use tileview_render::{FrameStats, FrameTimer, SpriteBatch, SpriteDraw, TileRenderer};
use tileview_render_wgpu::{PresentBlit, RenderTarget, SpriteMesh, WgpuSpriteRenderer, clear_color};
use tileview_tilemap::{ChunkGrid, WorldGen};
use tileview_view::{Camera, ResizeFilter, ViewSettings, ViewportConfig};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "tileview-desktop", about = "Tileview desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML view settings; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// World generation seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Half-width of the generated world in chunks
    #[arg(long, default_value = "32")]
    radius: i32,
}

const ATLAS_CELL: u32 = 16;
const ATLAS_CELLS: u32 = 5;
/// Atlas cell used for the click marker.
const MARKER_CELL: u32 = 4;
const PAN_SPEED: f32 = 240.0;
const ROTATE_SPEED: f32 = 90.0;

/// Procedural RGBA atlas: four bordered terrain cells and one white cell.
fn build_atlas() -> (u32, u32, Vec<u8>) {
    const COLORS: [[u8; 3]; ATLAS_CELLS as usize] = [
        [92, 92, 104],   // stone
        [70, 140, 64],   // grass
        [196, 180, 120], // sand
        [56, 96, 170],   // water
        [255, 255, 255], // marker
    ];
    let width = ATLAS_CELL * ATLAS_CELLS;
    let height = ATLAS_CELL;
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let cell = (x / ATLAS_CELL) as usize;
            let (lx, ly) = (x % ATLAS_CELL, y % ATLAS_CELL);
            let border = lx == 0 || ly == 0 || lx == ATLAS_CELL - 1 || ly == ATLAS_CELL - 1;
            let [r, g, b] = COLORS[cell];
            let shade = |c: u8| if border && cell != MARKER_CELL as usize { c / 2 + c / 4 } else { c };
            rgba.extend_from_slice(&[shade(r), shade(g), shade(b), 255]);
        }
    }
    (width, height, rgba)
}

fn atlas_sprite(texture: TextureId, cell: u32) -> SpriteHandle {
    let u0 = cell as f32 / ATLAS_CELLS as f32;
    let u1 = (cell + 1) as f32 / ATLAS_CELLS as f32;
    SpriteHandle::new(texture, ATLAS_CELL, ATLAS_CELL).with_uv([u0, 0.0, u1, 1.0])
}

/// Screen-relative pan direction mapped into world space for a camera
/// rotated by `rotation` degrees.
fn pan_delta(input: Vec2, rotation: f32, distance: f32) -> Vec2 {
    if input == Vec2::ZERO {
        return Vec2::ZERO;
    }
    Vec2::from_angle(rotation.to_radians()).rotate(input.normalize()) * distance
}

/// Application state.
struct AppState {
    settings: ViewSettings,
    viewport: ViewportConfig,
    camera: Camera,
    resize_filter: ResizeFilter,
    world_gen: WorldGen,
    grid: ChunkGrid,
    tiles: TileRenderer,
    batch: SpriteBatch,
    mesh: SpriteMesh,
    marker: SpriteHandle,
    timer: FrameTimer,
    stats: FrameStats,
    keys_held: HashSet<KeyCode>,
    cursor: Option<Vec2>,
    last_click: Option<Vec2>,
    show_panel: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(settings: ViewSettings, world_gen: WorldGen) -> Result<Self> {
        let viewport = settings.viewport()?;
        let camera = settings.camera(&viewport);
        Ok(Self {
            resize_filter: settings.resize_filter(),
            tiles: TileRenderer::new(settings.tile_size)?,
            settings,
            viewport,
            camera,
            world_gen,
            grid: ChunkGrid::new(),
            batch: SpriteBatch::with_capacity(8192),
            mesh: SpriteMesh::new(),
            marker: SpriteHandle::NULL,
            timer: FrameTimer::default(),
            stats: FrameStats::default(),
            keys_held: HashSet::new(),
            cursor: None,
            last_click: None,
            show_panel: true,
            last_frame: Instant::now(),
        })
    }

    /// Generate the world once the atlas texture exists.
    fn populate(&mut self, atlas: TextureId) {
        let palette: Vec<SpriteHandle> = (0..MARKER_CELL).map(|c| atlas_sprite(atlas, c)).collect();
        self.grid = self.world_gen.generate(&palette);
        self.marker = atlas_sprite(atlas, MARKER_CELL);
        tracing::info!(
            chunks = self.grid.chunk_count(),
            tiles = self.grid.tile_count(),
            "world ready"
        );
    }

    fn update(&mut self, dt: f32) {
        let speed_mult = if self.keys_held.contains(&KeyCode::ShiftLeft) {
            3.0
        } else {
            1.0
        };

        let mut input = Vec2::ZERO;
        if self.keys_held.contains(&KeyCode::KeyW) {
            input.y += 1.0;
        }
        if self.keys_held.contains(&KeyCode::KeyS) {
            input.y -= 1.0;
        }
        if self.keys_held.contains(&KeyCode::KeyA) {
            input.x -= 1.0;
        }
        if self.keys_held.contains(&KeyCode::KeyD) {
            input.x += 1.0;
        }
        // Pan speed is in screen terms, so it shrinks in world units as zoom grows.
        let distance = PAN_SPEED * speed_mult * dt / self.camera.zoom();
        let delta = pan_delta(input, self.camera.rotation(), distance);
        if delta != Vec2::ZERO {
            self.camera.translate(delta.extend(0.0));
        }

        if self.keys_held.contains(&KeyCode::KeyQ) {
            self.camera.rotate(ROTATE_SPEED * dt);
        }
        if self.keys_held.contains(&KeyCode::KeyE) {
            self.camera.rotate(-ROTATE_SPEED * dt);
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
            return;
        }

        match key {
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
            }
            KeyCode::KeyR => self.reset_camera(),
            KeyCode::Escape => {
                self.last_click = None;
            }
            _ => {}
        }
    }

    fn reset_camera(&mut self) {
        self.camera = self.settings.camera(&self.viewport);
        tracing::info!("camera reset");
    }

    /// Window resize, filtered. Returns the accepted size.
    fn handle_resize(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        let (w, h) = self.resize_filter.accept(width, height)?;
        if self.viewport.set_window_size(w, h) {
            self.camera.handle_resize(&self.viewport);
        }
        Some((w, h))
    }

    fn handle_click(&mut self) {
        let Some(cursor) = self.cursor else {
            return;
        };
        if !self.viewport.is_in_game_viewport(cursor.x, cursor.y) {
            tracing::debug!(x = cursor.x, y = cursor.y, "click outside game area");
            return;
        }
        let world = self.camera.screen_to_world(&self.viewport, cursor);
        let tile = (world / self.settings.tile_size).floor();
        tracing::info!(
            world_x = world.x,
            world_y = world.y,
            tile_x = tile.x,
            tile_y = tile.y,
            "clicked"
        );
        self.last_click = Some(world);
    }

    /// CPU side of the frame: cull, batch and build the mesh.
    fn build_frame(&mut self) {
        self.mesh.clear();
        self.batch.begin();
        let cull = self.tiles.submit_visible(&self.camera, &self.grid, &mut self.batch);
        if let Some(click) = self.last_click {
            self.batch.submit(
                SpriteDraw::new(self.marker, click, Vec2::splat(self.settings.tile_size * 0.5))
                    .with_rotation(45.0)
                    .with_z(1.0)
                    .with_tint(Color::rgba(1.0, 0.25, 0.2, 0.9)),
            );
        }
        let batch = self.batch.end(&mut self.mesh);
        self.stats = FrameStats { cull, batch };
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        egui::SidePanel::left("view_stats")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Tileview");
                ui.separator();
                ui.label(format!(
                    "Frame: {:.2} ms ({:.0} fps)",
                    self.timer.average().as_secs_f64() * 1000.0,
                    self.timer.fps()
                ));
                ui.label(format!(
                    "Frame max: {:.2} ms",
                    self.timer.max().as_secs_f64() * 1000.0
                ));
                ui.separator();

                ui.heading("Camera");
                let p = self.camera.position();
                ui.label(format!("Position: ({:.1}, {:.1})", p.x, p.y));
                ui.label(format!("Rotation: {:.1}°", self.camera.rotation()));
                let mut zoom = self.camera.zoom();
                ui.horizontal(|ui| {
                    ui.label("Zoom:");
                    if ui
                        .add(egui::DragValue::new(&mut zoom).speed(0.01).range(0.05..=20.0))
                        .changed()
                    {
                        self.camera.set_zoom(zoom);
                    }
                });
                let b = self.camera.world_bounds();
                ui.label(format!(
                    "Bounds: [{:.0}, {:.0}] .. [{:.0}, {:.0}]",
                    b.left, b.bottom, b.right, b.top
                ));
                if ui.button("Reset (R)").clicked() {
                    self.reset_camera();
                }
                ui.separator();

                ui.heading("Viewport");
                ui.label(format!(
                    "Window: {}x{}  Game: {}x{}",
                    self.viewport.window_width(),
                    self.viewport.window_height(),
                    self.viewport.game_width(),
                    self.viewport.game_height()
                ));
                ui.label(format!(
                    "Scale: {:.3}  Offset: ({:.1}, {:.1})",
                    self.viewport.scale(),
                    self.viewport.offset_x(),
                    self.viewport.offset_y()
                ));
                if let Some(cursor) = self.cursor {
                    let world = self.camera.screen_to_world(&self.viewport, cursor);
                    ui.label(format!("Cursor world: ({:.1}, {:.1})", world.x, world.y));
                }
                if let Some(click) = self.last_click {
                    ui.label(format!("Last click: ({:.1}, {:.1})", click.x, click.y));
                }
                ui.separator();

                ui.heading("Culling");
                ui.label(format!(
                    "World: {} chunks, {} tiles",
                    self.grid.chunk_count(),
                    self.grid.tile_count()
                ));
                ui.label(format!(
                    "Visible chunks: {} (range {})",
                    self.stats.cull.visible, self.stats.cull.range_cells
                ));
                ui.label(format!(
                    "Sprites: {} drawn, {} skipped, {} runs",
                    self.stats.batch.drawn, self.stats.batch.skipped, self.stats.batch.runs
                ));

                ui.separator();
                ui.small("F1: Panel | WASD: Pan | Q/E: Rotate | Wheel: Zoom | LMB: Pick");
            });
    }
}

/// Window and GPU resources, created on resume.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sprites: WgpuSpriteRenderer,
    target: RenderTarget,
    blit: PresentBlit,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        settings: &ViewSettings,
    ) -> Result<(Self, TextureId)> {
        let attrs = Window::default_attributes()
            .with_title("Tileview")
            .with_inner_size(PhysicalSize::new(settings.window_width, settings.window_height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tileview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Offscreen target at game resolution; failure here is fatal.
        let target = RenderTarget::new(
            &device,
            settings.game_width,
            settings.game_height,
            surface_format,
        )
        .context("create game render target")?;

        let mut sprites = WgpuSpriteRenderer::new(&device, surface_format);
        let (atlas_w, atlas_h, atlas_rgba) = build_atlas();
        let atlas = sprites
            .register_texture(&device, &queue, atlas_w, atlas_h, &atlas_rgba)
            .context("upload tile atlas")?;
        let blit = PresentBlit::new(&device, surface_format);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok((
            Self {
                window,
                surface,
                device,
                queue,
                config,
                sprites,
                target,
                blit,
                egui_winit,
                egui_renderer,
            },
            atlas,
        ))
    }

    fn reconfigure(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
            init_error: None,
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let frame_time = now - self.state.last_frame;
        self.state.last_frame = now;
        self.state.timer.record(frame_time);
        self.state.update(frame_time.as_secs_f32().min(0.1));

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let _span = tracing::debug_span!("frame").entered();
        self.state.build_frame();
        gpu.sprites.prepare(
            &gpu.device,
            &gpu.queue,
            self.state.camera.view_projection_matrix(),
            &self.state.mesh,
        );
        gpu.blit.prepare(&gpu.device, &gpu.target);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        let sprites = &gpu.sprites;
        gpu.target.render(
            &mut encoder,
            clear_color(self.state.settings.clear_color),
            |pass| sprites.draw(pass),
        );
        gpu.blit
            .draw(&mut encoder, &view, &self.state.viewport, wgpu::Color::BLACK);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx, &self.state.settings) {
            Ok((gpu, atlas)) => {
                let size = gpu.window.inner_size();
                self.state.handle_resize(size.width, size.height);
                self.state.populate(atlas);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("GPU initialization failed: {e:#}");
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                // Applied before the next redraw reads any matrix.
                if let Some((w, h)) = self.state.handle_resize(new_size.width, new_size.height) {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.reconfigure(w, h);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.camera.zoom_by(1.1_f32.powf(lines));
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                self.state.handle_click();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tileview-desktop starting");

    let settings = match &cli.config {
        Some(path) => ViewSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => ViewSettings::default(),
    };
    let world_gen = WorldGen {
        seed: cli.seed,
        radius_chunks: cli.radius,
        ..WorldGen::default()
    };
    let state = AppState::new(settings, world_gen)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn state() -> AppState {
        AppState::new(ViewSettings::default(), WorldGen::default()).unwrap()
    }

    #[test]
    fn atlas_has_expected_layout() {
        let (w, h, rgba) = build_atlas();
        assert_eq!((w, h), (80, 16));
        assert_eq!(rgba.len(), (w * h * 4) as usize);
        // Marker cell interior and border are both white.
        let px = |x: u32, y: u32| {
            let i = ((y * w + x) * 4) as usize;
            [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
        };
        assert_eq!(px(64, 0), [255, 255, 255, 255]);
        assert_eq!(px(70, 8), [255, 255, 255, 255]);
    }

    #[test]
    fn atlas_sprite_uv_cells() {
        let s = atlas_sprite(TextureId(1), 2);
        assert_eq!(s.uv, [0.4, 0.0, 0.6, 1.0]);
        assert!(s.is_valid());
    }

    #[test]
    fn pan_follows_camera_rotation() {
        let d = pan_delta(Vec2::new(1.0, 0.0), 90.0, 10.0);
        assert!((d - Vec2::new(0.0, 10.0)).length() < 1e-4);
        assert_eq!(pan_delta(Vec2::ZERO, 30.0, 10.0), Vec2::ZERO);
        let diag = pan_delta(Vec2::new(1.0, 1.0), 0.0, 1.0);
        assert!((diag.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn small_resize_is_filtered() {
        let mut s = state();
        assert_eq!(s.handle_resize(0, 600), None);
        assert_eq!(s.handle_resize(10, 10), None);
        assert_eq!(s.viewport.window_width(), 1280);
        assert_eq!(s.handle_resize(1280, 480), Some((1280, 480)));
        assert_eq!(s.viewport.offset_x(), 320.0);
        assert!(s.camera.is_projection_dirty());
    }

    #[test]
    fn click_records_world_position() {
        let mut s = state();
        s.handle_resize(640, 480);
        s.camera.set_position(Vec3::new(50.0, 20.0, 0.0));
        s.cursor = Some(Vec2::new(320.0, 240.0));
        s.handle_click();
        let click = s.last_click.unwrap();
        assert!((click - Vec2::new(50.0, 20.0)).length() < 1e-3);

        s.last_click = None;
        s.handle_resize(1280, 480);
        s.cursor = Some(Vec2::new(100.0, 240.0)); // pillarbox bar
        s.handle_click();
        assert!(s.last_click.is_none());
    }

    #[test]
    fn frame_includes_marker_above_tiles() {
        let mut s = state();
        s.world_gen = WorldGen {
            radius_chunks: 2,
            ..WorldGen::default()
        };
        s.populate(TextureId(1));
        s.last_click = Some(Vec2::ZERO);
        s.build_frame();
        assert!(s.stats.batch.drawn > 1);
        assert!(s.stats.cull.visible > 0);
        let last = s.mesh.runs().last().unwrap();
        assert_eq!(last.indices.end as usize, s.mesh.indices().len());
    }
}
