//! wgpu render backend for the tile viewer.
//!
//! Sprites are drawn into an offscreen [`RenderTarget`] at the fixed game
//! resolution, then [`PresentBlit`] scales it into the letterboxed rectangle
//! of the window surface.
//!
//! # Invariants
//! - GPU work happens only in `prepare`/`draw`/`render`, never on submit.
//! - A render pass opened by [`RenderTarget::render`] is closed on every exit path.
//! - Texture views are not kept across a [`RenderTarget`] resize.

mod blit;
mod gpu;
mod mesh;
mod render_target;
mod shaders;

pub use blit::{PresentBlit, present_rect};
pub use gpu::{TextureError, WgpuSpriteRenderer};
pub use mesh::{MeshRun, SpriteMesh, SpriteVertex};
pub use render_target::{RenderTarget, RenderTargetError};

/// Convert an engine colour to a wgpu clear colour.
pub fn clear_color(color: tileview_common::Color) -> wgpu::Color {
    wgpu::Color {
        r: color.r as f64,
        g: color.g as f64,
        b: color.b as f64,
        a: color.a as f64,
    }
}
