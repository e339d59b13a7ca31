use std::fmt::Write as _;

use tileview_common::TextureId;

use crate::batch::SpriteDraw;

/// Renderer-agnostic draw interface. All sprite backends implement this trait.
///
/// A backend receives z-ordered runs from [`SpriteBatch::end`](crate::SpriteBatch::end)
/// and never sees entries outside a pass.
pub trait DrawBackend {
    /// Whether consecutive same-texture entries should arrive as one run.
    fn merges_runs(&self) -> bool {
        true
    }

    /// Draw `sprites` in order, all sampling `texture`.
    fn draw_run(&mut self, texture: TextureId, sprites: &[SpriteDraw]);
}

impl<B: DrawBackend + ?Sized> DrawBackend for &mut B {
    fn merges_runs(&self) -> bool {
        (**self).merges_runs()
    }

    fn draw_run(&mut self, texture: TextureId, sprites: &[SpriteDraw]) {
        (**self).draw_run(texture, sprites);
    }
}

/// One `draw_run` call captured by [`DebugTextBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRun {
    pub texture: TextureId,
    pub sprites: Vec<SpriteDraw>,
}

/// Debug text backend: records runs instead of drawing them.
///
/// Useful for CLI output, logging, and testing the batch interface without
/// a GPU.
#[derive(Debug)]
pub struct DebugTextBackend {
    runs: Vec<RecordedRun>,
    merges: bool,
}

impl Default for DebugTextBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugTextBackend {
    pub fn new() -> Self {
        Self {
            runs: Vec::new(),
            merges: true,
        }
    }

    /// Backend that asks for one run per entry.
    pub fn unbatched() -> Self {
        Self {
            runs: Vec::new(),
            merges: false,
        }
    }

    pub fn runs(&self) -> &[RecordedRun] {
        &self.runs
    }

    /// Every recorded entry, flattened in draw order.
    pub fn draw_order(&self) -> Vec<SpriteDraw> {
        self.runs.iter().flat_map(|r| r.sprites.iter().copied()).collect()
    }

    pub fn sprite_count(&self) -> usize {
        self.runs.iter().map(|r| r.sprites.len()).sum()
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }

    /// Human-readable dump of the recorded runs.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Sprite Runs (runs={}, sprites={}) ===",
            self.runs.len(),
            self.sprite_count()
        );
        for (i, run) in self.runs.iter().enumerate() {
            let _ = writeln!(out, "run {i}: texture={} count={}", run.texture.0, run.sprites.len());
            for s in &run.sprites {
                let _ = writeln!(
                    out,
                    "  pos=({:.2}, {:.2}) size=({:.1}, {:.1}) rot={:.1} z={:.2}",
                    s.position.x, s.position.y, s.size.x, s.size.y, s.rotation, s.z
                );
            }
        }
        out
    }
}

impl DrawBackend for DebugTextBackend {
    fn merges_runs(&self) -> bool {
        self.merges
    }

    fn draw_run(&mut self, texture: TextureId, sprites: &[SpriteDraw]) {
        self.runs.push(RecordedRun {
            texture,
            sprites: sprites.to_vec(),
        });
    }
}
