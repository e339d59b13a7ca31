use std::cmp::Ordering;

use glam::Vec2;
use tileview_common::{Color, SpriteHandle};

use crate::backend::DrawBackend;

/// One draw request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub sprite: SpriteHandle,
    /// World position of the pivot.
    pub position: Vec2,
    /// World size of the quad.
    pub size: Vec2,
    /// Degrees, counter-clockwise about the pivot.
    pub rotation: f32,
    /// Normalised pivot; `(0, 0)` is the bottom-left corner, `(1, 1)` the top-right.
    pub origin: Vec2,
    pub z: f32,
    pub tint: Color,
}

impl SpriteDraw {
    /// Unrotated, centred, untinted sprite at z = 0.
    pub fn new(sprite: SpriteHandle, position: Vec2, size: Vec2) -> Self {
        Self {
            sprite,
            position,
            size,
            rotation: 0.0,
            origin: Vec2::splat(0.5),
            z: 0.0,
            tint: Color::WHITE,
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// World-space quad corners: bottom-left, bottom-right, top-right, top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        let rotation = Vec2::from_angle(self.rotation.to_radians());
        [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]
        .map(|unit| self.position + rotation.rotate((unit - self.origin) * self.size))
    }
}

/// Counters for one `begin`→`end` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// `submit` calls during the pass.
    pub submitted: usize,
    /// Entries dropped for an invalid sprite or non-finite depth.
    pub skipped: usize,
    /// Entries handed to the backend.
    pub drawn: usize,
    /// Backend `draw_run` calls.
    pub runs: usize,
}

/// Collects sprite draws for one pass, then sorts and emits them.
///
/// Performance characteristics:
/// - `submit()` is O(1) and never touches the GPU
/// - `end()` is one stable sort plus a linear scan; the entry buffer is
///   reused across passes
#[derive(Debug, Default)]
pub struct SpriteBatch {
    entries: Vec<SpriteDraw>,
    recording: bool,
    submitted: usize,
    skipped: usize,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Entries accepted so far in the open pass.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open a pass.
    ///
    /// # Panics
    /// Panics (debug only) if a pass is already open. Release builds log and
    /// discard the unfinished pass.
    pub fn begin(&mut self) {
        debug_assert!(!self.recording, "SpriteBatch::begin called while a pass is open");
        if self.recording {
            tracing::warn!(
                discarded = self.entries.len(),
                "SpriteBatch::begin called while a pass is open"
            );
        }
        self.entries.clear();
        self.submitted = 0;
        self.skipped = 0;
        self.recording = true;
    }

    /// Queue one draw. Returns `false` when the entry was dropped.
    pub fn submit(&mut self, draw: SpriteDraw) -> bool {
        if !self.recording {
            tracing::warn!("SpriteBatch::submit outside begin/end, dropped");
            return false;
        }
        self.submitted += 1;

        if !draw.sprite.is_valid() {
            tracing::debug!(texture = draw.sprite.texture.0, "skipping draw with null sprite");
            self.skipped += 1;
            return false;
        }
        if !draw.z.is_finite() {
            tracing::warn!(z = draw.z, "skipping draw with non-finite z");
            self.skipped += 1;
            return false;
        }

        self.entries.push(draw);
        true
    }

    /// Close the pass: order by z (stable) and hand runs to `backend`.
    ///
    /// Consecutive entries sharing a texture form one run when the backend
    /// merges runs; otherwise every entry is its own run.
    pub fn end<B: DrawBackend + ?Sized>(&mut self, backend: &mut B) -> BatchStats {
        if !self.recording {
            tracing::warn!("SpriteBatch::end without begin");
            return BatchStats::default();
        }
        self.recording = false;

        // `sort_by` is stable: equal z keeps submission order. z is finite
        // here, and `partial_cmp` treats -0.0 and 0.0 as equal.
        self.entries
            .sort_by(|a, b| a.z.partial_cmp(&b.z).unwrap_or(Ordering::Equal));

        let merge = backend.merges_runs();
        let mut runs = 0;
        let mut start = 0;
        while start < self.entries.len() {
            let texture = self.entries[start].sprite.texture;
            let mut end = start + 1;
            if merge {
                while end < self.entries.len() && self.entries[end].sprite.texture == texture {
                    end += 1;
                }
            }
            backend.draw_run(texture, &self.entries[start..end]);
            runs += 1;
            start = end;
        }

        let stats = BatchStats {
            submitted: self.submitted,
            skipped: self.skipped,
            drawn: self.entries.len(),
            runs,
        };
        tracing::trace!(
            drawn = stats.drawn,
            runs = stats.runs,
            skipped = stats.skipped,
            "sprite batch flushed"
        );
        self.entries.clear();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DebugTextBackend;
    use tileview_common::TextureId;

    fn sprite(texture: u32) -> SpriteHandle {
        SpriteHandle::new(TextureId(texture), 16, 16)
    }

    fn draw(texture: u32, x: f32, z: f32) -> SpriteDraw {
        SpriteDraw::new(sprite(texture), Vec2::new(x, 0.0), Vec2::splat(16.0)).with_z(z)
    }

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn lower_z_first_and_ties_keep_submission_order() {
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();

        batch.begin();
        batch.submit(draw(1, 1.0, 0.0)); // A
        batch.submit(draw(1, 2.0, 0.0)); // B
        batch.submit(draw(1, 3.0, -1.0)); // C
        batch.end(&mut backend);

        let order: Vec<f32> = backend.draw_order().iter().map(|d| d.position.x).collect();
        assert_eq!(order, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn signed_zero_z_counts_as_a_tie() {
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();

        batch.begin();
        batch.submit(draw(1, 1.0, 0.0));
        batch.submit(draw(1, 2.0, -0.0));
        batch.submit(draw(1, 3.0, 0.0));
        batch.end(&mut backend);

        let order: Vec<f32> = backend.draw_order().iter().map(|d| d.position.x).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn consecutive_same_texture_entries_share_a_run() {
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();

        batch.begin();
        batch.submit(draw(1, 0.0, 0.0));
        batch.submit(draw(1, 1.0, 0.0));
        batch.submit(draw(2, 2.0, 0.0));
        batch.submit(draw(1, 3.0, 0.0));
        let stats = batch.end(&mut backend);

        assert_eq!(stats.runs, 3);
        assert_eq!(stats.drawn, 4);
        let sizes: Vec<usize> = backend.runs().iter().map(|r| r.sprites.len()).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
    }

    #[test]
    fn non_merging_backend_gets_one_run_per_entry() {
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::unbatched();

        batch.begin();
        for x in 0..5 {
            batch.submit(draw(7, x as f32, 0.0));
        }
        let stats = batch.end(&mut backend);
        assert_eq!(stats.runs, 5);
        assert_eq!(backend.runs().len(), 5);
    }

    #[test]
    fn null_sprite_is_skipped_not_fatal() {
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();

        batch.begin();
        assert!(batch.submit(draw(1, 0.0, 0.0)));
        assert!(!batch.submit(SpriteDraw::new(SpriteHandle::NULL, Vec2::ZERO, Vec2::ONE)));
        assert!(!batch.submit(draw(1, 0.0, f32::NAN)));
        assert!(batch.submit(draw(1, 1.0, 0.0)));
        let stats = batch.end(&mut backend);

        assert_eq!(
            stats,
            BatchStats {
                submitted: 4,
                skipped: 2,
                drawn: 2,
                runs: 1
            }
        );
    }

    #[test]
    fn entries_do_not_survive_the_pass() {
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();

        batch.begin();
        batch.submit(draw(1, 0.0, 0.0));
        batch.end(&mut backend);
        assert!(batch.is_empty());

        backend.clear();
        batch.begin();
        let stats = batch.end(&mut backend);
        assert_eq!(stats.drawn, 0);
        assert!(backend.runs().is_empty());
    }

    #[test]
    fn submit_and_end_outside_pass_are_ignored() {
        let mut batch = SpriteBatch::new();
        let mut backend = DebugTextBackend::new();
        assert!(!batch.submit(draw(1, 0.0, 0.0)));
        assert_eq!(batch.end(&mut backend), BatchStats::default());
        assert!(backend.runs().is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "pass is open")]
    fn reentrant_begin_panics_in_debug() {
        let mut batch = SpriteBatch::new();
        batch.begin();
        batch.begin();
    }

    #[test]
    fn corners_with_centre_origin() {
        let d = SpriteDraw::new(sprite(1), Vec2::new(10.0, 20.0), Vec2::new(4.0, 2.0));
        let [bl, br, tr, tl] = d.corners();
        assert_close(bl, Vec2::new(8.0, 19.0));
        assert_close(br, Vec2::new(12.0, 19.0));
        assert_close(tr, Vec2::new(12.0, 21.0));
        assert_close(tl, Vec2::new(8.0, 21.0));
    }

    #[test]
    fn corners_with_bottom_left_origin_and_rotation() {
        let d = SpriteDraw::new(sprite(1), Vec2::new(5.0, 5.0), Vec2::new(2.0, 1.0))
            .with_origin(Vec2::ZERO)
            .with_rotation(90.0);
        let [bl, br, tr, tl] = d.corners();
        assert_close(bl, Vec2::new(5.0, 5.0));
        assert_close(br, Vec2::new(5.0, 7.0));
        assert_close(tr, Vec2::new(4.0, 7.0));
        assert_close(tl, Vec2::new(4.0, 5.0));
    }

    #[test]
    fn defaults_are_white_and_centred() {
        let d = SpriteDraw::new(sprite(1), Vec2::ZERO, Vec2::ONE);
        assert_eq!(d.tint, Color::WHITE);
        assert_eq!(d.origin, Vec2::splat(0.5));
        assert_eq!(d.rotation, 0.0);
    }
}
