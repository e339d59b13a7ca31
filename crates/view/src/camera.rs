use std::cell::Cell;

use glam::{Mat4, Vec2, Vec3};
use tileview_common::WorldBounds;

use crate::convert;
use crate::viewport::ViewportConfig;

/// Depth range of the orthographic projection. `position.z` and sprite
/// depths must stay inside it.
pub const NEAR_PLANE: f32 = -1000.0;
pub const FAR_PLANE: f32 = 1000.0;

/// 2D orthographic camera with lazily rebuilt matrices.
///
/// Projection and view are cached behind independent dirty flags. Mutators
/// only flip flags; the next matrix read rebuilds and clears them. Matrices
/// are returned by value, so callers can never reach the cache.
///
/// The camera copies the game resolution from the [`ViewportConfig`] it is
/// created with but does not own the viewport: screen conversions borrow it
/// per call.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    /// Degrees, counter-clockwise about the depth axis.
    rotation: f32,
    zoom: f32,
    orthographic_size: f32,
    game_size: Vec2,

    projection: Cell<Mat4>,
    view: Cell<Mat4>,
    projection_dirty: Cell<bool>,
    view_dirty: Cell<bool>,
}

impl Camera {
    /// Camera centred on the origin, zoom 1, showing the full game height
    /// at one world unit per game pixel.
    pub fn new(viewport: &ViewportConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: 0.0,
            zoom: 1.0,
            orthographic_size: viewport.game_height() as f32 / 2.0,
            game_size: viewport.game_size(),
            projection: Cell::new(Mat4::IDENTITY),
            view: Cell::new(Mat4::IDENTITY),
            projection_dirty: Cell::new(true),
            view_dirty: Cell::new(true),
        }
    }

    pub fn with_orthographic_size(mut self, size: f32) -> Self {
        self.set_orthographic_size(size);
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn orthographic_size(&self) -> f32 {
        self.orthographic_size
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty.get()
    }

    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty.get()
    }

    /// Half of the visible area in world units, before rotation.
    pub fn half_extents(&self) -> Vec2 {
        let half_height = self.orthographic_size / self.zoom;
        Vec2::new(half_height * self.game_size.x / self.game_size.y, half_height)
    }

    // --- mutators -------------------------------------------------------

    pub fn set_position(&mut self, position: Vec3) -> bool {
        if !position.is_finite() {
            tracing::warn!(?position, "rejected non-finite camera position");
            return false;
        }
        if position != self.position {
            self.position = position;
            self.view_dirty.set(true);
        }
        true
    }

    pub fn translate(&mut self, delta: Vec3) -> bool {
        self.set_position(self.position + delta)
    }

    pub fn set_rotation(&mut self, degrees: f32) -> bool {
        if !degrees.is_finite() {
            tracing::warn!(degrees, "rejected non-finite camera rotation");
            return false;
        }
        let mut degrees = degrees.rem_euclid(360.0);
        // Tiny negative inputs round up to exactly 360.
        if degrees >= 360.0 {
            degrees = 0.0;
        }
        if degrees != self.rotation {
            self.rotation = degrees;
            self.view_dirty.set(true);
        }
        true
    }

    pub fn rotate(&mut self, degrees: f32) -> bool {
        self.set_rotation(self.rotation + degrees)
    }

    /// Set the zoom multiplier. Non-positive or non-finite values are
    /// rejected and leave the projection untouched.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        if !(zoom.is_finite() && zoom > 0.0) {
            tracing::warn!(zoom, current = self.zoom, "rejected non-positive camera zoom");
            return false;
        }
        if zoom != self.zoom {
            self.zoom = zoom;
            self.projection_dirty.set(true);
        }
        true
    }

    /// Multiply the zoom by `factor` (> 1 zooms in).
    pub fn zoom_by(&mut self, factor: f32) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            tracing::warn!(factor, "rejected non-positive zoom factor");
            return false;
        }
        self.set_zoom(self.zoom * factor)
    }

    pub fn set_orthographic_size(&mut self, size: f32) -> bool {
        if !(size.is_finite() && size > 0.0) {
            tracing::warn!(
                size,
                current = self.orthographic_size,
                "rejected non-positive orthographic size"
            );
            return false;
        }
        if size != self.orthographic_size {
            self.orthographic_size = size;
            self.projection_dirty.set(true);
        }
        true
    }

    /// Called after the viewport changed. The projection is rebuilt on the
    /// next read.
    pub fn handle_resize(&mut self, viewport: &ViewportConfig) {
        self.game_size = viewport.game_size();
        self.projection_dirty.set(true);
    }

    // --- matrices -------------------------------------------------------

    pub fn projection_matrix(&self) -> Mat4 {
        if self.projection_dirty.get() {
            let half = self.half_extents();
            self.projection.set(Mat4::orthographic_rh(
                -half.x, half.x, -half.y, half.y, NEAR_PLANE, FAR_PLANE,
            ));
            self.projection_dirty.set(false);
            tracing::trace!(half_w = half.x, half_h = half.y, "projection rebuilt");
        }
        self.projection.get()
    }

    pub fn view_matrix(&self) -> Mat4 {
        if self.view_dirty.get() {
            // Translating first puts the view centre at the origin, so the
            // rotation pivots about it.
            let translation =
                Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));
            let rotation = Mat4::from_rotation_z(-self.rotation.to_radians());
            self.view.set(rotation * translation);
            self.view_dirty.set(false);
            tracing::trace!(position = ?self.position, rotation = self.rotation, "view rebuilt");
        }
        self.view.get()
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    // --- bounds ---------------------------------------------------------

    /// Axis-aligned world rectangle enclosing everything the camera can see.
    ///
    /// When rotated, this is the box around the rotated view rectangle, so
    /// it may include a little that is not on screen but never less.
    pub fn world_bounds(&self) -> WorldBounds {
        let half = self.half_extents();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let (sin, cos) = (sin.abs(), cos.abs());
        let extent = Vec2::new(
            half.x * cos + half.y * sin,
            half.x * sin + half.y * cos,
        );
        WorldBounds::from_center_half_extents(self.position.truncate(), extent)
    }

    pub fn is_point_visible(&self, x: f32, y: f32) -> bool {
        self.world_bounds().contains(x, y)
    }

    // --- conversion stages ----------------------------------------------

    pub fn window_to_game(&self, viewport: &ViewportConfig, window: Vec2) -> Vec2 {
        viewport.window_to_game(window)
    }

    pub fn game_to_ndc(&self, game: Vec2) -> Vec2 {
        convert::game_to_ndc(game, self.game_size)
    }

    pub fn ndc_to_game(&self, ndc: Vec2) -> Vec2 {
        convert::ndc_to_game(ndc, self.game_size)
    }

    /// World point to NDC. `z` is the projected depth in `[0, 1]`.
    pub fn world_to_ndc(&self, world: Vec3) -> Vec3 {
        self.view_projection_matrix().project_point3(world)
    }

    /// NDC point back to world space at the given world depth.
    pub fn ndc_to_world(&self, ndc: Vec2, depth: f32) -> Vec3 {
        let ndc_z = self
            .projection_matrix()
            .project_point3(Vec3::new(0.0, 0.0, depth))
            .z;
        self.view_projection_matrix()
            .inverse()
            .project_point3(Vec3::new(ndc.x, ndc.y, ndc_z))
    }

    /// Window pixel to world space, placed at `depth`.
    pub fn screen_to_world_point(&self, viewport: &ViewportConfig, screen: Vec2, depth: f32) -> Vec3 {
        let game = self.window_to_game(viewport, screen);
        let ndc = self.game_to_ndc(game);
        self.ndc_to_world(ndc, depth)
    }

    /// Window pixel to world space on the camera's depth plane.
    pub fn screen_to_world(&self, viewport: &ViewportConfig, screen: Vec2) -> Vec2 {
        self.screen_to_world_point(viewport, screen, self.position.z)
            .truncate()
    }

    /// World point to window pixels. Depth is dropped.
    pub fn world_to_screen_point(&self, viewport: &ViewportConfig, world: Vec3) -> Vec2 {
        let ndc = self.world_to_ndc(world).truncate();
        let game = self.ndc_to_game(ndc);
        viewport.game_to_window(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportConfig {
        ViewportConfig::new(640, 480, 640, 480).unwrap()
    }

    fn assert_close(a: Vec2, b: Vec2, eps: f32) {
        assert!((a - b).length() < eps, "{a:?} != {b:?}");
    }

    #[test]
    fn default_camera_covers_game_resolution() {
        let cam = Camera::new(&viewport());
        assert_eq!(cam.orthographic_size(), 240.0);
        assert_eq!(cam.half_extents(), Vec2::new(320.0, 240.0));
        assert_eq!(cam.world_bounds().to_array(), [-320.0, -240.0, 320.0, 240.0]);
    }

    #[test]
    fn zoom_shrinks_bounds() {
        let mut cam = Camera::new(&viewport());
        cam.set_position(Vec3::new(100.0, 50.0, 0.0));
        assert!(cam.set_zoom(2.0));
        assert_eq!(cam.world_bounds().to_array(), [-60.0, -70.0, 260.0, 170.0]);
    }

    #[test]
    fn rejected_zoom_keeps_state_and_flag() {
        let mut cam = Camera::new(&viewport());
        let _ = cam.projection_matrix();
        assert!(!cam.is_projection_dirty());

        assert!(!cam.set_zoom(0.0));
        assert!(!cam.set_zoom(-5.0));
        assert!(!cam.set_zoom(f32::NAN));
        assert_eq!(cam.zoom(), 1.0);
        assert!(!cam.is_projection_dirty());
    }

    #[test]
    fn rejected_orthographic_size_keeps_state() {
        let mut cam = Camera::new(&viewport());
        let _ = cam.projection_matrix();
        assert!(!cam.set_orthographic_size(0.0));
        assert!(!cam.set_orthographic_size(-1.0));
        assert_eq!(cam.orthographic_size(), 240.0);
        assert!(!cam.is_projection_dirty());
    }

    #[test]
    fn zoom_by_multiplies_and_rejects_bad_factor() {
        let mut cam = Camera::new(&viewport());
        assert!(cam.zoom_by(2.0));
        assert!(cam.zoom_by(1.5));
        assert_eq!(cam.zoom(), 3.0);
        assert!(!cam.zoom_by(0.0));
        assert!(!cam.zoom_by(-2.0));
        assert_eq!(cam.zoom(), 3.0);
    }

    #[test]
    fn mutators_dirty_only_their_matrix() {
        let mut cam = Camera::new(&viewport());
        let _ = cam.view_projection_matrix();
        assert!(!cam.is_projection_dirty());
        assert!(!cam.is_view_dirty());

        cam.translate(Vec3::new(5.0, 0.0, 0.0));
        assert!(cam.is_view_dirty());
        assert!(!cam.is_projection_dirty());
        let _ = cam.view_matrix();
        assert!(!cam.is_view_dirty());

        cam.set_zoom(4.0);
        assert!(cam.is_projection_dirty());
        assert!(!cam.is_view_dirty());
        let _ = cam.projection_matrix();
        assert!(!cam.is_projection_dirty());

        cam.handle_resize(&viewport());
        assert!(cam.is_projection_dirty());
    }

    #[test]
    fn matrices_follow_latest_mutation() {
        let mut cam = Camera::new(&viewport());
        let before = cam.projection_matrix();
        cam.set_zoom(2.0);
        let after = cam.projection_matrix();
        assert_ne!(before, after);
        assert_eq!(after, Mat4::orthographic_rh(-160.0, 160.0, -120.0, 120.0, NEAR_PLANE, FAR_PLANE));
    }

    #[test]
    fn returned_matrix_is_a_copy() {
        let cam = Camera::new(&viewport());
        let mut m = cam.view_matrix();
        m.x_axis.x = 42.0;
        assert_eq!(cam.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn rotation_wraps_into_range() {
        let mut cam = Camera::new(&viewport());
        cam.set_rotation(370.0);
        assert!((cam.rotation() - 10.0).abs() < 1e-4);
        cam.rotate(-20.0);
        assert!((cam.rotation() - 350.0).abs() < 1e-4);
        assert!(!cam.set_rotation(f32::INFINITY));
    }

    #[test]
    fn tiny_negative_rotation_wraps_to_zero() {
        let mut cam = Camera::new(&viewport());
        assert!(cam.set_rotation(-1e-6));
        assert!(cam.rotation() < 360.0);
        assert_eq!(cam.rotation(), 0.0);
        cam.set_rotation(90.0);
        cam.rotate(-90.0 - 1e-6);
        assert!((0.0..360.0).contains(&cam.rotation()));
    }

    #[test]
    fn rotated_bounds_enclose_view_corners() {
        let vp = viewport();
        let mut cam = Camera::new(&vp);
        cam.set_rotation(30.0);
        let bounds = cam.world_bounds();
        for corner in [
            Vec2::new(0.0, 0.0),
            Vec2::new(640.0, 0.0),
            Vec2::new(0.0, 480.0),
            Vec2::new(640.0, 480.0),
        ] {
            let w = cam.screen_to_world(&vp, corner);
            assert!(
                bounds.contains(w.x * 0.999, w.y * 0.999),
                "corner {corner:?} -> {w:?} outside {bounds:?}"
            );
        }
        assert!(bounds.width() > 640.0);
    }

    #[test]
    fn screen_centre_is_camera_position() {
        let vp = ViewportConfig::new(640, 480, 1280, 720).unwrap();
        let mut cam = Camera::new(&vp);
        cam.set_position(Vec3::new(-75.0, 30.0, 0.0));
        cam.set_rotation(45.0);
        cam.set_zoom(3.0);
        let centre = Vec2::new(640.0, 360.0);
        assert_close(cam.screen_to_world(&vp, centre), Vec2::new(-75.0, 30.0), 1e-3);
    }

    #[test]
    fn top_left_of_game_area_is_upper_left_of_world() {
        let vp = viewport();
        let cam = Camera::new(&vp);
        assert_close(cam.screen_to_world(&vp, Vec2::ZERO), Vec2::new(-320.0, 240.0), 1e-3);
        assert_close(
            cam.world_to_screen_point(&vp, Vec3::new(320.0, -240.0, 0.0)),
            Vec2::new(640.0, 480.0),
            1e-3,
        );
    }

    #[test]
    fn conversion_round_trip_inside_frustum() {
        let vp = ViewportConfig::new(640, 480, 1280, 720).unwrap();
        let mut cam = Camera::new(&vp);
        cam.set_position(Vec3::new(100.0, -50.0, 0.0));
        cam.set_rotation(30.0);
        cam.set_zoom(2.0);

        let half = cam.half_extents();
        for &(fx, fy, z) in &[
            (0.0, 0.0, 0.0),
            (0.5, 0.5, 10.0),
            (-0.9, 0.3, -3.0),
            (0.25, -0.75, 500.0),
        ] {
            let p = Vec3::new(100.0 + fx * half.x * 0.5, -50.0 + fy * half.y * 0.5, z);
            let screen = cam.world_to_screen_point(&vp, p);
            let back = cam.screen_to_world_point(&vp, screen, p.z);
            assert!((back - p).length() < 1e-3, "{p:?} -> {screen:?} -> {back:?}");
        }
    }

    #[test]
    fn ndc_stage_round_trip() {
        let mut cam = Camera::new(&viewport());
        cam.set_position(Vec3::new(12.0, 34.0, 0.0));
        cam.set_rotation(90.0);
        let p = Vec3::new(40.0, 10.0, 2.0);
        let ndc = cam.world_to_ndc(p);
        let back = cam.ndc_to_world(ndc.truncate(), p.z);
        assert!((back - p).length() < 1e-3);
    }

    #[test]
    fn point_visibility_uses_bounds() {
        let mut cam = Camera::new(&viewport());
        assert!(cam.is_point_visible(0.0, 0.0));
        assert!(cam.is_point_visible(320.0, 240.0));
        assert!(!cam.is_point_visible(321.0, 0.0));
        cam.set_position(Vec3::new(1000.0, 0.0, 0.0));
        assert!(!cam.is_point_visible(0.0, 0.0));
    }
}
