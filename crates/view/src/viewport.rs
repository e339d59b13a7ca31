use glam::Vec2;

/// Errors from constructing a viewport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewportError {
    #[error("game resolution must be positive, got {width}x{height}")]
    InvalidGameResolution { width: u32, height: u32 },
    #[error("window size must be positive, got {width}x{height}")]
    InvalidWindowSize { width: u32, height: u32 },
}

/// Fixed internal render resolution inside a resizable window.
///
/// The game area is scaled uniformly to fill the window's constraining
/// axis; the other axis gets equal bars on both sides (pillarbox when the
/// window is relatively wider, letterbox when it is taller).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    game_width: u32,
    game_height: u32,
    window_width: u32,
    window_height: u32,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl ViewportConfig {
    pub fn new(
        game_width: u32,
        game_height: u32,
        window_width: u32,
        window_height: u32,
    ) -> Result<Self, ViewportError> {
        if game_width == 0 || game_height == 0 {
            return Err(ViewportError::InvalidGameResolution {
                width: game_width,
                height: game_height,
            });
        }
        if window_width == 0 || window_height == 0 {
            return Err(ViewportError::InvalidWindowSize {
                width: window_width,
                height: window_height,
            });
        }

        let mut viewport = Self {
            game_width,
            game_height,
            window_width,
            window_height,
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        viewport.recalculate_scaling();
        Ok(viewport)
    }

    /// Recompute scale and bar offsets from the current window size.
    pub fn recalculate_scaling(&mut self) {
        let ww = self.window_width as f32;
        let wh = self.window_height as f32;
        let gw = self.game_width as f32;
        let gh = self.game_height as f32;

        // Aspect comparison by cross-multiplication so equal ratios compare
        // exactly equal.
        let window_wider = u64::from(self.window_width) * u64::from(self.game_height)
            > u64::from(self.window_height) * u64::from(self.game_width);

        if window_wider {
            self.scale = wh / gh;
            self.offset_x = (ww - gw * self.scale) / 2.0;
            self.offset_y = 0.0;
        } else {
            self.scale = ww / gw;
            self.offset_x = 0.0;
            self.offset_y = (wh - gh * self.scale) / 2.0;
        }

        tracing::trace!(
            scale = self.scale,
            offset_x = self.offset_x,
            offset_y = self.offset_y,
            "viewport scaling recalculated"
        );
    }

    /// Apply a window resize. Returns `true` when the stored size changed.
    ///
    /// Non-positive sizes are rejected and the previous state is kept.
    pub fn set_window_size(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            tracing::warn!(width, height, "ignoring non-positive window size");
            return false;
        }
        if width == self.window_width && height == self.window_height {
            return false;
        }

        self.window_width = width;
        self.window_height = height;
        self.recalculate_scaling();
        tracing::debug!(width, height, scale = self.scale, "window resized");
        true
    }

    pub fn game_width(&self) -> u32 {
        self.game_width
    }

    pub fn game_height(&self) -> u32 {
        self.game_height
    }

    pub fn game_size(&self) -> Vec2 {
        Vec2::new(self.game_width as f32, self.game_height as f32)
    }

    pub fn window_width(&self) -> u32 {
        self.window_width
    }

    pub fn window_height(&self) -> u32 {
        self.window_height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn game_aspect(&self) -> f32 {
        self.game_width as f32 / self.game_height as f32
    }

    pub fn window_aspect(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }

    /// `(x, y, width, height)` of the scaled game area, in window pixels.
    pub fn game_rect_in_window(&self) -> (f32, f32, f32, f32) {
        (
            self.offset_x,
            self.offset_y,
            self.game_width as f32 * self.scale,
            self.game_height as f32 * self.scale,
        )
    }

    pub fn window_to_game_x(&self, x: f32) -> f32 {
        (x - self.offset_x) / self.scale
    }

    pub fn window_to_game_y(&self, y: f32) -> f32 {
        (y - self.offset_y) / self.scale
    }

    pub fn game_to_window_x(&self, x: f32) -> f32 {
        x * self.scale + self.offset_x
    }

    pub fn game_to_window_y(&self, y: f32) -> f32 {
        y * self.scale + self.offset_y
    }

    pub fn window_to_game(&self, window: Vec2) -> Vec2 {
        Vec2::new(self.window_to_game_x(window.x), self.window_to_game_y(window.y))
    }

    pub fn game_to_window(&self, game: Vec2) -> Vec2 {
        Vec2::new(self.game_to_window_x(game.x), self.game_to_window_y(game.y))
    }

    /// Whether a window pixel falls inside the game area (not on a bar).
    pub fn is_in_game_viewport(&self, window_x: f32, window_y: f32) -> bool {
        let x = self.window_to_game_x(window_x);
        let y = self.window_to_game_y(window_y);
        x >= 0.0 && x < self.game_width as f32 && y >= 0.0 && y < self.game_height as f32
    }
}

/// Drops resize events that must never reach a [`ViewportConfig`].
///
/// Minimised windows report 0x0 and some platforms emit transient tiny
/// sizes during drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeFilter {
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for ResizeFilter {
    fn default() -> Self {
        Self {
            min_width: 1,
            min_height: 1,
        }
    }
}

impl ResizeFilter {
    pub fn new(min_width: u32, min_height: u32) -> Self {
        Self {
            min_width: min_width.max(1),
            min_height: min_height.max(1),
        }
    }

    /// Pass the event through, or `None` when it is below the threshold.
    pub fn accept(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width < self.min_width || height < self.min_height {
            tracing::debug!(width, height, "resize event filtered");
            return None;
        }
        Some((width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn rejects_zero_resolution() {
        assert_eq!(
            ViewportConfig::new(0, 480, 640, 480),
            Err(ViewportError::InvalidGameResolution {
                width: 0,
                height: 480
            })
        );
        assert_eq!(
            ViewportConfig::new(640, 480, 640, 0),
            Err(ViewportError::InvalidWindowSize {
                width: 640,
                height: 0
            })
        );
    }

    #[test]
    fn wider_window_is_pillarboxed() {
        let vp = ViewportConfig::new(640, 480, 1920, 1080).unwrap();
        assert_eq!(vp.scale(), 1080.0 / 480.0);
        assert_eq!(vp.offset_y(), 0.0);
        assert!(vp.offset_x() > 0.0);
        assert!((vp.offset_x() - (1920.0 - 640.0 * 2.25) / 2.0).abs() < EPS);
    }

    #[test]
    fn taller_window_is_letterboxed() {
        let vp = ViewportConfig::new(640, 480, 800, 1000).unwrap();
        assert_eq!(vp.scale(), 800.0 / 640.0);
        assert_eq!(vp.offset_x(), 0.0);
        assert!(vp.offset_y() > 0.0);
        assert!((vp.offset_y() - (1000.0 - 480.0 * 1.25) / 2.0).abs() < EPS);
    }

    #[test]
    fn equal_aspect_has_no_bars() {
        let vp = ViewportConfig::new(640, 480, 1280, 960).unwrap();
        assert_eq!(vp.offset_x(), 0.0);
        assert_eq!(vp.offset_y(), 0.0);
        assert_eq!(vp.scale(), 1280.0 / 640.0);
        assert_eq!(vp.scale(), 960.0 / 480.0);
    }

    #[test]
    fn resize_to_wide_window_maps_click_to_game_origin() {
        let mut vp = ViewportConfig::new(640, 480, 640, 480).unwrap();
        assert!(vp.set_window_size(1280, 480));

        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.offset_x(), 320.0);
        assert_eq!(vp.offset_y(), 0.0);
        assert_eq!(vp.window_to_game(Vec2::new(320.0, 0.0)), Vec2::ZERO);
    }

    #[test]
    fn set_window_size_rejects_zero_and_keeps_state() {
        let mut vp = ViewportConfig::new(640, 480, 1280, 720).unwrap();
        let before = vp.clone();
        assert!(!vp.set_window_size(0, 720));
        assert!(!vp.set_window_size(1280, 0));
        assert_eq!(vp, before);
    }

    #[test]
    fn set_window_size_same_value_reports_no_change() {
        let mut vp = ViewportConfig::new(640, 480, 1280, 720).unwrap();
        assert!(!vp.set_window_size(1280, 720));
        assert!(vp.set_window_size(1024, 768));
        assert_eq!(vp.window_width(), 1024);
        assert_eq!(vp.window_height(), 768);
    }

    #[test]
    fn window_game_conversions_are_inverse() {
        for &(w, h) in &[(1280, 720), (800, 1000), (640, 480), (333, 777)] {
            let vp = ViewportConfig::new(640, 480, w, h).unwrap();
            for &v in &[-50.0_f32, 0.0, 1.5, 320.0, 999.25] {
                assert!((vp.game_to_window_x(vp.window_to_game_x(v)) - v).abs() < 1e-3);
                assert!((vp.game_to_window_y(vp.window_to_game_y(v)) - v).abs() < 1e-3);
                assert!((vp.window_to_game_x(vp.game_to_window_x(v)) - v).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn bars_are_outside_game_viewport() {
        let vp = ViewportConfig::new(640, 480, 1280, 480).unwrap();
        assert!(!vp.is_in_game_viewport(100.0, 100.0));
        assert!(vp.is_in_game_viewport(320.0, 0.0));
        assert!(vp.is_in_game_viewport(959.0, 479.0));
        assert!(!vp.is_in_game_viewport(960.0, 100.0));
        assert!(!vp.is_in_game_viewport(500.0, 480.0));
    }

    #[test]
    fn game_rect_covers_scaled_area() {
        let vp = ViewportConfig::new(640, 480, 1280, 480).unwrap();
        assert_eq!(vp.game_rect_in_window(), (320.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn resize_filter_drops_small_events() {
        let filter = ResizeFilter::new(64, 64);
        assert_eq!(filter.accept(0, 0), None);
        assert_eq!(filter.accept(63, 200), None);
        assert_eq!(filter.accept(200, 10), None);
        assert_eq!(filter.accept(64, 64), Some((64, 64)));
    }

    #[test]
    fn resize_filter_default_only_drops_zero() {
        let filter = ResizeFilter::default();
        assert_eq!(filter.accept(0, 10), None);
        assert_eq!(filter.accept(1, 1), Some((1, 1)));
    }
}
