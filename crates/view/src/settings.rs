use std::path::Path;

use serde::{Deserialize, Serialize};
use tileview_common::Color;

use crate::camera::Camera;
use crate::viewport::{ResizeFilter, ViewportConfig, ViewportError};

/// Errors from loading view settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Viewport(#[from] ViewportError),
}

/// Startup configuration for the view pipeline.
///
/// Loaded from YAML; every field is optional and falls back to the
/// default below.
///
/// ```yaml
/// game_width: 320
/// game_height: 180
/// tile_size: 8.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Fixed internal render resolution.
    pub game_width: u32,
    pub game_height: u32,
    /// Initial window size.
    pub window_width: u32,
    pub window_height: u32,
    /// Resize events below this are dropped before reaching the viewport.
    pub min_window_width: u32,
    pub min_window_height: u32,
    /// Half-height of the visible world at zoom 1, in world units.
    pub orthographic_size: f32,
    /// World units per tile edge.
    pub tile_size: f32,
    pub zoom: f32,
    pub clear_color: Color,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            game_width: 640,
            game_height: 480,
            window_width: 1280,
            window_height: 720,
            min_window_width: 64,
            min_window_height: 64,
            orthographic_size: 240.0,
            tile_size: 16.0,
            zoom: 1.0,
            clear_color: Color::rgba(0.1, 0.1, 0.15, 1.0),
        }
    }
}

impl ViewSettings {
    /// Read and validate a YAML settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "view settings loaded");
        Ok(settings)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_yaml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_yaml_string(&self) -> Result<String, SettingsError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive_u32(field: &'static str, v: u32) -> Result<(), SettingsError> {
            if v == 0 {
                return Err(SettingsError::Invalid {
                    field,
                    reason: "must be positive".into(),
                });
            }
            Ok(())
        }
        fn positive_f32(field: &'static str, v: f32) -> Result<(), SettingsError> {
            if !(v.is_finite() && v > 0.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {v}"),
                });
            }
            Ok(())
        }

        positive_u32("game_width", self.game_width)?;
        positive_u32("game_height", self.game_height)?;
        positive_u32("window_width", self.window_width)?;
        positive_u32("window_height", self.window_height)?;
        positive_f32("orthographic_size", self.orthographic_size)?;
        positive_f32("tile_size", self.tile_size)?;
        positive_f32("zoom", self.zoom)?;
        Ok(())
    }

    pub fn viewport(&self) -> Result<ViewportConfig, ViewportError> {
        ViewportConfig::new(
            self.game_width,
            self.game_height,
            self.window_width,
            self.window_height,
        )
    }

    /// Camera for `viewport` with the configured orthographic size and zoom.
    pub fn camera(&self, viewport: &ViewportConfig) -> Camera {
        let mut camera = Camera::new(viewport).with_orthographic_size(self.orthographic_size);
        camera.set_zoom(self.zoom);
        camera
    }

    pub fn resize_filter(&self) -> ResizeFilter {
        ResizeFilter::new(self.min_window_width, self.min_window_height)
    }
}
