//! View: viewport scaling, 2D orthographic camera, coordinate-space conversions.
//!
//! # Coordinate convention
//! One convention is applied by the projection, the view and every
//! conversion routine in this crate:
//! - **Window space**: physical window pixels, origin top-left, +Y down.
//! - **Game space**: pixels of the fixed internal resolution, origin
//!   top-left, +Y down.
//! - **NDC**: `[-1, 1]²`, +Y up.
//! - **World space**: origin-centred, +Y up. The camera position is the
//!   geometric centre of the view.
//!
//! Zoom is applied once, in the projection. The view matrix is a rotation
//! about the view centre composed with a translation by `-position.xy`.
//!
//! # Invariants
//! - Viewport scale and offsets always match the latest window size.
//! - Matrices handed out by the camera reflect every prior mutator call.
//! - Invalid mutations are rejected with a warning; prior state is kept.

mod camera;
pub mod convert;
mod settings;
mod viewport;

pub use camera::{Camera, FAR_PLANE, NEAR_PLANE};
pub use settings::{SettingsError, ViewSettings};
pub use viewport::{ResizeFilter, ViewportConfig, ViewportError};

pub fn crate_info() -> &'static str {
    "tileview-view v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("view"));
    }
}
