use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier of a texture resident on the GPU. `0` is reserved for "no texture".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u32);

impl TextureId {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

/// Opaque sprite handle supplied by the asset layer.
///
/// Carries the backing texture, the sprite's pixel size and the UV region
/// inside the texture (`[u_min, v_min, u_max, v_max]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteHandle {
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
    pub uv: [f32; 4],
}

impl SpriteHandle {
    /// Sentinel used by absent tiles and unset sprites.
    pub const NULL: Self = Self {
        texture: TextureId::NULL,
        width: 0,
        height: 0,
        uv: [0.0, 0.0, 1.0, 1.0],
    };

    /// A sprite covering the whole texture.
    pub fn new(texture: TextureId, width: u32, height: u32) -> Self {
        Self {
            texture,
            width,
            height,
            uv: [0.0, 0.0, 1.0, 1.0],
        }
    }

    /// Restrict the sprite to a sub-region of its texture (atlas cell).
    pub fn with_uv(mut self, uv: [f32; 4]) -> Self {
        self.uv = uv;
        self
    }

    /// A handle is drawable when it names a texture and has a non-empty size.
    pub fn is_valid(&self) -> bool {
        !self.texture.is_null() && self.width > 0 && self.height > 0
    }

    /// Pixel size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl Default for SpriteHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// Linear RGBA tint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    /// Opaque white, so an untinted sprite draws with its texture colours.
    fn default() -> Self {
        Self::WHITE
    }
}

/// One occupied grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub sprite: SpriteHandle,
    /// Consumed by collision; the renderer ignores it.
    pub solid: bool,
}

impl Tile {
    pub fn new(sprite: SpriteHandle) -> Self {
        Self {
            sprite,
            solid: false,
        }
    }

    pub fn solid(sprite: SpriteHandle) -> Self {
        Self {
            sprite,
            solid: true,
        }
    }
}
