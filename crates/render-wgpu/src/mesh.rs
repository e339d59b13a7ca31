use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use tileview_common::TextureId;
use tileview_render::{DrawBackend, SpriteDraw};

/// One sprite-quad corner as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// Indices of one texture run inside [`SpriteMesh::indices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRun {
    pub texture: TextureId,
    pub indices: Range<u32>,
}

/// CPU-side quad builder: receives batch runs and produces vertex and index
/// data ready for upload.
#[derive(Debug, Default)]
pub struct SpriteMesh {
    vertices: Vec<SpriteVertex>,
    indices: Vec<u32>,
    runs: Vec<MeshRun>,
}

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

impl SpriteMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all geometry, keeping allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.runs.clear();
    }

    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn runs(&self) -> &[MeshRun] {
        &self.runs
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn push_quad(&mut self, draw: &SpriteDraw) {
        let base = self.vertices.len() as u32;
        let [u0, v0, u1, v1] = draw.sprite.uv;
        // Texture v grows downward, world y upward.
        let uvs = [[u0, v1], [u1, v1], [u1, v0], [u0, v0]];
        let color = draw.tint.to_array();

        for (corner, uv) in draw.corners().into_iter().zip(uvs) {
            self.vertices.push(SpriteVertex {
                position: corner.to_array(),
                uv,
                color,
            });
        }
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }
}

impl DrawBackend for SpriteMesh {
    fn draw_run(&mut self, texture: TextureId, sprites: &[SpriteDraw]) {
        if sprites.is_empty() {
            return;
        }
        let start = self.indices.len() as u32;
        for draw in sprites {
            self.push_quad(draw);
        }
        let end = self.indices.len() as u32;

        match self.runs.last_mut() {
            Some(last) if last.texture == texture && last.indices.end == start => {
                last.indices.end = end;
            }
            _ => self.runs.push(MeshRun {
                texture,
                indices: start..end,
            }),
        }
    }
}
