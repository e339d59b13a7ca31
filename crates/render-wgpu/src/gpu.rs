use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use tileview_common::TextureId;
use wgpu::util::DeviceExt;

use crate::mesh::{MeshRun, SpriteMesh, SpriteVertex};
use crate::shaders;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

/// Failures uploading a texture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureError {
    #[error("texture size {width}x{height} must be non-zero")]
    EmptySize { width: u32, height: u32 },
    #[error("expected {expected} bytes of RGBA data, got {actual}")]
    DataLength { expected: usize, actual: usize },
}

pub(crate) fn check_rgba(width: u32, height: u32, len: usize) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::EmptySize { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(TextureError::DataLength {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Next power-of-two capacity holding `needed`, never below `current`.
fn grow_capacity(current: usize, needed: usize) -> usize {
    if needed <= current {
        current
    } else {
        needed.next_power_of_two()
    }
}

struct GpuTexture {
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

/// wgpu sprite renderer: uploads a [`SpriteMesh`] and draws one indexed
/// call per texture run.
pub struct WgpuSpriteRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: HashMap<TextureId, GpuTexture>,
    next_texture: u32,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_buffer: wgpu::Buffer,
    index_capacity: usize,
    runs: Vec<MeshRun>,
    target_format: wgpu::TextureFormat,
}

const INITIAL_QUADS: usize = 1024;

impl WgpuSpriteRenderer {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite_uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SPRITE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_sprite"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SpriteVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x2,
                        1 => Float32x2,
                        2 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_sprite"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Rotation and mirrored views can flip winding; draw both faces.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let vertex_capacity = INITIAL_QUADS * 4;
        let index_capacity = INITIAL_QUADS * 6;
        let vertex_buffer = Self::create_vertex_buffer(device, vertex_capacity);
        let index_buffer = Self::create_index_buffer(device, index_capacity);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            sampler,
            textures: HashMap::new(),
            next_texture: 1,
            vertex_buffer,
            vertex_capacity,
            index_buffer,
            index_capacity,
            runs: Vec::new(),
            target_format,
        }
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Pixel size of a registered texture.
    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).map(|t| (t.width, t.height))
    }

    /// Upload tightly packed RGBA8 pixels and return the new texture's id.
    pub fn register_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, TextureError> {
        check_rgba(width, height, rgba.len())?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sprite_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_texture_bind_group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(
            id,
            GpuTexture {
                bind_group,
                width,
                height,
            },
        );
        tracing::debug!(id = id.0, width, height, "texture registered");
        Ok(id)
    }

    /// Upload the camera matrix and the mesh; grows GPU buffers as needed.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view_proj: Mat4,
        mesh: &SpriteMesh,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: view_proj.to_cols_array_2d(),
            }),
        );

        let vertices = mesh.vertices();
        let indices = mesh.indices();

        let vertex_capacity = grow_capacity(self.vertex_capacity, vertices.len());
        if vertex_capacity != self.vertex_capacity {
            tracing::debug!(from = self.vertex_capacity, to = vertex_capacity, "growing vertex buffer");
            self.vertex_buffer = Self::create_vertex_buffer(device, vertex_capacity);
            self.vertex_capacity = vertex_capacity;
        }
        let index_capacity = grow_capacity(self.index_capacity, indices.len());
        if index_capacity != self.index_capacity {
            tracing::debug!(from = self.index_capacity, to = index_capacity, "growing index buffer");
            self.index_buffer = Self::create_index_buffer(device, index_capacity);
            self.index_capacity = index_capacity;
        }

        if !vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(indices));
        }

        self.runs.clear();
        self.runs.extend_from_slice(mesh.runs());
    }

    /// Record the prepared runs into `pass`. Returns the number of draw calls.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) -> usize {
        if self.runs.is_empty() {
            return 0;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let mut calls = 0;
        for run in &self.runs {
            let Some(texture) = self.textures.get(&run.texture) else {
                tracing::debug!(texture = run.texture.0, "skipping run with unregistered texture");
                continue;
            };
            pass.set_bind_group(1, &texture.bind_group, &[]);
            pass.draw_indexed(run.indices.clone(), 0, 0..1);
            calls += 1;
        }
        calls
    }

    fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_vertex_buffer"),
            size: (capacity * std::mem::size_of::<SpriteVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_index_buffer"),
            size: (capacity * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}
