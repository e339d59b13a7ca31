use tileview_view::ViewportConfig;

use crate::render_target::RenderTarget;
use crate::shaders;

/// Viewport rectangle `[x, y, w, h]` of the game area on the surface,
/// clamped to the window. `None` when nothing would be visible.
pub fn present_rect(viewport: &ViewportConfig) -> Option<[f32; 4]> {
    let (x, y, w, h) = viewport.game_rect_in_window();
    let window_w = viewport.window_width() as f32;
    let window_h = viewport.window_height() as f32;

    let x = x.clamp(0.0, window_w);
    let y = y.clamp(0.0, window_h);
    let w = w.min(window_w - x);
    let h = h.min(window_h - y);
    (w >= 1.0 && h >= 1.0).then_some([x, y, w, h])
}

/// Scales an offscreen [`RenderTarget`] into the letterboxed rectangle of
/// the window surface; the bars keep the clear colour.
pub struct PresentBlit {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bound: Option<(u64, wgpu::BindGroup)>,
}

impl PresentBlit {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bind_group_layout"),
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

        // Nearest keeps pixel art crisp at integer and non-integer scales alike.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLIT_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_blit"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_blit"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            layout,
            sampler,
            bound: None,
        }
    }

    /// Bind `target` as the blit source, rebuilding only after it was recreated.
    pub fn prepare(&mut self, device: &wgpu::Device, target: &RenderTarget) {
        if matches!(&self.bound, Some((generation, _)) if *generation == target.generation()) {
            return;
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind_group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(target.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.bound = Some((target.generation(), bind_group));
    }

    /// Clear `surface` to `bars` and draw the prepared target into the game rect.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface: &wgpu::TextureView,
        viewport: &ViewportConfig,
        bars: wgpu::Color,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("present_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(bars),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });

        let Some((_, bind_group)) = &self.bound else {
            tracing::warn!("PresentBlit::draw before prepare, presenting bars only");
            return;
        };
        let Some([x, y, w, h]) = present_rect(viewport) else {
            return;
        };

        pass.set_viewport(x, y, w, h, 0.0, 1.0);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
