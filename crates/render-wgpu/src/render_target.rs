/// Failures creating or resizing a [`RenderTarget`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderTargetError {
    #[error("render target size {width}x{height} must be non-zero")]
    ZeroSize { width: u32, height: u32 },
    #[error("render target size {width}x{height} exceeds device limit {limit}")]
    TooLarge { width: u32, height: u32, limit: u32 },
}

/// Check a requested size against the device's 2D texture limit.
pub(crate) fn validate_size(width: u32, height: u32, limit: u32) -> Result<(), RenderTargetError> {
    if width == 0 || height == 0 {
        return Err(RenderTargetError::ZeroSize { width, height });
    }
    if width > limit || height > limit {
        return Err(RenderTargetError::TooLarge {
            width,
            height,
            limit,
        });
    }
    Ok(())
}

/// Offscreen colour texture that can be rendered into and then sampled.
///
/// `resize` destroys and recreates the backing texture; anything bound to
/// the old view must be rebuilt, which [`generation`](Self::generation)
/// lets callers detect.
pub struct RenderTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    generation: u64,
}

impl RenderTarget {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Self, RenderTargetError> {
        validate_size(width, height, device.limits().max_texture_dimension_2d)?;
        let (texture, view) = Self::create_texture(device, width, height, format);
        tracing::debug!(width, height, ?format, "render target created");
        Ok(Self {
            texture,
            view,
            format,
            width,
            height,
            generation: 0,
        })
    }

    /// Recreate at a new size. Returns `Ok(false)` when the size is unchanged.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<bool, RenderTargetError> {
        validate_size(width, height, device.limits().max_texture_dimension_2d)?;
        if width == self.width && height == self.height {
            return Ok(false);
        }

        self.texture.destroy();
        let (texture, view) = Self::create_texture(device, width, height, self.format);
        self.texture = texture;
        self.view = view;
        self.width = width;
        self.height = height;
        self.generation += 1;
        tracing::debug!(width, height, generation = self.generation, "render target recreated");
        Ok(true)
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bumped every time the backing texture is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Clear the target, then run `draw` inside a render pass on it.
    ///
    /// The pass is owned by this call and ends when it returns or unwinds.
    pub fn render<R>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        clear: wgpu::Color,
        draw: impl FnOnce(&mut wgpu::RenderPass<'_>) -> R,
    ) -> R {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("render_target_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });
        draw(&mut pass)
    }

    fn create_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("render_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        (texture, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_rejected() {
        assert_eq!(
            validate_size(0, 480, 8192),
            Err(RenderTargetError::ZeroSize {
                width: 0,
                height: 480
            })
        );
        assert!(validate_size(640, 0, 8192).is_err());
    }

    #[test]
    fn over_limit_rejected() {
        let err = validate_size(640, 9000, 8192).unwrap_err();
        assert!(matches!(err, RenderTargetError::TooLarge { limit: 8192, .. }));
        assert!(err.to_string().contains("exceeds device limit 8192"));
    }

    #[test]
    fn limit_is_inclusive() {
        assert!(validate_size(8192, 8192, 8192).is_ok());
        assert!(validate_size(640, 480, 8192).is_ok());
    }
}
