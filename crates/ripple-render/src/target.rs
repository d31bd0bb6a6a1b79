//! Offscreen reflection targets.

use ripple_core::MirrorConfig;

use crate::error::RenderResult;

/// Color format of reflection targets.
pub const REFLECTION_TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Depth format of reflection targets.
pub const REFLECTION_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU resources for one surface's offscreen reflection image.
///
/// One target per surface, rendered in place every frame; the single
/// threaded frame loop guarantees no reader overlaps the write.
pub struct ReflectionTarget {
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl ReflectionTarget {
    /// Allocates the color and depth textures for a reflection target.
    ///
    /// Resolution problems are surfaced here, at construction, since the
    /// pass cannot function without its target.
    pub fn new(device: &wgpu::Device, config: &MirrorConfig) -> RenderResult<Self> {
        config.validate()?;

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Color Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            color_texture,
            color_view,
            depth_texture,
            depth_view,
            width: config.width,
            height: config.height,
        })
    }

    /// Begins the reflection render pass, clearing color and depth.
    ///
    /// The caller draws the scene (minus the mirror's own geometry) into
    /// the returned pass with the mirror camera's matrices.
    pub fn begin_reflection_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        clear_color: wgpu::Color,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Reflection Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }

    /// Returns the reflection color texture.
    #[must_use]
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color_texture
    }

    /// Returns the reflection color view for sampling.
    #[must_use]
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    /// Returns the depth texture.
    #[must_use]
    pub fn depth_texture(&self) -> &wgpu::Texture {
        &self.depth_texture
    }

    /// Returns the target width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the target height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}
