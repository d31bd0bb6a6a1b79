//! Water surface material.
//!
//! Draws the reflective surface itself in the main pass, sampling the
//! offscreen reflection image through the surface's texture-projection
//! matrix. The flat mirror variant uses the same pipeline with distortion
//! zero and the sun disabled.

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::camera::OPENGL_TO_WGPU_MATRIX;
use crate::surface::{MirrorSurface, SurfaceKind};

/// GPU representation of the water material uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterUniforms {
    pub model: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub texture_matrix: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub sun_direction: [f32; 4],
    pub sun_color: [f32; 4],
    pub water_color: [f32; 4],
    pub time: f32,
    pub distortion_scale: f32,
    pub size: f32,
    pub alpha: f32,
}

impl Default for WaterUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            texture_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0; 4],
            sun_direction: [0.70707, 0.70707, 0.0, 0.0],
            sun_color: [1.0, 1.0, 1.0, 0.0],
            water_color: [0.0, 30.0 / 255.0, 15.0 / 255.0, 0.0],
            time: 0.0,
            distortion_scale: 3.7,
            size: 1.0,
            alpha: 1.0,
        }
    }
}

impl WaterUniforms {
    /// Builds the uniforms for a surface's current state.
    ///
    /// `projection` is in GL clip convention; the depth-range conversion
    /// to wgpu happens here.
    #[must_use]
    pub fn from_surface(surface: &MirrorSurface, model: Mat4, view: Mat4, projection: Mat4) -> Self {
        let view_proj = OPENGL_TO_WGPU_MATRIX * projection * view;
        let eye = surface.eye();

        let (sun_direction, sun_color, water_color, distortion_scale, size) =
            match surface.kind() {
                SurfaceKind::Water(state) => (
                    state.config.sun_direction,
                    state.config.sun_color,
                    state.config.water_color,
                    state.config.distortion_scale,
                    state.config.size,
                ),
                // A flat mirror is undistorted and unlit by the sun.
                SurfaceKind::Mirror => (Vec3::Y, Vec3::ZERO, Vec3::ZERO, 0.0, 1.0),
            };

        Self {
            model: model.to_cols_array_2d(),
            view_proj: view_proj.to_cols_array_2d(),
            texture_matrix: surface.texture_matrix().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
            sun_direction: [sun_direction.x, sun_direction.y, sun_direction.z, 0.0],
            sun_color: [sun_color.x, sun_color.y, sun_color.z, 0.0],
            water_color: [water_color.x, water_color.y, water_color.z, 0.0],
            time: surface.time(),
            distortion_scale,
            size,
            alpha: surface.config().alpha,
        }
    }
}

/// Vertex of the surface mesh: position only, the shader derives the rest.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterVertex {
    pub position: [f32; 3],
}

/// Water material render resources.
pub struct WaterRenderData {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl WaterRenderData {
    /// Creates the water material pipeline and the surface quad mesh.
    ///
    /// `half_extent` is the quad's half size in local units; the quad lies
    /// in the local XY plane with a +Z normal, matching the surface pose
    /// convention.
    #[allow(clippy::too_many_lines)]
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        normal_map_view: &wgpu::TextureView,
        reflection_view: &wgpu::TextureView,
        half_extent: f32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Uniform Buffer"),
            contents: bytemuck::cast_slice(&[WaterUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let normal_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Water Normal Map Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let reflection_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Water Reflection Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Water Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Normal map
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Reflection image
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Normal map sampler (repeat)
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Reflection sampler (clamp)
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(normal_map_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(reflection_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&normal_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&reflection_sampler),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Water Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/water.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Water Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Water Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<WaterVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let s = half_extent;
        let vertices = [
            WaterVertex { position: [-s, -s, 0.0] },
            WaterVertex { position: [s, -s, 0.0] },
            WaterVertex { position: [s, s, 0.0] },
            WaterVertex { position: [-s, s, 0.0] },
        ];
        let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Updates the uniforms from the surface's current state.
    ///
    /// `projection` is the main camera's projection in GL clip convention.
    pub fn update(
        &self,
        queue: &wgpu::Queue,
        surface: &MirrorSurface,
        view: Mat4,
        projection: Mat4,
    ) {
        let uniforms =
            WaterUniforms::from_surface(surface, surface.world_matrix(), view, projection);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Draws the surface quad into an active render pass.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_uniforms_size() {
        // Ensure the uniform block is correctly aligned for GPU
        assert_eq!(
            std::mem::size_of::<WaterUniforms>(),
            3 * 64 + 4 * 16 + 4 * 4 // three matrices + four vec4s + four scalars
        );
        assert_eq!(std::mem::size_of::<WaterUniforms>() % 16, 0);
    }

    #[test]
    fn test_water_uniforms_defaults() {
        let uniforms = WaterUniforms::default();
        assert_eq!(uniforms.alpha, 1.0);
        assert_eq!(uniforms.time, 0.0);
        assert!((uniforms.distortion_scale - 3.7).abs() < 1e-6);
    }
}
