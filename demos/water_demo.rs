//! Headless water reflection demo.
//!
//! Renders a small scene (a sky-colored background and one triangle) into a
//! water surface's reflection target, then draws the animated water quad
//! into an offscreen frame and saves it as `water_demo.png`.
//!
//! Run with `cargo run --example water_demo`.

use std::error::Error;

use glam::{Mat4, Quat, Vec3};
use ripple_core::{MirrorConfig, WaterConfig};
use ripple_render::{
    procedural_normal_map, render_reflection, Camera, GpuContext, MirrorSurface, NodeId,
    ReflectionTarget, RenderBackend, RenderError, RenderResult, SceneGraph, TargetId, Viewport,
    WaterRenderData, OPENGL_TO_WGPU_MATRIX,
};

const OUTPUT_SIZE: u32 = 512;
const SKY: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.79,
    b: 0.92,
    a: 1.0,
};

const SCENE_SHADER: &str = r#"
struct SceneUniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> scene: SceneUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    // One orange triangle floating above the water.
    var positions = array<vec3<f32>, 3>(
        vec3<f32>(-8.0, 2.0, 0.0),
        vec3<f32>(8.0, 2.0, 0.0),
        vec3<f32>(0.0, 14.0, 0.0),
    );
    var out: VertexOutput;
    out.clip_position = scene.view_proj * vec4<f32>(positions[index], 1.0);
    out.color = vec3<f32>(0.9, 0.5, 0.2);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;

/// A one-node scene: the water quad itself.
struct DemoScene {
    water_visible: bool,
}

impl SceneGraph for DemoScene {
    fn set_visible(&mut self, _node: NodeId, visible: bool) {
        self.water_visible = visible;
    }

    fn is_visible(&self, _node: NodeId) -> bool {
        self.water_visible
    }

    fn world_transform(&self, _node: NodeId) -> Mat4 {
        Mat4::IDENTITY
    }
}

/// wgpu-backed render backend for the demo.
struct DemoBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    targets: Vec<ReflectionTarget>,
    current_target: Option<TargetId>,
    viewport: Viewport,
    auto_clear: bool,
    scene_pipeline: wgpu::RenderPipeline,
    scene_uniforms: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
}

impl DemoBackend {
    fn new(gpu: &GpuContext) -> Self {
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();

        let scene_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Demo Scene Uniforms"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Demo Scene Bind Group Layout"),
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

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Demo Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniforms.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Demo Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Demo Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Demo Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ripple_render::REFLECTION_TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ripple_render::REFLECTION_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            device,
            queue,
            targets: Vec::new(),
            current_target: None,
            viewport: Viewport::with_size(OUTPUT_SIZE as f32, OUTPUT_SIZE as f32),
            auto_clear: true,
            scene_pipeline,
            scene_uniforms,
            scene_bind_group,
        }
    }

    fn target(&self, target: TargetId) -> &ReflectionTarget {
        &self.targets[target.0 as usize]
    }
}

impl RenderBackend for DemoBackend {
    fn create_target(&mut self, width: u32, height: u32) -> RenderResult<TargetId> {
        let config = MirrorConfig {
            width,
            height,
            ..MirrorConfig::default()
        };
        let target = ReflectionTarget::new(&self.device, &config)?;
        self.targets.push(target);
        Ok(TargetId(self.targets.len() as u32 - 1))
    }

    fn current_target(&self) -> Option<TargetId> {
        self.current_target
    }

    fn set_current_target(&mut self, target: Option<TargetId>) {
        self.current_target = target;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
    }

    // Clearing is folded into the render pass below.
    fn clear(&mut self) -> RenderResult<()> {
        Ok(())
    }

    fn render(
        &mut self,
        _scene: &mut dyn SceneGraph,
        view: Mat4,
        projection: Mat4,
    ) -> RenderResult<()> {
        let Some(target) = self.current_target else {
            return Err(RenderError::SceneRenderFailed("no target bound".into()));
        };

        let view_proj = OPENGL_TO_WGPU_MATRIX * projection * view;
        self.queue.write_buffer(
            &self.scene_uniforms,
            0,
            bytemuck::cast_slice(&view_proj.to_cols_array()),
        );

        let target = &self.targets[target.0 as usize];
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Demo Reflection Encoder"),
            });
        {
            let mut pass = target.begin_reflection_pass(&mut encoder, SKY);
            pass.set_pipeline(&self.scene_pipeline);
            pass.set_bind_group(0, &self.scene_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let gpu = pollster::block_on(GpuContext::new_headless())?;
    let mut backend = DemoBackend::new(&gpu);
    let mut scene = DemoScene {
        water_visible: true,
    };
    let water_node = NodeId(0);

    // Water lying flat at the origin, 100x100 world units.
    let mut surface = MirrorSurface::new_water(
        &mut backend,
        Vec3::ZERO,
        Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        MirrorConfig::default(),
        WaterConfig::default(),
    )?;

    let mut camera = Camera::new(1.0);
    camera.position = Vec3::new(0.0, 10.0, 30.0);
    camera.target = Vec3::ZERO;
    camera.far = 2000.0;

    // Let the water animate for a couple of seconds of frame time.
    for _ in 0..120 {
        surface.advance_time();
        render_reflection(&mut backend, &mut scene, water_node, &camera, &mut surface)?;
    }

    // Water material sampling the reflection we just rendered.
    let (_normal_texture, normal_view) = procedural_normal_map(&gpu.device, &gpu.queue, 256);
    let reflection_view = backend.target(surface.target()).color_view();
    let water = WaterRenderData::new(
        &gpu.device,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        None,
        &normal_view,
        reflection_view,
        50.0,
    );
    water.update(
        &gpu.queue,
        &surface,
        camera.view_matrix(),
        camera.projection_matrix(),
    );

    // Offscreen output frame.
    let output = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Demo Output"),
        size: wgpu::Extent3d {
            width: OUTPUT_SIZE,
            height: OUTPUT_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let output_view = output.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Demo Main Encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Demo Main Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(SKY),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        water.draw(&mut pass);
    }

    // Read the frame back and save it.
    let bytes_per_row = OUTPUT_SIZE * 4;
    let readback = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Demo Readback Buffer"),
        size: u64::from(bytes_per_row * OUTPUT_SIZE),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &output,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(OUTPUT_SIZE),
            },
        },
        wgpu::Extent3d {
            width: OUTPUT_SIZE,
            height: OUTPUT_SIZE,
            depth_or_array_layers: 1,
        },
    );
    gpu.queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = gpu.device.poll(wgpu::PollType::wait_indefinitely());
    rx.recv()??;

    let data = buffer_slice.get_mapped_range();
    let pixels = data.to_vec();
    drop(data);
    readback.unmap();

    let img = image::RgbaImage::from_raw(OUTPUT_SIZE, OUTPUT_SIZE, pixels)
        .ok_or("frame readback has unexpected size")?;
    img.save("water_demo.png")?;
    println!(
        "wrote water_demo.png ({}x{}, water time {:.2}s)",
        OUTPUT_SIZE,
        OUTPUT_SIZE,
        surface.time()
    );

    Ok(())
}
