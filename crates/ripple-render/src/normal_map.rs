//! Water normal map textures.
//!
//! The water shader tiles a normal map at several frequencies; any
//! repeating tangent-space normal texture works. A procedural fallback is
//! provided so the library has no mandatory asset.

use std::path::Path;

use rand::Rng;

use crate::error::RenderResult;

/// Loads a tiling normal map from an image file.
pub fn load_normal_map(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: impl AsRef<Path>,
) -> RenderResult<(wgpu::Texture, wgpu::TextureView)> {
    let image = image::open(path.as_ref())?.to_rgba8();
    let (width, height) = image.dimensions();
    log::debug!(
        "loaded {}x{} normal map from {}",
        width,
        height,
        path.as_ref().display()
    );
    Ok(upload_rgba(device, queue, &image, width, height))
}

/// Generates a random-noise normal map.
///
/// Not a substitute for an authored water normal map visually, but enough
/// to animate the surface.
pub fn procedural_normal_map(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    size: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = size.max(1);
    let mut rng = rand::thread_rng();
    let mut data = Vec::with_capacity((size * size * 4) as usize);

    for _ in 0..size * size {
        // Tangent-space normal with a dominant +Z, encoded in [0, 255].
        let x: f32 = rng.gen_range(-0.5..0.5);
        let y: f32 = rng.gen_range(-0.5..0.5);
        let z = (1.0 - x * x - y * y).max(0.0).sqrt();
        data.push(((x * 0.5 + 0.5) * 255.0) as u8);
        data.push(((y * 0.5 + 0.5) * 255.0) as u8);
        data.push(((z * 0.5 + 0.5) * 255.0) as u8);
        data.push(255u8);
    }

    upload_rgba(device, queue, &data, size, size)
}

fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &[u8],
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Water Normal Map"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
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
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
