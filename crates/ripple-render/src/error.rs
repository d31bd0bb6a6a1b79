//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Offscreen target allocation failed.
    #[error("render target creation failed: {0}")]
    TargetCreationFailed(String),

    /// Shader compilation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Pipeline creation failed.
    #[error("pipeline creation failed: {0}")]
    PipelineCreationFailed(String),

    /// Normal map image could not be decoded.
    #[error("normal map load failed: {0}")]
    NormalMapLoadFailed(#[from] image::ImageError),

    /// Invalid surface configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ripple_core::RippleError),

    /// GPU buffer mapping failed during readback.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// The backend rejected a scene render.
    #[error("scene render failed: {0}")]
    SceneRenderFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
