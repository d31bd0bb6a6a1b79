//! Planar reflection rendering for ripple-rs.
//!
//! This crate derives a mirror camera from a reflective surface's pose,
//! renders the scene through an obliquely-clipped projection into an
//! offscreen target, and draws the surface itself with a water (or flat
//! mirror) material that samples the reflection projectively.
//!
//! The reflection math is pure and backend-agnostic (see
//! [`reflection_pass`] and the [`backend`] traits); the wgpu resources for
//! the offscreen target and the water material live in [`target`],
//! [`water`] and [`normal_map`].

pub mod backend;
pub mod camera;
pub mod context;
pub mod error;
pub mod normal_map;
pub mod oblique;
pub mod reflection_pass;
pub mod surface;
pub mod target;
pub mod water;

pub use backend::{NodeId, RenderBackend, SceneGraph, TargetId, Viewport};
pub use camera::{Camera, OPENGL_TO_WGPU_MATRIX};
pub use context::GpuContext;
pub use error::{RenderError, RenderResult};
pub use normal_map::{load_normal_map, procedural_normal_map};
pub use oblique::apply_oblique_clipping;
pub use reflection_pass::{compute_frame, render_reflection, ReflectionFrame};
pub use surface::{MirrorSurface, SurfaceKind, WaterState};
pub use target::{ReflectionTarget, REFLECTION_DEPTH_FORMAT, REFLECTION_TARGET_FORMAT};
pub use water::{WaterRenderData, WaterUniforms, WaterVertex};
