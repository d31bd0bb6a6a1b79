//! Planar reflection rendering pass.
//!
//! Each frame the pass derives a mirror camera from the main camera by
//! reflecting its pose across the mirror plane, patches the projection so
//! the near clip plane coincides with the mirror, and renders the scene
//! from that camera into the surface's offscreen target. The surface's own
//! geometry is hidden for the duration of the render, and the backend's
//! target/viewport/auto-clear state is restored on every exit path.

use glam::{Mat4, Vec3};
use ripple_core::Plane;

use crate::backend::{NodeId, RenderBackend, SceneGraph, Viewport};
use crate::camera::Camera;
use crate::error::RenderResult;
use crate::oblique::apply_oblique_clipping;
use crate::surface::MirrorSurface;

/// Maps GL clip space [-1, 1] to texture space [0, 1].
fn bias_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::splat(0.5)) * Mat4::from_scale(Vec3::splat(0.5))
}

/// Everything derived for one frame of reflection rendering.
///
/// Transient by design: recomputed from the current poses every frame,
/// never persisted.
#[derive(Debug, Clone)]
pub struct ReflectionFrame {
    /// The derived mirror camera.
    pub mirror_camera: Camera,
    /// The mirror camera's view matrix.
    pub view_matrix: Mat4,
    /// The obliquely-clipped projection matrix (GL clip convention).
    pub projection: Mat4,
    /// Maps world-space positions to reflection texture coordinates.
    pub texture_matrix: Mat4,
    /// Main camera world position, for the shader's fresnel/specular terms.
    pub eye: Vec3,
}

/// Derives the mirror camera and matrices for the current frame.
///
/// Returns `None` when the pass must be skipped: the camera is on or
/// behind the mirror plane (reflecting would produce a camera behind the
/// mirror), or the surface normal is degenerate.
#[must_use]
pub fn compute_frame(camera: &Camera, surface: &MirrorSurface) -> Option<ReflectionFrame> {
    let mirror_position = surface.position();
    let Some(normal) = surface.normal() else {
        log::warn!("mirror surface has a degenerate normal, skipping reflection");
        return None;
    };

    let plane = Plane::from_normal_and_point(normal, mirror_position).ok()?;

    // Camera on or behind the mirror plane: the mirror faces away.
    let view = mirror_position - camera.position;
    if view.dot(normal) >= 0.0 {
        log::trace!("camera behind mirror plane, skipping reflection");
        return None;
    }

    let mirror_camera_position = mirror_position - plane.reflect_vector(view);

    // Reflect the main camera's look target across the plane the same way.
    let rotation = camera.rotation();
    let look_at = rotation * Vec3::NEG_Z + camera.position;
    let target_vector = mirror_position - look_at;
    let mirror_target = mirror_position - plane.reflect_vector(target_vector);

    // The up vector is reflected separately rather than derived from the
    // target; it fixes the mirror camera's roll.
    let up = plane.reflect_vector(rotation * Vec3::Y);

    // Shares fov/aspect/near/far with the main camera, pose is replaced.
    let mut mirror_camera = camera.clone();
    mirror_camera.position = mirror_camera_position;
    mirror_camera.target = mirror_target;
    mirror_camera.up = up;

    let view_matrix = mirror_camera.view_matrix();

    // Base projection comes from the main camera; the texture matrix uses
    // it un-clipped so projective texture coordinates stay valid across
    // the whole plane.
    let mut projection = camera.projection_matrix();
    let texture_matrix = bias_matrix() * projection * view_matrix;

    let clip_plane = plane.transformed(view_matrix).to_vec4();
    apply_oblique_clipping(&mut projection, clip_plane, surface.config().clip_bias);

    Some(ReflectionFrame {
        mirror_camera,
        view_matrix,
        projection,
        texture_matrix,
        eye: camera.position,
    })
}

/// Renders the reflection for one frame.
///
/// Returns `Ok(false)` when the pass was skipped (facing-away camera or
/// degenerate normal); the surface's target and texture matrix are left
/// untouched in that case. On success the surface's texture matrix and eye
/// position are updated and `Ok(true)` is returned.
pub fn render_reflection(
    backend: &mut dyn RenderBackend,
    scene: &mut dyn SceneGraph,
    surface_node: NodeId,
    camera: &Camera,
    surface: &mut MirrorSurface,
) -> RenderResult<bool> {
    let Some(frame) = compute_frame(camera, surface) else {
        return Ok(false);
    };

    // Hide the mirror's own geometry to avoid self-reflection artifacts.
    let was_visible = scene.is_visible(surface_node);
    scene.set_visible(surface_node, false);

    let saved_target = backend.current_target();
    let saved_viewport = backend.viewport();
    let saved_auto_clear = backend.auto_clear();

    backend.set_current_target(Some(surface.target()));
    backend.set_auto_clear(false);
    backend.set_viewport(Viewport::with_size(
        surface.config().width as f32,
        surface.config().height as f32,
    ));

    let result = backend
        .clear()
        .and_then(|()| backend.render(scene, frame.view_matrix, frame.projection));

    // Restore shared state unconditionally before surfacing any error.
    scene.set_visible(surface_node, was_visible);
    backend.set_current_target(saved_target);
    backend.set_viewport(saved_viewport);
    backend.set_auto_clear(saved_auto_clear);

    result?;

    surface.store_frame_outputs(frame.texture_matrix, frame.eye);
    Ok(true)
}
