//! Oblique near-plane clipping.
//!
//! Re-derives a perspective projection whose near clipping plane coincides
//! with an arbitrary view-space plane (the mirror plane), so geometry on
//! the camera's side of the mirror is clipped away without altering the
//! x/y frustum bounds. Only the z row of the matrix changes.
//!
//! The formulation assumes GL clip convention (depth in [-1, 1]); see
//! [`crate::camera::OPENGL_TO_WGPU_MATRIX`] for the upload-time conversion.

use glam::{Mat4, Vec4};

fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Patches `projection` so its near plane coincides with `clip_plane`.
///
/// `clip_plane` is `(nx, ny, nz, constant)` in the camera's view space.
/// A positive `clip_bias` pulls the clip plane slightly toward the camera
/// to avoid z-fighting at the mirror surface itself.
pub fn apply_oblique_clipping(projection: &mut Mat4, clip_plane: Vec4, clip_bias: f32) {
    // Corner of the near plane diagonally opposite the clip plane normal,
    // expressed through the existing projection entries.
    let q = Vec4::new(
        (sign(clip_plane.x) + projection.z_axis.x) / projection.x_axis.x,
        (sign(clip_plane.y) + projection.z_axis.y) / projection.y_axis.y,
        -1.0,
        (1.0 + projection.z_axis.z) / projection.w_axis.z,
    );

    let scaled = clip_plane * (2.0 / clip_plane.dot(q));

    projection.x_axis.z = scaled.x;
    projection.y_axis.z = scaled.y;
    projection.z_axis.z = scaled.z + 1.0 - clip_bias;
    projection.w_axis.z = scaled.w;
}
