//! Reflective surfaces.
//!
//! A [`MirrorSurface`] is a planar entity with a world pose, an owned
//! offscreen reflection target, and a texture-projection matrix recomputed
//! every frame by the reflection pass. The animated water variant is the
//! same surface with extra uniforms and a frame clock, modeled as a tagged
//! configuration rather than a subtype.

use glam::{Mat4, Quat, Vec3};
use ripple_core::{FrameClock, MirrorConfig, WaterConfig};

use crate::backend::{RenderBackend, TargetId};
use crate::error::RenderResult;

/// Per-surface state of the animated water variant.
#[derive(Debug, Clone)]
pub struct WaterState {
    /// Water shader tunables.
    pub config: WaterConfig,
    clock: FrameClock,
}

impl WaterState {
    /// Creates water state with a clock stepping by the configured amount.
    #[must_use]
    pub fn new(config: WaterConfig) -> Self {
        Self {
            config,
            clock: FrameClock::with_step(config.time_step),
        }
    }

    /// Returns the accumulated animation time.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.clock.time()
    }
}

/// The behavioral variant of a reflective surface.
#[derive(Debug, Clone)]
pub enum SurfaceKind {
    /// A flat, undistorted mirror.
    Mirror,
    /// An animated water surface.
    Water(WaterState),
}

/// A planar reflective surface.
pub struct MirrorSurface {
    position: Vec3,
    rotation: Quat,
    config: MirrorConfig,
    kind: SurfaceKind,
    target: TargetId,
    texture_matrix: Mat4,
    eye: Vec3,
}

impl MirrorSurface {
    /// Creates a flat mirror surface, allocating its offscreen target.
    pub fn new_mirror(
        backend: &mut dyn RenderBackend,
        position: Vec3,
        rotation: Quat,
        config: MirrorConfig,
    ) -> RenderResult<Self> {
        Self::new(backend, position, rotation, config, SurfaceKind::Mirror)
    }

    /// Creates an animated water surface, allocating its offscreen target.
    pub fn new_water(
        backend: &mut dyn RenderBackend,
        position: Vec3,
        rotation: Quat,
        config: MirrorConfig,
        water: WaterConfig,
    ) -> RenderResult<Self> {
        Self::new(
            backend,
            position,
            rotation,
            config,
            SurfaceKind::Water(WaterState::new(water)),
        )
    }

    fn new(
        backend: &mut dyn RenderBackend,
        position: Vec3,
        rotation: Quat,
        config: MirrorConfig,
        kind: SurfaceKind,
    ) -> RenderResult<Self> {
        config.validate().map_err(crate::error::RenderError::Config)?;
        let target = backend.create_target(config.width, config.height)?;
        log::debug!(
            "created {}x{} reflection target {:?}",
            config.width,
            config.height,
            target
        );
        Ok(Self {
            position,
            rotation,
            config,
            kind,
            target,
            texture_matrix: Mat4::IDENTITY,
            eye: Vec3::ZERO,
        })
    }

    /// Returns the surface position in world space.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Sets the surface position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Returns the surface rotation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Sets the surface rotation.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Returns the surface's world transform.
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Returns the plane normal: the local +Z axis rotated into world
    /// space, derived from the current pose every call.
    ///
    /// Returns `None` if the rotated axis fails to normalize.
    #[must_use]
    pub fn normal(&self) -> Option<Vec3> {
        (self.rotation * Vec3::Z).try_normalize()
    }

    /// Returns the shared surface configuration.
    #[must_use]
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Returns the surface variant.
    #[must_use]
    pub fn kind(&self) -> &SurfaceKind {
        &self.kind
    }

    /// Returns the water configuration, if this surface is water.
    #[must_use]
    pub fn water_config(&self) -> Option<&WaterConfig> {
        match &self.kind {
            SurfaceKind::Water(state) => Some(&state.config),
            SurfaceKind::Mirror => None,
        }
    }

    /// Returns the offscreen target owned by this surface.
    #[must_use]
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Returns the texture-projection matrix computed by the last
    /// successful reflection pass.
    #[must_use]
    pub fn texture_matrix(&self) -> Mat4 {
        self.texture_matrix
    }

    /// Returns the eye position recorded by the last successful pass.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Returns the accumulated water animation time (zero for a mirror).
    #[must_use]
    pub fn time(&self) -> f32 {
        match &self.kind {
            SurfaceKind::Water(state) => state.time(),
            SurfaceKind::Mirror => 0.0,
        }
    }

    /// Advances the water clock by one frame tick.
    ///
    /// Returns the new time, or `None` for a flat mirror. Called once per
    /// rendered frame by the caller's frame driver.
    pub fn advance_time(&mut self) -> Option<f32> {
        match &mut self.kind {
            SurfaceKind::Water(state) => Some(state.clock.advance()),
            SurfaceKind::Mirror => None,
        }
    }

    pub(crate) fn store_frame_outputs(&mut self, texture_matrix: Mat4, eye: Vec3) {
        self.texture_matrix = texture_matrix;
        self.eye = eye;
    }
}
