//! Seams between the reflection pass and the host rendering engine.
//!
//! The pass does not own a scene representation or a GPU submission path;
//! it drives whatever engine hosts it through these two traits. Keeping the
//! seams this narrow is what makes the pass testable without a display.

use glam::Mat4;

use crate::error::RenderResult;

/// Identifies a renderable node in the host scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Identifies an offscreen render target owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

/// A backend viewport rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport at the origin with the given size.
    #[must_use]
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

/// The scene graph operations the reflection pass needs.
pub trait SceneGraph {
    /// Toggles visibility of a node.
    fn set_visible(&mut self, node: NodeId, visible: bool);

    /// Returns whether a node is visible.
    fn is_visible(&self, node: NodeId) -> bool;

    /// Returns the world transform of a node.
    fn world_transform(&self, node: NodeId) -> Mat4;
}

/// The render backend operations the reflection pass needs.
///
/// The current target, viewport and auto-clear flag form shared mutable
/// backend state; the pass saves them, substitutes its own, and restores
/// them on every exit path.
pub trait RenderBackend {
    /// Allocates an offscreen color target.
    ///
    /// Allocation failure is fatal to the surface being constructed and is
    /// surfaced here rather than at render time.
    fn create_target(&mut self, width: u32, height: u32) -> RenderResult<TargetId>;

    /// Returns the currently bound render target, `None` for the default
    /// framebuffer.
    fn current_target(&self) -> Option<TargetId>;

    /// Binds a render target, `None` for the default framebuffer.
    fn set_current_target(&mut self, target: Option<TargetId>);

    /// Returns the current viewport.
    fn viewport(&self) -> Viewport;

    /// Sets the current viewport.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Returns whether the backend clears automatically before rendering.
    fn auto_clear(&self) -> bool;

    /// Sets the auto-clear flag.
    fn set_auto_clear(&mut self, auto_clear: bool);

    /// Clears the currently bound target.
    fn clear(&mut self) -> RenderResult<()>;

    /// Renders the scene with the given view and projection matrices into
    /// the currently bound target.
    fn render(
        &mut self,
        scene: &mut dyn SceneGraph,
        view: Mat4,
        projection: Mat4,
    ) -> RenderResult<()>;
}
