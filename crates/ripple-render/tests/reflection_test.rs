//! Integration tests for the planar reflection pass, driven through a
//! recording mock backend so no GPU is required.

use std::collections::{HashMap, HashSet};

use glam::{Mat4, Quat, Vec3};
use ripple_core::{MirrorConfig, WaterConfig};
use ripple_render::{
    compute_frame, render_reflection, Camera, MirrorSurface, NodeId, RenderBackend, RenderError,
    RenderResult, SceneGraph, TargetId, Viewport,
};

#[derive(Default)]
struct MockScene {
    hidden: HashSet<u64>,
}

impl SceneGraph for MockScene {
    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if visible {
            self.hidden.remove(&node.0);
        } else {
            self.hidden.insert(node.0);
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        !self.hidden.contains(&node.0)
    }

    fn world_transform(&self, _node: NodeId) -> Mat4 {
        Mat4::IDENTITY
    }
}

struct MockBackend {
    targets: HashMap<u32, Vec<u8>>,
    next_target: u32,
    current_target: Option<TargetId>,
    viewport: Viewport,
    auto_clear: bool,
    render_count: u8,
    /// Node whose visibility is sampled at render time.
    watch_node: Option<NodeId>,
    node_visible_during_render: Option<bool>,
    fail_render: bool,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            targets: HashMap::new(),
            next_target: 0,
            current_target: None,
            viewport: Viewport::with_size(1920.0, 1080.0),
            auto_clear: true,
            render_count: 0,
            watch_node: None,
            node_visible_during_render: None,
            fail_render: false,
        }
    }

    fn target_bytes(&self, target: TargetId) -> &[u8] {
        &self.targets[&target.0]
    }
}

impl RenderBackend for MockBackend {
    fn create_target(&mut self, width: u32, height: u32) -> RenderResult<TargetId> {
        let id = self.next_target;
        self.next_target += 1;
        self.targets
            .insert(id, vec![0u8; (width * height * 4) as usize]);
        Ok(TargetId(id))
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

    fn clear(&mut self) -> RenderResult<()> {
        if let Some(target) = self.current_target {
            if let Some(pixels) = self.targets.get_mut(&target.0) {
                pixels.fill(0);
            }
        }
        Ok(())
    }

    fn render(
        &mut self,
        scene: &mut dyn SceneGraph,
        _view: Mat4,
        _projection: Mat4,
    ) -> RenderResult<()> {
        if self.fail_render {
            return Err(RenderError::SceneRenderFailed("mock failure".into()));
        }
        self.render_count += 1;
        if let Some(node) = self.watch_node {
            self.node_visible_during_render = Some(scene.is_visible(node));
        }
        let stamp = self.render_count;
        if let Some(target) = self.current_target {
            if let Some(pixels) = self.targets.get_mut(&target.0) {
                pixels.fill(stamp);
            }
        }
        Ok(())
    }
}

/// Horizontal water surface at the origin with a +Y world normal.
fn horizontal_surface(backend: &mut MockBackend) -> MirrorSurface {
    MirrorSurface::new_water(
        backend,
        Vec3::ZERO,
        Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        MirrorConfig::default(),
        WaterConfig::default(),
    )
    .unwrap()
}

fn camera_at(position: Vec3) -> Camera {
    let mut camera = Camera::new(16.0 / 9.0);
    camera.position = position;
    camera.target = Vec3::ZERO;
    camera.far = 40000.0;
    camera
}

#[test]
fn mirror_camera_preserves_distance_to_plane_point() {
    let mut backend = MockBackend::new();
    let surface = horizontal_surface(&mut backend);

    for position in [
        Vec3::new(0.0, 10.0, 30.0),
        Vec3::new(-5.0, 2.0, 1.0),
        Vec3::new(100.0, 0.5, -40.0),
    ] {
        let camera = camera_at(position);
        let frame = compute_frame(&camera, &surface).expect("camera is above the plane");
        let d_camera = (camera.position - surface.position()).length();
        let d_mirror = (frame.mirror_camera.position - surface.position()).length();
        assert!(
            (d_camera - d_mirror).abs() < 1e-3,
            "{d_camera} vs {d_mirror}"
        );
    }
}

#[test]
fn end_to_end_scenario_from_above_and_below() {
    let mut backend = MockBackend::new();
    let surface = horizontal_surface(&mut backend);

    // Camera above the plane: pass proceeds, position mirrored below.
    let camera = camera_at(Vec3::new(0.0, 10.0, 30.0));
    let frame = compute_frame(&camera, &surface).expect("pass should proceed");
    assert!((frame.mirror_camera.position - Vec3::new(0.0, -10.0, 30.0)).length() < 1e-4);

    // Look direction's y-component flips sign.
    let forward = camera.forward();
    let mirror_forward =
        (frame.mirror_camera.target - frame.mirror_camera.position).normalize();
    assert!((mirror_forward.x - forward.x).abs() < 1e-4);
    assert!((mirror_forward.y + forward.y).abs() < 1e-4);
    assert!((mirror_forward.z - forward.z).abs() < 1e-4);

    assert_eq!(frame.mirror_camera.far, camera.far);
    assert_eq!(frame.eye, camera.position);

    // Camera below the plane: pass is skipped.
    let below = camera_at(Vec3::new(0.0, -10.0, 30.0));
    assert!(compute_frame(&below, &surface).is_none());

    // Camera exactly on the plane counts as facing away.
    let on_plane = camera_at(Vec3::new(0.0, 0.0, 30.0));
    assert!(compute_frame(&on_plane, &surface).is_none());
}

#[test]
fn reflecting_the_mirror_camera_recovers_the_original_pose() {
    let mut backend = MockBackend::new();
    let surface = horizontal_surface(&mut backend);
    let camera = camera_at(Vec3::new(3.0, 7.0, -12.0));

    let frame = compute_frame(&camera, &surface).expect("camera is above the plane");

    let normal = surface.normal().unwrap();
    let mirror_position = surface.position();
    let reflect_back = |x: Vec3| {
        let v = mirror_position - x;
        mirror_position - (v - 2.0 * v.dot(normal) * normal)
    };

    let recovered_position = reflect_back(frame.mirror_camera.position);
    assert!((recovered_position - camera.position).length() < 1e-4);

    let look_at = camera.rotation() * Vec3::NEG_Z + camera.position;
    let recovered_target = reflect_back(frame.mirror_camera.target);
    assert!((recovered_target - look_at).length() < 1e-4);
}

#[test]
fn oblique_patch_only_touches_projection_z_row() {
    let mut backend = MockBackend::new();
    let surface = horizontal_surface(&mut backend);

    let bases = [
        (std::f32::consts::FRAC_PI_4, 1.0, 0.1, 100.0),
        (1.2, 16.0 / 9.0, 0.01, 1000.0),
        (0.6, 2.0, 1.0, 40000.0),
    ];

    for (fov, aspect, near, far) in bases {
        let mut camera = camera_at(Vec3::new(1.0, 5.0, 10.0));
        camera.fov = fov;
        camera.aspect_ratio = aspect;
        camera.near = near;
        camera.far = far;

        let base = camera.projection_matrix();
        let frame = compute_frame(&camera, &surface).expect("camera is above the plane");
        let patched = frame.projection;

        assert_eq!(patched.x_axis.x, base.x_axis.x); // (0,0)
        assert_eq!(patched.y_axis.y, base.y_axis.y); // (1,1)
        assert_eq!(patched.z_axis.w, base.z_axis.w); // (3,2)
        assert_eq!(patched.w_axis.w, base.w_axis.w); // (3,3)
    }
}

#[test]
fn texture_matrix_maps_plane_corners_into_unit_square() {
    let mut backend = MockBackend::new();
    let surface = horizontal_surface(&mut backend);

    // Straight-down camera with a 90 degree fov and square aspect: the
    // frustum intersects the plane in a square of half-width equal to the
    // camera height.
    let height = 20.0;
    let mut camera = Camera::new(1.0);
    camera.position = Vec3::new(0.0, height, 0.0);
    camera.target = Vec3::ZERO;
    camera.up = Vec3::NEG_Z;
    camera.fov = std::f32::consts::FRAC_PI_2;

    let frame = compute_frame(&camera, &surface).expect("camera is above the plane");

    for corner in [
        Vec3::new(-height, 0.0, -height),
        Vec3::new(height, 0.0, -height),
        Vec3::new(height, 0.0, height),
        Vec3::new(-height, 0.0, height),
    ] {
        let projected = frame.texture_matrix * corner.extend(1.0);
        let u = projected.x / projected.w;
        let v = projected.y / projected.w;
        assert!((-1e-3..=1.0 + 1e-3).contains(&u), "u = {u}");
        assert!((-1e-3..=1.0 + 1e-3).contains(&v), "v = {v}");
    }
}

#[test]
fn skipped_pass_leaves_target_and_backend_state_untouched() {
    let mut backend = MockBackend::new();
    let mut scene = MockScene::default();
    let node = NodeId(7);
    let mut surface = horizontal_surface(&mut backend);

    // Render once from above so the target holds a previous frame.
    let above = camera_at(Vec3::new(0.0, 10.0, 30.0));
    assert!(render_reflection(&mut backend, &mut scene, node, &above, &mut surface).unwrap());
    let previous = backend.target_bytes(surface.target()).to_vec();
    let texture_matrix = surface.texture_matrix();

    let target_before = backend.current_target();
    let viewport_before = backend.viewport();
    let auto_clear_before = backend.auto_clear();

    // Camera below the plane: skipped outright.
    let below = camera_at(Vec3::new(0.0, -10.0, 30.0));
    let rendered =
        render_reflection(&mut backend, &mut scene, node, &below, &mut surface).unwrap();

    assert!(!rendered);
    assert_eq!(backend.render_count, 1);
    assert_eq!(backend.target_bytes(surface.target()), &previous[..]);
    assert_eq!(surface.texture_matrix(), texture_matrix);
    assert_eq!(backend.current_target(), target_before);
    assert_eq!(backend.viewport(), viewport_before);
    assert_eq!(backend.auto_clear(), auto_clear_before);
}

#[test]
fn successful_pass_restores_backend_state_and_node_visibility() {
    let mut backend = MockBackend::new();
    let mut scene = MockScene::default();
    let node = NodeId(3);
    backend.watch_node = Some(node);
    let mut surface = horizontal_surface(&mut backend);

    let viewport_before = backend.viewport();
    let camera = camera_at(Vec3::new(0.0, 10.0, 30.0));

    let rendered =
        render_reflection(&mut backend, &mut scene, node, &camera, &mut surface).unwrap();

    assert!(rendered);
    assert_eq!(backend.render_count, 1);
    // The mirror's own geometry was hidden while the scene rendered.
    assert_eq!(backend.node_visible_during_render, Some(false));
    assert!(scene.is_visible(node));
    assert_eq!(backend.current_target(), None);
    assert_eq!(backend.viewport(), viewport_before);
    assert!(backend.auto_clear());
    // The frame outputs landed on the surface.
    assert_ne!(surface.texture_matrix(), Mat4::IDENTITY);
    assert_eq!(surface.eye(), camera.position);
}

#[test]
fn failed_render_still_restores_backend_state() {
    let mut backend = MockBackend::new();
    let mut scene = MockScene::default();
    let node = NodeId(1);
    let mut surface = horizontal_surface(&mut backend);
    backend.fail_render = true;

    let viewport_before = backend.viewport();
    let camera = camera_at(Vec3::new(0.0, 10.0, 30.0));

    let result = render_reflection(&mut backend, &mut scene, node, &camera, &mut surface);

    assert!(result.is_err());
    assert!(scene.is_visible(node));
    assert_eq!(backend.current_target(), None);
    assert_eq!(backend.viewport(), viewport_before);
    assert!(backend.auto_clear());
}

#[test]
fn water_time_advances_one_step_per_tick() {
    let mut backend = MockBackend::new();
    let mut surface = horizontal_surface(&mut backend);

    let step = surface.water_config().unwrap().time_step;
    for tick in 1..=240u32 {
        let time = surface.advance_time().unwrap();
        assert!((time - tick as f32 * step).abs() < 1e-3);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn above_plane_camera() -> impl Strategy<Value = Camera> {
        (
            -50.0f32..50.0,
            0.1f32..50.0,
            -50.0f32..50.0,
            -10.0f32..10.0,
            -10.0f32..10.0,
        )
            .prop_map(|(x, y, z, tx, tz)| {
                let mut camera = Camera::new(16.0 / 9.0);
                camera.position = Vec3::new(x, y, z);
                camera.target = Vec3::new(tx, -1.0, tz);
                camera
            })
    }

    proptest! {
        #[test]
        fn mirror_position_is_an_involution(camera in above_plane_camera()) {
            let mut backend = MockBackend::new();
            let surface = horizontal_surface(&mut backend);

            if let Some(frame) = compute_frame(&camera, &surface) {
                let normal = surface.normal().unwrap();
                let origin = surface.position();
                let reflect_back = |x: Vec3| {
                    let v = origin - x;
                    origin - (v - 2.0 * v.dot(normal) * normal)
                };
                let recovered = reflect_back(frame.mirror_camera.position);
                prop_assert!((recovered - camera.position).length() < 1e-2);
            }
        }

        #[test]
        fn mirror_camera_is_always_below_a_horizontal_plane(camera in above_plane_camera()) {
            let mut backend = MockBackend::new();
            let surface = horizontal_surface(&mut backend);

            if let Some(frame) = compute_frame(&camera, &surface) {
                prop_assert!(frame.mirror_camera.position.y <= 1e-4);
            }
        }
    }
}
