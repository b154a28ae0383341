//! Editor AR provider.
//!
//! Fakes an AR session on a desktop: two planes are "discovered" one second
//! apart, a static random point cloud stands in for feature points, the pose
//! is a keyboard/mouse fly-camera, and the first available camera device is
//! used as passthrough video.

use ar_events::{
    rect_boundary, BoundedPlane, CameraImage, EulerRot, LightEstimate, Mat4, PointCloud, Pose,
    Quat, Vec2, Vec3, Vec4,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::background::{
    passthrough_display_transform, uv_corners, BackgroundRenderer, CameraId, MaterialLoader,
    RenderMode, MAIN_TEX, UV_BOTTOM_LEFT_RIGHT, UV_TOP_LEFT_RIGHT,
};
use crate::bus::PlaneEventBus;
use crate::capture::{select_device, CameraDeviceSource, CaptureRequest, CaptureTexture};
use crate::config::ArConfig;
use crate::error::ArError;
use crate::interface::{ArInterface, RigInput};

/// Plane discovery progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderState {
    #[default]
    Uninitialized,
    Initialized,
    WaitingToAddPlane1,
    WaitingToAddPlane2,
    Finished,
}

/// The two planes the editor provider reports.
pub fn fake_planes(include_boundary: bool) -> [BoundedPlane; 2] {
    let planes = [
        BoundedPlane::new(
            "0x1",
            Vec3::new(2.0, -1.0, 3.0),
            Quat::from_rotation_y(60f32.to_radians()),
            Vec2::new(2.2, 2.0),
        ),
        BoundedPlane::new(
            "0x2",
            Vec3::new(3.0, 1.0, 3.0),
            Quat::from_rotation_y(200f32.to_radians()),
            Vec2::new(2.0, 2.0),
        ),
    ];
    if include_boundary {
        planes.map(|p| {
            let boundary = rect_boundary(p.extents);
            p.with_boundary(boundary)
        })
    } else {
        planes
    }
}

/// Simulated AR backend for desktop development.
pub struct EditorInterface {
    config: ArConfig,
    state: ProviderState,
    last_time: f32,
    running: bool,
    planes: Vec<BoundedPlane>,
    /// Host window size; capture falls back to `config.capture` without it.
    screen_size: Option<(u32, u32)>,
    point_cloud: Vec<Vec3>,

    pose: Pose,
    pointer_held: bool,
    last_pointer: Vec2,
    /// Accumulated (pitch, yaw) in degrees.
    look: Vec2,

    devices: Box<dyn CameraDeviceSource>,
    active_texture: Option<Box<dyn CaptureTexture>>,
    display_transform: Mat4,
    background: Option<BackgroundRenderer>,
}

impl EditorInterface {
    pub fn new(config: ArConfig, devices: Box<dyn CameraDeviceSource>) -> Self {
        Self {
            config,
            state: ProviderState::Uninitialized,
            last_time: 0.0,
            running: false,
            planes: Vec::new(),
            screen_size: None,
            point_cloud: Vec::new(),
            pose: Pose::IDENTITY,
            pointer_held: false,
            last_pointer: Vec2::ZERO,
            look: Vec2::ZERO,
            devices,
            active_texture: None,
            display_transform: Mat4::IDENTITY,
            background: None,
        }
    }

    pub fn state(&self) -> ProviderState {
        self.state
    }

    /// Name of the device the passthrough texture is capturing from.
    pub fn active_capture_device(&self) -> Option<&str> {
        self.active_texture.as_deref().map(|t| t.device_name())
    }

    fn generate_point_cloud(&mut self) {
        let settings = &self.config.point_cloud;
        let [hx, hy, hz] = settings.half_extents.map(f32::abs);
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        self.point_cloud = (0..settings.count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-hx..=hx),
                    rng.gen_range(-hy..=hy),
                    rng.gen_range(-hz..=hz),
                )
            })
            .collect();
    }

    /// Publish `plane_index` once the configured delay has passed.
    fn advance_after_delay(
        &mut self,
        now: f32,
        plane_index: usize,
        next: ProviderState,
        bus: &mut PlaneEventBus,
    ) {
        if now - self.last_time <= self.config.planes.delay_seconds {
            return;
        }
        if let Some(plane) = self.planes.get(plane_index) {
            tracing::info!("Editor provider adding plane {}", plane.id);
            bus.plane_added(plane.clone());
        }
        self.last_time = now;
        self.state = next;
    }

    fn release_texture(&mut self) {
        if let Some(mut texture) = self.active_texture.take() {
            tracing::info!("Releasing passthrough capture on {}", texture.device_name());
            texture.stop();
        }
    }

    /// Keep the passthrough texture in step with the device list and the
    /// running flag, then point the background at it.
    fn update_camera_feed(&mut self) {
        let devices = self.devices.devices();

        if let Some(texture) = &self.active_texture {
            let device_present =
                self.running && devices.iter().any(|d| d.name == texture.device_name());
            if !device_present {
                self.release_texture();
            }
        }

        if self.active_texture.is_none() && self.running {
            if let Some(device) = select_device(&devices) {
                let capture = &self.config.capture;
                let (width, height) = self.screen_size.unwrap_or((capture.width, capture.height));
                let mut texture = self.devices.open(CaptureRequest {
                    device_name: device.name.clone(),
                    width,
                    height,
                    frame_rate: capture.target_frame_rate,
                });
                texture.play();
                tracing::info!(
                    "Started passthrough capture on {} ({}x{} @ {} fps)",
                    device.name,
                    width,
                    height,
                    capture.target_frame_rate
                );
                self.active_texture = Some(texture);
            }
        }

        match &self.active_texture {
            Some(texture) => {
                self.display_transform = passthrough_display_transform(
                    texture.video_rotation_angle(),
                    texture.video_vertically_mirrored(),
                );
                if let Some(background) = &mut self.background {
                    if let Some(material) = &mut background.material {
                        material.set_texture(MAIN_TEX, texture.texture_id());
                    }
                    background.mode = RenderMode::MaterialAsBackground;
                }
            }
            None => {
                if let Some(background) = &mut self.background {
                    background.mode = RenderMode::StandardBackground;
                }
            }
        }
    }

    fn fly(&mut self, input: &RigInput) {
        let speed = input.parent_scale / self.config.fly_camera.speed_divisor;
        let step = input.dt * speed;
        let (forward, right, up) = (self.pose.forward(), self.pose.right(), self.pose.up());
        let keys = input.keys;

        if keys.forward {
            self.pose.position += forward * step;
        }
        if keys.back {
            self.pose.position -= forward * step;
        }
        if keys.left {
            self.pose.position -= right * step;
        }
        if keys.right {
            self.pose.position += right * step;
        }
        if keys.up {
            self.pose.position += up * step;
        }
        if keys.down {
            self.pose.position -= up * step;
        }
    }

    fn look(&mut self, input: &RigInput) {
        if !input.secondary_held {
            self.pointer_held = false;
            return;
        }
        if !self.pointer_held {
            self.last_pointer = input.pointer;
        }

        let delta = input.pointer - self.last_pointer;
        let turn = input.dt * self.config.fly_camera.turn_speed;
        // Dragging right turns right, dragging up looks up
        self.look.y -= turn * delta.x;
        self.look.x += turn * delta.y;
        self.pose.rotation = Quat::from_euler(
            EulerRot::YXZ,
            self.look.y.to_radians(),
            self.look.x.to_radians(),
            0.0,
        );
        self.last_pointer = input.pointer;
        self.pointer_held = true;
    }

    fn push_uv_corners(&mut self) {
        let transform = self.display_transform();
        let Some(material) = self.background.as_mut().and_then(|b| b.material.as_mut()) else {
            return;
        };
        let [top_left, top_right, bottom_left, bottom_right] = uv_corners(&transform);
        material.set_vector(
            UV_TOP_LEFT_RIGHT,
            Vec4::new(top_left.x, top_left.y, top_right.x, top_right.y),
        );
        material.set_vector(
            UV_BOTTOM_LEFT_RIGHT,
            Vec4::new(bottom_left.x, bottom_left.y, bottom_right.x, bottom_right.y),
        );
    }
}

impl ArInterface for EditorInterface {
    fn name(&self) -> &'static str {
        "editor"
    }

    fn start_service(&mut self, now: f32) -> Result<(), ArError> {
        self.pose = Pose::IDENTITY;
        self.look = Vec2::ZERO;
        self.pointer_held = false;
        self.last_time = now;
        self.state = ProviderState::Initialized;
        self.planes = fake_planes(self.config.planes.include_boundary).to_vec();
        self.generate_point_cloud();
        self.running = true;
        tracing::info!(
            "Editor provider started with {} fake planes and {} cloud points",
            self.planes.len(),
            self.point_cloud.len()
        );
        Ok(())
    }

    fn stop_service(&mut self) {
        if let Some(mut background) = self.background.take() {
            background.detach();
        }
        self.running = false;
        tracing::info!("Editor provider stopped");

        self.update_camera_feed();
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn set_screen_size(&mut self, width: u32, height: u32) {
        // Minimized windows report zero
        if width > 0 && height > 0 {
            self.screen_size = Some((width, height));
        }
    }

    fn unscaled_pose(&self) -> Option<Pose> {
        Some(self.pose)
    }

    fn camera_image(&self) -> Option<CameraImage> {
        None
    }

    fn try_get_point_cloud(&self, cloud: &mut PointCloud) -> bool {
        if !self.running {
            return false;
        }
        cloud.points.clear();
        cloud.points.extend_from_slice(&self.point_cloud);
        true
    }

    fn light_estimate(&self) -> LightEstimate {
        LightEstimate::unsupported()
    }

    fn setup_camera(
        &mut self,
        camera: CameraId,
        materials: &dyn MaterialLoader,
    ) -> Result<(), ArError> {
        if self.background.is_some() {
            return Ok(());
        }
        let path = &self.config.background.material;
        let material = materials
            .load_material(path)
            .ok_or_else(|| ArError::MissingMaterial(path.clone()))?;
        tracing::debug!("Background material {} bound to camera {:?}", material.name, camera);
        self.background = Some(BackgroundRenderer::new(material, camera));
        Ok(())
    }

    fn display_transform(&self) -> Mat4 {
        if self.active_texture.is_some() {
            self.display_transform
        } else {
            Mat4::IDENTITY
        }
    }

    fn update_camera(&mut self, input: &RigInput) {
        self.fly(input);
        self.look(input);
        if self.background.is_some() {
            self.push_uv_corners();
        }
    }

    fn update(&mut self, now: f32, bus: &mut PlaneEventBus) {
        match self.state {
            ProviderState::Initialized => {
                self.state = ProviderState::WaitingToAddPlane1;
                self.last_time = now;
            }
            ProviderState::WaitingToAddPlane1 => {
                self.advance_after_delay(now, 0, ProviderState::WaitingToAddPlane2, bus);
            }
            ProviderState::WaitingToAddPlane2 => {
                self.advance_after_delay(now, 1, ProviderState::Finished, bus);
            }
            ProviderState::Uninitialized | ProviderState::Finished => {}
        }

        self.update_camera_feed();
    }

    fn background_renderer(&self) -> Option<&BackgroundRenderer> {
        self.background.as_ref()
    }
}

impl Drop for EditorInterface {
    fn drop(&mut self) {
        self.release_texture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::BuiltinMaterials;
    use crate::capture::SyntheticCameraSource;
    use crate::interface::MoveKeys;
    use ar_events::fixtures::mixed_devices;
    use ar_events::PlaneEvent;

    fn provider(devices: &SyntheticCameraSource) -> EditorInterface {
        EditorInterface::new(ArConfig::default(), Box::new(devices.clone()))
    }

    #[test]
    fn test_fake_planes() {
        let [first, second] = fake_planes(false);
        assert_eq!(first.id, "0x1");
        assert_eq!(first.extents, Vec2::new(2.2, 2.0));
        assert_eq!(first.center, Vec3::new(2.0, -1.0, 3.0));
        assert!(first.boundary_polygon.is_none());
        assert_eq!(second.id, "0x2");
        assert_eq!(second.center, Vec3::new(3.0, 1.0, 3.0));

        let [with_boundary, _] = fake_planes(true);
        assert_eq!(with_boundary.boundary_len(), 5);
    }

    #[test]
    fn test_update_before_start_is_noop() {
        let devices = SyntheticCameraSource::new(mixed_devices());
        let mut ar = provider(&devices);
        let mut bus = PlaneEventBus::new();

        ar.update(10.0, &mut bus);
        assert_eq!(ar.state(), ProviderState::Uninitialized);
        assert_eq!(bus.published_count(), 0);
        // Not running, so no capture either
        assert!(devices.opened().is_empty());
    }

    #[test]
    fn test_delay_is_strictly_greater_than() {
        let devices = SyntheticCameraSource::default();
        let mut ar = provider(&devices);
        let mut bus = PlaneEventBus::new();

        ar.start_service(0.0).unwrap();
        ar.update(0.0, &mut bus);
        ar.update(1.0, &mut bus);
        assert_eq!(ar.state(), ProviderState::WaitingToAddPlane1);
        ar.update(1.01, &mut bus);
        assert_eq!(ar.state(), ProviderState::WaitingToAddPlane2);
    }

    #[test]
    fn test_pose_and_unsupported_queries() {
        let devices = SyntheticCameraSource::default();
        let mut ar = provider(&devices);
        ar.start_service(0.0).unwrap();

        assert_eq!(ar.unscaled_pose(), Some(Pose::IDENTITY));
        assert!(ar.camera_image().is_none());
        assert!(ar.light_estimate().capabilities.is_empty());
    }

    #[test]
    fn test_fly_camera_moves_along_local_axes() {
        let devices = SyntheticCameraSource::default();
        let mut ar = provider(&devices);
        ar.start_service(0.0).unwrap();

        let input = RigInput {
            dt: 0.5,
            parent_scale: 2.0,
            keys: MoveKeys {
                forward: true,
                up: true,
                ..Default::default()
            },
            ..Default::default()
        };
        ar.update_camera(&input);

        // speed = 2.0 / 10, step = 0.5 * 0.2
        let pose = ar.unscaled_pose().unwrap();
        assert!(pose.position.abs_diff_eq(Vec3::new(0.0, 0.1, -0.1), 1e-6));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let devices = SyntheticCameraSource::default();
        let mut ar = provider(&devices);
        ar.start_service(0.0).unwrap();

        let keys = MoveKeys {
            forward: true,
            back: true,
            left: true,
            right: true,
            up: true,
            down: true,
        };
        ar.update_camera(&RigInput {
            dt: 1.0,
            keys,
            ..Default::default()
        });
        assert!(ar.unscaled_pose().unwrap().position.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_mouse_look_anchors_on_first_held_frame() {
        let devices = SyntheticCameraSource::default();
        let mut ar = provider(&devices);
        ar.start_service(0.0).unwrap();

        let held = |x: f32, y: f32| RigInput {
            dt: 0.1,
            pointer: Vec2::new(x, y),
            secondary_held: true,
            ..Default::default()
        };

        // First held frame only captures the anchor
        ar.update_camera(&held(100.0, 100.0));
        assert!(ar
            .unscaled_pose()
            .unwrap()
            .rotation
            .abs_diff_eq(Quat::IDENTITY, 1e-6));

        // 90 px right at 0.1 s * 10 deg = 90 degrees of yaw to the right
        ar.update_camera(&held(190.0, 100.0));
        let forward = ar.unscaled_pose().unwrap().forward();
        assert!(forward.abs_diff_eq(Vec3::X, 1e-5));

        // Release, then press somewhere else: no jump
        ar.update_camera(&RigInput::default());
        ar.update_camera(&held(500.0, 500.0));
        assert!(ar.unscaled_pose().unwrap().forward().abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_setup_camera_is_idempotent() {
        let devices = SyntheticCameraSource::default();
        let mut ar = provider(&devices);

        ar.setup_camera(CameraId(1), &BuiltinMaterials).unwrap();
        ar.setup_camera(CameraId(2), &BuiltinMaterials).unwrap();

        let background = ar.background_renderer().unwrap();
        assert_eq!(background.camera, Some(CameraId(1)));
        assert_eq!(background.mode, RenderMode::StandardBackground);
    }

    #[test]
    fn test_setup_camera_missing_material() {
        let devices = SyntheticCameraSource::default();
        let mut config = ArConfig::default();
        config.background.material = "Materials/Nope".to_string();
        let mut ar = EditorInterface::new(config, Box::new(devices));

        let err = ar.setup_camera(CameraId(1), &BuiltinMaterials).unwrap_err();
        assert!(matches!(err, ArError::MissingMaterial(ref p) if p == "Materials/Nope"));
        assert!(ar.background_renderer().is_none());
    }

    #[test]
    fn test_uv_corners_pushed_to_material() {
        let devices = SyntheticCameraSource::new(mixed_devices());
        let mut ar = provider(&devices);
        let mut bus = PlaneEventBus::new();
        ar.setup_camera(CameraId(1), &BuiltinMaterials).unwrap();

        // No texture yet: identity mapping
        ar.update_camera(&RigInput::default());
        let material = ar.background_renderer().unwrap().material.as_ref().unwrap();
        assert_eq!(material.vector(UV_TOP_LEFT_RIGHT), Some(Vec4::new(0.0, 1.0, 1.0, 1.0)));
        assert_eq!(material.vector(UV_BOTTOM_LEFT_RIGHT), Some(Vec4::new(0.0, 0.0, 1.0, 0.0)));

        ar.start_service(0.0).unwrap();
        ar.update(0.0, &mut bus);
        ar.update_camera(&RigInput::default());
        let material = ar.background_renderer().unwrap().material.as_ref().unwrap();
        let top = material.vector(UV_TOP_LEFT_RIGHT).unwrap();
        assert!(top.abs_diff_eq(Vec4::new(0.0, 1.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_restart_emits_planes_again() {
        let devices = SyntheticCameraSource::default();
        let mut ar = provider(&devices);
        let mut bus = PlaneEventBus::new();
        let sub = bus.subscribe();

        for round in 0..2 {
            let base = round as f32 * 10.0;
            ar.start_service(base).unwrap();
            for step in 0..6 {
                ar.update(base + step as f32 * 1.5, &mut bus);
            }
            ar.stop_service();
        }

        let ids: Vec<_> = bus
            .drain(sub)
            .into_iter()
            .map(|e| match e {
                PlaneEvent::Added(p) => p.id,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(ids, vec!["0x1", "0x2", "0x1", "0x2"]);
    }
}
