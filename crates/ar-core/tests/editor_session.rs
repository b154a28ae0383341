//! Integration tests for the editor provider driven frame by frame.

use ar_core::{
    passthrough_display_transform, ArConfig, ArInterface, BuiltinMaterials, CameraId,
    EditorInterface, PlaneEventBus, ProviderState, RenderMode, RigInput, SyntheticCameraSource,
    MAIN_TEX, UV_BOTTOM_LEFT_RIGHT, UV_TOP_LEFT_RIGHT,
};
use ar_events::fixtures::{front_only_devices, mixed_devices};
use ar_events::{CameraDevice, Mat4, PlaneEvent, PointCloud, Vec4};

/// Drive `provider` at a fixed frame interval, recording state and events.
fn run_frames(
    provider: &mut EditorInterface,
    bus: &mut PlaneEventBus,
    frames: usize,
    dt: f32,
) -> Vec<(f32, ProviderState)> {
    (1..=frames)
        .map(|frame| {
            let now = frame as f32 * dt;
            provider.update(now, bus);
            (now, provider.state())
        })
        .collect()
}

fn editor(devices: &SyntheticCameraSource) -> EditorInterface {
    EditorInterface::new(ArConfig::default(), Box::new(devices.clone()))
}

/// States are visited in order and never regress.
#[test]
fn test_state_machine_order() {
    let devices = SyntheticCameraSource::default();
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.start_service(0.0).unwrap();
    assert_eq!(provider.state(), ProviderState::Initialized);

    let trace = run_frames(&mut provider, &mut bus, 300, 1.0 / 60.0);
    let states: Vec<_> = trace.iter().map(|(_, s)| *s).collect();

    assert!(states.windows(2).all(|w| w[0] <= w[1]));
    let mut visited = states.clone();
    visited.dedup();
    assert_eq!(
        visited,
        vec![
            ProviderState::WaitingToAddPlane1,
            ProviderState::WaitingToAddPlane2,
            ProviderState::Finished,
        ]
    );
}

/// Exactly two planes, in order, each after a full delay in its waiting state.
#[test]
fn test_plane_events_timing_and_ids() {
    let devices = SyntheticCameraSource::default();
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();
    let sub = bus.subscribe();

    provider.start_service(0.0).unwrap();

    let dt = 0.1;
    let mut entered_waiting = None;
    let mut previous = provider.state();
    let mut seen = Vec::new();
    for frame in 1..=100 {
        let now = frame as f32 * dt;
        provider.update(now, &mut bus);
        let state = provider.state();
        if state != previous {
            if let Some(entered) = entered_waiting {
                if state != ProviderState::WaitingToAddPlane1 {
                    assert!(now - entered > 1.0, "plane published too early at {now}");
                }
            }
            entered_waiting = Some(now);
            previous = state;
        }
        seen.extend(bus.drain(sub));
    }

    let ids: Vec<_> = seen
        .iter()
        .map(|e| match e {
            PlaneEvent::Added(p) => p.id.as_str(),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec!["0x1", "0x2"]);
    assert_eq!(provider.state(), ProviderState::Finished);
}

/// Once finished, no more plane events, however long the session runs.
#[test]
fn test_no_events_after_finished() {
    let devices = SyntheticCameraSource::default();
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();
    let sub = bus.subscribe();

    provider.start_service(0.0).unwrap();
    run_frames(&mut provider, &mut bus, 10, 1.0);
    assert_eq!(provider.state(), ProviderState::Finished);
    assert_eq!(bus.drain(sub).len(), 2);

    run_frames(&mut provider, &mut bus, 100, 5.0);
    assert_eq!(bus.pending(sub), 0);
    assert_eq!(bus.published_count(), 2);
}

/// Stalls indefinitely when time stops advancing.
#[test]
fn test_stalls_without_time() {
    let devices = SyntheticCameraSource::default();
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.start_service(5.0).unwrap();
    for _ in 0..1000 {
        provider.update(5.0, &mut bus);
    }
    assert_eq!(provider.state(), ProviderState::WaitingToAddPlane1);
    assert_eq!(bus.published_count(), 0);
}

/// Point cloud fails before start and after stop, yields 20 points while running.
#[test]
fn test_point_cloud_availability() {
    let devices = SyntheticCameraSource::default();
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    let mut cloud = PointCloud::new();
    assert!(!provider.try_get_point_cloud(&mut cloud));
    assert!(cloud.is_empty());

    provider.start_service(0.0).unwrap();
    // Stale contents are replaced, not appended to
    cloud.points.push(ar_events::Vec3::splat(100.0));
    assert!(provider.try_get_point_cloud(&mut cloud));
    assert_eq!(cloud.len(), 20);

    run_frames(&mut provider, &mut bus, 5, 1.0);
    let first = cloud.clone();
    assert!(provider.try_get_point_cloud(&mut cloud));
    assert_eq!(cloud, first, "cloud is static once generated");
    for p in &cloud.points {
        assert!(p.x.abs() <= 2.0 && p.y.abs() <= 0.5 && p.z.abs() <= 2.0);
    }

    provider.stop_service();
    assert!(!provider.try_get_point_cloud(&mut cloud));
}

/// Same seed, same cloud.
#[test]
fn test_point_cloud_is_seeded() {
    let devices = SyntheticCameraSource::default();
    let mut a = editor(&devices);
    let mut b = editor(&devices);
    a.start_service(0.0).unwrap();
    b.start_service(3.0).unwrap();

    let (mut ca, mut cb) = (PointCloud::new(), PointCloud::new());
    assert!(a.try_get_point_cloud(&mut ca));
    assert!(b.try_get_point_cloud(&mut cb));
    assert_eq!(ca, cb);
}

/// A lone front-facing camera is still used.
#[test]
fn test_capture_front_only_fallback() {
    let devices = SyntheticCameraSource::new(front_only_devices());
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);

    assert_eq!(provider.active_capture_device(), Some("Integrated Webcam"));
    let opened = devices.opened();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].width, 1280);
    assert_eq!(opened[0].height, 720);
    assert_eq!(opened[0].frame_rate, 30);
    assert_eq!(devices.playing(), 1);
}

/// Capture follows the host's screen size once one is reported.
#[test]
fn test_capture_uses_screen_size() {
    let devices = SyntheticCameraSource::new(front_only_devices());
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.set_screen_size(1920, 1080);
    // A minimized window does not override the last real size
    provider.set_screen_size(0, 0);
    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);

    let opened = devices.opened();
    assert_eq!(opened.len(), 1);
    assert_eq!((opened[0].width, opened[0].height), (1920, 1080));
    assert_eq!(opened[0].frame_rate, 30);
}

/// The first rear camera wins over an earlier front camera.
#[test]
fn test_capture_prefers_rear_camera() {
    let devices = SyntheticCameraSource::new(mixed_devices());
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);
    provider.update(0.5, &mut bus);

    assert_eq!(provider.active_capture_device(), Some("USB Rear Camera"));
    assert_eq!(devices.opened().len(), 1, "capture opened once and kept");
}

/// Unplugging the captured device releases it and fails over.
#[test]
fn test_capture_fails_over_on_unplug() {
    let devices = SyntheticCameraSource::new(mixed_devices());
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);
    assert_eq!(provider.active_capture_device(), Some("USB Rear Camera"));

    assert!(devices.remove_device("USB Rear Camera"));
    provider.update(0.1, &mut bus);
    assert_eq!(provider.active_capture_device(), Some("FaceTime HD Camera"));
    assert_eq!(devices.playing(), 1);

    devices.set_devices(Vec::new());
    provider.update(0.2, &mut bus);
    assert_eq!(provider.active_capture_device(), None);
    assert_eq!(devices.playing(), 0);
}

/// Identity display transform whenever no texture is active.
#[test]
fn test_display_transform_identity_without_texture() {
    let devices = SyntheticCameraSource::new(vec![CameraDevice::back("cam")])
        .with_orientation(0.0, true);
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    // Before start
    assert_eq!(provider.display_transform(), Mat4::IDENTITY);
    provider.update(0.0, &mut bus);
    assert_eq!(provider.display_transform(), Mat4::IDENTITY);

    // Running with a texture
    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);
    assert_ne!(provider.display_transform(), Mat4::IDENTITY);

    // Stopped
    provider.stop_service();
    assert_eq!(provider.active_capture_device(), None);
    assert_eq!(provider.display_transform(), Mat4::IDENTITY);

    // Running with no devices at all
    devices.set_devices(Vec::new());
    provider.start_service(1.0).unwrap();
    provider.update(1.0, &mut bus);
    assert_eq!(provider.display_transform(), Mat4::IDENTITY);
}

/// A feed rotated by 90 degrees flips the UV corners vertically.
#[test]
fn test_rotated_feed_uv_corners() {
    let devices = SyntheticCameraSource::new(vec![CameraDevice::back("cam")])
        .with_orientation(90.0, false);
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.setup_camera(CameraId(3), &BuiltinMaterials).unwrap();
    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);
    provider.update_camera(&RigInput::default());

    assert!(provider
        .display_transform()
        .abs_diff_eq(passthrough_display_transform(90.0, false), 1e-6));
    let material = provider
        .background_renderer()
        .and_then(|b| b.material.as_ref())
        .unwrap();
    let top = material.vector(UV_TOP_LEFT_RIGHT).unwrap();
    let bottom = material.vector(UV_BOTTOM_LEFT_RIGHT).unwrap();
    assert!(top.abs_diff_eq(Vec4::new(0.0, 0.0, 1.0, 0.0), 1e-5), "{top}");
    assert!(bottom.abs_diff_eq(Vec4::new(0.0, 1.0, 1.0, 1.0), 1e-5), "{bottom}");
}

/// Background switches to the passthrough texture and back.
#[test]
fn test_background_mode_follows_texture() {
    let devices = SyntheticCameraSource::new(mixed_devices());
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.setup_camera(CameraId(7), &BuiltinMaterials).unwrap();
    provider.update(0.0, &mut bus);
    let background = provider.background_renderer().unwrap();
    assert_eq!(background.mode, RenderMode::StandardBackground);
    assert!(background.main_texture().is_none());

    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);
    let background = provider.background_renderer().unwrap();
    assert_eq!(background.mode, RenderMode::MaterialAsBackground);
    assert!(background
        .material
        .as_ref()
        .and_then(|m| m.texture(MAIN_TEX))
        .is_some());

    devices.set_devices(Vec::new());
    provider.update(0.1, &mut bus);
    let background = provider.background_renderer().unwrap();
    assert_eq!(background.mode, RenderMode::StandardBackground);
}

/// Stop releases the capture immediately and drops the background binding.
#[test]
fn test_stop_releases_resources() {
    let devices = SyntheticCameraSource::new(mixed_devices());
    let mut provider = editor(&devices);
    let mut bus = PlaneEventBus::new();

    provider.setup_camera(CameraId(1), &BuiltinMaterials).unwrap();
    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);
    assert_eq!(devices.playing(), 1);

    provider.stop_service();
    assert!(!provider.is_running());
    assert_eq!(devices.playing(), 0);
    assert!(provider.background_renderer().is_none());

    // A later setup binds a fresh renderer
    provider.setup_camera(CameraId(2), &BuiltinMaterials).unwrap();
    assert_eq!(provider.background_renderer().unwrap().camera, Some(CameraId(2)));
}

/// Stop without a prior setup_camera is fine.
#[test]
fn test_stop_without_setup() {
    let devices = SyntheticCameraSource::default();
    let mut provider = editor(&devices);
    provider.start_service(0.0).unwrap();
    provider.stop_service();
    assert!(!provider.is_running());
}

/// Dropping the provider stops the capture.
#[test]
fn test_drop_releases_capture() {
    let devices = SyntheticCameraSource::new(mixed_devices());
    let mut bus = PlaneEventBus::new();
    {
        let mut provider = editor(&devices);
        provider.start_service(0.0).unwrap();
        provider.update(0.0, &mut bus);
        assert_eq!(devices.playing(), 1);
    }
    assert_eq!(devices.playing(), 0);
}

/// The provider is usable through the trait object the host stores.
#[test]
fn test_trait_object_usage() {
    let devices = SyntheticCameraSource::default();
    let mut provider: Box<dyn ArInterface> = Box::new(editor(&devices));
    let mut bus = PlaneEventBus::new();

    assert_eq!(provider.name(), "editor");
    provider.start_service(0.0).unwrap();
    provider.update(0.0, &mut bus);
    assert!(provider.is_running());
    assert!(provider.unscaled_pose().is_some());
}
