//! AR session: owns the provider and ticks it from the frame clock.
//!
//! P toggles the session, C plugs or unplugs the simulated cameras.

use ar_core::{
    ArConfig, ArInterface, BuiltinMaterials, CameraDeviceSource, CameraId, EditorInterface,
    PlaneEventBus, SyntheticCameraSource,
};
use ar_events::CameraDevice;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera::ArCamera;
use crate::plugin::ArSet;

/// Device exposed by the simulated camera source when none is configured.
pub const DEFAULT_CAMERA_DEVICE: &str = "Editor Webcam";

/// Plugin that drives the AR provider.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<ArSession>() {
            let config = app
                .world()
                .get_resource::<ArConfig>()
                .cloned()
                .unwrap_or_default();
            let devices =
                SyntheticCameraSource::new(vec![CameraDevice::back(DEFAULT_CAMERA_DEVICE)]);
            app.insert_resource(ArSession::editor(config, devices));
        }

        app.init_resource::<PlaneEventBus>()
            .add_event::<SessionCommand>()
            .add_systems(PostStartup, start_session)
            .add_systems(
                Update,
                (
                    session_keys,
                    apply_session_commands,
                    track_screen_size,
                    update_session,
                )
                    .chain()
                    .in_set(ArSet::Track),
            );
    }
}

/// Requests to change the session from UI or other systems.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    Toggle,
    /// Unplug every simulated camera, or plug them back in.
    TogglePlugged,
}

/// The running AR provider plus the host-side bits it needs.
#[derive(Resource)]
pub struct ArSession {
    provider: Box<dyn ArInterface>,
    devices: Option<SyntheticCameraSource>,
    unplugged: Vec<CameraDevice>,
    camera: Option<Entity>,
}

impl ArSession {
    pub fn new(provider: Box<dyn ArInterface>) -> Self {
        Self {
            provider,
            devices: None,
            unplugged: Vec::new(),
            camera: None,
        }
    }

    /// Editor provider over a simulated camera source the session can hotplug.
    pub fn editor(config: ArConfig, devices: SyntheticCameraSource) -> Self {
        let provider = EditorInterface::new(config, Box::new(devices.clone()));
        Self {
            devices: Some(devices),
            ..Self::new(Box::new(provider))
        }
    }

    pub fn provider(&self) -> &dyn ArInterface {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut dyn ArInterface {
        self.provider.as_mut()
    }

    /// Bind background compositing to `camera`.
    pub fn bind_camera(&mut self, camera: Entity) {
        self.camera = Some(camera);
        let id = CameraId(camera.to_bits());
        if let Err(e) = self.provider.setup_camera(id, &BuiltinMaterials) {
            tracing::warn!("Background setup failed for {:?}: {}", camera, e);
        }
    }

    /// Start tracking. Rebinds the camera, since stopping drops the binding.
    pub fn start(&mut self, now: f32) -> bool {
        if self.provider.is_running() {
            return true;
        }
        if let Some(camera) = self.camera {
            self.bind_camera(camera);
        }
        match self.provider.start_service(now) {
            Ok(()) => {
                tracing::info!("AR session started ({})", self.provider.name());
                true
            }
            Err(e) => {
                tracing::warn!("AR session failed to start: {}", e);
                false
            }
        }
    }

    pub fn stop(&mut self) {
        if self.provider.is_running() {
            self.provider.stop_service();
            tracing::info!("AR session stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.provider.is_running()
    }

    /// Window size in physical pixels, used for the next capture.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.provider.set_screen_size(width, height);
    }

    /// Number of simulated cameras currently plugged in.
    pub fn plugged_devices(&self) -> usize {
        self.devices.as_ref().map_or(0, |d| d.devices().len())
    }

    pub fn is_unplugged(&self) -> bool {
        !self.unplugged.is_empty()
    }

    /// Unplug every simulated camera, or restore the ones unplugged earlier.
    pub fn toggle_plugged(&mut self) {
        let Some(devices) = &self.devices else {
            tracing::debug!("Session has no simulated cameras to hotplug");
            return;
        };
        if self.unplugged.is_empty() {
            self.unplugged = devices.devices();
            devices.set_devices(Vec::new());
            tracing::info!("Unplugged {} camera(s)", self.unplugged.len());
        } else {
            let restored = std::mem::take(&mut self.unplugged);
            tracing::info!("Plugged {} camera(s) back in", restored.len());
            devices.set_devices(restored);
        }
    }

    /// Advance tracking to `now`, publishing plane events to `bus`.
    ///
    /// A stopped provider is not ticked.
    pub fn update(&mut self, now: f32, bus: &mut PlaneEventBus) {
        if self.provider.is_running() {
            self.provider.update(now, bus);
        }
    }
}

fn start_session(
    mut session: ResMut<ArSession>,
    cameras: Query<Entity, With<ArCamera>>,
    time: Res<Time>,
) {
    match cameras.get_single() {
        Ok(camera) => session.bind_camera(camera),
        Err(e) => tracing::warn!("No AR camera to bind the background to: {}", e),
    }
    session.start(time.elapsed_seconds());
}

fn session_keys(keyboard: Res<ButtonInput<KeyCode>>, mut commands: EventWriter<SessionCommand>) {
    if keyboard.just_pressed(KeyCode::KeyP) {
        commands.send(SessionCommand::Toggle);
    }
    if keyboard.just_pressed(KeyCode::KeyC) {
        commands.send(SessionCommand::TogglePlugged);
    }
}

fn apply_session_commands(
    mut commands: EventReader<SessionCommand>,
    mut session: ResMut<ArSession>,
    time: Res<Time>,
) {
    let now = time.elapsed_seconds();
    for command in commands.read() {
        match command {
            SessionCommand::Start => {
                session.start(now);
            }
            SessionCommand::Stop => session.stop(),
            SessionCommand::Toggle if session.is_running() => session.stop(),
            SessionCommand::Toggle => {
                session.start(now);
            }
            SessionCommand::TogglePlugged => session.toggle_plugged(),
        }
    }
}

/// Headless apps have no window and keep the configured capture size.
fn track_screen_size(
    mut session: ResMut<ArSession>,
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
) {
    if let Ok(window) = windows.get_single() {
        session.set_screen_size(window.physical_width(), window.physical_height());
    }
}

fn update_session(
    mut session: ResMut<ArSession>,
    mut bus: ResMut<PlaneEventBus>,
    time: Res<Time>,
) {
    session.update(time.elapsed_seconds(), &mut bus);
}
