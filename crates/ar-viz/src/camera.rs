//! AR camera rig: a session origin with the tracked camera as its child.
//!
//! The provider owns the camera pose. Each frame the polled keyboard and
//! mouse state goes to `update_camera` and the resulting pose is copied onto
//! the camera's local transform.

use ar_core::{MoveKeys, RigInput};
use bevy::prelude::*;
use bevy::ui::IsDefaultUiCamera;
use bevy::window::PrimaryWindow;

use crate::plugin::ArSet;
use crate::session::ArSession;

/// Plugin for the AR camera rig.
pub struct CameraRigPlugin;

impl Plugin for CameraRigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RigSettings>()
            .add_systems(Startup, spawn_camera_rig)
            .add_systems(Update, drive_camera_rig.in_set(ArSet::Rig));
    }
}

/// Rig layout settings.
#[derive(Resource, Debug, Clone)]
pub struct RigSettings {
    /// Uniform scale of the session origin. Also scales fly speed.
    pub origin_scale: f32,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self { origin_scale: 1.0 }
    }
}

/// Marker for the session origin. Planes are parented here too.
#[derive(Component)]
pub struct ArSessionOrigin;

/// Marker for the tracked camera.
#[derive(Component)]
pub struct ArCamera;

pub fn spawn_camera_rig(mut commands: Commands, settings: Res<RigSettings>) {
    commands
        .spawn((
            SpatialBundle::from_transform(Transform::from_scale(Vec3::splat(
                settings.origin_scale,
            ))),
            ArSessionOrigin,
            Name::new("AR Session Origin"),
        ))
        .with_children(|origin| {
            origin.spawn((
                Camera3dBundle::default(),
                IsDefaultUiCamera,
                ArCamera,
                Name::new("AR Camera"),
            ));
        });
}

/// Held fly-camera keys: W/S forward and back, A/D strafe, Q/Z up and down.
pub fn move_keys(keyboard: &ButtonInput<KeyCode>) -> MoveKeys {
    MoveKeys {
        forward: keyboard.pressed(KeyCode::KeyW),
        back: keyboard.pressed(KeyCode::KeyS),
        left: keyboard.pressed(KeyCode::KeyA),
        right: keyboard.pressed(KeyCode::KeyD),
        up: keyboard.pressed(KeyCode::KeyQ),
        down: keyboard.pressed(KeyCode::KeyZ),
    }
}

/// Cursor position with the origin moved to the bottom-left of the window.
pub fn pointer_position(window: &Window) -> Option<Vec2> {
    window
        .cursor_position()
        .map(|cursor| Vec2::new(cursor.x, window.height() - cursor.y))
}

fn drive_camera_rig(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    origins: Query<&Transform, (With<ArSessionOrigin>, Without<ArCamera>)>,
    mut cameras: Query<&mut Transform, With<ArCamera>>,
    mut session: ResMut<ArSession>,
    mut last_pointer: Local<Vec2>,
) {
    // Keep the last known pointer while the cursor is outside the window
    if let Some(pointer) = windows.get_single().ok().and_then(pointer_position) {
        *last_pointer = pointer;
    }

    let input = RigInput {
        dt: time.delta_seconds(),
        parent_scale: origins.get_single().map_or(1.0, |t| t.scale.x),
        keys: move_keys(&keyboard),
        pointer: *last_pointer,
        secondary_held: mouse.pressed(MouseButton::Right),
    };

    let provider = session.provider_mut();
    provider.update_camera(&input);
    let Some(pose) = provider.unscaled_pose() else {
        return;
    };
    for mut transform in cameras.iter_mut() {
        transform.translation = pose.position;
        transform.rotation = pose.rotation;
    }
}
