//! Status overlay: session state, pose, planes and capture devices.

use bevy::prelude::*;

use crate::planes::PlaneVisualizer;
use crate::plugin::ArSet;
use crate::point_cloud::FeaturePoints;
use crate::session::ArSession;

const CONTROLS: &str = "WASD/QZ move, right mouse look, P session, C cameras, V planes";

/// Plugin for the status overlay.
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_overlay)
            .add_systems(Update, update_overlay.in_set(ArSet::Present));
    }
}

/// Component for the status text.
#[derive(Component)]
pub struct StatusText;

fn setup_overlay(mut commands: Commands) {
    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 14.0,
                color: Color::srgb(0.9, 0.9, 0.9),
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        }),
        StatusText,
    ));
}

/// Overlay text for the current frame.
pub fn status_lines(session: &ArSession, planes: usize, points: Option<usize>) -> Vec<String> {
    let provider = session.provider();
    let mut lines = Vec::new();

    let state = if provider.is_running() { "running" } else { "stopped" };
    lines.push(format!("AR: {} ({})", provider.name(), state));

    if let Some(pose) = provider.unscaled_pose() {
        let p = pose.position;
        lines.push(format!("Pose: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
    }

    lines.push(format!("Planes: {}", planes));
    match points {
        Some(count) => lines.push(format!("Points: {}", count)),
        None => lines.push("Points: none".to_string()),
    }

    let cameras = if session.is_unplugged() {
        "unplugged".to_string()
    } else {
        session.plugged_devices().to_string()
    };
    let feed = provider
        .background_renderer()
        .and_then(|b| b.main_texture())
        .map_or("off".to_string(), |t| format!("texture {}", t.0));
    lines.push(format!("Cameras: {}, feed {}", cameras, feed));

    let light = provider.light_estimate();
    if light.capabilities.is_empty() {
        lines.push("Light estimate: unsupported".to_string());
    }

    lines.push(CONTROLS.to_string());
    lines
}

fn update_overlay(
    session: Res<ArSession>,
    visualizer: Option<Res<PlaneVisualizer>>,
    points: Option<Res<FeaturePoints>>,
    mut texts: Query<&mut Text, With<StatusText>>,
) {
    let planes = visualizer.map_or(0, |v| v.registry().len());
    let points = points.filter(|p| p.available).map(|p| p.cloud.len());
    let status = status_lines(&session, planes, points).join("\n");

    for mut text in texts.iter_mut() {
        if let Some(section) = text.sections.first_mut() {
            if section.value != status {
                section.value.clone_from(&status);
            }
        }
    }
}
