//! Main plugin that ties the AR systems together.

use bevy::prelude::*;

use crate::background::BackgroundPlugin;
use crate::camera::CameraRigPlugin;
use crate::overlay::OverlayPlugin;
use crate::planes::{PlaneOutlinePlugin, PlaneVisualizerPlugin};
use crate::point_cloud::PointCloudPlugin;
use crate::session::SessionPlugin;

/// Per-frame ordering of the AR systems.
///
/// Tracking runs first so plane events and the capture feed are current,
/// then the rig moves, then scene objects follow, then everything is drawn.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArSet {
    Track,
    Rig,
    Visualize,
    Present,
}

/// Main plugin for the AR editor simulation.
///
/// Insert an [`ArConfig`](ar_core::ArConfig) or a ready
/// [`ArSession`](crate::ArSession) before adding it to override defaults.
pub struct ArSimPlugin;

impl Plugin for ArSimPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "AR Editor Simulation".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .configure_sets(
            Update,
            (ArSet::Track, ArSet::Rig, ArSet::Visualize, ArSet::Present).chain(),
        )
        .add_plugins((
            SessionPlugin,
            CameraRigPlugin,
            BackgroundPlugin,
            PlaneVisualizerPlugin,
            PlaneOutlinePlugin,
            PointCloudPlugin,
            OverlayPlugin,
        ));
    }
}
