//! Feature points from the provider, drawn as small gizmo spheres.

use ar_events::PointCloud;
use bevy::prelude::*;

use crate::camera::ArSessionOrigin;
use crate::plugin::ArSet;
use crate::session::ArSession;

const POINT_COLOR: Color = Color::srgb(1.0, 0.4, 0.8);
const POINT_RADIUS: f32 = 0.02;

/// Plugin for point cloud display.
pub struct PointCloudPlugin;

impl Plugin for PointCloudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FeaturePoints>()
            .add_systems(Update, refresh_point_cloud.in_set(ArSet::Visualize))
            .add_systems(Update, draw_point_cloud.in_set(ArSet::Present));
    }
}

/// Latest feature points, in session-origin space. The buffer is reused.
#[derive(Resource, Debug, Default)]
pub struct FeaturePoints {
    pub cloud: PointCloud,
    /// False while the provider has no points to give.
    pub available: bool,
}

fn refresh_point_cloud(session: Res<ArSession>, mut points: ResMut<FeaturePoints>) {
    let points = &mut *points;
    points.available = session.provider().try_get_point_cloud(&mut points.cloud);
}

fn draw_point_cloud(
    mut gizmos: Gizmos,
    points: Res<FeaturePoints>,
    origins: Query<&GlobalTransform, With<ArSessionOrigin>>,
) {
    if !points.available {
        return;
    }
    let origin = origins.get_single().copied().unwrap_or_default();
    for point in &points.cloud.points {
        gizmos.sphere(
            origin.transform_point(*point),
            Quat::IDENTITY,
            POINT_RADIUS,
            POINT_COLOR,
        );
    }
}
