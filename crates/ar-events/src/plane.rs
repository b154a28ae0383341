//! Plane Types
//!
//! Detected planar surfaces and the lifecycle events that carry them.

use bevy_math::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A detected planar surface.
///
/// `center` and `rotation` are relative to the AR session origin. The
/// boundary polygon, when present, is expressed in plane-local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedPlane {
    /// Unique plane identifier assigned by the provider.
    pub id: String,
    /// Plane center.
    pub center: Vec3,
    /// Plane orientation.
    pub rotation: Quat,
    /// Half-size along the plane's local X and Z axes.
    pub extents: Vec2,
    /// Ordered outline of the plane, if the provider tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_polygon: Option<Vec<Vec3>>,
}

impl BoundedPlane {
    /// Create a plane without a boundary polygon.
    pub fn new(id: impl Into<String>, center: Vec3, rotation: Quat, extents: Vec2) -> Self {
        Self {
            id: id.into(),
            center,
            rotation,
            extents,
            boundary_polygon: None,
        }
    }

    /// Attach a boundary polygon.
    pub fn with_boundary(mut self, points: Vec<Vec3>) -> Self {
        self.boundary_polygon = Some(points);
        self
    }

    /// Number of boundary points (zero when untracked).
    pub fn boundary_len(&self) -> usize {
        self.boundary_polygon.as_ref().map_or(0, Vec::len)
    }

    /// Full width and depth of the plane.
    pub fn size(&self) -> Vec2 {
        self.extents * 2.0
    }
}

/// Build a closed rectangular outline in plane-local space.
///
/// Corners are wound counter-clockwise when viewed from above, and the first
/// corner is repeated at the end so a line strip closes the loop.
pub fn rect_boundary(extents: Vec2) -> Vec<Vec3> {
    let (x, z) = (extents.x, extents.y);
    vec![
        Vec3::new(-x, 0.0, -z),
        Vec3::new(-x, 0.0, z),
        Vec3::new(x, 0.0, z),
        Vec3::new(x, 0.0, -z),
        Vec3::new(-x, 0.0, -z),
    ]
}

/// Kind of plane lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneEventKind {
    Added,
    Updated,
    Removed,
}

/// A plane lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "plane", rename_all = "snake_case")]
pub enum PlaneEvent {
    /// A plane was seen for the first time.
    Added(BoundedPlane),
    /// A known plane changed.
    Updated(BoundedPlane),
    /// A plane is no longer tracked.
    Removed(BoundedPlane),
}

impl PlaneEvent {
    /// The plane carried by this event.
    pub fn plane(&self) -> &BoundedPlane {
        match self {
            PlaneEvent::Added(p) | PlaneEvent::Updated(p) | PlaneEvent::Removed(p) => p,
        }
    }

    /// Which lifecycle signal this is.
    pub fn kind(&self) -> PlaneEventKind {
        match self {
            PlaneEvent::Added(_) => PlaneEventKind::Added,
            PlaneEvent::Updated(_) => PlaneEventKind::Updated,
            PlaneEvent::Removed(_) => PlaneEventKind::Removed,
        }
    }
}
