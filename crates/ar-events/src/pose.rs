//! Tracked device pose.

use bevy_math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of the tracked camera.
///
/// Axes follow the engine convention: `-Z` forward, `+X` right, `+Y` up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// Origin, no rotation.
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Local forward axis in session space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Local right axis in session space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local up axis in session space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}
