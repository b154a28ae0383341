//! Per-frame tracking data: point clouds, light estimates, camera images.

use bevy_math::Vec3;
use serde::{Deserialize, Serialize};

/// Sparse feature points sampled from the environment.
///
/// Callers keep one of these around and hand it to the provider every frame;
/// the provider clears and refills `points` so the allocation is reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<Vec3>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Which light estimate fields a provider fills in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightEstimateCapabilities(u8);

impl LightEstimateCapabilities {
    pub const NONE: Self = Self(0);
    pub const AMBIENT_INTENSITY: Self = Self(1);
    pub const AMBIENT_COLOR_TEMPERATURE: Self = Self(1 << 1);

    /// True if every flag in `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for LightEstimateCapabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Ambient lighting estimate for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LightEstimate {
    pub capabilities: LightEstimateCapabilities,
    /// Ambient intensity in lumens, if supported.
    pub ambient_intensity: Option<f32>,
    /// Ambient color temperature in Kelvin, if supported.
    pub ambient_color_temperature: Option<f32>,
}

impl LightEstimate {
    /// An estimate carrying no data.
    pub fn unsupported() -> Self {
        Self::default()
    }
}

/// Raw YUV camera frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraImage {
    pub width: u32,
    pub height: u32,
    /// Luma plane, `width * height` bytes.
    pub y: Vec<u8>,
    /// Interleaved chroma plane.
    pub uv: Vec<u8>,
}
