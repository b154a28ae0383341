//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // ar-events = { path = "../ar-events", features = ["test-fixtures"] }
//!
//! use ar_events::fixtures;
//!
//! let plane = fixtures::sample_plane("floor");
//! let devices = fixtures::mixed_devices();
//! ```

use bevy_math::{Quat, Vec2, Vec3};

use crate::{rect_boundary, BoundedPlane, CameraDevice};

/// A 1x1 m horizontal plane at the origin with a rectangular outline.
pub fn sample_plane(id: &str) -> BoundedPlane {
    let extents = Vec2::splat(0.5);
    BoundedPlane::new(id, Vec3::ZERO, Quat::IDENTITY, extents).with_boundary(rect_boundary(extents))
}

/// A plane whose outline has `points` vertices on a circle.
pub fn plane_with_polygon(id: &str, points: usize) -> BoundedPlane {
    let polygon = (0..points)
        .map(|i| {
            let angle = i as f32 / points as f32 * std::f32::consts::TAU;
            Vec3::new(angle.cos(), 0.0, angle.sin())
        })
        .collect();
    BoundedPlane::new(id, Vec3::ZERO, Quat::IDENTITY, Vec2::ONE).with_boundary(polygon)
}

/// Front camera listed first, rear camera second.
pub fn mixed_devices() -> Vec<CameraDevice> {
    vec![
        CameraDevice::front("FaceTime HD Camera"),
        CameraDevice::back("USB Rear Camera"),
    ]
}

/// A laptop with only a selfie camera.
pub fn front_only_devices() -> Vec<CameraDevice> {
    vec![CameraDevice::front("Integrated Webcam")]
}
