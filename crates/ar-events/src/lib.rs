//! Shared AR data types for the editor simulation.
//!
//! This crate contains pure data structures with no provider logic.
//! It is a dependency for all other crates in the workspace.

pub mod device;
pub mod frame;
pub mod plane;
pub mod pose;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use device::CameraDevice;
pub use frame::{CameraImage, LightEstimate, LightEstimateCapabilities, PointCloud};
pub use plane::{rect_boundary, BoundedPlane, PlaneEvent, PlaneEventKind};
pub use pose::Pose;

// Math types shared by every crate in the workspace
pub use bevy_math::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
