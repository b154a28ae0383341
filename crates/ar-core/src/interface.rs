//! The AR provider interface.
//!
//! Every backend (the editor simulation, device SDK bindings) implements
//! [`ArInterface`]. The host drives it once per frame and never reaches for a
//! concrete backend type.

use ar_events::{CameraImage, LightEstimate, Mat4, PointCloud, Pose, Vec2};

use crate::background::{BackgroundRenderer, CameraId, MaterialLoader};
use crate::bus::PlaneEventBus;
use crate::error::ArError;

/// Keys held this frame for the debug fly-camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Polled input for one camera rig update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Uniform scale of the rig's parent transform.
    pub parent_scale: f32,
    pub keys: MoveKeys,
    /// Pointer position in pixels, origin bottom-left.
    pub pointer: Vec2,
    /// Secondary (right) pointer button held.
    pub secondary_held: bool,
}

impl Default for RigInput {
    fn default() -> Self {
        Self {
            dt: 0.0,
            parent_scale: 1.0,
            keys: MoveKeys::default(),
            pointer: Vec2::ZERO,
            secondary_held: false,
        }
    }
}

/// An AR backend as seen by the host.
pub trait ArInterface: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Begin tracking. `now` is the host's elapsed time in seconds.
    fn start_service(&mut self, now: f32) -> Result<(), ArError>;

    /// Stop tracking and release camera resources.
    fn stop_service(&mut self);

    fn is_running(&self) -> bool;

    /// Device pose relative to the session origin, before session scaling.
    fn unscaled_pose(&self) -> Option<Pose>;

    /// Latest CPU-side camera frame, if the backend exposes one.
    fn camera_image(&self) -> Option<CameraImage>;

    /// Clear `cloud` and refill it with the current feature points.
    ///
    /// Returns false, leaving `cloud` untouched, when no points are available.
    fn try_get_point_cloud(&self, cloud: &mut PointCloud) -> bool;

    fn light_estimate(&self) -> LightEstimate;

    /// Bind background compositing to `camera`. Calling it again is a no-op.
    fn setup_camera(
        &mut self,
        camera: CameraId,
        materials: &dyn MaterialLoader,
    ) -> Result<(), ArError>;

    /// UV remap for the background texture.
    fn display_transform(&self) -> Mat4;

    /// Per-frame camera rig update.
    fn update_camera(&mut self, input: &RigInput);

    /// Screen size in physical pixels. Capture opened afterwards uses it.
    fn set_screen_size(&mut self, _width: u32, _height: u32) {}

    /// Per-frame tracking update. Plane events go to `bus`.
    fn update(&mut self, now: f32, bus: &mut PlaneEventBus);

    /// Background compositing state, once `setup_camera` has run.
    fn background_renderer(&self) -> Option<&BackgroundRenderer> {
        None
    }
}
