//! Camera capture for the passthrough background.
//!
//! [`CameraDeviceSource`] is the host's device enumeration and capture
//! primitive. The editor has no real camera stack, so
//! [`SyntheticCameraSource`] stands in for one: its device list is shared
//! between clones so the host (or a test) can plug and unplug devices while
//! the provider holds its own handle.

use ar_events::CameraDevice;
use std::sync::{Arc, Mutex, MutexGuard};

/// Host identifier for a capture texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Parameters used to open a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub device_name: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

/// A live camera feed bound to a texture.
pub trait CaptureTexture: Send + Sync {
    fn device_name(&self) -> &str;
    fn texture_id(&self) -> TextureId;
    fn play(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// Clockwise rotation of the feed in degrees.
    fn video_rotation_angle(&self) -> f32;
    fn video_vertically_mirrored(&self) -> bool;
}

/// Enumerates cameras and opens captures on them.
pub trait CameraDeviceSource: Send + Sync {
    fn devices(&self) -> Vec<CameraDevice>;
    fn open(&mut self, request: CaptureRequest) -> Box<dyn CaptureTexture>;
}

/// Pick the first rear-facing device, or the first device at all.
pub fn select_device(devices: &[CameraDevice]) -> Option<&CameraDevice> {
    devices
        .iter()
        .find(|d| !d.is_front_facing)
        .or_else(|| devices.first())
}

#[derive(Debug, Default)]
struct SyntheticState {
    devices: Vec<CameraDevice>,
    rotation_angle: f32,
    vertically_mirrored: bool,
    next_texture: u64,
    opened: Vec<CaptureRequest>,
    playing: usize,
}

/// In-process camera source for running without hardware.
#[derive(Debug, Clone, Default)]
pub struct SyntheticCameraSource {
    state: Arc<Mutex<SyntheticState>>,
}

fn lock(state: &Mutex<SyntheticState>) -> MutexGuard<'_, SyntheticState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SyntheticCameraSource {
    pub fn new(devices: Vec<CameraDevice>) -> Self {
        let source = Self::default();
        lock(&source.state).devices = devices;
        source
    }

    /// Orientation reported by every capture opened from now on.
    pub fn with_orientation(self, rotation_angle: f32, vertically_mirrored: bool) -> Self {
        {
            let mut state = lock(&self.state);
            state.rotation_angle = rotation_angle;
            state.vertically_mirrored = vertically_mirrored;
        }
        self
    }

    pub fn set_devices(&self, devices: Vec<CameraDevice>) {
        lock(&self.state).devices = devices;
    }

    /// Unplug a device by name. Returns false if it was not listed.
    pub fn remove_device(&self, name: &str) -> bool {
        let mut state = lock(&self.state);
        let before = state.devices.len();
        state.devices.retain(|d| d.name != name);
        state.devices.len() != before
    }

    /// Every capture request made so far, oldest first.
    pub fn opened(&self) -> Vec<CaptureRequest> {
        lock(&self.state).opened.clone()
    }

    /// Number of captures currently playing.
    pub fn playing(&self) -> usize {
        lock(&self.state).playing
    }
}

impl CameraDeviceSource for SyntheticCameraSource {
    fn devices(&self) -> Vec<CameraDevice> {
        lock(&self.state).devices.clone()
    }

    fn open(&mut self, request: CaptureRequest) -> Box<dyn CaptureTexture> {
        let mut state = lock(&self.state);
        state.next_texture += 1;
        state.opened.push(request.clone());
        Box::new(SyntheticCapture {
            device_name: request.device_name,
            texture: TextureId(state.next_texture),
            rotation_angle: state.rotation_angle,
            vertically_mirrored: state.vertically_mirrored,
            playing: false,
            source: Arc::clone(&self.state),
        })
    }
}

/// Capture handed out by [`SyntheticCameraSource`].
#[derive(Debug)]
pub struct SyntheticCapture {
    device_name: String,
    texture: TextureId,
    rotation_angle: f32,
    vertically_mirrored: bool,
    playing: bool,
    source: Arc<Mutex<SyntheticState>>,
}

impl CaptureTexture for SyntheticCapture {
    fn device_name(&self) -> &str {
        &self.device_name
    }

    fn texture_id(&self) -> TextureId {
        self.texture
    }

    fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            lock(&self.source).playing += 1;
        }
    }

    fn stop(&mut self) {
        if self.playing {
            self.playing = false;
            lock(&self.source).playing -= 1;
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn video_rotation_angle(&self) -> f32 {
        self.rotation_angle
    }

    fn video_vertically_mirrored(&self) -> bool {
        self.vertically_mirrored
    }
}

impl Drop for SyntheticCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ar_events::fixtures::{front_only_devices, mixed_devices};

    #[test]
    fn test_select_prefers_rear_camera() {
        let devices = mixed_devices();
        assert_eq!(select_device(&devices).unwrap().name, "USB Rear Camera");
    }

    #[test]
    fn test_select_falls_back_to_first_device() {
        let devices = front_only_devices();
        assert_eq!(select_device(&devices).unwrap().name, "Integrated Webcam");

        let both_front = vec![CameraDevice::front("a"), CameraDevice::front("b")];
        assert_eq!(select_device(&both_front).unwrap().name, "a");
    }

    #[test]
    fn test_select_empty() {
        assert!(select_device(&[]).is_none());
    }

    #[test]
    fn test_synthetic_capture_lifecycle() {
        let mut source = SyntheticCameraSource::new(mixed_devices()).with_orientation(90.0, true);
        let observer = source.clone();

        let mut capture = source.open(CaptureRequest {
            device_name: "USB Rear Camera".to_string(),
            width: 640,
            height: 480,
            frame_rate: 30,
        });
        assert_eq!(capture.device_name(), "USB Rear Camera");
        assert_eq!(capture.video_rotation_angle(), 90.0);
        assert!(capture.video_vertically_mirrored());
        assert!(!capture.is_playing());

        capture.play();
        capture.play();
        assert_eq!(observer.playing(), 1);

        drop(capture);
        assert_eq!(observer.playing(), 0);
        assert_eq!(observer.opened().len(), 1);
    }

    #[test]
    fn test_remove_device_is_shared_between_clones() {
        let source = SyntheticCameraSource::new(mixed_devices());
        let host = source.clone();

        assert!(host.remove_device("USB Rear Camera"));
        assert!(!host.remove_device("USB Rear Camera"));
        assert_eq!(source.devices(), front_only_devices_named("FaceTime HD Camera"));
    }

    fn front_only_devices_named(name: &str) -> Vec<CameraDevice> {
        vec![CameraDevice::front(name)]
    }
}
