//! Core AR simulation logic: the provider interface, the editor provider,
//! the plane event bus and the plane boundary visualizer.
//!
//! Nothing in this crate renders. Engine collaborators (camera devices,
//! background compositing, material loading, scene objects) are traits that
//! the host implements.

pub mod background;
pub mod bus;
pub mod capture;
pub mod config;
pub mod editor;
pub mod error;
pub mod interface;
pub mod visualizer;

pub use background::{
    passthrough_display_transform, uv_corners, BackgroundMaterial, BackgroundRenderer,
    BuiltinMaterials, CameraId, MaterialLoader, RenderMode, BACKGROUND_MATERIAL_PATH, MAIN_TEX,
    UV_BOTTOM_LEFT_RIGHT, UV_TOP_LEFT_RIGHT,
};
pub use bus::{PlaneEventBus, SubscriptionId};
pub use capture::{
    select_device, CameraDeviceSource, CaptureRequest, CaptureTexture, SyntheticCameraSource,
    TextureId,
};
pub use config::{
    default_config_toml, ArConfig, BackgroundConfig, CaptureConfig, ConfigError,
    FlyCameraConfig, PlaneConfig, PointCloudConfig, VisualizerConfig,
};
pub use editor::{fake_planes, EditorInterface, ProviderState};
pub use error::ArError;
pub use interface::{ArInterface, MoveKeys, RigInput};
pub use visualizer::{
    DefaultPlaneHooks, PlaneBoundaryVisualizer, PlaneHooks, PlaneRegistry, PlaneScene,
    SceneHandles,
};
