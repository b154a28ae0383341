//! Background compositing model.
//!
//! The provider owns a [`BackgroundRenderer`] once the host has called
//! `setup_camera`. The host reads it every frame to decide whether to clear
//! to a solid color or draw the passthrough texture behind the scene.

use ar_events::{Mat4, Quat, Vec2, Vec3, Vec4};
use std::collections::HashMap;

use crate::capture::TextureId;

/// Resource path of the default background material.
pub const BACKGROUND_MATERIAL_PATH: &str = "Materials/ARBackground";

/// Texture slot the passthrough feed is bound to.
pub const MAIN_TEX: &str = "_MainTex";

/// Shader vector holding the top-left and top-right UVs.
pub const UV_TOP_LEFT_RIGHT: &str = "_UvTopLeftRight";

/// Shader vector holding the bottom-left and bottom-right UVs.
pub const UV_BOTTOM_LEFT_RIGHT: &str = "_UvBottomLeftRight";

/// Host identifier for the camera a renderer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub u64);

/// How the background is composited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// The camera's own clear color.
    #[default]
    StandardBackground,
    /// The background material, usually showing the passthrough texture.
    MaterialAsBackground,
}

/// Shader-facing state of the background material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundMaterial {
    pub name: String,
    textures: HashMap<String, TextureId>,
    vectors: HashMap<String, Vec4>,
}

impl BackgroundMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn set_texture(&mut self, slot: &str, texture: TextureId) {
        self.textures.insert(slot.to_string(), texture);
    }

    pub fn texture(&self, slot: &str) -> Option<TextureId> {
        self.textures.get(slot).copied()
    }

    pub fn set_vector(&mut self, name: &str, value: Vec4) {
        self.vectors.insert(name.to_string(), value);
    }

    pub fn vector(&self, name: &str) -> Option<Vec4> {
        self.vectors.get(name).copied()
    }
}

/// Binding of a background material to a camera.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundRenderer {
    pub material: Option<BackgroundMaterial>,
    pub camera: Option<CameraId>,
    pub mode: RenderMode,
}

impl BackgroundRenderer {
    pub fn new(material: BackgroundMaterial, camera: CameraId) -> Self {
        Self {
            material: Some(material),
            camera: Some(camera),
            mode: RenderMode::StandardBackground,
        }
    }

    /// Release the material and camera references.
    pub fn detach(&mut self) {
        self.material = None;
        self.camera = None;
    }

    /// The texture currently bound to the main slot, if any.
    pub fn main_texture(&self) -> Option<TextureId> {
        self.material.as_ref().and_then(|m| m.texture(MAIN_TEX))
    }
}

/// Host resource loader for background materials.
pub trait MaterialLoader {
    fn load_material(&self, path: &str) -> Option<BackgroundMaterial>;
}

/// Loader that knows the materials shipped with the simulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMaterials;

impl MaterialLoader for BuiltinMaterials {
    fn load_material(&self, path: &str) -> Option<BackgroundMaterial> {
        (path == BACKGROUND_MATERIAL_PATH).then(|| BackgroundMaterial::new("ARBackground"))
    }
}

/// UV remap for a capture texture with the given orientation.
///
/// Rotates by `90 + rotation_angle` degrees about Z after flipping X, and
/// flips Y as well when the feed is vertically mirrored.
pub fn passthrough_display_transform(rotation_angle: f32, vertically_mirrored: bool) -> Mat4 {
    let rotation = Mat4::from_quat(Quat::from_rotation_z((90.0 + rotation_angle).to_radians()));
    let y = if vertically_mirrored { -1.0 } else { 1.0 };
    rotation * Mat4::from_scale(Vec3::new(-1.0, y, 1.0))
}

/// Screen-corner UVs remapped through `transform` about the texture center.
///
/// Order: top-left, top-right, bottom-left, bottom-right.
pub fn uv_corners(transform: &Mat4) -> [Vec2; 4] {
    let center = Vec2::splat(0.5);
    [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
    ]
    .map(|uv| transform.transform_vector3((uv - center).extend(0.0)).truncate() + center)
}
