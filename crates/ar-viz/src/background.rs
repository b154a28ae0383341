//! Passthrough camera background.
//!
//! While the provider renders its material as the background, a 2D camera
//! behind the AR camera draws the capture texture as a full-window sprite and
//! the AR camera stops clearing. The sprite's rotation and flip come from the
//! UV corner vectors the provider writes into the background material.

use ar_core::{RenderMode, TextureId, MAIN_TEX, UV_BOTTOM_LEFT_RIGHT, UV_TOP_LEFT_RIGHT};
use bevy::prelude::*;
use bevy::render::camera::ClearColorConfig;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::render::view::RenderLayers;
use bevy::window::PrimaryWindow;
use std::collections::HashMap;

use crate::camera::ArCamera;
use crate::plugin::ArSet;
use crate::session::ArSession;

const BACKGROUND_LAYER: usize = 1;
const PATTERN_WIDTH: u32 = 64;
const PATTERN_HEIGHT: u32 = 36;
const PATTERN_CELL: u32 = 8;

/// Plugin for the passthrough background.
pub struct BackgroundPlugin;

impl Plugin for BackgroundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PassthroughTextures>()
            .add_systems(Startup, spawn_background)
            .add_systems(Update, update_background.in_set(ArSet::Present));
    }
}

/// Camera that draws the passthrough sprite.
#[derive(Component)]
pub struct BackgroundCamera;

/// Full-window sprite showing the capture texture.
#[derive(Component)]
pub struct PassthroughSprite;

/// How the capture texture sits on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundLayout {
    /// Rotation about the view axis, radians.
    pub angle: f32,
    pub flip_y: bool,
    /// Texture width runs along the screen's vertical axis.
    pub quarter_turn: bool,
}

impl Default for BackgroundLayout {
    fn default() -> Self {
        Self {
            angle: 0.0,
            flip_y: false,
            quarter_turn: false,
        }
    }
}

/// Derive the sprite layout from the top and bottom UV corner pairs.
///
/// `top` packs the top-left and top-right UVs, `bottom` the bottom-left and
/// bottom-right ones.
pub fn background_layout(top: Vec4, bottom: Vec4) -> BackgroundLayout {
    let top_left = Vec2::new(top.x, top.y);
    let top_right = Vec2::new(top.z, top.w);
    let bottom_left = Vec2::new(bottom.x, bottom.y);

    // Screen right and screen up expressed in UV space
    let right = top_right - top_left;
    let up = top_left - bottom_left;
    // Texture u and v axes expressed in screen space
    let u_axis = Vec2::new(right.x, up.x);
    let v_axis = Vec2::new(right.y, up.y);

    BackgroundLayout {
        angle: u_axis.y.atan2(u_axis.x),
        flip_y: u_axis.perp_dot(v_axis) < 0.0,
        quarter_turn: u_axis.y.abs() > u_axis.x.abs(),
    }
}

/// Synthetic frame for a simulated capture: a tinted checkerboard with a
/// marker in the first cell so orientation is visible.
pub fn test_pattern(texture: TextureId) -> Image {
    let tint = [
        (texture.0.wrapping_mul(53) % 256) as u8,
        (texture.0.wrapping_mul(97) % 256) as u8,
        200,
        255,
    ];
    let mut data = Vec::with_capacity((PATTERN_WIDTH * PATTERN_HEIGHT * 4) as usize);
    for y in 0..PATTERN_HEIGHT {
        for x in 0..PATTERN_WIDTH {
            let (cx, cy) = (x / PATTERN_CELL, y / PATTERN_CELL);
            let pixel = if cx == 0 && cy == 0 {
                [255, 40, 40, 255]
            } else if (cx + cy) % 2 == 0 {
                tint
            } else {
                [30, 30, 30, 255]
            };
            data.extend_from_slice(&pixel);
        }
    }
    Image::new(
        Extent3d {
            width: PATTERN_WIDTH,
            height: PATTERN_HEIGHT,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

/// Image assets backing capture textures. Only the live one is kept.
#[derive(Resource, Default)]
pub struct PassthroughTextures {
    images: HashMap<TextureId, Handle<Image>>,
}

impl PassthroughTextures {
    /// Image for `texture`, dropping images of older captures.
    pub fn acquire(&mut self, texture: TextureId, images: &mut Assets<Image>) -> Handle<Image> {
        self.images.retain(|id, _| *id == texture);
        self.images
            .entry(texture)
            .or_insert_with(|| {
                tracing::debug!("Creating passthrough image for {:?}", texture);
                images.add(test_pattern(texture))
            })
            .clone()
    }

    pub fn release_all(&mut self) {
        self.images.clear();
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn spawn_background(mut commands: Commands) {
    commands.spawn((
        Camera2dBundle {
            camera: Camera {
                order: -1,
                is_active: false,
                ..default()
            },
            ..default()
        },
        RenderLayers::layer(BACKGROUND_LAYER),
        BackgroundCamera,
        Name::new("AR Background Camera"),
    ));
    commands.spawn((
        SpriteBundle {
            visibility: Visibility::Hidden,
            ..default()
        },
        RenderLayers::layer(BACKGROUND_LAYER),
        PassthroughSprite,
        Name::new("Passthrough"),
    ));
}

/// Current capture texture and its layout, when the feed is the background.
fn passthrough_feed(session: &ArSession) -> Option<(TextureId, BackgroundLayout)> {
    let renderer = session.provider().background_renderer()?;
    if renderer.mode != RenderMode::MaterialAsBackground {
        return None;
    }
    let material = renderer.material.as_ref()?;
    let texture = material.texture(MAIN_TEX)?;
    let layout = match (
        material.vector(UV_TOP_LEFT_RIGHT),
        material.vector(UV_BOTTOM_LEFT_RIGHT),
    ) {
        (Some(top), Some(bottom)) => background_layout(top, bottom),
        _ => BackgroundLayout::default(),
    };
    Some((texture, layout))
}

#[allow(clippy::type_complexity)]
fn update_background(
    session: Res<ArSession>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut textures: ResMut<PassthroughTextures>,
    mut images: ResMut<Assets<Image>>,
    mut ar_cameras: Query<&mut Camera, (With<ArCamera>, Without<BackgroundCamera>)>,
    mut background_cameras: Query<&mut Camera, (With<BackgroundCamera>, Without<ArCamera>)>,
    mut sprites: Query<
        (&mut Sprite, &mut Handle<Image>, &mut Transform, &mut Visibility),
        With<PassthroughSprite>,
    >,
) {
    let feed = passthrough_feed(&session);
    let textured = feed.is_some();

    for mut camera in ar_cameras.iter_mut() {
        let clearing = !matches!(camera.clear_color, ClearColorConfig::None);
        if clearing == textured {
            camera.clear_color = if textured {
                ClearColorConfig::None
            } else {
                ClearColorConfig::Default
            };
        }
    }
    for mut camera in background_cameras.iter_mut() {
        if camera.is_active != textured {
            camera.is_active = textured;
        }
    }

    let Some((texture, layout)) = feed else {
        if !textures.is_empty() {
            textures.release_all();
        }
        for (_, _, _, mut visibility) in sprites.iter_mut() {
            *visibility = Visibility::Hidden;
        }
        return;
    };

    let window_size = windows
        .get_single()
        .map(|w| Vec2::new(w.width(), w.height()))
        .unwrap_or(Vec2::new(1280.0, 720.0));
    let image = textures.acquire(texture, &mut images);

    for (mut sprite, mut handle, mut transform, mut visibility) in sprites.iter_mut() {
        if *handle != image {
            *handle = image.clone();
        }
        sprite.flip_y = layout.flip_y;
        sprite.custom_size = Some(if layout.quarter_turn {
            Vec2::new(window_size.y, window_size.x)
        } else {
            window_size
        });
        transform.rotation = Quat::from_rotation_z(layout.angle);
        *visibility = Visibility::Visible;
    }
}
