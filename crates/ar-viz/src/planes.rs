//! Detected planes as scene entities.
//!
//! The `World` itself is the scene the plane visualizer writes into: each
//! plane becomes a root entity under the session origin with a collider mesh
//! child, a [`PlaneLayer`] and a [`PlaneOutline`] drawn with gizmos.

use ar_core::{
    ArConfig, PlaneBoundaryVisualizer, PlaneEventBus, PlaneHooks, PlaneRegistry, PlaneScene,
    SceneHandles, VisualizerConfig,
};
use ar_events::BoundedPlane;
use bevy::prelude::*;
use std::collections::HashMap;

use crate::camera::{spawn_camera_rig, ArSessionOrigin};
use crate::plugin::ArSet;

const PLANE_COLOR: Color = Color::srgba(0.2, 0.7, 1.0, 0.35);
const OUTLINE_COLOR: Color = Color::srgb(1.0, 0.8, 0.1);

/// Plugin that mirrors plane events into entities.
///
/// V toggles the visualizer. Existing planes stay while it is off.
pub struct PlaneVisualizerPlugin;

impl Plugin for PlaneVisualizerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LayerTable>()
            .init_resource::<PlaneEventBus>()
            .add_systems(Startup, setup_plane_visualizer.after(spawn_camera_rig))
            .add_systems(
                Update,
                (toggle_plane_visualizer, sync_planes)
                    .chain()
                    .in_set(ArSet::Visualize),
            );
    }
}

/// Plugin that draws every [`PlaneOutline`] as a closed line strip.
pub struct PlaneOutlinePlugin;

impl Plugin for PlaneOutlinePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, draw_plane_outlines.in_set(ArSet::Present));
    }
}

/// Named layers an entity can be placed on.
#[derive(Resource, Debug, Clone)]
pub struct LayerTable {
    layers: HashMap<String, u32>,
}

impl Default for LayerTable {
    fn default() -> Self {
        let mut table = Self {
            layers: HashMap::new(),
        };
        table.register("Default", 0);
        table.register("UI", 5);
        table.register("ARGameObject", 8);
        table
    }
}

impl LayerTable {
    pub fn register(&mut self, name: impl Into<String>, index: u32) {
        self.layers.insert(name.into(), index);
    }

    pub fn layer(&self, name: &str) -> Option<u32> {
        self.layers.get(name).copied()
    }
}

/// Root of an instantiated plane.
#[derive(Component)]
pub struct PlaneVisual;

/// Marks the part of a plane that can be hit.
#[derive(Component)]
pub struct PlaneCollider;

/// Layer index assigned by the visualizer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayer(pub u32);

/// Boundary points in the plane's local space.
#[derive(Component, Debug, Clone, Default)]
pub struct PlaneOutline {
    pub points: Vec<Vec3>,
}

/// What a plane is instantiated from.
#[derive(Debug, Clone)]
pub struct PlanePrefab {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Handles handed out by the `World` scene.
pub struct BevyHandles;

impl SceneHandles for BevyHandles {
    type Object = Entity;
    type Outline = Entity;
    type Prefab = PlanePrefab;
}

impl PlaneScene<BevyHandles> for World {
    fn layer_by_name(&self, name: &str) -> Option<u32> {
        self.get_resource::<LayerTable>()?.layer(name)
    }

    fn instantiate(&mut self, prefab: &PlanePrefab, root: Option<Entity>) -> Entity {
        let mut plane = self.spawn((SpatialBundle::default(), PlaneVisual, Name::new("Plane")));
        plane.with_children(|parent| {
            parent.spawn((
                PbrBundle {
                    mesh: prefab.mesh.clone(),
                    material: prefab.material.clone(),
                    ..default()
                },
                PlaneCollider,
            ));
        });
        let plane = plane.id();

        if let Some(mut root) = root.and_then(|root| self.get_entity_mut(root)) {
            root.add_child(plane);
        }
        plane
    }

    fn collider_descendants(&self, object: Entity) -> Vec<Entity> {
        let mut found = Vec::new();
        let mut stack = vec![object];
        while let Some(entity) = stack.pop() {
            if self.get::<PlaneCollider>(entity).is_some() {
                found.push(entity);
            }
            if let Some(children) = self.get::<Children>(entity) {
                stack.extend(children.iter().copied());
            }
        }
        found
    }

    fn set_layer(&mut self, object: Entity, layer: u32) {
        if let Some(mut entity) = self.get_entity_mut(object) {
            entity.insert(PlaneLayer(layer));
        }
    }

    fn add_outline(&mut self, object: Entity) -> Entity {
        if let Some(mut entity) = self.get_entity_mut(object) {
            entity.insert(PlaneOutline::default());
        }
        object
    }

    fn set_outline_positions(&mut self, outline: Entity, points: &[Vec3]) {
        if let Some(mut outline) = self.get_mut::<PlaneOutline>(outline) {
            outline.points.clear();
            outline.points.extend_from_slice(points);
        }
    }

    fn set_local_pose(&mut self, object: Entity, position: Vec3, rotation: Quat) {
        if let Some(mut transform) = self.get_mut::<Transform>(object) {
            transform.translation = position;
            transform.rotation = rotation;
        }
    }

    fn destroy(&mut self, object: Entity) {
        if let Some(entity) = self.get_entity_mut(object) {
            entity.despawn_recursive();
        }
    }
}

/// Default plane handling, then stretch the collider mesh to the plane size.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizedPlaneHooks;

impl PlaneHooks<BevyHandles, World> for SizedPlaneHooks {
    fn create_or_update(
        &mut self,
        registry: &mut PlaneRegistry<BevyHandles>,
        scene: &mut World,
        plane: &BoundedPlane,
    ) {
        registry.create_or_update(scene, plane);
        let Some(object) = registry.object(&plane.id) else {
            return;
        };
        let size = plane.size();
        for collider in scene.collider_descendants(object) {
            if let Some(mut transform) = scene.get_mut::<Transform>(collider) {
                transform.scale = Vec3::new(size.x, 1.0, size.y);
            }
        }
    }
}

/// The plane visualizer bound to the `World`.
#[derive(Resource)]
pub struct PlaneVisualizer {
    inner: PlaneBoundaryVisualizer<BevyHandles, SizedPlaneHooks>,
    /// Desired state. Applied on the next sync.
    pub enabled: bool,
}

impl PlaneVisualizer {
    pub fn new(
        config: VisualizerConfig,
        prefab: Option<PlanePrefab>,
        root: Option<Entity>,
    ) -> Self {
        Self {
            inner: PlaneBoundaryVisualizer::with_hooks(config, prefab, root, SizedPlaneHooks),
            enabled: true,
        }
    }

    pub fn registry(&self) -> &PlaneRegistry<BevyHandles> {
        self.inner.registry()
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Apply `enabled`, then handle queued plane events. Returns how many.
    pub fn sync(&mut self, bus: &mut PlaneEventBus, world: &mut World) -> usize {
        match (self.enabled, self.inner.is_active()) {
            (true, false) => {
                if let Err(e) = self.inner.activate(bus, &*world) {
                    tracing::warn!("Plane visualizer disabled: {}", e);
                    self.enabled = false;
                    return 0;
                }
            }
            (false, true) => {
                self.inner.deactivate(bus);
                return 0;
            }
            (false, false) => return 0,
            (true, true) => {}
        }
        self.inner.process(bus, world)
    }
}

fn setup_plane_visualizer(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Option<Res<ArConfig>>,
    origins: Query<Entity, With<ArSessionOrigin>>,
) {
    let prefab = PlanePrefab {
        mesh: meshes.add(Plane3d::default().mesh().size(1.0, 1.0)),
        material: materials.add(StandardMaterial {
            base_color: PLANE_COLOR,
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        }),
    };
    let config = config.map(|c| c.visualizer.clone()).unwrap_or_default();
    commands.insert_resource(PlaneVisualizer::new(
        config,
        Some(prefab),
        origins.get_single().ok(),
    ));
}

fn toggle_plane_visualizer(
    keyboard: Res<ButtonInput<KeyCode>>,
    visualizer: Option<ResMut<PlaneVisualizer>>,
) {
    let Some(mut visualizer) = visualizer else {
        return;
    };
    if keyboard.just_pressed(KeyCode::KeyV) {
        visualizer.enabled = !visualizer.enabled;
        let status = if visualizer.enabled { "ON" } else { "OFF" };
        tracing::info!("Plane visualizer: {}", status);
    }
}

/// Exclusive system: the visualizer needs the whole `World` as its scene.
pub fn sync_planes(world: &mut World) {
    if !world.contains_resource::<PlaneVisualizer>() || !world.contains_resource::<PlaneEventBus>()
    {
        return;
    }
    world.resource_scope(|world, mut visualizer: Mut<PlaneVisualizer>| {
        world.resource_scope(|world, mut bus: Mut<PlaneEventBus>| {
            visualizer.sync(&mut bus, world);
        });
    });
}

fn draw_plane_outlines(mut gizmos: Gizmos, outlines: Query<(&GlobalTransform, &PlaneOutline)>) {
    for (transform, outline) in outlines.iter() {
        gizmos.linestrip(
            outline.points.iter().map(|p| transform.transform_point(*p)),
            OUTLINE_COLOR,
        );
    }
}
