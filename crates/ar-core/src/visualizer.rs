//! Plane boundary visualizer.
//!
//! Keeps exactly one rendered object per live plane id. Objects are created
//! the first time an id is added or updated, moved on every later event for
//! that id, and destroyed only when the id is removed.

use ar_events::{BoundedPlane, PlaneEvent, Quat, Vec3};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::bus::{PlaneEventBus, SubscriptionId};
use crate::config::VisualizerConfig;
use crate::error::ArError;

/// Handle types a host scene hands out.
pub trait SceneHandles {
    /// Handle to a scene object.
    type Object: Copy + Eq + Debug;
    /// Handle to an outline renderer attached to an object.
    type Outline: Copy + Debug;
    /// Template instantiated once per plane.
    type Prefab;
}

/// Scene operations the visualizer needs from the host.
pub trait PlaneScene<K: SceneHandles> {
    /// Resolve a render layer by name.
    fn layer_by_name(&self, name: &str) -> Option<u32>;

    /// Instantiate `prefab`, parented to `root` when given.
    fn instantiate(&mut self, prefab: &K::Prefab, root: Option<K::Object>) -> K::Object;

    /// `object` and all of its descendants that carry a collider.
    fn collider_descendants(&self, object: K::Object) -> Vec<K::Object>;

    fn set_layer(&mut self, object: K::Object, layer: u32);

    fn add_outline(&mut self, object: K::Object) -> K::Outline;

    fn set_outline_positions(&mut self, outline: K::Outline, points: &[Vec3]);

    fn set_local_pose(&mut self, object: K::Object, position: Vec3, rotation: Quat);

    /// Destroy `object` and everything under it.
    fn destroy(&mut self, object: K::Object);
}

/// Plane id to scene object mapping plus the prefab it instantiates.
pub struct PlaneRegistry<K: SceneHandles> {
    prefab: Option<K::Prefab>,
    root: Option<K::Object>,
    plane_layer: u32,
    objects: HashMap<String, K::Object>,
    outlines: HashMap<String, K::Outline>,
    boundary: Vec<Vec3>,
}

impl<K: SceneHandles> PlaneRegistry<K> {
    fn new(prefab: Option<K::Prefab>, root: Option<K::Object>) -> Self {
        Self {
            prefab,
            root,
            plane_layer: 0,
            objects: HashMap::new(),
            outlines: HashMap::new(),
            boundary: Vec::new(),
        }
    }

    pub fn root(&self) -> Option<K::Object> {
        self.root
    }

    /// Layer assigned to plane colliders, resolved on activation.
    pub fn plane_layer(&self) -> u32 {
        self.plane_layer
    }

    pub fn object(&self, id: &str) -> Option<K::Object> {
        self.objects.get(id).copied()
    }

    pub fn outline(&self, id: &str) -> Option<K::Outline> {
        self.outlines.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Current capacity of the boundary scratch buffer.
    pub fn boundary_capacity(&self) -> usize {
        self.boundary.capacity()
    }

    /// Register an object created outside the default path.
    pub fn insert(&mut self, id: impl Into<String>, object: K::Object, outline: K::Outline) {
        let id = id.into();
        self.outlines.insert(id.clone(), outline);
        self.objects.insert(id, object);
    }

    /// Forget a plane. Does not touch the scene.
    pub fn remove(&mut self, id: &str) -> Option<K::Object> {
        self.outlines.remove(id);
        self.objects.remove(id)
    }

    /// Default create-or-update behavior.
    ///
    /// Instantiates the prefab for unseen ids, moves colliders onto the plane
    /// layer so ray queries can tell plane geometry apart, feeds the boundary
    /// polygon to the outline, and applies the plane's pose.
    pub fn create_or_update<S: PlaneScene<K>>(
        &mut self,
        scene: &mut S,
        plane: &BoundedPlane,
    ) {
        let object = match self.objects.get(&plane.id) {
            Some(&object) => object,
            None => {
                let Some(prefab) = &self.prefab else {
                    return;
                };
                let object = scene.instantiate(prefab, self.root);
                for collider in scene.collider_descendants(object) {
                    scene.set_layer(collider, self.plane_layer);
                }
                let outline = scene.add_outline(object);
                tracing::debug!("Created plane object {:?} for {}", object, plane.id);
                self.insert(plane.id.clone(), object, outline);
                object
            }
        };

        if let Some(polygon) = &plane.boundary_polygon {
            if polygon.len() > self.boundary.capacity() {
                tracing::debug!(
                    "Growing boundary buffer from {} to {} points",
                    self.boundary.capacity(),
                    polygon.len()
                );
            }
            self.boundary.clear();
            self.boundary.extend_from_slice(polygon);
            if let Some(&outline) = self.outlines.get(&plane.id) {
                scene.set_outline_positions(outline, &self.boundary);
            }
        }

        scene.set_local_pose(object, plane.center, plane.rotation);
    }
}

/// Overridable per-plane rendering hook.
pub trait PlaneHooks<K: SceneHandles, S: PlaneScene<K>> {
    /// Called for every added or updated plane while a prefab is configured.
    fn create_or_update(
        &mut self,
        registry: &mut PlaneRegistry<K>,
        scene: &mut S,
        plane: &BoundedPlane,
    ) {
        registry.create_or_update(scene, plane);
    }
}

/// Hooks that keep the default behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPlaneHooks;

impl<K: SceneHandles, S: PlaneScene<K>> PlaneHooks<K, S> for DefaultPlaneHooks {}

/// Mirrors plane lifecycle events into scene objects.
pub struct PlaneBoundaryVisualizer<K: SceneHandles, H = DefaultPlaneHooks> {
    registry: PlaneRegistry<K>,
    hooks: H,
    config: VisualizerConfig,
    subscription: Option<SubscriptionId>,
}

impl<K: SceneHandles> PlaneBoundaryVisualizer<K, DefaultPlaneHooks> {
    pub fn new(
        config: VisualizerConfig,
        prefab: Option<K::Prefab>,
        root: Option<K::Object>,
    ) -> Self {
        Self::with_hooks(config, prefab, root, DefaultPlaneHooks)
    }
}

impl<K: SceneHandles, H> PlaneBoundaryVisualizer<K, H> {
    pub fn with_hooks(
        config: VisualizerConfig,
        prefab: Option<K::Prefab>,
        root: Option<K::Object>,
        hooks: H,
    ) -> Self {
        Self {
            registry: PlaneRegistry::new(prefab, root),
            hooks,
            config,
            subscription: None,
        }
    }

    /// Resolve the plane layer and start listening for plane events.
    pub fn activate<S: PlaneScene<K>>(
        &mut self,
        bus: &mut PlaneEventBus,
        scene: &S,
    ) -> Result<(), ArError> {
        let layer_name = &self.config.plane_layer;
        let layer = scene
            .layer_by_name(layer_name)
            .ok_or_else(|| ArError::UnknownLayer(layer_name.clone()))?;
        self.registry.plane_layer = layer;

        if self.subscription.map_or(true, |id| !bus.is_subscribed(id)) {
            self.subscription = Some(bus.subscribe());
        }
        self.registry.boundary = Vec::with_capacity(self.config.boundary_capacity);
        tracing::debug!("Plane visualizer active on layer {} ({})", layer_name, layer);
        Ok(())
    }

    /// Stop listening. Existing objects stay in the scene.
    pub fn deactivate(&mut self, bus: &mut PlaneEventBus) {
        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Handle every event queued for this visualizer. Returns how many.
    pub fn process<S>(&mut self, bus: &mut PlaneEventBus, scene: &mut S) -> usize
    where
        S: PlaneScene<K>,
        H: PlaneHooks<K, S>,
    {
        let Some(id) = self.subscription else {
            return 0;
        };
        let events = bus.drain(id);
        for event in &events {
            self.handle(scene, event);
        }
        events.len()
    }

    /// Dispatch a single event.
    pub fn handle<S>(&mut self, scene: &mut S, event: &PlaneEvent)
    where
        S: PlaneScene<K>,
        H: PlaneHooks<K, S>,
    {
        match event {
            PlaneEvent::Added(plane) | PlaneEvent::Updated(plane) => {
                self.plane_changed(scene, plane)
            }
            PlaneEvent::Removed(plane) => self.plane_removed(scene, plane),
        }
    }

    fn plane_changed<S>(&mut self, scene: &mut S, plane: &BoundedPlane)
    where
        S: PlaneScene<K>,
        H: PlaneHooks<K, S>,
    {
        if self.registry.prefab.is_none() {
            return;
        }
        self.hooks.create_or_update(&mut self.registry, scene, plane);
    }

    fn plane_removed<S: PlaneScene<K>>(&mut self, scene: &mut S, plane: &BoundedPlane) {
        if let Some(object) = self.registry.remove(&plane.id) {
            tracing::debug!("Destroying plane object {:?} for {}", object, plane.id);
            scene.destroy(object);
        }
    }

    pub fn registry(&self) -> &PlaneRegistry<K> {
        &self.registry
    }
}
