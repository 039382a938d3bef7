//! Scene container and per-frame visibility
//!
//! [`Scene`] owns everything that can be drawn. Once per scene pass the master
//! renderer calls [`Scene::cull`] with the pass's frustum and gets back a
//! [`VisibleSet`]: indices and keys of what survived, with entities already
//! batched by model.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Vec3;
use crate::scene::{Entity, Frustum, GuiElement, Light, Particle, Terrain, TextMesh, TexturedModel, WaterTile};

new_key_type! {
    /// Key of a model registered with a [`Scene`]
    pub struct ModelKey;

    /// Key of an entity placed in a [`Scene`]
    pub struct EntityKey;
}

/// All visible instances of one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBatch {
    /// Model shared by the batch
    pub model: ModelKey,

    /// Entities drawn with the model
    pub entities: Vec<EntityKey>,
}

impl EntityBatch {
    /// Create an empty batch for a model
    pub fn new(model: ModelKey) -> Self {
        Self {
            model,
            entities: Vec::new(),
        }
    }
}

/// What one frustum sees of a scene
///
/// Batches keep the order in which their model was first encountered, so the
/// draw order is stable from frame to frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    /// Batches of models without a normal map
    pub entities: Vec<EntityBatch>,

    /// Batches of normal-mapped models
    pub normal_mapped: Vec<EntityBatch>,

    /// Indices into [`Scene::terrains`]
    pub terrains: Vec<usize>,

    /// Indices into [`Scene::water`]
    pub water: Vec<usize>,

    /// Indices into [`Scene::particles`]
    pub particles: Vec<usize>,
}

impl VisibleSet {
    /// Number of visible entities across both entity lists
    pub fn entity_count(&self) -> usize {
        self.entities
            .iter()
            .chain(&self.normal_mapped)
            .map(|batch| batch.entities.len())
            .sum()
    }

    /// Whether nothing at all is visible
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.normal_mapped.is_empty()
            && self.terrains.is_empty()
            && self.water.is_empty()
            && self.particles.is_empty()
    }
}

/// Everything that may be drawn
#[derive(Debug, Default)]
pub struct Scene {
    models: SlotMap<ModelKey, TexturedModel>,
    entities: SlotMap<EntityKey, Entity>,

    /// Terrain tiles
    pub terrains: Vec<Terrain>,

    /// Water tiles
    pub water: Vec<WaterTile>,

    /// Live particles
    pub particles: Vec<Particle>,

    /// Lights; index 0 is the sun
    pub lights: Vec<Light>,

    /// GUI quads, drawn in order
    pub gui: Vec<GuiElement>,

    /// Text meshes, drawn after the GUI quads
    pub texts: Vec<TextMesh>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model
    pub fn add_model(&mut self, model: TexturedModel) -> ModelKey {
        self.models.insert(model)
    }

    /// Look up a model
    pub fn model(&self, key: ModelKey) -> Option<&TexturedModel> {
        self.models.get(key)
    }

    /// Place an entity
    pub fn add_entity(&mut self, entity: Entity) -> EntityKey {
        if !self.models.contains_key(entity.model) {
            log::warn!("Entity added with unknown model {:?}; it will never be drawn", entity.model);
        }
        self.entities.insert(entity)
    }

    /// Remove an entity, returning it if it existed
    pub fn remove_entity(&mut self, key: EntityKey) -> Option<Entity> {
        self.entities.remove(key)
    }

    /// Look up an entity
    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Look up an entity for modification
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Iterate over all entities
    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    /// Number of placed entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Replace the sun (light 0), inserting it if there are no lights yet
    pub fn set_sun(&mut self, sun: Light) {
        match self.lights.first_mut() {
            Some(slot) => *slot = sun,
            None => self.lights.push(sun),
        }
    }

    /// Add a secondary light after the sun
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// The shadow-casting light
    pub fn sun(&self) -> Option<&Light> {
        self.lights.first()
    }

    /// Advance particles, drop dead ones and sort the rest back to front
    pub fn update_particles(&mut self, delta: f32, camera_position: &Vec3) {
        self.particles.retain_mut(|particle| particle.update(delta, camera_position));
        self.particles.sort_by(|a, b| {
            b.camera_distance_squared()
                .total_cmp(&a.camera_distance_squared())
        });
    }

    /// Collect what `frustum` can see
    ///
    /// Entities are tested with their model's bounding sphere scaled by the
    /// entity scale; entities whose model is missing are skipped.
    pub fn cull(&self, frustum: &Frustum) -> VisibleSet {
        let mut visible = VisibleSet::default();
        let mut plain_index: HashMap<ModelKey, usize> = HashMap::new();
        let mut mapped_index: HashMap<ModelKey, usize> = HashMap::new();

        for (key, entity) in &self.entities {
            let Some(model) = self.models.get(entity.model) else {
                continue;
            };
            if !frustum.contains(&entity.position, model.bounding_radius * entity.scale.abs()) {
                continue;
            }

            let (batches, index) = if model.is_normal_mapped() {
                (&mut visible.normal_mapped, &mut mapped_index)
            } else {
                (&mut visible.entities, &mut plain_index)
            };
            let slot = *index.entry(entity.model).or_insert_with(|| {
                batches.push(EntityBatch::new(entity.model));
                batches.len() - 1
            });
            batches[slot].entities.push(key);
        }

        visible.terrains = self
            .terrains
            .iter()
            .enumerate()
            .filter(|(_, t)| frustum.contains(&t.bounding_center(), t.bounding_radius()))
            .map(|(i, _)| i)
            .collect();

        visible.water = self
            .water
            .iter()
            .enumerate()
            .filter(|(_, w)| frustum.contains(&w.center(), w.bounding_radius()))
            .map(|(i, _)| i)
            .collect();

        visible.particles = self
            .particles
            .iter()
            .enumerate()
            .filter(|(_, p)| frustum.contains(&p.position, p.scale))
            .map(|(i, _)| i)
            .collect();

        log::trace!(
            "Culled scene: {} entities, {} terrains, {} water, {} particles visible",
            visible.entity_count(),
            visible.terrains.len(),
            visible.water.len(),
            visible.particles.len()
        );

        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{MeshHandle, TextureHandle};
    use crate::render::primitives::{Camera, GpuMesh};
    use crate::scene::{ModelTexture, ParticleTexture};

    fn frustum() -> Frustum {
        let camera = Camera::perspective(Vec3::zeros(), 70.0, 4.0 / 3.0, 0.1, 1000.0);
        Frustum::new(&camera.orientation(), 1000.0)
    }

    fn model(normal_mapped: bool) -> TexturedModel {
        let mut texture = ModelTexture::new(TextureHandle(1));
        if normal_mapped {
            texture = texture.with_normal_map(TextureHandle(2));
        }
        TexturedModel::new(GpuMesh::new(MeshHandle(1), 36), texture, 1.0)
    }

    #[test]
    fn test_cull_batches_visible_entities_by_model() {
        let mut scene = Scene::new();
        let crate_model = scene.add_model(model(false));
        let barrel_model = scene.add_model(model(true));

        let a = scene.add_entity(Entity::new(crate_model, Vec3::new(0.0, 0.0, -10.0)));
        let b = scene.add_entity(Entity::new(crate_model, Vec3::new(1.0, 0.0, -20.0)));
        scene.add_entity(Entity::new(crate_model, Vec3::new(0.0, 0.0, 20.0)));
        let c = scene.add_entity(Entity::new(barrel_model, Vec3::new(0.0, 1.0, -5.0)));

        let visible = scene.cull(&frustum());
        assert_eq!(visible.entities, vec![EntityBatch { model: crate_model, entities: vec![a, b] }]);
        assert_eq!(visible.normal_mapped, vec![EntityBatch { model: barrel_model, entities: vec![c] }]);
        assert_eq!(visible.entity_count(), 3);
    }

    #[test]
    fn test_large_entity_behind_near_plane_survives_by_radius() {
        let mut scene = Scene::new();
        let key = scene.add_model(model(false));
        scene.add_entity(Entity::new(key, Vec3::new(0.0, 0.0, 1.0)).with_scale(5.0));
        assert_eq!(scene.cull(&frustum()).entity_count(), 1);
    }

    #[test]
    fn test_cull_water_and_particles() {
        let mut scene = Scene::new();
        scene.water.push(WaterTile::new(0.0, -100.0, -5.0));
        scene.water.push(WaterTile::new(0.0, 500.0, -5.0));
        let texture = ParticleTexture::new(TextureHandle(4), 1);
        scene.particles.push(Particle::new(texture, Vec3::new(0.0, 0.0, -3.0), Vec3::zeros(), 0.0, 1.0, 0.0, 0.5));
        scene.particles.push(Particle::new(texture, Vec3::new(0.0, 0.0, 3.0), Vec3::zeros(), 0.0, 1.0, 0.0, 0.5));

        let visible = scene.cull(&frustum());
        assert_eq!(visible.water, vec![0]);
        assert_eq!(visible.particles, vec![0]);
    }

    #[test]
    fn test_update_particles_sorts_far_to_near_and_drops_dead() {
        let mut scene = Scene::new();
        let texture = ParticleTexture::new(TextureHandle(4), 1);
        scene.particles.push(Particle::new(texture, Vec3::new(0.0, 0.0, -2.0), Vec3::zeros(), 0.0, 5.0, 0.0, 1.0));
        scene.particles.push(Particle::new(texture, Vec3::new(0.0, 0.0, -9.0), Vec3::zeros(), 0.0, 5.0, 0.0, 1.0));
        scene.particles.push(Particle::new(texture, Vec3::new(0.0, 0.0, -5.0), Vec3::zeros(), 0.0, 0.01, 0.0, 1.0));

        scene.update_particles(0.1, &Vec3::zeros());
        assert_eq!(scene.particles.len(), 2);
        assert!(scene.particles[0].position.z < scene.particles[1].position.z);
    }

    #[test]
    fn test_sun_is_first_light() {
        let mut scene = Scene::new();
        scene.set_sun(Light::new(Vec3::new(0.0, 1000.0, 0.0), Vec3::new(1.0, 1.0, 1.0)));
        scene.add_light(Light::new(Vec3::new(5.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));
        scene.set_sun(Light::new(Vec3::new(0.0, 2000.0, 0.0), Vec3::new(1.0, 1.0, 1.0)));
        assert_eq!(scene.lights.len(), 2);
        assert_eq!(scene.sun().map(|s| s.position.y), Some(2000.0));
    }
}
