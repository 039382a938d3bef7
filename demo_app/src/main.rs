//! Free Roam Demo
//!
//! Builds a procedural landscape (terrain tiles, a lake, a scattered forest,
//! normal-mapped boulders, a campfire and a small HUD) and flies the camera
//! across it for a fixed number of frames. Rendering goes through the
//! recording backend, so the demo runs headless and reports what each frame
//! drew.
//!
//! Usage: `free_roam [path/to/engine.toml]`

use std::f32::consts::TAU;
use std::path::Path;

use log::{info, warn};
use rand::prelude::*;
use thiserror::Error;

use umbra_engine::foundation::logging;
use umbra_engine::prelude::*;
use umbra_engine::render::backends::RecordingBackend;
use umbra_engine::render::{GpuMesh, MeshData, MeshHandle};
use umbra_engine::scene::{GuiElement, Particle, ParticleTexture, TerrainTexturePack, TextMesh};

const DEFAULT_CONFIG_PATH: &str = "demo_app/config/engine.toml";
const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

const TERRAIN_SIZE: f32 = 800.0;
const TERRAIN_VERTEX_COUNT: u32 = 128;
const WATER_HEIGHT: f32 = -2.0;

const TREE_COUNT: usize = 120;
const FERN_COUNT: usize = 80;
const BOULDER_COUNT: usize = 12;

const FIRE_POSITION: [f32; 3] = [40.0, 0.0, -60.0];
const PARTICLES_PER_SECOND: f32 = 60.0;

const CAMERA_SPEED: f32 = 20.0;
const CAMERA_TURN_SPEED: f32 = 8.0;
const STATS_INTERVAL: u64 = 120;

/// Demo-level errors
#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Spawns flame particles at a fixed spot
struct Campfire {
    texture: ParticleTexture,
    position: Vec3,
    spawn_accumulator: f32,
}

impl Campfire {
    fn emit(&mut self, scene: &mut Scene, rng: &mut StdRng, delta_time: f32) {
        self.spawn_accumulator += PARTICLES_PER_SECOND * delta_time;
        while self.spawn_accumulator >= 1.0 {
            self.spawn_accumulator -= 1.0;
            let angle = rng.gen_range(0.0..TAU);
            let spread = rng.gen_range(0.0..1.5);
            let velocity = Vec3::new(angle.cos() * spread, rng.gen_range(6.0..10.0), angle.sin() * spread);
            scene.particles.push(Particle::new(
                self.texture,
                self.position,
                velocity,
                -0.1,
                rng.gen_range(1.2..2.0),
                rng.gen_range(0.0..360.0),
                rng.gen_range(1.0..2.5),
            ));
        }
    }
}

/// Free roam demo application
struct FreeRoamApp {
    rng: StdRng,
    campfire: Option<Campfire>,
    heading: f32,
}

impl FreeRoamApp {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            campfire: None,
            heading: 0.0,
        }
    }

    fn build_terrain(engine: &mut Engine<RecordingBackend>) -> Result<(), AppError> {
        let backend = engine.backend_mut();
        let data = MeshData::terrain_grid(TERRAIN_SIZE, TERRAIN_VERTEX_COUNT);
        let mesh = GpuMesh::new(upload(backend, &data)?, data.index_count());
        let textures = TerrainTexturePack {
            background: backend.register_texture("grassy"),
            r: backend.register_texture("mud"),
            g: backend.register_texture("grassFlowers"),
            b: backend.register_texture("path"),
        };
        let blend_map = backend.register_texture("blendMap");

        for grid_x in -1..1 {
            for grid_z in -1..1 {
                engine
                    .scene
                    .terrains
                    .push(Terrain::new(grid_x, grid_z, mesh, textures, blend_map).with_max_height(40.0));
            }
        }
        engine.scene.water.push(WaterTile::new(-120.0, -120.0, WATER_HEIGHT));
        engine.scene.water.push(WaterTile::new(-240.0, -120.0, WATER_HEIGHT));
        Ok(())
    }

    fn build_forest(&mut self, engine: &mut Engine<RecordingBackend>) -> Result<(), AppError> {
        let backend = engine.backend_mut();
        let cube = MeshData::cube();
        let tree_mesh = GpuMesh::new(upload(backend, &cube)?, cube.index_count());
        let tree_texture = ModelTexture::new(backend.register_texture("pine")).with_specular(10.0, 0.1);
        let fern_texture = ModelTexture::new(backend.register_texture("fern"))
            .with_atlas_rows(2)
            .with_transparency(true)
            .with_fake_lighting(true);
        let boulder_texture = ModelTexture::new(backend.register_texture("boulder"))
            .with_normal_map(backend.register_texture("boulderNormal"))
            .with_specular(10.0, 0.5);

        let radius = cube.bounding_radius();
        let tree = engine.scene.add_model(TexturedModel::new(tree_mesh, tree_texture, radius));
        let fern = engine.scene.add_model(TexturedModel::new(tree_mesh, fern_texture, radius));
        let boulder = engine.scene.add_model(TexturedModel::new(tree_mesh, boulder_texture, radius));

        let half = TERRAIN_SIZE;
        for _ in 0..TREE_COUNT {
            let position = self.random_ground_point(half);
            let entity = Entity::new(tree, position)
                .with_rotation(0.0, self.rng.gen_range(0.0..360.0), 0.0)
                .with_scale(self.rng.gen_range(3.0..6.0));
            engine.scene.add_entity(entity);
        }
        for _ in 0..FERN_COUNT {
            let position = self.random_ground_point(half);
            let entity = Entity::new(fern, position)
                .with_texture_index(self.rng.gen_range(0..4))
                .with_scale(0.9);
            engine.scene.add_entity(entity);
        }
        for _ in 0..BOULDER_COUNT {
            let position = self.random_ground_point(half);
            let entity = Entity::new(boulder, position)
                .with_rotation(self.rng.gen_range(0.0..30.0), self.rng.gen_range(0.0..360.0), 0.0)
                .with_scale(self.rng.gen_range(1.0..2.5));
            engine.scene.add_entity(entity);
        }
        Ok(())
    }

    fn build_hud(engine: &mut Engine<RecordingBackend>) -> Result<(), AppError> {
        let backend = engine.backend_mut();
        let health = backend.register_texture("health");
        let font_atlas = backend.register_texture("candara");
        let title = MeshData::quad();
        let title_mesh = GpuMesh::new(upload(backend, &title)?, title.index_count());

        engine
            .scene
            .gui
            .push(GuiElement::new(health, Vec2::new(-0.75, 0.9), Vec2::new(0.2, 0.05)));
        engine.scene.texts.push(
            TextMesh::new(title_mesh, font_atlas, Vec2::new(0.0, 0.0), Vec3::new(1.0, 0.9, 0.6)).with_outline(
                Vec3::new(0.1, 0.1, 0.1),
                0.4,
                0.5,
            ),
        );
        Ok(())
    }

    fn random_ground_point(&mut self, half_extent: f32) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(-half_extent..half_extent),
            0.0,
            self.rng.gen_range(-half_extent..half_extent),
        )
    }
}

impl Application<RecordingBackend> for FreeRoamApp {
    fn initialize(&mut self, engine: &mut Engine<RecordingBackend>) -> Result<(), AppError> {
        info!("Building free roam scene");

        engine.scene.set_sun(Light::new(
            Vec3::new(1_000_000.0, 1_500_000.0, -1_000_000.0),
            Vec3::new(1.3, 1.3, 1.3),
        ));
        engine.scene.add_light(
            Light::new(Vec3::from(FIRE_POSITION) + Vec3::new(0.0, 4.0, 0.0), Vec3::new(2.0, 0.8, 0.2))
                .with_attenuation(Vec3::new(1.0, 0.01, 0.002)),
        );

        Self::build_terrain(engine)?;
        self.build_forest(engine)?;
        Self::build_hud(engine)?;

        let flame = engine.backend_mut().register_texture("fire");
        self.campfire = Some(Campfire {
            texture: ParticleTexture::new(flame, 8).additive(),
            position: Vec3::from(FIRE_POSITION),
            spawn_accumulator: 0.0,
        });

        info!(
            "Scene ready: {} entities, {} terrain tiles, {} water tiles",
            engine.scene.entity_count(),
            engine.scene.terrains.len(),
            engine.scene.water.len()
        );
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine<RecordingBackend>, delta_time: f32) -> Result<(), AppError> {
        self.heading = (self.heading + CAMERA_TURN_SPEED * delta_time).rem_euclid(360.0);
        engine.camera.yaw = self.heading;
        engine.camera.move_relative(CAMERA_SPEED * delta_time, 0.0, 0.0);

        if let Some(campfire) = self.campfire.as_mut() {
            campfire.emit(&mut engine.scene, &mut self.rng, delta_time);
        }

        let frame = engine.frames_rendered();
        if frame > 0 && frame % STATS_INTERVAL == 0 {
            let stats = engine.last_stats();
            info!(
                "frame {frame}: {} entities, {} terrains, {} water, {} particles, {} casters, {} passes",
                stats.visible_entities,
                stats.visible_terrains,
                stats.visible_water_tiles,
                stats.visible_particles,
                stats.shadow_casters,
                stats.scene_passes
            );
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine<RecordingBackend>) {
        info!(
            "Free roam finished after {} frames ({} particles alive)",
            engine.frames_rendered(),
            engine.scene.particles.len()
        );
        self.campfire = None;
    }
}

fn upload(backend: &mut RecordingBackend, data: &MeshData) -> Result<MeshHandle, AppError> {
    backend
        .upload_mesh(data)
        .map_err(|e| AppError::Asset(format!("failed to upload mesh '{}': {e}", data.name)))
}

fn load_config() -> EngineConfig {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        warn!("No config at {path}, using defaults");
        return EngineConfig {
            max_frames: Some(600),
            ..EngineConfig::default()
        };
    }
    match EngineConfig::load_from_file(&path) {
        Ok(config) => {
            info!("Loaded config from {path}");
            config
        }
        Err(e) => {
            warn!("Failed to load {path}: {e}, using defaults");
            EngineConfig::default()
        }
    }
}

fn main() -> Result<(), DemoError> {
    logging::init_with_default_filter("info");

    let config = load_config();
    let mut backend = RecordingBackend::new(WINDOW_WIDTH, WINDOW_HEIGHT);
    let textures = SceneTextures {
        skybox: backend.register_texture("skybox"),
        water_dudv: backend.register_texture("waterDUDV"),
        water_normal: backend.register_texture("matchingNormalMap"),
    };

    let mut engine = Engine::new(backend, config, textures)?;
    let mut app = FreeRoamApp::new(0x5eed);
    engine.run(&mut app)?;

    let backend = engine.into_backend();
    info!(
        "Recorded {} commands, {} programs and {} framebuffers still live",
        backend.commands().len(),
        backend.live_programs(),
        backend.live_framebuffers()
    );
    Ok(())
}
