//! Frame orchestration
//!
//! [`MasterRenderer`] owns one renderer per pass plus the shadow and water
//! render targets, and runs them in a fixed order every frame:
//!
//! 1. cull the scene against the camera frustum
//! 2. shadow pass (if the scene has a sun) into the shadow map
//! 3. water reflection into its target, from the camera mirrored about the
//!    water plane, clipping everything below the surface
//! 4. water refraction into its target, clipping everything above it
//! 5. main scene pass into the window
//! 6. water surface, sampling both targets
//! 7. particles
//! 8. GUI and text
//!
//! Steps 3 and 4 only run when a water tile is visible. The shadow map is
//! sampled by every scene pass, so it is always complete before step 3.

use crate::foundation::math::Vec4;
use crate::render::api::{
    BackendResult, ClearFlags, FrameStats, RenderBackend, RenderFrameData, RenderState, RendererConfig, TextureHandle,
};
use crate::render::renderers::{
    EntityRenderer, NormalMapRenderer, OverlayRenderer, ParticleRenderer, ScenePass, ShadowInput, SkyboxRenderer,
    TerrainRenderer, WaterFrameBuffers, WaterRenderer,
};
use crate::render::RenderResult;
use crate::scene::{Frustum, Scene, VisibleSet};
use crate::shadows::ShadowMapRenderer;

/// Textures the renderers sample that are not owned by any scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTextures {
    /// Cube map of the sky
    pub skybox: TextureHandle,
    /// Distortion map of the water surface
    pub water_dudv: TextureHandle,
    /// Normal map of the water surface
    pub water_normal: TextureHandle,
}

/// Runs every pass of a frame in order
#[derive(Debug)]
pub struct MasterRenderer {
    config: RendererConfig,
    textures: SceneTextures,
    shadow_renderer: ShadowMapRenderer,
    entity_renderer: EntityRenderer,
    normal_map_renderer: NormalMapRenderer,
    terrain_renderer: TerrainRenderer,
    skybox_renderer: SkyboxRenderer,
    water_renderer: WaterRenderer,
    water_buffers: WaterFrameBuffers,
    particle_renderer: ParticleRenderer,
    overlay_renderer: OverlayRenderer,
}

impl MasterRenderer {
    /// Validate `config` and create every renderer and render target
    pub fn new<B: RenderBackend + ?Sized>(
        backend: &mut B,
        config: RendererConfig,
        textures: SceneTextures,
    ) -> RenderResult<Self> {
        config.validate()?;
        let renderer = Self::create(backend, config, textures).map_err(|e| {
            log::error!("Failed to create renderer: {}", e);
            e
        })?;
        log::info!(
            "Renderer ready: shadow map {0}x{0}, shadow distance {1}",
            renderer.config.shadows.map_size,
            renderer.config.shadows.shadow_distance
        );
        Ok(renderer)
    }

    fn create<B: RenderBackend + ?Sized>(
        backend: &mut B,
        config: RendererConfig,
        textures: SceneTextures,
    ) -> BackendResult<Self> {
        Ok(Self {
            shadow_renderer: ShadowMapRenderer::new(backend, &config.shadows)?,
            entity_renderer: EntityRenderer::new(backend, &config.shadows)?,
            normal_map_renderer: NormalMapRenderer::new(backend, &config.shadows)?,
            terrain_renderer: TerrainRenderer::new(backend, &config.shadows)?,
            skybox_renderer: SkyboxRenderer::new(backend, config.skybox_rotation_speed)?,
            water_renderer: WaterRenderer::new(backend, &config.water, textures.water_dudv, textures.water_normal)?,
            water_buffers: WaterFrameBuffers::new(backend, &config.water)?,
            particle_renderer: ParticleRenderer::new(backend)?,
            overlay_renderer: OverlayRenderer::new(backend)?,
            config,
            textures,
        })
    }

    /// Configuration the renderer was built with
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The shadow pass, for inspecting the last shadow box
    pub fn shadow_renderer(&self) -> &ShadowMapRenderer {
        &self.shadow_renderer
    }

    /// Render one frame
    pub fn render_frame<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, frame: &RenderFrameData<'_>) -> FrameStats {
        let camera = frame.camera;
        let scene = frame.scene;
        self.skybox_renderer.advance(frame.delta_time);
        self.water_renderer.advance(frame.delta_time);

        let orientation = camera.orientation();
        let visible = scene.cull(&Frustum::new(&orientation, camera.far));
        let mut stats = FrameStats {
            visible_entities: visible.entity_count(),
            visible_terrains: visible.terrains.len(),
            visible_water_tiles: visible.water.len(),
            visible_particles: visible.particles.len(),
            ..FrameStats::default()
        };

        let shadow_frame = scene
            .sun()
            .map(|sun| self.shadow_renderer.render(backend, &orientation, sun, scene, &visible));
        if shadow_frame.is_some() {
            stats.shadow_casters = self.shadow_renderer.caster_count();
        }
        let shadow = shadow_frame.as_ref().map(|frame| ShadowInput {
            frame,
            map: self.shadow_renderer.shadow_map(),
        });

        let sky_colour = self.config.sky_colour;
        if let Some(height) = visible.water.first().map(|&i| scene.water[i].height) {
            let epsilon = self.config.water.clip_epsilon;
            backend.enable(RenderState::CLIP_DISTANCE0);

            let mirrored = camera.mirrored_about(height);
            let reflected = scene.cull(&Frustum::new(&mirrored.orientation(), mirrored.far));
            self.water_buffers.bind_reflection(backend);
            let reflection = ScenePass::new(&mirrored, &scene.lights, sky_colour)
                .with_clip_plane(Vec4::new(0.0, 1.0, 0.0, -height + epsilon))
                .with_shadow(shadow);
            self.render_scene(backend, &reflection, scene, &reflected);

            self.water_buffers.bind_refraction(backend);
            let refraction = ScenePass::new(camera, &scene.lights, sky_colour)
                .with_clip_plane(Vec4::new(0.0, -1.0, 0.0, height + epsilon))
                .with_shadow(shadow);
            self.render_scene(backend, &refraction, scene, &visible);

            self.water_buffers.unbind(backend);
            backend.disable(RenderState::CLIP_DISTANCE0);
            stats.scene_passes += 2;
        }

        let main = ScenePass::new(camera, &scene.lights, sky_colour).with_shadow(shadow);
        self.render_scene(backend, &main, scene, &visible);
        stats.scene_passes += 1;

        self.water_renderer
            .render(backend, &main, &scene.water, &visible.water, &self.water_buffers, scene.sun());
        self.particle_renderer
            .render(backend, &main.view, &main.projection, &scene.particles, &visible.particles);
        self.overlay_renderer.render(backend, &scene.gui, &scene.texts);

        log::trace!("Frame rendered: {:?}", stats);
        stats
    }

    fn render_scene<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        pass: &ScenePass<'_>,
        scene: &Scene,
        visible: &VisibleSet,
    ) {
        backend.enable(RenderState::DEPTH_TEST | RenderState::DEPTH_WRITE | RenderState::CULL_BACK_FACES);
        let sky = pass.sky_colour;
        backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH, Vec4::new(sky.x, sky.y, sky.z, 1.0));

        self.entity_renderer.render(backend, pass, scene, &visible.entities);
        self.normal_map_renderer.render(backend, pass, scene, &visible.normal_mapped);
        self.terrain_renderer.render(backend, pass, &scene.terrains, &visible.terrains);
        self.skybox_renderer.render(backend, pass, self.textures.skybox);
    }

    /// Release every program and render target
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.shadow_renderer.cleanup(backend);
        self.entity_renderer.cleanup(backend);
        self.normal_map_renderer.cleanup(backend);
        self.terrain_renderer.cleanup(backend);
        self.skybox_renderer.cleanup(backend);
        self.water_renderer.cleanup(backend);
        self.water_buffers.cleanup(backend);
        self.particle_renderer.cleanup(backend);
        self.overlay_renderer.cleanup(backend);
        log::info!("Renderer resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::foundation::math::{Vec2, Vec3};
    use crate::render::api::{ProgramHandle, ShadowConfig};
    use crate::render::backends::{RecordingBackend, RenderCommand};
    use crate::render::primitives::{Camera, GpuMesh, MeshData};
    use crate::render::RenderError;
    use crate::scene::{
        Entity, GuiElement, Light, ModelTexture, Particle, ParticleTexture, Terrain, TerrainTexturePack,
        TexturedModel, WaterTile,
    };

    fn textures(backend: &mut RecordingBackend) -> SceneTextures {
        SceneTextures {
            skybox: backend.register_texture("sky"),
            water_dudv: backend.register_texture("waterDUDV"),
            water_normal: backend.register_texture("waterNormal"),
        }
    }

    fn config() -> RendererConfig {
        RendererConfig::default().with_shadows(ShadowConfig::default().with_map_size(1024))
    }

    fn full_scene(backend: &mut RecordingBackend, with_water: bool) -> Scene {
        let mut scene = Scene::new();
        let cube = backend.upload_mesh(&MeshData::cube()).expect("cube");
        let texture = backend.register_texture("crate");
        let normal_map = backend.register_texture("crateNormal");

        let plain = scene.add_model(TexturedModel::new(GpuMesh::new(cube, 36), ModelTexture::new(texture), 1.8));
        let mapped = scene.add_model(TexturedModel::new(
            GpuMesh::new(cube, 36),
            ModelTexture::new(texture).with_normal_map(normal_map),
            1.8,
        ));
        scene.add_entity(Entity::new(plain, Vec3::new(0.0, 2.0, -20.0)));
        scene.add_entity(Entity::new(plain, Vec3::new(4.0, 2.0, -25.0)));
        scene.add_entity(Entity::new(mapped, Vec3::new(-4.0, 2.0, -25.0)));

        let grid = MeshData::terrain_grid(Terrain::SIZE, 16);
        let grid_mesh = GpuMesh::new(backend.upload_mesh(&grid).expect("grid"), grid.index_count());
        let pack = TerrainTexturePack {
            background: backend.register_texture("grass"),
            r: backend.register_texture("mud"),
            g: backend.register_texture("flowers"),
            b: backend.register_texture("path"),
        };
        let blend_map = backend.register_texture("blendMap");
        scene.terrains.push(Terrain::new(0, -1, grid_mesh, pack, blend_map));

        if with_water {
            scene.water.push(WaterTile::new(0.0, -40.0, -1.0));
        }

        let fire = ParticleTexture::new(backend.register_texture("fire"), 8).additive();
        scene
            .particles
            .push(Particle::new(fire, Vec3::new(0.0, 4.0, -15.0), Vec3::zeros(), 0.0, 5.0, 0.0, 1.0));
        scene.gui.push(GuiElement::new(
            backend.register_texture("health"),
            Vec2::new(-0.7, 0.8),
            Vec2::new(0.2, 0.1),
        ));

        scene.set_sun(Light::new(Vec3::new(1000.0, 10_000.0, -7000.0), Vec3::new(1.0, 1.0, 1.0)));
        scene
    }

    fn camera() -> Camera {
        Camera::perspective(Vec3::new(0.0, 5.0, 0.0), 70.0, 16.0 / 9.0, 0.1, 1000.0).with_rotation(10.0, 0.0)
    }

    fn render_once(with_water: bool) -> (RecordingBackend, MasterRenderer, FrameStats) {
        let mut backend = RecordingBackend::new(1280, 720);
        let textures = textures(&mut backend);
        let scene = full_scene(&mut backend, with_water);
        let mut renderer = MasterRenderer::new(&mut backend, config(), textures).expect("renderer");
        let camera = camera();

        backend.take_commands();
        let frame = RenderFrameData {
            camera: &camera,
            scene: &scene,
            delta_time: 1.0 / 60.0,
        };
        let stats = renderer.render_frame(&mut backend, &frame);
        (backend, renderer, stats)
    }

    fn draw_positions(backend: &RecordingBackend, program: Option<ProgramHandle>) -> Vec<usize> {
        backend
            .commands()
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, RenderCommand::Draw { program: p, .. } if *p == program))
            .map(|(i, _)| i)
            .collect()
    }

    fn framebuffer_draws(backend: &RecordingBackend, framebuffer: Option<crate::render::api::FramebufferHandle>) -> Vec<usize> {
        backend
            .commands()
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, RenderCommand::Draw { framebuffer: f, .. } if *f == framebuffer))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_shadow_pass_completes_before_any_sampling_pass() {
        let (backend, _, stats) = render_once(true);
        let shadow_draws = draw_positions(&backend, backend.program_named("shadow"));
        assert_eq!(shadow_draws.len(), stats.shadow_casters);
        assert!(!shadow_draws.is_empty());

        let last_shadow = *shadow_draws.last().expect("shadow draw");
        for name in ["entity", "normal_map", "terrain", "skybox", "water", "particle", "gui"] {
            let draws = draw_positions(&backend, backend.program_named(name));
            assert!(!draws.is_empty(), "no {name} draws");
            assert!(draws.iter().all(|&i| i > last_shadow), "{name} drew before the shadow map was complete");
        }
    }

    #[test]
    fn test_water_targets_complete_before_water_surface() {
        let (backend, renderer, stats) = render_once(true);
        assert_eq!(stats.scene_passes, 3);

        let reflection = framebuffer_draws(&backend, Some(renderer.water_buffers.reflection_framebuffer()));
        let refraction = framebuffer_draws(&backend, Some(renderer.water_buffers.refraction_framebuffer()));
        let water = draw_positions(&backend, backend.program_named("water"));
        assert!(!reflection.is_empty());
        assert!(!refraction.is_empty());
        assert_eq!(water.len(), 1);

        let last_reflection = *reflection.last().expect("reflection draw");
        let first_refraction = refraction[0];
        assert!(last_reflection < first_refraction);
        assert!(*refraction.last().expect("refraction draw") < water[0]);

        let clip_off = backend
            .position_of(|c| *c == RenderCommand::Disable(RenderState::CLIP_DISTANCE0))
            .expect("clip distance disabled");
        let window_draws = framebuffer_draws(&backend, None);
        assert!(window_draws.iter().all(|&i| i > clip_off));
    }

    #[test]
    fn test_reflection_clips_below_water_surface() {
        let (backend, _, _) = render_once(true);
        let planes: Vec<Vec4> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Uniform {
                    name,
                    value: crate::render::api::UniformValue::Vec4(plane),
                    ..
                } if name == "plane" => Some(*plane),
                _ => None,
            })
            .collect();
        // Water at y = -1 with the default clip epsilon of 1
        assert!(planes.contains(&Vec4::new(0.0, 1.0, 0.0, 2.0)));
        assert!(planes.contains(&Vec4::new(0.0, -1.0, 0.0, 0.0)));
        assert!(planes.contains(&crate::render::renderers::no_clip_plane()));
    }

    #[test]
    fn test_overlay_is_drawn_last() {
        let (backend, _, _) = render_once(true);
        let gui = backend.program_named("gui");
        let last_draw = backend
            .last_position_of(|c| matches!(c, RenderCommand::Draw { .. }))
            .expect("draws");
        let gui_draws = draw_positions(&backend, gui);
        assert_eq!(gui_draws.last(), Some(&last_draw));
        let particle = draw_positions(&backend, backend.program_named("particle"));
        assert!(particle.iter().all(|&i| i < gui_draws[0]));
    }

    #[test]
    fn test_stats_and_no_water_skips_extra_passes() {
        let (backend, _, stats) = render_once(false);
        assert_eq!(stats.visible_entities, 3);
        assert_eq!(stats.visible_terrains, 1);
        assert_eq!(stats.visible_water_tiles, 0);
        assert_eq!(stats.visible_particles, 1);
        assert_eq!(stats.scene_passes, 1);
        assert!(backend
            .position_of(|c| *c == RenderCommand::Enable(RenderState::CLIP_DISTANCE0))
            .is_none());
        assert!(draw_positions(&backend, backend.program_named("water")).is_empty());
    }

    #[test]
    fn test_scene_without_sun_skips_shadow_pass() {
        let mut backend = RecordingBackend::new(1280, 720);
        let textures = textures(&mut backend);
        let mut scene = full_scene(&mut backend, false);
        scene.lights.clear();
        let mut renderer = MasterRenderer::new(&mut backend, config(), textures).expect("renderer");
        let camera = camera();

        backend.take_commands();
        let stats = renderer.render_frame(
            &mut backend,
            &RenderFrameData {
                camera: &camera,
                scene: &scene,
                delta_time: 0.0,
            },
        );
        assert_eq!(stats.shadow_casters, 0);
        assert!(draw_positions(&backend, backend.program_named("shadow")).is_empty());
        assert!(!draw_positions(&backend, backend.program_named("entity")).is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected_before_allocation() {
        let mut backend = RecordingBackend::new(1280, 720);
        let textures = textures(&mut backend);
        let bad = RendererConfig::default().with_shadows(ShadowConfig::default().with_map_size(0));
        let result = MasterRenderer::new(&mut backend, bad, textures);
        assert!(matches!(
            result,
            Err(RenderError::InvalidConfig(ConfigError::InvalidValue { field: "shadows.map_size", .. }))
        ));
        assert_eq!(backend.live_programs(), 0);
        assert_eq!(backend.live_framebuffers(), 0);
    }

    #[test]
    fn test_cleanup_releases_everything() {
        let (mut backend, renderer, _) = render_once(true);
        assert_eq!(backend.live_framebuffers(), 3);
        // scene cube and terrain grid, plus skybox, water, particle and GUI quads
        assert_eq!(backend.live_meshes(), 6);
        renderer.cleanup(&mut backend);
        assert_eq!(backend.live_programs(), 0);
        assert_eq!(backend.live_framebuffers(), 0);
        // only the meshes the scene uploaded itself remain
        assert_eq!(backend.live_meshes(), 2);
    }
}
