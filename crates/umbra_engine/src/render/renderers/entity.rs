//! Renderer for plain textured entities

use crate::render::api::{BackendResult, RenderBackend, RenderState, ShadowConfig};
use crate::render::renderers::{bind_shadow, ScenePass};
use crate::render::shaders::{entity, BoundProgram, EntityShader};
use crate::scene::{EntityBatch, Scene, TexturedModel};

/// Position, texture coordinates and normal
const ENTITY_ATTRIBUTES: u32 = 3;

/// Draws batches of entities that have no normal map
#[derive(Debug)]
pub struct EntityRenderer {
    shader: EntityShader,
}

impl EntityRenderer {
    /// Load the entity shader and upload the constant shadow parameters
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B, shadows: &ShadowConfig) -> BackendResult<Self> {
        let shader = EntityShader::load(backend)?;
        {
            let mut bound = shader.program.bind(backend);
            entity::connect_texture_units(&mut bound, &shader);
            shader.shadows.load_config(&mut bound, shadows);
        }
        Ok(Self { shader })
    }

    /// Draw `batches` for one scene pass, returning the number of entities drawn
    pub fn render<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        pass: &ScenePass<'_>,
        scene: &Scene,
        batches: &[EntityBatch],
    ) -> usize {
        if batches.is_empty() {
            return 0;
        }

        let shader = &self.shader;
        let mut bound = shader.program.bind(backend);
        entity::load_clip_plane(&mut bound, shader, &pass.clip_plane);
        entity::load_sky_colour(&mut bound, shader, &pass.sky_colour);
        entity::load_lights(&mut bound, shader, pass.lights);
        entity::load_view_matrix(&mut bound, shader, &pass.view);
        entity::load_projection_matrix(&mut bound, shader, &pass.projection);
        bind_shadow(&mut bound, &shader.shadows, pass);

        let mut drawn = 0;
        for batch in batches {
            let Some(model) = scene.model(batch.model) else {
                log::warn!("Skipping batch of unknown model {:?}", batch.model);
                continue;
            };
            prepare_model(&mut bound, shader, model);
            for entity in batch.entities.iter().filter_map(|key| scene.entity(*key)) {
                entity::load_transformation_matrix(&mut bound, shader, &entity.transformation_matrix());
                entity::load_offset(&mut bound, shader, &entity.texture_offset(model.texture.number_of_rows));
                bound.draw_indexed(model.mesh.index_count);
                drawn += 1;
            }
            unbind_model(&mut bound, model);
        }
        drawn
    }

    /// Release the shader
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.shader.program.destroy(backend);
    }
}

fn prepare_model<B: RenderBackend + ?Sized>(bound: &mut BoundProgram<'_, B>, shader: &EntityShader, model: &TexturedModel) {
    bound.bind_mesh(model.mesh.handle, ENTITY_ATTRIBUTES);
    if model.texture.has_transparency {
        bound.disable(RenderState::CULL_BACK_FACES);
    }
    entity::load_model_texture(bound, shader, &model.texture);
    bound.bind_texture(0, model.texture.texture);
}

fn unbind_model<B: RenderBackend + ?Sized>(bound: &mut BoundProgram<'_, B>, model: &TexturedModel) {
    if model.texture.has_transparency {
        bound.enable(RenderState::CULL_BACK_FACES);
    }
    bound.unbind_mesh();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec3, Vec4};
    use crate::render::api::{TextureHandle, UniformValue};
    use crate::render::backends::{RecordingBackend, RenderCommand};
    use crate::render::primitives::{Camera, GpuMesh, MeshData};
    use crate::scene::{Entity, Frustum, Light, ModelTexture};

    #[test]
    fn test_atlas_offset_and_fake_lighting_are_uploaded() {
        let mut backend = RecordingBackend::new(800, 600);
        let mesh = backend.upload_mesh(&MeshData::cube()).expect("mesh");
        let mut scene = Scene::new();
        let fern = ModelTexture::new(TextureHandle(77))
            .with_atlas_rows(2)
            .with_fake_lighting(true)
            .with_transparency(true);
        let model = scene.add_model(TexturedModel::new(GpuMesh::new(mesh, 36), fern, 1.0));
        scene.add_entity(Entity::new(model, Vec3::new(0.0, 0.0, -20.0)).with_texture_index(3));
        scene.set_sun(Light::new(Vec3::new(0.0, 100.0, 0.0), Vec3::new(1.0, 1.0, 1.0)));

        let renderer = EntityRenderer::new(&mut backend, &ShadowConfig::default()).expect("renderer");
        let camera = Camera::perspective(Vec3::zeros(), 70.0, 4.0 / 3.0, 0.1, 500.0);
        let visible = scene.cull(&Frustum::new(&camera.orientation(), 500.0));
        let pass = ScenePass::new(&camera, &scene.lights, Vec3::new(0.5, 0.6, 0.7))
            .with_clip_plane(Vec4::new(0.0, 1.0, 0.0, 2.0));

        backend.take_commands();
        assert_eq!(renderer.render(&mut backend, &pass, &scene, &visible.entities), 1);

        let commands = backend.commands();
        assert!(commands.contains(&RenderCommand::Uniform {
            program: backend.program_named("entity"),
            name: "offset".to_string(),
            value: UniformValue::Vec2(crate::foundation::math::Vec2::new(0.5, 0.5)),
        }));
        assert!(commands.contains(&RenderCommand::Uniform {
            program: backend.program_named("entity"),
            name: "useFakeLighting".to_string(),
            value: UniformValue::Int(1),
        }));
        assert!(commands.contains(&RenderCommand::Disable(RenderState::CULL_BACK_FACES)));
        assert_eq!(commands.last(), Some(&RenderCommand::UnbindProgram));
    }

    #[test]
    fn test_unused_light_slots_are_filled() {
        let mut backend = RecordingBackend::new(800, 600);
        let mesh = backend.upload_mesh(&MeshData::cube()).expect("mesh");
        let mut scene = Scene::new();
        let model = scene.add_model(TexturedModel::new(GpuMesh::new(mesh, 36), ModelTexture::new(TextureHandle(5)), 1.0));
        scene.add_entity(Entity::new(model, Vec3::new(0.0, 0.0, -20.0)));
        scene.set_sun(Light::new(Vec3::new(0.0, 100.0, 0.0), Vec3::new(1.0, 1.0, 1.0)));

        let renderer = EntityRenderer::new(&mut backend, &ShadowConfig::default()).expect("renderer");
        let camera = Camera::default();
        let visible = scene.cull(&Frustum::new(&camera.orientation(), camera.far));
        renderer.render(&mut backend, &ScenePass::new(&camera, &scene.lights, Vec3::zeros()), &scene, &visible.entities);

        let colours: Vec<&RenderCommand> = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::Uniform { name, .. } if name.starts_with("lightColour")))
            .collect();
        assert_eq!(colours.len(), 4);
    }

    #[test]
    fn test_empty_batches_bind_nothing() {
        let mut backend = RecordingBackend::new(800, 600);
        let renderer = EntityRenderer::new(&mut backend, &ShadowConfig::default()).expect("renderer");
        let scene = Scene::new();
        let camera = Camera::default();
        backend.take_commands();
        assert_eq!(renderer.render(&mut backend, &ScenePass::new(&camera, &[], Vec3::zeros()), &scene, &[]), 0);
        assert!(backend.commands().is_empty());
    }
}
