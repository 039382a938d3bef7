//! Renderer for normal-mapped entities
//!
//! Same batching as the entity renderer, but the models carry a normal map
//! and a tangent attribute, and lighting happens in eye space.

use crate::render::api::{BackendResult, RenderBackend, RenderState, ShadowConfig};
use crate::render::renderers::{bind_shadow, ScenePass};
use crate::render::shaders::{normal_map, NormalMapShader, NORMAL_MAP_UNIT};
use crate::scene::{EntityBatch, Scene};

/// Position, texture coordinates, normal and tangent
const NORMAL_MAP_ATTRIBUTES: u32 = 4;

/// Draws batches of normal-mapped entities
#[derive(Debug)]
pub struct NormalMapRenderer {
    shader: NormalMapShader,
}

impl NormalMapRenderer {
    /// Load the shader and upload the constant shadow parameters
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B, shadows: &ShadowConfig) -> BackendResult<Self> {
        let shader = NormalMapShader::load(backend)?;
        {
            let mut bound = shader.program.bind(backend);
            normal_map::connect_texture_units(&mut bound, &shader);
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
        normal_map::load_clip_plane(&mut bound, shader, &pass.clip_plane);
        normal_map::load_sky_colour(&mut bound, shader, &pass.sky_colour);
        normal_map::load_view_and_lights(&mut bound, shader, &pass.view, pass.lights);
        normal_map::load_projection_matrix(&mut bound, shader, &pass.projection);
        bind_shadow(&mut bound, &shader.shadows, pass);

        let mut drawn = 0;
        for batch in batches {
            let Some(model) = scene.model(batch.model) else {
                continue;
            };
            let texture = &model.texture;

            bound.bind_mesh(model.mesh.handle, NORMAL_MAP_ATTRIBUTES);
            if texture.has_transparency {
                bound.disable(RenderState::CULL_BACK_FACES);
            }
            normal_map::load_model_texture(&mut bound, shader, texture);
            bound.bind_texture(0, texture.texture);
            match texture.normal_map {
                Some(map) => bound.bind_texture(NORMAL_MAP_UNIT, map),
                None => log::warn!("Model {:?} in the normal-mapped list has no normal map", batch.model),
            }

            for entity in batch.entities.iter().filter_map(|key| scene.entity(*key)) {
                normal_map::load_transformation_matrix(&mut bound, shader, &entity.transformation_matrix());
                normal_map::load_offset(&mut bound, shader, &entity.texture_offset(texture.number_of_rows));
                bound.draw_indexed(model.mesh.index_count);
                drawn += 1;
            }

            if texture.has_transparency {
                bound.enable(RenderState::CULL_BACK_FACES);
            }
            bound.unbind_mesh();
        }
        drawn
    }

    /// Release the shader
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.shader.program.destroy(backend);
    }
}
