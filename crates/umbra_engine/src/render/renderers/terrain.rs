//! Renderer for terrain tiles

use crate::render::api::{BackendResult, RenderBackend, ShadowConfig};
use crate::render::renderers::{bind_shadow, ScenePass};
use crate::render::shaders::{terrain, TerrainShader, TERRAIN_TEXTURE_UNITS};
use crate::scene::Terrain;

/// Position, texture coordinates and normal
const TERRAIN_ATTRIBUTES: u32 = 3;

/// Terrain is matte
const SHINE_DAMPER: f32 = 1.0;
const REFLECTIVITY: f32 = 0.0;

/// Draws the visible terrain tiles
#[derive(Debug)]
pub struct TerrainRenderer {
    shader: TerrainShader,
}

impl TerrainRenderer {
    /// Load the terrain shader and upload the constant shadow parameters
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B, shadows: &ShadowConfig) -> BackendResult<Self> {
        let shader = TerrainShader::load(backend)?;
        {
            let mut bound = shader.program.bind(backend);
            terrain::connect_texture_units(&mut bound, &shader);
            shader.shadows.load_config(&mut bound, shadows);
        }
        Ok(Self { shader })
    }

    /// Draw the tiles at `visible` (indices into `terrains`), returning how many were drawn
    pub fn render<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        pass: &ScenePass<'_>,
        terrains: &[Terrain],
        visible: &[usize],
    ) -> usize {
        if visible.is_empty() {
            return 0;
        }

        let shader = &self.shader;
        let mut bound = shader.program.bind(backend);
        terrain::load_clip_plane(&mut bound, shader, &pass.clip_plane);
        terrain::load_sky_colour(&mut bound, shader, &pass.sky_colour);
        terrain::load_lights(&mut bound, shader, pass.lights);
        terrain::load_view_matrix(&mut bound, shader, &pass.view);
        terrain::load_projection_matrix(&mut bound, shader, &pass.projection);
        terrain::load_shine_variables(&mut bound, shader, SHINE_DAMPER, REFLECTIVITY);
        bind_shadow(&mut bound, &shader.shadows, pass);

        let mut drawn = 0;
        for tile in visible.iter().filter_map(|&i| terrains.get(i)) {
            bound.bind_mesh(tile.mesh.handle, TERRAIN_ATTRIBUTES);
            let textures = [
                tile.textures.background,
                tile.textures.r,
                tile.textures.g,
                tile.textures.b,
                tile.blend_map,
            ];
            for (unit, texture) in TERRAIN_TEXTURE_UNITS.iter().zip(textures) {
                bound.bind_texture(*unit, texture);
            }
            terrain::load_transformation_matrix(&mut bound, shader, &tile.transformation_matrix());
            bound.draw_indexed(tile.mesh.index_count);
            bound.unbind_mesh();
            drawn += 1;
        }
        drawn
    }

    /// Release the shader
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.shader.program.destroy(backend);
    }
}
