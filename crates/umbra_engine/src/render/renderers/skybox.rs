//! Skybox renderer
//!
//! The cube follows the camera (the view translation is dropped) and turns
//! slowly around the world Y axis. The rotation advances once per frame, not
//! once per scene pass, so reflections and the main pass agree.

use crate::foundation::math::{utils, Mat4, Mat4Ext};
use crate::render::api::{BackendResult, RenderBackend, TextureHandle};
use crate::render::primitives::{GpuMesh, MeshData};
use crate::render::renderers::ScenePass;
use crate::render::shaders::{skybox, SkyboxShader};

/// Half the edge length of the skybox cube
const SKYBOX_SIZE: f32 = 500.0;

/// Draws the cube-mapped sky
#[derive(Debug)]
pub struct SkyboxRenderer {
    shader: SkyboxShader,
    cube: GpuMesh,
    rotation: f32,
    rotation_speed: f32,
}

impl SkyboxRenderer {
    /// Upload the cube and load the shader
    ///
    /// `rotation_speed` is in degrees per second.
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B, rotation_speed: f32) -> BackendResult<Self> {
        let data = MeshData::skybox(SKYBOX_SIZE);
        let cube = GpuMesh::new(backend.upload_mesh(&data)?, data.index_count());
        let shader = SkyboxShader::load(backend)?;
        {
            let mut bound = shader.program.bind(backend);
            skybox::connect_texture_units(&mut bound, &shader);
        }
        Ok(Self {
            shader,
            cube,
            rotation: 0.0,
            rotation_speed,
        })
    }

    /// Turn the sky by `delta` seconds worth of rotation
    pub fn advance(&mut self, delta: f32) {
        self.rotation = (self.rotation + self.rotation_speed * delta).rem_euclid(360.0);
    }

    /// Current rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// View matrix used for the sky: camera rotation only, then the sky's own turn
    pub fn sky_view_matrix(&self, view: &Mat4) -> Mat4 {
        view.without_translation() * Mat4::rotation_y(utils::deg_to_rad(self.rotation))
    }

    /// Draw the sky for one scene pass
    pub fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B, pass: &ScenePass<'_>, cube_map: TextureHandle) {
        let shader = &self.shader;
        let mut bound = shader.program.bind(backend);
        skybox::load_projection_matrix(&mut bound, shader, &pass.projection);
        skybox::load_view_matrix(&mut bound, shader, &self.sky_view_matrix(&pass.view));
        skybox::load_fog_colour(&mut bound, shader, &pass.sky_colour);

        bound.bind_mesh(self.cube.handle, 1);
        bound.bind_texture(0, cube_map);
        bound.draw_indexed(self.cube.index_count);
        bound.unbind_mesh();
    }

    /// Release the cube and its program
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.shader.program.destroy(backend);
        backend.destroy_mesh(self.cube.handle);
    }
}
