//! Cube-map skybox shader

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{BackendResult, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink};
use crate::render::shaders::ShaderProgram;

/// Skybox program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyboxShader {
    /// Linked program
    pub program: ShaderProgram,
    projection_matrix: UniformLocation,
    view_matrix: UniformLocation,
    fog_colour: UniformLocation,
    cube_map: UniformLocation,
}

impl SkyboxShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new(
            "skybox",
            "resources/shaders/skybox.vert",
            "resources/shaders/skybox.frag",
        )
        .with_attribute("position")
    }

    /// Compile the program and resolve its uniforms
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let program = ShaderProgram::load(backend, &Self::descriptor())?;
        Ok(Self {
            projection_matrix: program.uniform(backend, "projectionMatrix")?,
            view_matrix: program.uniform(backend, "viewMatrix")?,
            fog_colour: program.uniform(backend, "fogColour")?,
            cube_map: program.uniform(backend, "cubeMap")?,
            program,
        })
    }
}

/// Sample the cube map from unit 0
pub fn connect_texture_units(sink: &mut impl UniformSink, shader: &SkyboxShader) {
    sink.set_int(shader.cube_map, 0);
}

/// Upload the camera projection
pub fn load_projection_matrix(sink: &mut impl UniformSink, shader: &SkyboxShader, projection: &Mat4) {
    sink.set_matrix(shader.projection_matrix, projection);
}

/// Upload the skybox view (camera rotation plus the sky's own spin, no translation)
pub fn load_view_matrix(sink: &mut impl UniformSink, shader: &SkyboxShader, view: &Mat4) {
    sink.set_matrix(shader.view_matrix, view);
}

/// Upload the colour the horizon fades into
pub fn load_fog_colour(sink: &mut impl UniformSink, shader: &SkyboxShader, colour: &Vec3) {
    sink.set_vec3(shader.fog_colour, colour);
}
