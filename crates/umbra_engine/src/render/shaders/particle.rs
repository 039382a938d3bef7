//! Billboarded particle shader

use crate::foundation::math::{Mat4, Vec2};
use crate::render::api::{BackendResult, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink};
use crate::render::shaders::ShaderProgram;

/// Particle program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleShader {
    /// Linked program
    pub program: ShaderProgram,
    model_view_matrix: UniformLocation,
    projection_matrix: UniformLocation,
    tex_offset1: UniformLocation,
    tex_offset2: UniformLocation,
    tex_coord_info: UniformLocation,
    particle_texture: UniformLocation,
}

impl ParticleShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new(
            "particle",
            "resources/shaders/particle.vert",
            "resources/shaders/particle.frag",
        )
        .with_attribute("position")
    }

    /// Compile the program and resolve its uniforms
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let program = ShaderProgram::load(backend, &Self::descriptor())?;
        Ok(Self {
            model_view_matrix: program.uniform(backend, "modelViewMatrix")?,
            projection_matrix: program.uniform(backend, "projectionMatrix")?,
            tex_offset1: program.uniform(backend, "texOffset1")?,
            tex_offset2: program.uniform(backend, "texOffset2")?,
            tex_coord_info: program.uniform(backend, "texCoordInfo")?,
            particle_texture: program.uniform(backend, "particleTexture")?,
            program,
        })
    }
}

/// Sample the particle atlas from unit 0
pub fn connect_texture_units(sink: &mut impl UniformSink, shader: &ParticleShader) {
    sink.set_int(shader.particle_texture, 0);
}

/// Upload the camera projection
pub fn load_projection_matrix(sink: &mut impl UniformSink, shader: &ParticleShader, projection: &Mat4) {
    sink.set_matrix(shader.projection_matrix, projection);
}

/// Upload a particle's billboarded model-view matrix
pub fn load_model_view_matrix(sink: &mut impl UniformSink, shader: &ParticleShader, model_view: &Mat4) {
    sink.set_matrix(shader.model_view_matrix, model_view);
}

/// Upload the two atlas stages, the atlas size and the blend between stages
pub fn load_texture_coord_info(
    sink: &mut impl UniformSink,
    shader: &ParticleShader,
    offsets: (Vec2, Vec2),
    number_of_rows: u32,
    blend: f32,
) {
    sink.set_vec2(shader.tex_offset1, &offsets.0);
    sink.set_vec2(shader.tex_offset2, &offsets.1);
    sink.set_vec2(shader.tex_coord_info, &Vec2::new(number_of_rows as f32, blend));
}
