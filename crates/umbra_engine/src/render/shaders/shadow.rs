//! Depth-only shader of the shadow pass
//!
//! Only positions and texture coordinates are read; the fragment stage
//! discards texels whose alpha is below one half so cut-out foliage casts
//! the right shape.

use crate::foundation::math::Mat4;
use crate::render::api::{BackendResult, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink};
use crate::render::shaders::ShaderProgram;

/// Shadow pass program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowShader {
    /// Linked program
    pub program: ShaderProgram,
    mvp_matrix: UniformLocation,
    model_texture: UniformLocation,
}

impl ShadowShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new(
            "shadow",
            "resources/shaders/shadow.vert",
            "resources/shaders/shadow.frag",
        )
        .with_attribute("in_position")
        .with_attribute("in_textureCoords")
    }

    /// Compile the program and resolve its uniforms
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let program = ShaderProgram::load(backend, &Self::descriptor())?;
        Ok(Self {
            mvp_matrix: program.uniform(backend, "mvpMatrix")?,
            model_texture: program.uniform(backend, "modelTexture")?,
            program,
        })
    }
}

/// Sample the cut-out texture from unit 0
pub fn connect_texture_units(sink: &mut impl UniformSink, shader: &ShadowShader) {
    sink.set_int(shader.model_texture, 0);
}

/// Upload `projection_view * model`
pub fn load_mvp_matrix(sink: &mut impl UniformSink, shader: &ShadowShader, mvp: &Mat4) {
    sink.set_matrix(shader.mvp_matrix, mvp);
}
