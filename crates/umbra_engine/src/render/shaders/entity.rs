//! Lit, fogged, shadow-receiving shader for plain entities

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::api::{BackendResult, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink};
use crate::render::shaders::{LightUniforms, ShaderProgram, ShadowReceiverUniforms};
use crate::scene::{Light, ModelTexture};

/// Entity program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityShader {
    /// Linked program
    pub program: ShaderProgram,
    /// Light arrays
    pub lights: LightUniforms,
    /// Shadow sampling parameters
    pub shadows: ShadowReceiverUniforms,
    transformation_matrix: UniformLocation,
    projection_matrix: UniformLocation,
    view_matrix: UniformLocation,
    shine_damper: UniformLocation,
    reflectivity: UniformLocation,
    use_fake_lighting: UniformLocation,
    sky_colour: UniformLocation,
    number_of_rows: UniformLocation,
    offset: UniformLocation,
    plane: UniformLocation,
    model_texture: UniformLocation,
}

impl EntityShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new(
            "entity",
            "resources/shaders/entity.vert",
            "resources/shaders/entity.frag",
        )
        .with_attribute("position")
        .with_attribute("textureCoordinates")
        .with_attribute("normal")
    }

    /// Compile the program and resolve its uniforms
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let program = ShaderProgram::load(backend, &Self::descriptor())?;
        Ok(Self {
            lights: LightUniforms::locate(&program, backend)?,
            shadows: ShadowReceiverUniforms::locate(&program, backend)?,
            transformation_matrix: program.uniform(backend, "transformationMatrix")?,
            projection_matrix: program.uniform(backend, "projectionMatrix")?,
            view_matrix: program.uniform(backend, "viewMatrix")?,
            shine_damper: program.uniform(backend, "shineDamper")?,
            reflectivity: program.uniform(backend, "reflectivity")?,
            use_fake_lighting: program.uniform(backend, "useFakeLighting")?,
            sky_colour: program.uniform(backend, "skyColour")?,
            number_of_rows: program.uniform(backend, "numberOfRows")?,
            offset: program.uniform(backend, "offset")?,
            plane: program.uniform(backend, "plane")?,
            model_texture: program.uniform(backend, "modelTexture")?,
            program,
        })
    }
}

/// Bind samplers to their texture units
pub fn connect_texture_units(sink: &mut impl UniformSink, shader: &EntityShader) {
    sink.set_int(shader.model_texture, 0);
    shader.shadows.connect_texture_unit(sink);
}

/// Upload the camera projection
pub fn load_projection_matrix(sink: &mut impl UniformSink, shader: &EntityShader, projection: &Mat4) {
    sink.set_matrix(shader.projection_matrix, projection);
}

/// Upload the camera view
pub fn load_view_matrix(sink: &mut impl UniformSink, shader: &EntityShader, view: &Mat4) {
    sink.set_matrix(shader.view_matrix, view);
}

/// Upload an entity's model matrix
pub fn load_transformation_matrix(sink: &mut impl UniformSink, shader: &EntityShader, transformation: &Mat4) {
    sink.set_matrix(shader.transformation_matrix, transformation);
}

/// Upload the scene lights
pub fn load_lights(sink: &mut impl UniformSink, shader: &EntityShader, lights: &[Light]) {
    shader.lights.load(sink, lights);
}

/// Upload the fog colour
pub fn load_sky_colour(sink: &mut impl UniformSink, shader: &EntityShader, colour: &Vec3) {
    sink.set_vec3(shader.sky_colour, colour);
}

/// Upload the clipping plane (`plane.xyz · p + plane.w >= 0` is kept)
pub fn load_clip_plane(sink: &mut impl UniformSink, shader: &EntityShader, plane: &Vec4) {
    sink.set_vec4(shader.plane, plane);
}

/// Upload the per-model surface parameters
pub fn load_model_texture(sink: &mut impl UniformSink, shader: &EntityShader, texture: &ModelTexture) {
    sink.set_float(shader.shine_damper, texture.shine_damper);
    sink.set_float(shader.reflectivity, texture.reflectivity);
    sink.set_bool(shader.use_fake_lighting, texture.use_fake_lighting);
    sink.set_float(shader.number_of_rows, texture.number_of_rows as f32);
}

/// Upload an entity's atlas offset
pub fn load_offset(sink: &mut impl UniformSink, shader: &EntityShader, offset: &Vec2) {
    sink.set_vec2(shader.offset, offset);
}
