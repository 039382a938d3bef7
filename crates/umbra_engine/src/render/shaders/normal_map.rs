//! Entity shader variant with tangent-space normal mapping
//!
//! Lighting is done in eye space, so light positions are uploaded already
//! multiplied by the view matrix.

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::api::{BackendResult, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink};
use crate::render::shaders::{LightUniforms, ShaderProgram, ShadowReceiverUniforms, NORMAL_MAP_UNIT};
use crate::scene::{Light, ModelTexture};

/// Normal-mapping program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalMapShader {
    /// Linked program
    pub program: ShaderProgram,
    /// Light arrays (eye space)
    pub lights: LightUniforms,
    /// Shadow sampling parameters
    pub shadows: ShadowReceiverUniforms,
    transformation_matrix: UniformLocation,
    projection_matrix: UniformLocation,
    view_matrix: UniformLocation,
    shine_damper: UniformLocation,
    reflectivity: UniformLocation,
    sky_colour: UniformLocation,
    number_of_rows: UniformLocation,
    offset: UniformLocation,
    plane: UniformLocation,
    model_texture: UniformLocation,
    normal_map: UniformLocation,
}

impl NormalMapShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new(
            "normal_map",
            "resources/shaders/normal_map.vert",
            "resources/shaders/normal_map.frag",
        )
        .with_attribute("position")
        .with_attribute("textureCoordinates")
        .with_attribute("normal")
        .with_attribute("tangent")
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
            sky_colour: program.uniform(backend, "skyColour")?,
            number_of_rows: program.uniform(backend, "numberOfRows")?,
            offset: program.uniform(backend, "offset")?,
            plane: program.uniform(backend, "plane")?,
            model_texture: program.uniform(backend, "modelTexture")?,
            normal_map: program.uniform(backend, "normalMap")?,
            program,
        })
    }
}

/// Bind samplers to their texture units
pub fn connect_texture_units(sink: &mut impl UniformSink, shader: &NormalMapShader) {
    sink.set_int(shader.model_texture, 0);
    sink.set_int(shader.normal_map, NORMAL_MAP_UNIT as i32);
    shader.shadows.connect_texture_unit(sink);
}

/// Upload the camera projection
pub fn load_projection_matrix(sink: &mut impl UniformSink, shader: &NormalMapShader, projection: &Mat4) {
    sink.set_matrix(shader.projection_matrix, projection);
}

/// Upload the camera view and the lights moved into eye space
pub fn load_view_and_lights(sink: &mut impl UniformSink, shader: &NormalMapShader, view: &Mat4, lights: &[Light]) {
    sink.set_matrix(shader.view_matrix, view);
    shader.lights.load_eye_space(sink, lights, view);
}

/// Upload an entity's model matrix
pub fn load_transformation_matrix(sink: &mut impl UniformSink, shader: &NormalMapShader, transformation: &Mat4) {
    sink.set_matrix(shader.transformation_matrix, transformation);
}

/// Upload the fog colour
pub fn load_sky_colour(sink: &mut impl UniformSink, shader: &NormalMapShader, colour: &Vec3) {
    sink.set_vec3(shader.sky_colour, colour);
}

/// Upload the clipping plane
pub fn load_clip_plane(sink: &mut impl UniformSink, shader: &NormalMapShader, plane: &Vec4) {
    sink.set_vec4(shader.plane, plane);
}

/// Upload the per-model surface parameters
pub fn load_model_texture(sink: &mut impl UniformSink, shader: &NormalMapShader, texture: &ModelTexture) {
    sink.set_float(shader.shine_damper, texture.shine_damper);
    sink.set_float(shader.reflectivity, texture.reflectivity);
    sink.set_float(shader.number_of_rows, texture.number_of_rows as f32);
}

/// Upload an entity's atlas offset
pub fn load_offset(sink: &mut impl UniformSink, shader: &NormalMapShader, offset: &Vec2) {
    sink.set_vec2(shader.offset, offset);
}
