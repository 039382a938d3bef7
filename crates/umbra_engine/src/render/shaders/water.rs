//! Water surface shader
//!
//! Samples the reflection and refraction targets with projective texture
//! coordinates, distorts them with a scrolling du/dv map and fades the edges
//! using the refraction depth.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{BackendResult, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink};
use crate::render::shaders::ShaderProgram;
use crate::scene::Light;

/// Texture units of the water samplers
pub mod units {
    /// Reflection colour
    pub const REFLECTION: u32 = 0;
    /// Refraction colour
    pub const REFRACTION: u32 = 1;
    /// Distortion map
    pub const DUDV_MAP: u32 = 2;
    /// Surface normal map
    pub const NORMAL_MAP: u32 = 3;
    /// Refraction depth
    pub const DEPTH_MAP: u32 = 4;
}

/// Water program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterShader {
    /// Linked program
    pub program: ShaderProgram,
    model_matrix: UniformLocation,
    view_matrix: UniformLocation,
    projection_matrix: UniformLocation,
    reflection_texture: UniformLocation,
    refraction_texture: UniformLocation,
    dudv_map: UniformLocation,
    normal_map: UniformLocation,
    depth_map: UniformLocation,
    move_factor: UniformLocation,
    camera_position: UniformLocation,
    light_colour: UniformLocation,
    light_position: UniformLocation,
    near_plane: UniformLocation,
    far_plane: UniformLocation,
}

impl WaterShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new(
            "water",
            "resources/shaders/water.vert",
            "resources/shaders/water.frag",
        )
        .with_attribute("position")
    }

    /// Compile the program and resolve its uniforms
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let program = ShaderProgram::load(backend, &Self::descriptor())?;
        Ok(Self {
            model_matrix: program.uniform(backend, "modelMatrix")?,
            view_matrix: program.uniform(backend, "viewMatrix")?,
            projection_matrix: program.uniform(backend, "projectionMatrix")?,
            reflection_texture: program.uniform(backend, "reflectionTexture")?,
            refraction_texture: program.uniform(backend, "refractionTexture")?,
            dudv_map: program.uniform(backend, "dudvMap")?,
            normal_map: program.uniform(backend, "normalMap")?,
            depth_map: program.uniform(backend, "depthMap")?,
            move_factor: program.uniform(backend, "moveFactor")?,
            camera_position: program.uniform(backend, "cameraPosition")?,
            light_colour: program.uniform(backend, "lightColour")?,
            light_position: program.uniform(backend, "lightPosition")?,
            near_plane: program.uniform(backend, "nearPlane")?,
            far_plane: program.uniform(backend, "farPlane")?,
            program,
        })
    }
}

/// Bind samplers to their texture units
pub fn connect_texture_units(sink: &mut impl UniformSink, shader: &WaterShader) {
    sink.set_int(shader.reflection_texture, units::REFLECTION as i32);
    sink.set_int(shader.refraction_texture, units::REFRACTION as i32);
    sink.set_int(shader.dudv_map, units::DUDV_MAP as i32);
    sink.set_int(shader.normal_map, units::NORMAL_MAP as i32);
    sink.set_int(shader.depth_map, units::DEPTH_MAP as i32);
}

/// Upload the projection and its clip distances (needed to linearize depth)
pub fn load_projection(sink: &mut impl UniformSink, shader: &WaterShader, projection: &Mat4, near: f32, far: f32) {
    sink.set_matrix(shader.projection_matrix, projection);
    sink.set_float(shader.near_plane, near);
    sink.set_float(shader.far_plane, far);
}

/// Upload the camera view and position
pub fn load_camera(sink: &mut impl UniformSink, shader: &WaterShader, view: &Mat4, position: &Vec3) {
    sink.set_matrix(shader.view_matrix, view);
    sink.set_vec3(shader.camera_position, position);
}

/// Upload the light used for specular highlights
pub fn load_light(sink: &mut impl UniformSink, shader: &WaterShader, light: &Light) {
    sink.set_vec3(shader.light_colour, &light.colour);
    sink.set_vec3(shader.light_position, &light.position);
}

/// Upload the distortion scroll offset
pub fn load_move_factor(sink: &mut impl UniformSink, shader: &WaterShader, move_factor: f32) {
    sink.set_float(shader.move_factor, move_factor);
}

/// Upload a tile's model matrix
pub fn load_model_matrix(sink: &mut impl UniformSink, shader: &WaterShader, model: &Mat4) {
    sink.set_matrix(shader.model_matrix, model);
}
