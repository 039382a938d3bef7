//! Multi-textured terrain shader

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::api::{BackendResult, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink};
use crate::render::shaders::{LightUniforms, ShaderProgram, ShadowReceiverUniforms};
use crate::scene::Light;

/// Texture units of the terrain samplers, in `TerrainTexturePack` order then blend map
pub const TERRAIN_TEXTURE_UNITS: [u32; 5] = [0, 1, 2, 3, 4];

/// Terrain program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainShader {
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
    sky_colour: UniformLocation,
    plane: UniformLocation,
    samplers: [UniformLocation; 5],
}

impl TerrainShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new(
            "terrain",
            "resources/shaders/terrain.vert",
            "resources/shaders/terrain.frag",
        )
        .with_attribute("position")
        .with_attribute("textureCoordinates")
        .with_attribute("normal")
    }

    /// Compile the program and resolve its uniforms
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let program = ShaderProgram::load(backend, &Self::descriptor())?;
        let samplers = [
            program.uniform(backend, "backgroundTexture")?,
            program.uniform(backend, "rTexture")?,
            program.uniform(backend, "gTexture")?,
            program.uniform(backend, "bTexture")?,
            program.uniform(backend, "blendMap")?,
        ];
        Ok(Self {
            lights: LightUniforms::locate(&program, backend)?,
            shadows: ShadowReceiverUniforms::locate(&program, backend)?,
            transformation_matrix: program.uniform(backend, "transformationMatrix")?,
            projection_matrix: program.uniform(backend, "projectionMatrix")?,
            view_matrix: program.uniform(backend, "viewMatrix")?,
            shine_damper: program.uniform(backend, "shineDamper")?,
            reflectivity: program.uniform(backend, "reflectivity")?,
            sky_colour: program.uniform(backend, "skyColour")?,
            plane: program.uniform(backend, "plane")?,
            samplers,
            program,
        })
    }
}

/// Bind samplers to their texture units
pub fn connect_texture_units(sink: &mut impl UniformSink, shader: &TerrainShader) {
    for (location, unit) in shader.samplers.iter().zip(TERRAIN_TEXTURE_UNITS) {
        sink.set_int(*location, unit as i32);
    }
    shader.shadows.connect_texture_unit(sink);
}

/// Upload the camera projection
pub fn load_projection_matrix(sink: &mut impl UniformSink, shader: &TerrainShader, projection: &Mat4) {
    sink.set_matrix(shader.projection_matrix, projection);
}

/// Upload the camera view
pub fn load_view_matrix(sink: &mut impl UniformSink, shader: &TerrainShader, view: &Mat4) {
    sink.set_matrix(shader.view_matrix, view);
}

/// Upload a tile's model matrix
pub fn load_transformation_matrix(sink: &mut impl UniformSink, shader: &TerrainShader, transformation: &Mat4) {
    sink.set_matrix(shader.transformation_matrix, transformation);
}

/// Upload the scene lights
pub fn load_lights(sink: &mut impl UniformSink, shader: &TerrainShader, lights: &[Light]) {
    shader.lights.load(sink, lights);
}

/// Upload the fog colour
pub fn load_sky_colour(sink: &mut impl UniformSink, shader: &TerrainShader, colour: &Vec3) {
    sink.set_vec3(shader.sky_colour, colour);
}

/// Upload the clipping plane
pub fn load_clip_plane(sink: &mut impl UniformSink, shader: &TerrainShader, plane: &Vec4) {
    sink.set_vec4(shader.plane, plane);
}

/// Upload specular parameters (terrain is dull by default)
pub fn load_shine_variables(sink: &mut impl UniformSink, shader: &TerrainShader, shine_damper: f32, reflectivity: f32) {
    sink.set_float(shader.shine_damper, shine_damper);
    sink.set_float(shader.reflectivity, reflectivity);
}
