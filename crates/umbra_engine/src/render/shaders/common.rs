//! Uniform groups shared by several shaders

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::api::{BackendResult, RenderBackend, ShadowConfig, UniformLocation, UniformSink};
use crate::render::shaders::{ShaderProgram, MAX_LIGHTS, SHADOW_MAP_UNIT};
use crate::scene::Light;
use crate::shadows::ShadowFrame;

/// `lightPosition[]`, `lightColour[]` and `attenuation[]` arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightUniforms {
    position: [UniformLocation; MAX_LIGHTS],
    colour: [UniformLocation; MAX_LIGHTS],
    attenuation: [UniformLocation; MAX_LIGHTS],
}

impl LightUniforms {
    /// Resolve the light arrays of `program`
    pub fn locate<B: RenderBackend + ?Sized>(program: &ShaderProgram, backend: &B) -> BackendResult<Self> {
        Ok(Self {
            position: program.uniform_array(backend, "lightPosition")?,
            colour: program.uniform_array(backend, "lightColour")?,
            attenuation: program.uniform_array(backend, "attenuation")?,
        })
    }

    /// Upload up to [`MAX_LIGHTS`] lights in world space; unused slots are blacked out
    pub fn load(&self, sink: &mut impl UniformSink, lights: &[Light]) {
        self.load_with(sink, lights, |light| light.position);
    }

    /// Upload lights with positions moved into eye space by `view`
    pub fn load_eye_space(&self, sink: &mut impl UniformSink, lights: &[Light], view: &Mat4) {
        self.load_with(sink, lights, |light| {
            let p = light.position;
            (view * Vec4::new(p.x, p.y, p.z, 1.0)).xyz()
        });
    }

    fn load_with(&self, sink: &mut impl UniformSink, lights: &[Light], position_of: impl Fn(&Light) -> Vec3) {
        let unused = Light::unused();
        for i in 0..MAX_LIGHTS {
            let light = lights.get(i).unwrap_or(&unused);
            sink.set_vec3(self.position[i], &position_of(light));
            sink.set_vec3(self.colour[i], &light.colour);
            sink.set_vec3(self.attenuation[i], &light.attenuation);
        }
    }
}

/// Uniforms of shaders that sample the shadow map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowReceiverUniforms {
    to_shadow_map_space: UniformLocation,
    shadow_distance: UniformLocation,
    transition_distance: UniformLocation,
    shadow_map_size: UniformLocation,
    pcf_count: UniformLocation,
    shadow_map: UniformLocation,
}

impl ShadowReceiverUniforms {
    /// Resolve the shadow uniforms of `program`
    pub fn locate<B: RenderBackend + ?Sized>(program: &ShaderProgram, backend: &B) -> BackendResult<Self> {
        Ok(Self {
            to_shadow_map_space: program.uniform(backend, "toShadowMapSpace")?,
            shadow_distance: program.uniform(backend, "shadowDistance")?,
            transition_distance: program.uniform(backend, "transitionDistance")?,
            shadow_map_size: program.uniform(backend, "shadowMapSize")?,
            pcf_count: program.uniform(backend, "pcfCount")?,
            shadow_map: program.uniform(backend, "shadowMap")?,
        })
    }

    /// Point the `shadowMap` sampler at [`SHADOW_MAP_UNIT`]
    pub fn connect_texture_unit(&self, sink: &mut impl UniformSink) {
        sink.set_int(self.shadow_map, SHADOW_MAP_UNIT as i32);
    }

    /// Upload the constant shadow parameters
    pub fn load_config(&self, sink: &mut impl UniformSink, config: &ShadowConfig) {
        sink.set_float(self.shadow_distance, config.shadow_distance);
        sink.set_float(self.transition_distance, config.transition_distance);
        sink.set_float(self.shadow_map_size, config.map_size as f32);
        sink.set_int(self.pcf_count, config.pcf_count);
    }

    /// Upload this frame's world-to-shadow-map transform
    pub fn load_frame(&self, sink: &mut impl UniformSink, frame: &ShadowFrame) {
        sink.set_matrix(self.to_shadow_map_space, &frame.to_shadow_map_space);
    }
}
