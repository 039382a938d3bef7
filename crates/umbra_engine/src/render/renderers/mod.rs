//! Per-pass renderers
//!
//! One renderer per kind of drawable. Each owns its shader (and any mesh it
//! needs, such as the skybox cube or the particle quad), is created with
//! `new(backend, ...)`, draws with `render(...)` and releases everything with
//! `cleanup(backend)`. Renderers never decide *when* they run; the
//! [`MasterRenderer`](crate::render::MasterRenderer) sequences them.
//!
//! The lit renderers (entity, normal-mapped entity, terrain) and the skybox
//! are invoked once per scene pass with a [`ScenePass`] describing the
//! camera, clip plane and lighting of that pass.

pub mod entity;
pub mod normal_map;
pub mod overlay;
pub mod particle;
pub mod skybox;
pub mod terrain;
pub mod water;

pub use entity::EntityRenderer;
pub use normal_map::NormalMapRenderer;
pub use overlay::OverlayRenderer;
pub use particle::{billboard_model_view, ParticleRenderer};
pub use skybox::SkyboxRenderer;
pub use terrain::TerrainRenderer;
pub use water::{WaterFrameBuffers, WaterRenderer};

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::api::{RenderBackend, TextureHandle};
use crate::render::primitives::Camera;
use crate::render::shaders::{BoundProgram, ShadowReceiverUniforms, SHADOW_MAP_UNIT};
use crate::scene::Light;
use crate::shadows::ShadowFrame;

/// Clip plane that never clips anything in front of a sane camera
pub fn no_clip_plane() -> Vec4 {
    Vec4::new(0.0, -1.0, 0.0, 100_000.0)
}

/// The shadow map and the matrices it was rendered with
#[derive(Debug, Clone, Copy)]
pub struct ShadowInput<'a> {
    /// Frame produced by the shadow pass
    pub frame: &'a ShadowFrame,

    /// Depth texture the pass rendered into
    pub map: TextureHandle,
}

/// Everything the lit renderers share within one scene pass
#[derive(Debug, Clone, Copy)]
pub struct ScenePass<'a> {
    /// Camera of this pass (mirrored for the water reflection)
    pub camera: &'a Camera,

    /// `camera.view_matrix()`
    pub view: Mat4,

    /// `camera.projection_matrix()`
    pub projection: Mat4,

    /// `(normal, distance)`; fragments with `dot(normal, p) + distance < 0` are clipped
    pub clip_plane: Vec4,

    /// Fog and clear colour
    pub sky_colour: Vec3,

    /// Lights, sun first
    pub lights: &'a [Light],

    /// Shadow map of this frame, if there is a sun
    pub shadow: Option<ShadowInput<'a>>,
}

impl<'a> ScenePass<'a> {
    /// Pass seen from `camera` with no clipping and no shadows
    pub fn new(camera: &'a Camera, lights: &'a [Light], sky_colour: Vec3) -> Self {
        Self {
            camera,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            clip_plane: no_clip_plane(),
            sky_colour,
            lights,
            shadow: None,
        }
    }

    /// Clip geometry against `plane`
    pub fn with_clip_plane(mut self, plane: Vec4) -> Self {
        self.clip_plane = plane;
        self
    }

    /// Sample `shadow` in the lit shaders
    pub fn with_shadow(mut self, shadow: Option<ShadowInput<'a>>) -> Self {
        self.shadow = shadow;
        self
    }
}

/// Upload this pass's shadow matrix and bind the shadow map
///
/// Without a shadow map the receivers keep whatever matrix they last saw and
/// nothing is bound on [`SHADOW_MAP_UNIT`].
pub(crate) fn bind_shadow<B: RenderBackend + ?Sized>(
    bound: &mut BoundProgram<'_, B>,
    uniforms: &ShadowReceiverUniforms,
    pass: &ScenePass<'_>,
) {
    if let Some(shadow) = pass.shadow {
        uniforms.load_frame(bound, shadow.frame);
        bound.bind_texture(SHADOW_MAP_UNIT, shadow.map);
    }
}
