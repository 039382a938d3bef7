//! Shadow pass
//!
//! Renders the depth of every visible entity, as seen from the sun, into a
//! square depth texture. The pass runs before anything that samples the
//! shadow map, and hands the frame's [`ShadowFrame`] to those consumers.

use crate::foundation::math::Vec4;
use crate::render::api::{BackendResult, ClearFlags, RenderBackend, RenderState, ShadowConfig, TextureHandle};
use crate::render::primitives::CameraOrientation;
use crate::render::shaders::{shadow, BoundProgram, ShadowShader};
use crate::scene::{EntityBatch, Light, Scene, VisibleSet};
use crate::shadows::{compute_shadow_frame, ShadowBox, ShadowFrame, ShadowFrameBuffer};

/// Attributes the shadow shader reads: position and texture coordinates
const SHADOW_ATTRIBUTES: u32 = 2;

/// Owner of the shadow box, the shadow framebuffer and the depth shader
#[derive(Debug)]
pub struct ShadowMapRenderer {
    shader: ShadowShader,
    shadow_box: ShadowBox,
    frame_buffer: ShadowFrameBuffer,
    config: ShadowConfig,
    caster_count: usize,
}

impl ShadowMapRenderer {
    /// Allocate the shadow map and load the depth shader
    ///
    /// # Panics
    /// If the configured map is not square (see [`ShadowFrameBuffer::new`]).
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B, config: &ShadowConfig) -> BackendResult<Self> {
        Self::with_map_size(backend, config, config.map_size, config.map_size)
    }

    /// Like [`new`](Self::new) with an explicit map resolution
    ///
    /// # Panics
    /// If `width != height`.
    pub fn with_map_size<B: RenderBackend + ?Sized>(
        backend: &mut B,
        config: &ShadowConfig,
        width: u32,
        height: u32,
    ) -> BackendResult<Self> {
        let frame_buffer = ShadowFrameBuffer::new(backend, width, height)?;
        let shader = ShadowShader::load(backend)?;
        {
            let mut bound = shader.program.bind(backend);
            shadow::connect_texture_units(&mut bound, &shader);
        }

        Ok(Self {
            shader,
            shadow_box: ShadowBox::new(config),
            frame_buffer,
            config: config.clone(),
            caster_count: 0,
        })
    }

    /// Run the shadow pass over the visible entities
    ///
    /// Refits the shadow box, rebuilds the light matrices and draws every
    /// entity of `visible` into the shadow map. Models with transparent
    /// textures are drawn double-sided. Returns the matrices for this frame.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        orientation: &CameraOrientation,
        sun: &Light,
        scene: &Scene,
        visible: &VisibleSet,
    ) -> ShadowFrame {
        let frame = compute_shadow_frame(orientation, sun, &mut self.shadow_box);

        self.frame_buffer.bind_for_writing(backend);
        backend.enable(RenderState::DEPTH_TEST | RenderState::DEPTH_WRITE | RenderState::CULL_BACK_FACES);
        backend.clear(ClearFlags::DEPTH, Vec4::zeros());

        let mut casters = 0;
        {
            let mut bound = self.shader.program.bind(backend);
            for batch in visible.entities.iter().chain(&visible.normal_mapped) {
                casters += draw_batch(&mut bound, &self.shader, scene, batch, &frame);
            }
        }

        self.frame_buffer.unbind(backend);
        self.caster_count = casters;
        log::debug!("Shadow pass drew {} casters", casters);
        frame
    }

    /// Depth texture holding the shadow map
    pub fn shadow_map(&self) -> TextureHandle {
        self.frame_buffer.depth_texture()
    }

    /// Shadow parameters the pass was built with
    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    /// The shadow box, as fitted by the last pass
    pub fn shadow_box(&self) -> &ShadowBox {
        &self.shadow_box
    }

    /// Entities drawn by the last pass
    pub fn caster_count(&self) -> usize {
        self.caster_count
    }

    /// Release the shadow map and the shader
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.frame_buffer.cleanup(backend);
        self.shader.program.destroy(backend);
    }
}

fn draw_batch<B: RenderBackend + ?Sized>(
    bound: &mut BoundProgram<'_, B>,
    shader: &ShadowShader,
    scene: &Scene,
    batch: &EntityBatch,
    frame: &ShadowFrame,
) -> usize {
    let Some(model) = scene.model(batch.model) else {
        return 0;
    };

    bound.bind_mesh(model.mesh.handle, SHADOW_ATTRIBUTES);
    bound.bind_texture(0, model.texture.texture);
    if model.texture.has_transparency {
        bound.disable(RenderState::CULL_BACK_FACES);
    }

    let mut drawn = 0;
    for entity in batch.entities.iter().filter_map(|key| scene.entity(*key)) {
        let mvp = frame.projection_view * entity.transformation_matrix();
        shadow::load_mvp_matrix(bound, shader, &mvp);
        bound.draw_indexed(model.mesh.index_count);
        drawn += 1;
    }

    if model.texture.has_transparency {
        bound.enable(RenderState::CULL_BACK_FACES);
    }
    bound.unbind_mesh();
    drawn
}
