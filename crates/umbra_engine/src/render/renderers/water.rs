//! Water surface rendering
//!
//! [`WaterFrameBuffers`] owns the two off-screen targets the water shader
//! samples: a low-resolution reflection (colour plus a depth render buffer)
//! and a refraction target whose depth is kept as a texture so the shader can
//! soften edges where the water is shallow. The master renderer fills both
//! before [`WaterRenderer::render`] draws the surface.

use crate::render::api::{
    BackendResult, BlendMode, DepthAttachment, FramebufferDescriptor, FramebufferHandle, RenderBackend, RenderState,
    TextureHandle, WaterConfig,
};
use crate::render::primitives::{GpuMesh, MeshData};
use crate::render::renderers::ScenePass;
use crate::render::shaders::water::{self, units};
use crate::render::shaders::WaterShader;
use crate::scene::{Light, WaterTile};

/// Reflection and refraction render targets
#[derive(Debug)]
pub struct WaterFrameBuffers {
    reflection: FramebufferHandle,
    reflection_texture: TextureHandle,
    reflection_size: (u32, u32),
    refraction: FramebufferHandle,
    refraction_texture: TextureHandle,
    refraction_depth_texture: TextureHandle,
    refraction_size: (u32, u32),
}

impl WaterFrameBuffers {
    /// Allocate both targets at the configured resolutions
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B, config: &WaterConfig) -> BackendResult<Self> {
        let reflection_size = (config.reflection_width, config.reflection_height);
        let reflection = backend.create_framebuffer(&FramebufferDescriptor::color(
            reflection_size.0,
            reflection_size.1,
            DepthAttachment::RenderBuffer,
        ))?;
        let refraction_size = (config.refraction_width, config.refraction_height);
        let refraction = backend.create_framebuffer(&FramebufferDescriptor::color(
            refraction_size.0,
            refraction_size.1,
            DepthAttachment::Texture,
        ))?;

        log::debug!(
            "Created water targets: reflection {}x{}, refraction {}x{}",
            reflection_size.0,
            reflection_size.1,
            refraction_size.0,
            refraction_size.1
        );

        Ok(Self {
            reflection,
            reflection_texture: backend.color_texture(reflection)?,
            reflection_size,
            refraction,
            refraction_texture: backend.color_texture(refraction)?,
            refraction_depth_texture: backend.depth_texture(refraction)?,
            refraction_size,
        })
    }

    /// Render into the reflection target
    pub fn bind_reflection<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        backend.bind_framebuffer(self.reflection, self.reflection_size.0, self.reflection_size.1);
    }

    /// Render into the refraction target
    pub fn bind_refraction<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        backend.bind_framebuffer(self.refraction, self.refraction_size.0, self.refraction_size.1);
    }

    /// Return to the window
    pub fn unbind<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        let viewport = backend.default_viewport();
        backend.unbind_framebuffer(viewport);
    }

    /// Framebuffer of the reflection target
    pub fn reflection_framebuffer(&self) -> FramebufferHandle {
        self.reflection
    }

    /// Framebuffer of the refraction target
    pub fn refraction_framebuffer(&self) -> FramebufferHandle {
        self.refraction
    }

    /// Colour of the reflection target
    pub fn reflection_texture(&self) -> TextureHandle {
        self.reflection_texture
    }

    /// Colour of the refraction target
    pub fn refraction_texture(&self) -> TextureHandle {
        self.refraction_texture
    }

    /// Depth of the refraction target
    pub fn refraction_depth_texture(&self) -> TextureHandle {
        self.refraction_depth_texture
    }

    /// Release both targets
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        backend.destroy_framebuffer(self.reflection);
        backend.destroy_framebuffer(self.refraction);
    }
}

/// Draws water tiles using the reflection and refraction targets
#[derive(Debug)]
pub struct WaterRenderer {
    shader: WaterShader,
    quad: GpuMesh,
    dudv_map: TextureHandle,
    normal_map: TextureHandle,
    wave_speed: f32,
    move_factor: f32,
}

impl WaterRenderer {
    /// Upload the unit quad and load the water shader
    pub fn new<B: RenderBackend + ?Sized>(
        backend: &mut B,
        config: &WaterConfig,
        dudv_map: TextureHandle,
        normal_map: TextureHandle,
    ) -> BackendResult<Self> {
        let data = MeshData::water_quad();
        let quad = GpuMesh::new(backend.upload_mesh(&data)?, data.index_count());
        let shader = WaterShader::load(backend)?;
        {
            let mut bound = shader.program.bind(backend);
            water::connect_texture_units(&mut bound, &shader);
        }
        Ok(Self {
            shader,
            quad,
            dudv_map,
            normal_map,
            wave_speed: config.wave_speed,
            move_factor: 0.0,
        })
    }

    /// Scroll the distortion by `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        self.move_factor = (self.move_factor + self.wave_speed * delta).rem_euclid(1.0);
    }

    /// Current distortion offset in `[0, 1)`
    pub fn move_factor(&self) -> f32 {
        self.move_factor
    }

    /// Draw the tiles at `visible` (indices into `tiles`)
    ///
    /// Blending is enabled for the duration of the call so the surface fades
    /// into the shore.
    pub fn render<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        pass: &ScenePass<'_>,
        tiles: &[WaterTile],
        visible: &[usize],
        buffers: &WaterFrameBuffers,
        sun: Option<&Light>,
    ) -> usize {
        if visible.is_empty() {
            return 0;
        }

        let shader = &self.shader;
        let camera = pass.camera;
        let mut bound = shader.program.bind(backend);
        water::load_projection(&mut bound, shader, &pass.projection, camera.near, camera.far);
        water::load_camera(&mut bound, shader, &pass.view, &camera.position);
        water::load_move_factor(&mut bound, shader, self.move_factor);
        if let Some(sun) = sun {
            water::load_light(&mut bound, shader, sun);
        }

        bound.bind_mesh(self.quad.handle, 1);
        bound.bind_texture(units::REFLECTION, buffers.reflection_texture());
        bound.bind_texture(units::REFRACTION, buffers.refraction_texture());
        bound.bind_texture(units::DUDV_MAP, self.dudv_map);
        bound.bind_texture(units::NORMAL_MAP, self.normal_map);
        bound.bind_texture(units::DEPTH_MAP, buffers.refraction_depth_texture());
        bound.enable(RenderState::BLEND);
        bound.set_blend_mode(BlendMode::Alpha);

        let mut drawn = 0;
        for tile in visible.iter().filter_map(|&i| tiles.get(i)) {
            water::load_model_matrix(&mut bound, shader, &tile.transformation_matrix());
            bound.draw_indexed(self.quad.index_count);
            drawn += 1;
        }

        bound.disable(RenderState::BLEND);
        bound.unbind_mesh();
        drawn
    }

    /// Release the shader and the surface quad
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.shader.program.destroy(backend);
        backend.destroy_mesh(self.quad.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::backends::{RecordingBackend, RenderCommand};
    use crate::render::primitives::Camera;
    use approx::assert_relative_eq;

    #[test]
    fn test_targets_have_configured_sizes() {
        let mut backend = RecordingBackend::new(1280, 720);
        let buffers = WaterFrameBuffers::new(&mut backend, &WaterConfig::default()).expect("targets");

        buffers.bind_reflection(&mut backend);
        assert_eq!(backend.viewport().width, 320);
        assert_eq!(backend.viewport().height, 180);

        buffers.bind_refraction(&mut backend);
        assert_eq!(backend.bound_framebuffer(), Some(buffers.refraction_framebuffer()));
        assert_eq!(backend.viewport().width, 1280);

        buffers.unbind(&mut backend);
        assert_eq!(backend.bound_framebuffer(), None);
        assert_eq!(backend.viewport(), backend.default_viewport());

        buffers.cleanup(&mut backend);
        assert_eq!(backend.live_framebuffers(), 0);
    }

    #[test]
    fn test_move_factor_wraps() {
        let mut backend = RecordingBackend::new(800, 600);
        let config = WaterConfig {
            wave_speed: 0.25,
            ..WaterConfig::default()
        };
        let mut renderer = WaterRenderer::new(&mut backend, &config, TextureHandle(1), TextureHandle(2)).expect("water");
        renderer.advance(3.0);
        assert_relative_eq!(renderer.move_factor(), 0.75);
        renderer.advance(2.0);
        assert_relative_eq!(renderer.move_factor(), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_samples_all_five_units_and_blends() {
        let mut backend = RecordingBackend::new(800, 600);
        let buffers = WaterFrameBuffers::new(&mut backend, &WaterConfig::default()).expect("targets");
        let renderer =
            WaterRenderer::new(&mut backend, &WaterConfig::default(), TextureHandle(1), TextureHandle(2)).expect("water");
        let camera = Camera::default();
        let tiles = [WaterTile::new(0.0, -30.0, 0.0)];

        backend.take_commands();
        let drawn = renderer.render(&mut backend, &ScenePass::new(&camera, &[], Vec3::zeros()), &tiles, &[0], &buffers, None);
        assert_eq!(drawn, 1);

        let units: Vec<u32> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::BindTexture { unit, .. } => Some(*unit),
                _ => None,
            })
            .collect();
        assert_eq!(units, vec![0, 1, 2, 3, 4]);
        let enable = backend.position_of(|c| *c == RenderCommand::Enable(RenderState::BLEND));
        let draw = backend.position_of(|c| matches!(c, RenderCommand::Draw { .. }));
        assert!(enable < draw);
        assert!(!backend.enabled_state().contains(RenderState::BLEND));
    }
}
