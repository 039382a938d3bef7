//! Screen-space overlay: GUI quads, then text
//!
//! Drawn last, with depth testing off and alpha blending on, in the order
//! the elements appear in the scene.

use crate::foundation::math::utils;
use crate::render::api::{BackendResult, BlendMode, RenderBackend, RenderState};
use crate::render::primitives::{GpuMesh, MeshData};
use crate::render::shaders::{overlay, FontShader, OverlayShader};
use crate::scene::{GuiElement, TextMesh};

/// Glyph quads carry position and texture coordinates
const TEXT_ATTRIBUTES: u32 = 2;

/// Draws GUI elements and text meshes
#[derive(Debug)]
pub struct OverlayRenderer {
    gui_shader: OverlayShader,
    font_shader: FontShader,
    quad: GpuMesh,
}

impl OverlayRenderer {
    /// Upload the GUI quad and load both overlay shaders
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let data = MeshData::quad();
        let quad = GpuMesh::new(backend.upload_mesh(&data)?, data.index_count());

        let gui_shader = OverlayShader::load(backend)?;
        {
            let mut bound = gui_shader.program.bind(backend);
            overlay::connect_texture_units(&mut bound, &gui_shader);
        }
        let font_shader = FontShader::load(backend)?;
        {
            let mut bound = font_shader.program.bind(backend);
            overlay::connect_font_texture_units(&mut bound, &font_shader);
        }

        Ok(Self {
            gui_shader,
            font_shader,
            quad,
        })
    }

    /// Draw `gui` then `texts`, returning the number of draws issued
    pub fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B, gui: &[GuiElement], texts: &[TextMesh]) -> usize {
        if gui.is_empty() && texts.is_empty() {
            return 0;
        }

        backend.enable(RenderState::BLEND);
        backend.set_blend_mode(BlendMode::Alpha);
        backend.disable(RenderState::DEPTH_TEST);

        let drawn = self.render_gui(backend, gui) + self.render_text(backend, texts);

        backend.enable(RenderState::DEPTH_TEST);
        backend.disable(RenderState::BLEND);
        drawn
    }

    fn render_gui<B: RenderBackend + ?Sized>(&self, backend: &mut B, gui: &[GuiElement]) -> usize {
        if gui.is_empty() {
            return 0;
        }
        let shader = &self.gui_shader;
        let mut bound = shader.program.bind(backend);
        bound.bind_mesh(self.quad.handle, 1);
        for element in gui {
            bound.bind_texture(0, element.texture);
            let matrix = utils::create_overlay_matrix(&element.position, &element.scale);
            overlay::load_transformation(&mut bound, shader, &matrix);
            bound.draw_indexed(self.quad.index_count);
        }
        bound.unbind_mesh();
        gui.len()
    }

    fn render_text<B: RenderBackend + ?Sized>(&self, backend: &mut B, texts: &[TextMesh]) -> usize {
        if texts.is_empty() {
            return 0;
        }
        let shader = &self.font_shader;
        let mut bound = shader.program.bind(backend);
        for text in texts {
            bound.bind_mesh(text.mesh.handle, TEXT_ATTRIBUTES);
            bound.bind_texture(0, text.font_atlas);
            overlay::load_text(&mut bound, shader, text);
            bound.draw_indexed(text.mesh.index_count);
            bound.unbind_mesh();
        }
        texts.len()
    }

    /// Release both shaders and the GUI quad
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.gui_shader.program.destroy(backend);
        self.font_shader.program.destroy(backend);
        backend.destroy_mesh(self.quad.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec2, Vec3};
    use crate::render::api::{MeshHandle, TextureHandle};
    use crate::render::backends::{RecordingBackend, RenderCommand};

    #[test]
    fn test_gui_before_text_with_depth_test_off() {
        let mut backend = RecordingBackend::new(800, 600);
        backend.enable(RenderState::DEPTH_TEST);
        let renderer = OverlayRenderer::new(&mut backend).expect("overlay");
        let gui = [GuiElement::new(TextureHandle(60), Vec2::new(0.5, 0.5), Vec2::new(0.25, 0.25))];
        let text = [TextMesh::new(GpuMesh::new(MeshHandle(61), 48), TextureHandle(62), Vec2::zeros(), Vec3::x())];

        backend.take_commands();
        assert_eq!(renderer.render(&mut backend, &gui, &text), 2);

        let gui_program = backend.program_named("gui");
        let font_program = backend.program_named("font");
        let programs: Vec<_> = backend
            .draws()
            .filter_map(|c| match c {
                RenderCommand::Draw { program, .. } => Some(*program),
                _ => None,
            })
            .collect();
        assert_eq!(programs, vec![gui_program, font_program]);

        let depth_off = backend
            .position_of(|c| *c == RenderCommand::Disable(RenderState::DEPTH_TEST))
            .expect("depth test disabled");
        let first_draw = backend
            .position_of(|c| matches!(c, RenderCommand::Draw { .. }))
            .expect("draw");
        assert!(depth_off < first_draw);
        assert!(backend.enabled_state().contains(RenderState::DEPTH_TEST));
        assert!(!backend.enabled_state().contains(RenderState::BLEND));
    }

    #[test]
    fn test_empty_overlay_touches_no_state() {
        let mut backend = RecordingBackend::new(800, 600);
        let renderer = OverlayRenderer::new(&mut backend).expect("overlay");
        backend.take_commands();
        assert_eq!(renderer.render(&mut backend, &[], &[]), 0);
        assert!(backend.commands().is_empty());
    }
}
