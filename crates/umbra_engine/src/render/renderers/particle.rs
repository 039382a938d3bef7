//! Particle renderer
//!
//! Particles are camera-facing quads. They are drawn after all opaque
//! geometry with depth writes off, grouped by texture so each atlas and its
//! blend equation are set once. Within a group the scene's back-to-front
//! order is kept.

use std::collections::HashMap;

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::api::{BackendResult, BlendMode, RenderBackend, RenderState};
use crate::render::primitives::{GpuMesh, MeshData};
use crate::render::shaders::{particle, ParticleShader};
use crate::scene::{Particle, ParticleTexture};

/// Model-view matrix of a billboard at `position`
///
/// The model rotation is the transpose of the view rotation, so the two
/// cancel and the quad faces the camera; `rotation` then rolls it around the
/// view axis (degrees) and `scale` sizes it.
pub fn billboard_model_view(view: &Mat4, position: &Vec3, rotation: f32, scale: f32) -> Mat4 {
    let mut model = Mat4::new_translation(position);
    let facing = view.fixed_view::<3, 3>(0, 0).transpose();
    model.fixed_view_mut::<3, 3>(0, 0).copy_from(&facing);

    view * model * Mat4::rotation_z(utils::deg_to_rad(rotation)) * Mat4::new_scaling(scale)
}

/// Draws the visible particles
#[derive(Debug)]
pub struct ParticleRenderer {
    shader: ParticleShader,
    quad: GpuMesh,
}

impl ParticleRenderer {
    /// Upload the quad and load the particle shader
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let data = MeshData::quad();
        let quad = GpuMesh::new(backend.upload_mesh(&data)?, data.index_count());
        let shader = ParticleShader::load(backend)?;
        {
            let mut bound = shader.program.bind(backend);
            particle::connect_texture_units(&mut bound, &shader);
        }
        Ok(Self { shader, quad })
    }

    /// Draw the particles at `visible` (indices into `particles`)
    pub fn render<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        view: &Mat4,
        projection: &Mat4,
        particles: &[Particle],
        visible: &[usize],
    ) -> usize {
        let groups = group_by_texture(particles, visible);
        if groups.is_empty() {
            return 0;
        }

        let shader = &self.shader;
        let mut bound = shader.program.bind(backend);
        particle::load_projection_matrix(&mut bound, shader, projection);
        bound.bind_mesh(self.quad.handle, 1);
        bound.enable(RenderState::BLEND);
        bound.disable(RenderState::DEPTH_WRITE);

        let mut drawn = 0;
        for (texture, members) in &groups {
            bound.set_blend_mode(if texture.additive { BlendMode::Additive } else { BlendMode::Alpha });
            bound.bind_texture(0, texture.texture);
            for p in members {
                let model_view = billboard_model_view(view, &p.position, p.rotation, p.scale);
                particle::load_model_view_matrix(&mut bound, shader, &model_view);
                particle::load_texture_coord_info(&mut bound, shader, p.texture_offsets(), texture.number_of_rows(), p.blend());
                bound.draw_indexed(self.quad.index_count);
                drawn += 1;
            }
        }

        bound.enable(RenderState::DEPTH_WRITE);
        bound.disable(RenderState::BLEND);
        bound.unbind_mesh();
        drawn
    }

    /// Release the shader and the billboard quad
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        self.shader.program.destroy(backend);
        backend.destroy_mesh(self.quad.handle);
    }
}

fn group_by_texture<'a>(particles: &'a [Particle], visible: &[usize]) -> Vec<(ParticleTexture, Vec<&'a Particle>)> {
    let mut groups: Vec<(ParticleTexture, Vec<&Particle>)> = Vec::new();
    let mut index: HashMap<ParticleTexture, usize> = HashMap::new();
    for p in visible.iter().filter_map(|&i| particles.get(i)) {
        let slot = *index.entry(p.texture).or_insert_with(|| {
            groups.push((p.texture, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(p);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use crate::render::api::TextureHandle;
    use crate::render::backends::{RecordingBackend, RenderCommand};
    use crate::render::primitives::Camera;
    use approx::assert_relative_eq;

    fn spark(texture: ParticleTexture, z: f32) -> Particle {
        Particle::new(texture, Vec3::new(0.0, 5.0, z), Vec3::zeros(), 0.0, 4.0, 0.0, 1.0)
    }

    #[test]
    fn test_billboard_faces_camera() {
        let camera = Camera::default().with_rotation(25.0, -60.0);
        let view = camera.view_matrix();
        let model_view = billboard_model_view(&view, &Vec3::new(3.0, 1.0, -8.0), 0.0, 2.0);

        let rotation = model_view.fixed_view::<3, 3>(0, 0).into_owned();
        assert_relative_eq!(rotation, nalgebra::Matrix3::<f32>::identity() * 2.0, epsilon = 1e-5);

        let eye = model_view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let expected = view * Vec4::new(3.0, 1.0, -8.0, 1.0);
        assert_relative_eq!(eye, expected, epsilon = 1e-4);
    }

    #[test]
    fn test_roll_rotates_in_screen_plane() {
        let view = Camera::default().view_matrix();
        let model_view = billboard_model_view(&view, &Vec3::zeros(), 90.0, 1.0);
        let corner = model_view * Vec4::new(1.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(corner, Vec4::new(0.0, 1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_groups_by_texture_and_sets_blend_mode() {
        let mut backend = RecordingBackend::new(800, 600);
        let renderer = ParticleRenderer::new(&mut backend).expect("particles");
        let fire = ParticleTexture::new(TextureHandle(30), 4).additive();
        let smoke = ParticleTexture::new(TextureHandle(31), 8);
        let particles = [spark(fire, -20.0), spark(smoke, -15.0), spark(fire, -10.0)];
        let camera = Camera::default();

        backend.take_commands();
        let drawn = renderer.render(
            &mut backend,
            &camera.view_matrix(),
            &camera.projection_matrix(),
            &particles,
            &[0, 1, 2],
        );
        assert_eq!(drawn, 3);

        let modes: Vec<BlendMode> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::SetBlendMode(mode) => Some(*mode),
                _ => None,
            })
            .collect();
        assert_eq!(modes, vec![BlendMode::Additive, BlendMode::Alpha]);

        let depth_off = backend
            .position_of(|c| *c == RenderCommand::Disable(RenderState::DEPTH_WRITE))
            .expect("depth writes disabled");
        let first_draw = backend
            .position_of(|c| matches!(c, RenderCommand::Draw { .. }))
            .expect("draw");
        assert!(depth_off < first_draw);
        assert!(backend.enabled_state().contains(RenderState::DEPTH_WRITE));
    }

    #[test]
    fn test_nothing_visible_draws_nothing() {
        let mut backend = RecordingBackend::new(800, 600);
        let renderer = ParticleRenderer::new(&mut backend).expect("particles");
        let camera = Camera::default();
        backend.take_commands();
        assert_eq!(
            renderer.render(&mut backend, &camera.view_matrix(), &camera.projection_matrix(), &[], &[]),
            0
        );
        assert!(backend.commands().is_empty());
    }
}
