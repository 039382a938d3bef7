//! Shadow mapping
//!
//! ```text
//! CameraOrientation ─┐
//!                    ├─► compute_shadow_frame ─► ShadowFrame ─► shadow-receiving shaders
//! sun Light ─────────┤          │
//!                    │          └─► ShadowBox (refit in light space)
//!                    └─► ShadowMapRenderer ─► depth texture (shadow map)
//! ```
//!
//! The light is treated as directional, shining along the negation of its
//! position. Everything is recomputed from scratch each frame.

mod shadow_box;
mod shadow_frame;
mod shadow_frame_buffer;
mod shadow_map_renderer;

pub use shadow_box::{frustum_corners, LightSpaceBounds, ShadowBox};
pub use shadow_frame::{compute_shadow_frame, light_angles, light_rotation, ShadowFrame};
pub use shadow_frame_buffer::ShadowFrameBuffer;
pub use shadow_map_renderer::ShadowMapRenderer;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::api::{RenderBackend, RenderState, ShadowConfig, TextureHandle};
    use crate::render::backends::{RecordingBackend, RenderCommand};
    use crate::render::primitives::{Camera, GpuMesh, MeshData};
    use crate::scene::{Entity, Frustum, Light, ModelTexture, Scene, TexturedModel};

    fn scene_with(backend: &mut RecordingBackend, transparent: bool) -> Scene {
        let mesh = backend.upload_mesh(&MeshData::cube()).expect("upload cube");
        let texture = ModelTexture::new(TextureHandle(900)).with_transparency(transparent);
        let mut scene = Scene::new();
        let model = scene.add_model(TexturedModel::new(GpuMesh::new(mesh, 36), texture, 1.8));
        scene.add_entity(Entity::new(model, Vec3::new(0.0, 0.0, -10.0)));
        scene.add_entity(Entity::new(model, Vec3::new(2.0, 0.0, -30.0)));
        scene.set_sun(Light::new(Vec3::new(2000.0, 8000.0, 3000.0), Vec3::new(1.0, 1.0, 1.0)));
        scene
    }

    fn run_pass(transparent: bool) -> (RecordingBackend, ShadowMapRenderer, ShadowFrame) {
        let mut backend = RecordingBackend::new(1280, 720);
        let scene = scene_with(&mut backend, transparent);
        let config = ShadowConfig::default().with_map_size(1024);
        let mut renderer = ShadowMapRenderer::new(&mut backend, &config).expect("shadow renderer");

        let camera = Camera::perspective(Vec3::zeros(), 70.0, 16.0 / 9.0, 0.1, 1000.0);
        let orientation = camera.orientation();
        let visible = scene.cull(&Frustum::new(&orientation, 1000.0));
        let sun = *scene.sun().expect("sun");
        let frame = renderer.render(&mut backend, &orientation, &sun, &scene, &visible);
        (backend, renderer, frame)
    }

    #[test]
    fn test_pass_draws_into_shadow_map_and_restores_viewport() {
        let (backend, renderer, _) = run_pass(false);
        assert_eq!(renderer.caster_count(), 2);

        let bind = backend
            .position_of(|c| matches!(c, RenderCommand::BindFramebuffer { width: 1024, height: 1024, .. }))
            .expect("shadow framebuffer bound");
        let unbind = backend
            .position_of(|c| matches!(c, RenderCommand::UnbindFramebuffer(_)))
            .expect("shadow framebuffer unbound");
        let draws: Vec<usize> = backend
            .commands()
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, RenderCommand::Draw { .. }))
            .map(|(i, _)| i)
            .collect();

        assert_eq!(draws.len(), 2);
        assert!(draws.iter().all(|&i| i > bind && i < unbind));
        assert_eq!(backend.viewport(), backend.default_viewport());
        assert_eq!(backend.bound_framebuffer(), None);
    }

    #[test]
    fn test_transparent_models_are_drawn_double_sided() {
        let (backend, _, _) = run_pass(true);
        let disable = backend
            .position_of(|c| *c == RenderCommand::Disable(RenderState::CULL_BACK_FACES))
            .expect("culling disabled");
        let first_draw = backend
            .position_of(|c| matches!(c, RenderCommand::Draw { .. }))
            .expect("draw");
        let enable = backend
            .last_position_of(|c| *c == RenderCommand::Enable(RenderState::CULL_BACK_FACES))
            .expect("culling restored");
        assert!(disable < first_draw && first_draw < enable);

        let (opaque, _, _) = run_pass(false);
        assert!(opaque
            .position_of(|c| *c == RenderCommand::Disable(RenderState::CULL_BACK_FACES))
            .is_none());

        // a fresh backend has culling off, so the pass must turn it on itself
        let cull_on = opaque
            .position_of(|c| matches!(c, RenderCommand::Enable(s) if s.contains(RenderState::CULL_BACK_FACES)))
            .expect("culling enabled");
        let first_opaque_draw = opaque
            .position_of(|c| matches!(c, RenderCommand::Draw { .. }))
            .expect("draw");
        assert!(cull_on < first_opaque_draw);
        assert!(opaque.enabled_state().contains(RenderState::CULL_BACK_FACES));
    }

    #[test]
    fn test_mvp_uploaded_before_each_draw() {
        let (backend, _, frame) = run_pass(false);
        let commands = backend.commands();
        for (i, command) in commands.iter().enumerate() {
            if matches!(command, RenderCommand::Draw { .. }) {
                let RenderCommand::Uniform { name, .. } = &commands[i - 1] else {
                    panic!("draw without a preceding uniform upload");
                };
                assert_eq!(name, "mvpMatrix");
            }
        }
        assert!(frame.pitch > 0.0);
    }

    #[test]
    #[should_panic(expected = "shadow map must be square")]
    fn test_non_square_shadow_map_panics() {
        let mut backend = RecordingBackend::new(800, 600);
        let _ = ShadowMapRenderer::with_map_size(&mut backend, &ShadowConfig::default(), 2048, 1024);
    }

    #[test]
    fn test_cleanup_releases_resources() {
        let (mut backend, renderer, _) = run_pass(false);
        assert_eq!(backend.live_framebuffers(), 1);
        renderer.cleanup(&mut backend);
        assert_eq!(backend.live_framebuffers(), 0);
        assert_eq!(backend.live_programs(), 0);
    }
}
