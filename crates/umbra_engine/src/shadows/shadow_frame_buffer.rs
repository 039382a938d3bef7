//! Depth-only render target of the shadow pass

use crate::render::api::{BackendResult, FramebufferDescriptor, FramebufferHandle, RenderBackend, TextureHandle};

/// Square depth framebuffer whose depth texture is sampled as the shadow map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowFrameBuffer {
    framebuffer: FramebufferHandle,
    depth_texture: TextureHandle,
    size: u32,
}

impl ShadowFrameBuffer {
    /// Allocate a `width` x `height` depth target
    ///
    /// # Panics
    /// If `width != height`; shadow maps are always square.
    pub fn new<B: RenderBackend + ?Sized>(backend: &mut B, width: u32, height: u32) -> BackendResult<Self> {
        assert_eq!(width, height, "shadow map must be square, got {width}x{height}");

        let framebuffer = backend.create_framebuffer(&FramebufferDescriptor::depth_only(width, height))?;
        let depth_texture = backend.depth_texture(framebuffer)?;
        log::info!("Created {}x{} shadow map", width, height);

        Ok(Self {
            framebuffer,
            depth_texture,
            size: width,
        })
    }

    /// Direct rendering into the shadow map, with a matching viewport
    pub fn bind_for_writing<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        backend.bind_framebuffer(self.framebuffer, self.size, self.size);
    }

    /// Return to the window framebuffer and its viewport
    pub fn unbind<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        let viewport = backend.default_viewport();
        backend.unbind_framebuffer(viewport);
    }

    /// The sampleable shadow map
    pub fn depth_texture(&self) -> TextureHandle {
        self.depth_texture
    }

    /// Edge length in texels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Release the framebuffer and its depth texture
    pub fn cleanup<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        backend.destroy_framebuffer(self.framebuffer);
    }
}
