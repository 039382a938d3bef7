//! Public rendering API
//!
//! This module contains the high-level public API that users interact with:
//! the render backend capability traits and handles, the renderer
//! configuration, and the per-frame input bundle.

pub mod render_backend;
pub mod renderer_config;
pub mod frame_data;

// Re-export commonly used types
pub use render_backend::{
    RenderBackend, UniformSink, BackendResult, MeshHandle, TextureHandle, ProgramHandle,
    FramebufferHandle, UniformLocation, UniformValue, RenderState, ClearFlags, BlendMode,
    Viewport, ShaderDescriptor, FramebufferDescriptor, DepthAttachment,
};
pub use renderer_config::{RendererConfig, ShadowConfig, WaterConfig};
pub use frame_data::{RenderFrameData, FrameStats};
