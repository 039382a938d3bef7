//! # Rendering System
//!
//! This module provides the rendering layer of the engine: backend capability
//! traits, scene-independent primitives, the logical shaders, one renderer
//! per pass and the [`MasterRenderer`] that sequences them each frame.
//!
//! ## Architecture
//!
//! The rendering system is designed with clear separation of concerns:
//! - **API**: Backend traits, opaque handles, configuration and frame data
//! - **Primitives**: Camera, camera orientation and CPU-side meshes
//! - **Shaders**: Cached uniform locations plus upload functions per program
//! - **Renderers**: Entity, normal-mapped entity, terrain, skybox, water,
//!   particle and overlay passes
//! - **Backends**: Implementations of [`RenderBackend`]; the recording backend
//!   doubles as the test harness
//!
//! ## Frame Sequence
//!
//! ```text
//! cull ─► shadow pass ─► water reflection ─► water refraction ─► main scene
//!                                                                     │
//!                              overlay ◄─ particles ◄─ water surface ◄┘
//! ```
//!
//! The shadow map is complete before any pass samples it, and both water
//! targets are complete before the water surface is drawn.

pub mod api;
pub mod backends;
pub mod primitives;
pub mod renderers;
pub mod shaders;

mod master_renderer;

pub use api::{
    BackendResult, FrameStats, MeshHandle, RenderBackend, RenderFrameData, RendererConfig, ShadowConfig,
    TextureHandle, UniformSink, WaterConfig,
};
pub use master_renderer::{MasterRenderer, SceneTextures};
pub use primitives::{Camera, CameraOrientation, GpuMesh, MeshData, Vertex};

use thiserror::Error;

use crate::config::ConfigError;

/// High-level rendering error types
///
/// Represents errors that can occur during rendering operations, abstracted
/// from specific graphics API error types to maintain library-agnostic design.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// Resource creation or management failed
    ///
    /// Occurs when GPU resources (buffers, textures, shaders, framebuffers)
    /// cannot be created, typically due to memory constraints or invalid data.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A handle did not refer to a live backend resource
    #[error("Unknown {kind} handle {id}")]
    UnknownHandle {
        /// Resource kind ("program", "mesh", ...)
        kind: &'static str,
        /// Raw handle value
        id: u64,
    },

    /// A shader program has no active uniform with this name
    #[error("Uniform '{name}' not found in program '{program}'")]
    UniformNotFound {
        /// Program debug name
        program: String,
        /// Uniform name
        name: String,
    },

    /// Renderer configuration was rejected
    #[error("Invalid renderer configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Backend-specific error occurred
    ///
    /// Wraps backend-specific errors in a generic form for consistent error
    /// handling across different graphics backends.
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
