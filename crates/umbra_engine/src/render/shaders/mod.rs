//! Logical shaders
//!
//! Each shader is a plain struct of uniform locations resolved once from a
//! [`ShaderProgram`], plus free functions that write values through any
//! [`UniformSink`](crate::render::api::UniformSink) (normally the
//! [`BoundProgram`] guard returned by [`ShaderProgram::bind`]).
//!
//! ```text
//! ShaderProgram ──bind──► BoundProgram ──► UniformSink ──► RenderBackend
//!       │
//!       └── uniform locations ──► EntityShader, TerrainShader, ...
//! ```

mod common;
mod program;

pub mod entity;
pub mod normal_map;
pub mod overlay;
pub mod particle;
pub mod shadow;
pub mod skybox;
pub mod terrain;
pub mod water;

pub use common::{LightUniforms, ShadowReceiverUniforms};
pub use entity::EntityShader;
pub use normal_map::NormalMapShader;
pub use overlay::{FontShader, OverlayShader};
pub use particle::ParticleShader;
pub use program::{BoundProgram, ShaderProgram};
pub use shadow::ShadowShader;
pub use skybox::SkyboxShader;
pub use terrain::{TerrainShader, TERRAIN_TEXTURE_UNITS};
pub use water::WaterShader;

/// Number of light slots in the lit shaders
pub const MAX_LIGHTS: usize = 4;

/// Texture unit the shadow map is bound to for every shadow-receiving shader
pub const SHADOW_MAP_UNIT: u32 = 5;

/// Texture unit of the normal map in the normal-mapping shader
pub const NORMAL_MAP_UNIT: u32 = 1;
