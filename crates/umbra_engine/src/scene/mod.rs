//! Scene model and visibility
//!
//! Holds the drawable world (entities, terrain tiles, water tiles, particles,
//! lights and overlay elements) and answers the one question the renderers ask
//! of it each pass: what does this frustum see?
//!
//! ## Architecture
//!
//! ```text
//! Camera ──► CameraOrientation ──► Frustum
//!                                     │
//! Scene ──────── cull ◄───────────────┘
//!                  │
//!                  ▼
//!             VisibleSet ──► per-pass renderers
//! ```

mod entity;
mod frustum;
mod light;
mod model;
mod overlay;
mod particle;
mod terrain;
mod water;
mod world;

pub use entity::{atlas_offset, Entity};
pub use frustum::{Frustum, FrustumPlane, Plane};
pub use light::Light;
pub use model::{ModelTexture, TexturedModel};
pub use overlay::{GuiElement, TextMesh};
pub use particle::{Particle, ParticleTexture, GRAVITY};
pub use terrain::{Terrain, TerrainTexturePack};
pub use water::WaterTile;
pub use world::{EntityBatch, EntityKey, ModelKey, Scene, VisibleSet};
