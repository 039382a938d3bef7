//! # Umbra Engine
//!
//! A small real-time 3D rendering engine built around shadow mapping.
//!
//! ## Features
//!
//! - **Shadow Mapping**: A light-space box fitted to the visible part of the
//!   camera frustum every frame, rendered into a square depth map and sampled
//!   with PCF by every lit shader
//! - **Frustum Culling**: Entities, terrain, water and particles are culled
//!   against six inward-facing planes before any pass runs
//! - **Water**: Reflection and refraction targets rendered with clip planes
//!   from a mirrored camera
//! - **Backend Agnostic**: Renderers talk to a [`RenderBackend`](render::RenderBackend)
//!   trait; a recording backend runs everything headless
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use umbra_engine::prelude::*;
//! use umbra_engine::render::backends::RecordingBackend;
//!
//! struct MyApp;
//!
//! impl Application<RecordingBackend> for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine<RecordingBackend>) -> Result<(), AppError> {
//!         engine.scene.set_sun(Light::new(Vec3::new(1000.0, 5000.0, 1000.0), Vec3::new(1.0, 1.0, 1.0)));
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine<RecordingBackend>, delta_time: f32) -> Result<(), AppError> {
//!         engine.camera.move_relative(2.0 * delta_time, 0.0, 0.0);
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine<RecordingBackend>) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut backend = RecordingBackend::new(1280, 720);
//!     let textures = SceneTextures {
//!         skybox: backend.register_texture("sky"),
//!         water_dudv: backend.register_texture("waterDUDV"),
//!         water_normal: backend.register_texture("normalMap"),
//!     };
//!     let config = EngineConfig { max_frames: Some(60), ..EngineConfig::default() };
//!     let mut engine = Engine::new(backend, config, textures)?;
//!     engine.run(&mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod shadows;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineConfig, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::{
            math::{Mat4, Vec2, Vec3, Vec4},
            time::Timer,
        },
        render::{
            Camera, CameraOrientation, FrameStats, MasterRenderer, RenderBackend, RendererConfig, SceneTextures,
            ShadowConfig, WaterConfig,
        },
        scene::{Entity, Frustum, Light, ModelTexture, Scene, Terrain, TexturedModel, WaterTile},
        shadows::{ShadowBox, ShadowFrame},
        AppError, Application, Engine, EngineConfig, EngineError,
    };
}
