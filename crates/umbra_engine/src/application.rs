//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::render::RenderBackend;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive a scene with the engine. The engine calls
/// [`initialize`](Self::initialize) once, then [`update`](Self::update) once
/// per frame before rendering, and [`cleanup`](Self::cleanup) once the loop
/// ends (also when it ends with an error).
pub trait Application<B: RenderBackend> {
    /// Initialize the application
    ///
    /// Called once before the first frame. Use this to upload meshes and
    /// populate [`Engine::scene`].
    fn initialize(&mut self, engine: &mut Engine<B>) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the scene is rendered.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine<B>, delta_time: f32) -> Result<(), AppError>;

    /// Whether the loop should stop after the frame just rendered
    fn should_close(&self, _engine: &Engine<B>) -> bool {
        false
    }

    /// Cleanup the application
    ///
    /// Called when the loop has ended (or initialization failed), before the
    /// engine releases renderer resources.
    fn cleanup(&mut self, engine: &mut Engine<B>);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(String),

    /// Game logic error
    #[error("Game logic error: {0}")]
    GameLogic(String),
}
