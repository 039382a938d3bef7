//! Core engine implementation
//!
//! [`Engine`] owns the render backend, the scene, the camera and the
//! [`MasterRenderer`], and drives the single-threaded frame loop:
//!
//! ```text
//! initialize ─► ┌─ timer ─► app.update ─► particles ─► render_frame ─► should_close? ─┐
//!               └──────────────────────────── no ◄──────────────────────────────────────┘
//!                                                   yes ─► app.cleanup ─► release GPU resources
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::Application;
use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::foundation::time::Timer;
use crate::render::{
    Camera, FrameStats, MasterRenderer, RenderBackend, RenderError, RenderFrameData, RendererConfig, SceneTextures,
};
use crate::scene::Scene;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Renderer configuration
    pub renderer: RendererConfig,

    /// Where the camera starts
    pub camera_position: Vec3,

    /// Stop after this many frames (headless runs and tests)
    pub max_frames: Option<u64>,

    /// Use this delta instead of wall-clock time (deterministic runs)
    pub fixed_delta: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            camera_position: Vec3::new(0.0, 5.0, 0.0),
            max_frames: None,
            fixed_delta: None,
        }
    }
}

impl Config for EngineConfig {}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Rendering error
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The renderer was already released
    #[error("Renderer has been shut down")]
    RendererShutDown,
}

/// Main engine struct
///
/// The engine coordinates the scene, the camera and the renderer, and manages
/// the main loop.
pub struct Engine<B: RenderBackend> {
    backend: B,
    renderer: Option<MasterRenderer>,

    /// Everything that may be drawn
    pub scene: Scene,

    /// Camera the scene is rendered from
    pub camera: Camera,

    timer: Timer,
    config: EngineConfig,
    running: bool,
    frames_rendered: u64,
    last_stats: FrameStats,
}

impl<B: RenderBackend> Engine<B> {
    /// Create a new engine around `backend`
    ///
    /// The camera's aspect ratio is taken from the backend's window.
    pub fn new(mut backend: B, config: EngineConfig, textures: SceneTextures) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");

        let renderer = MasterRenderer::new(&mut backend, config.renderer.clone(), textures).map_err(|e| match e {
            RenderError::InvalidConfig(config_error) => EngineError::Config(config_error),
            other => EngineError::InitializationFailed(format!("Master renderer: {}", other)),
        })?;

        let aspect = backend.default_viewport().aspect_ratio();
        let rc = &config.renderer;
        let camera = Camera::perspective(config.camera_position, rc.fov_degrees, aspect, rc.near_plane, rc.far_plane);

        Ok(Self {
            backend,
            renderer: Some(renderer),
            scene: Scene::new(),
            camera,
            timer: Timer::new(),
            config,
            running: true,
            frames_rendered: 0,
            last_stats: FrameStats::default(),
        })
    }

    /// Run the main loop with the given application
    ///
    /// Returns once the application asks to close (or `max_frames` is
    /// reached). Renderer resources are released before returning, also when
    /// the application fails during initialization or mid-loop.
    pub fn run<T: Application<B>>(&mut self, app: &mut T) -> Result<(), EngineError> {
        let result = match app.initialize(self) {
            Ok(()) => {
                log::info!("Starting main loop...");
                self.main_loop(app)
            }
            Err(e) => {
                log::error!("Application failed to initialize: {}", e);
                Err(EngineError::ApplicationError(format!("App initialization: {}", e)))
            }
        };

        app.cleanup(self);
        self.shutdown();

        log::info!(
            "Engine shutdown complete after {} frames ({:.1} fps average)",
            self.frames_rendered,
            self.timer.average_fps()
        );
        result
    }

    fn main_loop<T: Application<B>>(&mut self, app: &mut T) -> Result<(), EngineError> {
        while self.running {
            self.timer.update();
            let delta_time = self.config.fixed_delta.unwrap_or_else(|| self.timer.delta_time());

            app.update(self, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;

            let camera_position = self.camera.position;
            self.scene.update_particles(delta_time, &camera_position);
            self.render_frame(delta_time)?;

            let frame_limit = self.config.max_frames.is_some_and(|max| self.frames_rendered >= max);
            if frame_limit || app.should_close(self) {
                self.running = false;
            }
        }
        Ok(())
    }

    /// Render the scene once from the current camera
    pub fn render_frame(&mut self, delta_time: f32) -> Result<FrameStats, EngineError> {
        let renderer = self.renderer.as_mut().ok_or(EngineError::RendererShutDown)?;
        let frame = RenderFrameData {
            camera: &self.camera,
            scene: &self.scene,
            delta_time,
        };
        self.last_stats = renderer.render_frame(&mut self.backend, &frame);
        self.frames_rendered += 1;
        Ok(self.last_stats)
    }

    /// Release renderer resources; later frames fail with [`EngineError::RendererShutDown`]
    pub fn shutdown(&mut self) {
        self.running = false;
        if let Some(renderer) = self.renderer.take() {
            renderer.cleanup(&mut self.backend);
        }
    }

    /// Request the loop to stop after the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// The render backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the render backend (uploading meshes, registering textures)
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The master renderer, unless it has been shut down
    pub fn renderer(&self) -> Option<&MasterRenderer> {
        self.renderer.as_ref()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Counters of the most recent frame
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Frames rendered so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Whether the main loop is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Consume the engine and hand back the backend
    pub fn into_backend(mut self) -> B {
        self.shutdown();
        self.backend
    }
}
