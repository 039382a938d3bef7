//! Frame Rendering Data Structures
//!
//! Following Game Engine Architecture Chapter 8.2 - The Game Loop
//!
//! The application hands one [`RenderFrameData`] to the master renderer per
//! frame and receives [`FrameStats`] back describing what was drawn.

use crate::render::primitives::Camera;
use crate::scene::Scene;

/// Complete frame rendering data
///
/// Application provides this once per frame; renderer handles the complete
/// pass sequence internally.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrameData<'a> {
    /// Camera the frame is rendered from
    pub camera: &'a Camera,

    /// Everything that may be drawn this frame
    pub scene: &'a Scene,

    /// Seconds since the previous frame (drives skybox and water animation)
    pub delta_time: f32,
}

/// Counters gathered while rendering one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Entities (plain and normal-mapped) that survived culling
    pub visible_entities: usize,
    /// Terrain tiles that survived culling
    pub visible_terrains: usize,
    /// Water tiles that survived culling
    pub visible_water_tiles: usize,
    /// Particles that survived culling
    pub visible_particles: usize,
    /// Meshes drawn into the shadow map
    pub shadow_casters: usize,
    /// Scene passes executed (reflection, refraction, main)
    pub scene_passes: usize,
}
