//! Simulated particles
//!
//! Particles are simple ballistic points with a limited life. Their texture is
//! an atlas of animation stages; as a particle ages it blends between the two
//! stages bracketing its current life fraction. Emission policies live in the
//! application; this module only advances existing particles.

use crate::foundation::math::{Vec2, Vec3};
use crate::scene::entity::atlas_offset;
use crate::render::api::TextureHandle;

/// Downward acceleration applied to particles, scaled by their gravity effect
pub const GRAVITY: f32 = -50.0;

/// Animated particle texture atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleTexture {
    /// Atlas texture
    pub texture: TextureHandle,

    /// Rows (and columns) in the atlas, never zero
    number_of_rows: u32,

    /// Blend additively instead of by alpha (fire, sparks)
    pub additive: bool,
}

impl ParticleTexture {
    /// Create an alpha-blended particle texture
    pub fn new(texture: TextureHandle, number_of_rows: u32) -> Self {
        Self {
            texture,
            number_of_rows: number_of_rows.max(1),
            additive: false,
        }
    }

    /// Rows (and columns) in the atlas
    pub fn number_of_rows(&self) -> u32 {
        self.number_of_rows
    }

    /// Switch to additive blending
    pub fn additive(mut self) -> Self {
        self.additive = true;
        self
    }
}

/// One live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Atlas the particle is drawn with
    pub texture: ParticleTexture,

    /// World position
    pub position: Vec3,

    /// Velocity in units per second
    pub velocity: Vec3,

    /// Multiplier on [`GRAVITY`]
    pub gravity_effect: f32,

    /// Total lifetime in seconds
    pub life_length: f32,

    /// Roll around the view axis in degrees
    pub rotation: f32,

    /// Billboard size
    pub scale: f32,

    elapsed_time: f32,
    camera_distance_squared: f32,
    texture_offset1: Vec2,
    texture_offset2: Vec2,
    blend: f32,
}

impl Particle {
    /// Spawn a particle
    pub fn new(
        texture: ParticleTexture,
        position: Vec3,
        velocity: Vec3,
        gravity_effect: f32,
        life_length: f32,
        rotation: f32,
        scale: f32,
    ) -> Self {
        Self {
            texture,
            position,
            velocity,
            gravity_effect,
            life_length,
            rotation,
            scale,
            elapsed_time: 0.0,
            camera_distance_squared: 0.0,
            texture_offset1: Vec2::zeros(),
            texture_offset2: Vec2::zeros(),
            blend: 0.0,
        }
    }

    /// Advance the simulation by `delta` seconds
    ///
    /// Returns `false` once the particle has outlived its life length.
    pub fn update(&mut self, delta: f32, camera_position: &Vec3) -> bool {
        self.velocity.y += GRAVITY * self.gravity_effect * delta;
        self.position += self.velocity * delta;
        self.camera_distance_squared = (camera_position - self.position).norm_squared();
        self.update_texture_coord_info();
        self.elapsed_time += delta;
        self.elapsed_time < self.life_length
    }

    fn update_texture_coord_info(&mut self) {
        let life_factor = if self.life_length > 0.0 {
            (self.elapsed_time / self.life_length).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let rows = self.texture.number_of_rows();
        let stage_count = rows * rows;
        let progression = life_factor * stage_count as f32;
        let index1 = (progression.floor() as u32).min(stage_count - 1);
        let index2 = if index1 < stage_count - 1 { index1 + 1 } else { index1 };

        self.blend = progression.fract();
        self.texture_offset1 = atlas_offset(index1, rows);
        self.texture_offset2 = atlas_offset(index2, rows);
    }

    /// Seconds since spawning
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Squared distance to the camera at the last update
    pub fn camera_distance_squared(&self) -> f32 {
        self.camera_distance_squared
    }

    /// Atlas offsets of the current and next animation stage
    pub fn texture_offsets(&self) -> (Vec2, Vec2) {
        (self.texture_offset1, self.texture_offset2)
    }

    /// Blend factor between the two stages
    pub fn blend(&self) -> f32 {
        self.blend
    }
}
