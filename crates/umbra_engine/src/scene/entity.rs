//! Placed instances of textured models

use crate::foundation::math::{utils, Mat4, Vec2, Vec3};
use crate::scene::ModelKey;

/// One instance of a [`TexturedModel`](crate::scene::TexturedModel) in the world
///
/// Rotation is stored as Euler angles in degrees and applied X, then Y, then Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    /// Model drawn for this entity
    pub model: ModelKey,

    /// World position
    pub position: Vec3,

    /// Euler rotation in degrees
    pub rotation: Vec3,

    /// Uniform scale
    pub scale: f32,

    /// Cell of the model's texture atlas
    pub texture_index: u32,
}

impl Entity {
    /// Create an entity at `position` with no rotation and unit scale
    pub fn new(model: ModelKey, position: Vec3) -> Self {
        Self {
            model,
            position,
            rotation: Vec3::zeros(),
            scale: 1.0,
            texture_index: 0,
        }
    }

    /// Set the Euler rotation in degrees
    pub fn with_rotation(mut self, rx: f32, ry: f32, rz: f32) -> Self {
        self.rotation = Vec3::new(rx, ry, rz);
        self
    }

    /// Set the uniform scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Select an atlas cell
    pub fn with_texture_index(mut self, texture_index: u32) -> Self {
        self.texture_index = texture_index;
        self
    }

    /// Move by `delta`
    pub fn increase_position(&mut self, delta: &Vec3) {
        self.position += delta;
    }

    /// Rotate by `delta` degrees per axis
    pub fn increase_rotation(&mut self, delta: &Vec3) {
        self.rotation += delta;
    }

    /// Model-to-world transform
    pub fn transformation_matrix(&self) -> Mat4 {
        utils::create_transformation_matrix(
            &self.position,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
            self.scale,
        )
    }

    /// Atlas offset of the selected cell for an atlas with `number_of_rows` rows
    pub fn texture_offset(&self, number_of_rows: u32) -> Vec2 {
        atlas_offset(self.texture_index, number_of_rows)
    }
}

/// Top-left UV of cell `index` in a square atlas with `rows` rows
pub fn atlas_offset(index: u32, rows: u32) -> Vec2 {
    let rows = rows.max(1);
    let column = index % rows;
    let row = index / rows;
    Vec2::new(column as f32 / rows as f32, row as f32 / rows as f32)
}
