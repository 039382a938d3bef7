//! Water tiles

use crate::foundation::math::{Mat4, Vec3};

/// Square patch of water at a fixed height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterTile {
    /// World X of the tile centre
    pub center_x: f32,

    /// World Z of the tile centre
    pub center_z: f32,

    /// Height of the water surface
    pub height: f32,
}

impl WaterTile {
    /// Half the edge length of a tile
    pub const TILE_SIZE: f32 = 60.0;

    /// Create a tile
    pub fn new(center_x: f32, center_z: f32, height: f32) -> Self {
        Self {
            center_x,
            center_z,
            height,
        }
    }

    /// Centre of the tile surface
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.center_x, self.height, self.center_z)
    }

    /// Model matrix for the unit water quad
    pub fn transformation_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.center()) * Mat4::new_scaling(Self::TILE_SIZE)
    }

    /// Radius of the culling sphere
    pub fn bounding_radius(&self) -> f32 {
        Self::TILE_SIZE * std::f32::consts::SQRT_2
    }
}
