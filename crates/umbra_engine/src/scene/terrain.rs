//! Terrain tiles
//!
//! Terrain is laid out on a square grid of [`Terrain::SIZE`] world units per
//! tile. Each tile is textured with four tiling textures mixed by a blend map.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::TextureHandle;
use crate::render::primitives::GpuMesh;

/// The four tiling textures of a terrain tile
///
/// The blend map's black areas show `background`; its red, green and blue
/// channels select the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainTexturePack {
    /// Texture for black blend-map areas
    pub background: TextureHandle,
    /// Texture for the red channel
    pub r: TextureHandle,
    /// Texture for the green channel
    pub g: TextureHandle,
    /// Texture for the blue channel
    pub b: TextureHandle,
}

/// One terrain tile
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    /// World X of the tile's minimum corner
    pub x: f32,

    /// World Z of the tile's minimum corner
    pub z: f32,

    /// Uploaded grid mesh spanning `[0, SIZE]` on X and Z
    pub mesh: GpuMesh,

    /// Tiling textures
    pub textures: TerrainTexturePack,

    /// Blend map selecting between the tiling textures
    pub blend_map: TextureHandle,

    /// Largest absolute vertex height, used to size the culling sphere
    pub max_height: f32,
}

impl Terrain {
    /// Edge length of a tile in world units
    pub const SIZE: f32 = 800.0;

    /// Tile at grid cell (`grid_x`, `grid_z`)
    pub fn new(grid_x: i32, grid_z: i32, mesh: GpuMesh, textures: TerrainTexturePack, blend_map: TextureHandle) -> Self {
        Self {
            x: grid_x as f32 * Self::SIZE,
            z: grid_z as f32 * Self::SIZE,
            mesh,
            textures,
            blend_map,
            max_height: 0.0,
        }
    }

    /// Set the height extent of the tile's geometry
    pub fn with_max_height(mut self, max_height: f32) -> Self {
        self.max_height = max_height.abs();
        self
    }

    /// Model-to-world transform (translation only)
    pub fn transformation_matrix(&self) -> Mat4 {
        Mat4::new_translation(&Vec3::new(self.x, 0.0, self.z))
    }

    /// Centre of the culling sphere
    pub fn bounding_center(&self) -> Vec3 {
        let half = Self::SIZE / 2.0;
        Vec3::new(self.x + half, 0.0, self.z + half)
    }

    /// Radius of the culling sphere
    pub fn bounding_radius(&self) -> f32 {
        let half = Self::SIZE / 2.0;
        (2.0 * half * half + self.max_height * self.max_height).sqrt()
    }

    /// Whether world position (`world_x`, `world_z`) lies on this tile
    pub fn covers(&self, world_x: f32, world_z: f32) -> bool {
        (self.x..self.x + Self::SIZE).contains(&world_x) && (self.z..self.z + Self::SIZE).contains(&world_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::MeshHandle;
    use approx::assert_relative_eq;

    fn tile(grid_x: i32, grid_z: i32) -> Terrain {
        let texture = TextureHandle(1);
        let pack = TerrainTexturePack { background: texture, r: texture, g: texture, b: texture };
        Terrain::new(grid_x, grid_z, GpuMesh::new(MeshHandle(1), 6), pack, TextureHandle(2))
    }

    #[test]
    fn test_grid_placement() {
        let terrain = tile(-1, 2);
        assert_relative_eq!(terrain.x, -800.0);
        assert_relative_eq!(terrain.z, 1600.0);
        assert!(terrain.covers(-1.0, 1600.0));
        assert!(!terrain.covers(0.0, 1600.0));
    }

    #[test]
    fn test_bounding_sphere_encloses_corners() {
        let terrain = tile(0, 0).with_max_height(40.0);
        let center = terrain.bounding_center();
        for corner in [
            Vec3::new(0.0, 40.0, 0.0),
            Vec3::new(800.0, -40.0, 0.0),
            Vec3::new(0.0, 40.0, 800.0),
            Vec3::new(800.0, 0.0, 800.0),
        ] {
            assert!((corner - center).norm() <= terrain.bounding_radius() + 1e-3);
        }
    }
}
