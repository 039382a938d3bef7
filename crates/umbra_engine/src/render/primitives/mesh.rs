//! Mesh representation for 3D models
//!
//! Geometry is kept CPU-side as [`MeshData`] until it is uploaded through a
//! [`RenderBackend`](crate::render::RenderBackend), after which renderers only
//! hold a [`GpuMesh`] (handle plus index count).
//!
//! A handful of procedural shapes live here as well: the cube used for props,
//! the inward-facing skybox cube, flat terrain grids and the unit quads used by
//! water tiles, particles and overlays. Loading meshes from files is the asset
//! layer's job and is not handled here.

use bytemuck::{Pod, Zeroable};

use crate::render::api::MeshHandle;

/// 3D vertex data structure for rendering
///
/// The `#[repr(C)]` layout is uploaded verbatim, so attribute locations are:
/// 0 = position, 1 = texture coordinates, 2 = normal, 3 = tangent.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],

    /// Normal vector
    pub normal: [f32; 3],

    /// Tangent vector for normal mapping
    pub tangent: [f32; 3],
}

impl Vertex {
    /// Number of attributes in the layout
    pub const ATTRIBUTE_COUNT: u32 = 4;

    /// Create a new vertex without a tangent
    pub fn new(position: [f32; 3], tex_coord: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            tex_coord,
            normal,
            tangent: [0.0, 0.0, 0.0],
        }
    }

    /// Create a new vertex with tangent
    pub fn with_tangent(mut self, tangent: [f32; 3]) -> Self {
        self.tangent = tangent;
        self
    }
}

/// CPU-side mesh containing vertices and triangle indices
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Debug name, forwarded to the backend
    pub name: String,

    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Index data for triangles
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create a new mesh
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    /// Raw vertex bytes ready for a vertex buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes ready for an index buffer upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of indices, as drawn by `draw_indexed`
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Radius of the smallest origin-centred sphere enclosing every vertex
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| {
                let [x, y, z] = v.position;
                (x * x + y * y + z * z).sqrt()
            })
            .fold(0.0, f32::max)
    }

    /// Unit cube centred at the origin with per-face normals
    pub fn cube() -> Self {
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            // (normal, u axis, v axis)
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = [
                    normal[0] + u[0] * su + v[0] * sv,
                    normal[1] + u[1] * su + v[1] * sv,
                    normal[2] + u[2] * su + v[2] * sv,
                ];
                let tex_coord = [(su + 1.0) * 0.5, (sv + 1.0) * 0.5];
                vertices.push(Vertex::new(position, tex_coord, normal).with_tangent(u));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::new("cube", vertices, indices)
    }

    /// Inward-facing cube for the skybox (positions only are meaningful)
    pub fn skybox(size: f32) -> Self {
        let corners = [
            [-size, -size, -size],
            [size, -size, -size],
            [size, size, -size],
            [-size, size, -size],
            [-size, -size, size],
            [size, -size, size],
            [size, size, size],
            [-size, size, size],
        ];
        let vertices = corners
            .iter()
            .map(|&p| Vertex::new(p, [0.0, 0.0], [0.0, 0.0, 0.0]))
            .collect();

        // Winding reversed so the faces are visible from inside
        let indices = vec![
            0, 2, 1, 2, 0, 3, // back
            4, 5, 6, 6, 7, 4, // front
            0, 4, 7, 7, 3, 0, // left
            1, 2, 6, 6, 5, 1, // right
            3, 7, 6, 6, 2, 3, // top
            0, 1, 5, 5, 4, 0, // bottom
        ];

        Self::new("skybox", vertices, indices)
    }

    /// Flat square grid in the XZ plane spanning `[0, size]` on both axes
    ///
    /// `vertex_count` vertices per edge; normals point up and texture
    /// coordinates span `[0, 1]` across the tile.
    pub fn terrain_grid(size: f32, vertex_count: u32) -> Self {
        let count = vertex_count.max(2);
        let step = 1.0 / (count - 1) as f32;

        let mut vertices = Vec::with_capacity((count * count) as usize);
        for row in 0..count {
            for col in 0..count {
                let u = col as f32 * step;
                let v = row as f32 * step;
                vertices.push(
                    Vertex::new([u * size, 0.0, v * size], [u, v], [0.0, 1.0, 0.0]).with_tangent([1.0, 0.0, 0.0]),
                );
            }
        }

        let mut indices = Vec::with_capacity(((count - 1) * (count - 1) * 6) as usize);
        for row in 0..count - 1 {
            for col in 0..count - 1 {
                let top_left = row * count + col;
                let top_right = top_left + 1;
                let bottom_left = (row + 1) * count + col;
                let bottom_right = bottom_left + 1;
                indices.extend_from_slice(&[top_left, bottom_left, top_right, top_right, bottom_left, bottom_right]);
            }
        }

        Self::new("terrain_grid", vertices, indices)
    }

    /// Unit quad in the XY plane spanning `[-1, 1]`, facing +Z
    ///
    /// Used by overlays and particles (billboarded in the vertex shader).
    pub fn quad() -> Self {
        let vertices = vec![
            Vertex::new([-1.0, 1.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]),
            Vertex::new([-1.0, -1.0, 0.0], [0.0, 1.0], [0.0, 0.0, 1.0]),
            Vertex::new([1.0, 1.0, 0.0], [1.0, 0.0], [0.0, 0.0, 1.0]),
            Vertex::new([1.0, -1.0, 0.0], [1.0, 1.0], [0.0, 0.0, 1.0]),
        ];
        Self::new("quad", vertices, vec![0, 1, 2, 2, 1, 3])
    }

    /// Unit quad in the XZ plane spanning `[-1, 1]`, facing +Y (water tiles)
    pub fn water_quad() -> Self {
        let vertices = vec![
            Vertex::new([-1.0, 0.0, -1.0], [0.0, 0.0], [0.0, 1.0, 0.0]),
            Vertex::new([-1.0, 0.0, 1.0], [0.0, 1.0], [0.0, 1.0, 0.0]),
            Vertex::new([1.0, 0.0, -1.0], [1.0, 0.0], [0.0, 1.0, 0.0]),
            Vertex::new([1.0, 0.0, 1.0], [1.0, 1.0], [0.0, 1.0, 0.0]),
        ];
        Self::new("water_quad", vertices, vec![0, 1, 2, 2, 1, 3])
    }
}

/// Mesh that has been uploaded to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuMesh {
    /// Backend handle of the vertex/index buffers
    pub handle: MeshHandle,

    /// Number of indices to draw
    pub index_count: u32,
}

impl GpuMesh {
    /// Wrap an uploaded mesh
    pub fn new(handle: MeshHandle, index_count: u32) -> Self {
        Self { handle, index_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 11 * 4);
        let mesh = MeshData::quad();
        assert_eq!(mesh.vertex_bytes().len(), mesh.vertices.len() * 44);
        assert_eq!(mesh.index_bytes().len(), mesh.indices.len() * 4);
    }

    #[test]
    fn test_cube_has_outward_face_normals() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.index_count(), 36);
        for vertex in &cube.vertices {
            let dot: f32 = (0..3).map(|i| vertex.position[i] * vertex.normal[i]).sum();
            assert!((dot - 1.0).abs() < 1e-6, "normal must point out of its face");
        }
    }

    #[test]
    fn test_terrain_grid_dimensions() {
        let grid = MeshData::terrain_grid(800.0, 4);
        assert_eq!(grid.vertices.len(), 16);
        assert_eq!(grid.index_count(), 3 * 3 * 6);
        let last = grid.vertices.last().expect("grid has vertices");
        assert_eq!(last.position, [800.0, 0.0, 800.0]);
        assert!(grid.indices.iter().all(|&i| i < 16));
    }

    #[test]
    fn test_bounding_radius() {
        let cube = MeshData::cube();
        assert!((cube.bounding_radius() - 3.0_f32.sqrt()).abs() < 1e-6);
    }
}
