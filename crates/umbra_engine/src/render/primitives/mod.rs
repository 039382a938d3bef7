//! Core primitive types for rendering
//!
//! This module contains fundamental data structures used throughout
//! the rendering system: meshes and vertices, the camera, and the per-frame
//! camera basis snapshot.

pub mod camera;
pub mod mesh;
pub mod orientation;

// Re-export commonly used types
pub use camera::Camera;
pub use mesh::{GpuMesh, MeshData, Vertex};
pub use orientation::{CameraOrientation, PlaneExtent};
