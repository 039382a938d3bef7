//! Camera basis snapshot
//!
//! [`CameraOrientation`] freezes the camera's world-space axes and near-plane
//! extents for one frame. Frustum culling and shadow-volume fitting both build
//! on it, so they always agree on what the camera sees.

use crate::foundation::math::{utils, Mat4, Vec3};

/// Width and height of a plane slice through the view volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneExtent {
    /// Extent along the camera's right axis
    pub width: f32,
    /// Extent along the camera's up axis
    pub height: f32,
}

/// Immutable per-frame camera basis
///
/// The axes are read from the rotation block of the view matrix: row 0 is the
/// camera's right axis in world space, row 1 its up axis and row 2 points
/// backwards, so `look_at` is the negated third row. `left` and `down` are the
/// negations of `right` and `up`.
///
/// Extents follow `h = 2 * d * tan(fov / 2)` and `w = aspect * h` at distance
/// `d`; consumers offset by half of these values to reach the plane edges.
///
/// A view matrix with a zero-length basis row yields NaN axes; callers are
/// expected to pass proper rigid transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOrientation {
    /// Camera position in world space
    pub position: Vec3,
    /// Viewing direction
    pub look_at: Vec3,
    /// Camera up axis
    pub up: Vec3,
    /// Camera right axis
    pub right: Vec3,
    /// Negated up axis
    pub down: Vec3,
    /// Negated right axis
    pub left: Vec3,
    /// Centre of the near clipping plane
    pub near_center: Vec3,
    /// Near plane extent along `up`
    pub h_near: f32,
    /// Near plane extent along `right`
    pub w_near: f32,
    /// Distance to the near plane
    pub near: f32,
    tan_half_fov: f32,
    aspect_ratio: f32,
}

impl CameraOrientation {
    /// Derive the basis from a view matrix and projection parameters
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `view_matrix` - World-to-view transform of the same camera
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `near` - Near clipping distance
    /// * `aspect_ratio` - Viewport width / height
    pub fn new(position: Vec3, view_matrix: &Mat4, fov_degrees: f32, near: f32, aspect_ratio: f32) -> Self {
        let right = Vec3::new(view_matrix[(0, 0)], view_matrix[(0, 1)], view_matrix[(0, 2)]).normalize();
        let up = Vec3::new(view_matrix[(1, 0)], view_matrix[(1, 1)], view_matrix[(1, 2)]).normalize();
        let look_at = -Vec3::new(view_matrix[(2, 0)], view_matrix[(2, 1)], view_matrix[(2, 2)]).normalize();

        let tan_half_fov = (utils::deg_to_rad(fov_degrees) / 2.0).tan();
        let h_near = 2.0 * near * tan_half_fov;
        let w_near = aspect_ratio * h_near;

        Self {
            position,
            look_at,
            up,
            right,
            down: -up,
            left: -right,
            near_center: position + look_at * near,
            h_near,
            w_near,
            near,
            tan_half_fov,
            aspect_ratio,
        }
    }

    /// Plane extents at `distance` along the view direction
    pub fn far(&self, distance: f32) -> PlaneExtent {
        let height = 2.0 * distance * self.tan_half_fov;
        PlaneExtent {
            width: self.aspect_ratio * height,
            height,
        }
    }

    /// Centre of the plane at `distance` along the view direction
    pub fn far_center(&self, distance: f32) -> Vec3 {
        self.position + self.look_at * distance
    }

    /// Near plane extents
    pub fn near_extent(&self) -> PlaneExtent {
        PlaneExtent {
            width: self.w_near,
            height: self.h_near,
        }
    }

    /// Viewport aspect ratio the snapshot was built with
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}
