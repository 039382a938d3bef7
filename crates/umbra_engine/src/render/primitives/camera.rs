//! # 3D Camera System
//!
//! First-person camera described by a world position and Euler angles, with
//! OpenGL-style perspective projection.
//!
//! ## Design Principles
//! - **Library-agnostic**: No backend dependencies in camera math
//! - **Cheap to copy**: Reflection passes work on a mirrored copy
//! - **Mathematical correctness**: Right-handed view space, camera looks down -Z

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3, Vec4};
use crate::render::primitives::CameraOrientation;

/// 3D perspective camera
///
/// # Coordinate System
/// Uses a right-handed Y-up world. In view space:
/// - X+ = Right
/// - Y+ = Up
/// - Z- = Forward
///
/// `pitch` rotates about the view X axis (positive looks down) and `yaw`
/// about the world Y axis (positive turns right), both in degrees. The view
/// matrix is `Rx(pitch) * Ry(yaw) * T(-position)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Rotation about the X axis in degrees
    pub pitch: f32,

    /// Rotation about the Y axis in degrees
    pub yaw: f32,

    /// Vertical field of view in degrees
    pub fov_degrees: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera looking down -Z
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    ///
    /// # Example
    /// ```rust
    /// use umbra_engine::foundation::math::Vec3;
    /// use umbra_engine::render::primitives::Camera;
    ///
    /// let camera = Camera::perspective(Vec3::new(0.0, 5.0, 0.0), 70.0, 16.0 / 9.0, 0.1, 1000.0);
    /// assert_eq!(camera.pitch, 0.0);
    /// ```
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            pitch: 0.0,
            yaw: 0.0,
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    /// Set the Euler angles in degrees
    pub fn with_rotation(mut self, pitch: f32, yaw: f32) -> Self {
        self.pitch = pitch;
        self.yaw = yaw;
        self
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Update the aspect ratio after a resize
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Move along the horizontal forward direction and strafe sideways
    pub fn move_relative(&mut self, forward: f32, right: f32, up: f32) {
        let yaw = utils::deg_to_rad(self.yaw);
        let forward_dir = Vec3::new(yaw.sin(), 0.0, -yaw.cos());
        let right_dir = Vec3::new(yaw.cos(), 0.0, yaw.sin());
        self.position += forward_dir * forward + right_dir * right + Vec3::y() * up;
    }

    /// Negate the pitch (used when mirroring the camera about a water plane)
    pub fn invert_pitch(&mut self) {
        self.pitch = -self.pitch;
    }

    /// Copy of this camera mirrored about the horizontal plane `y = height`
    ///
    /// The reflection pass renders the scene from this camera so the result can be
    /// projected onto the water surface.
    pub fn mirrored_about(&self, height: f32) -> Self {
        let mut mirrored = *self;
        mirrored.position.y -= 2.0 * (self.position.y - height);
        mirrored.invert_pitch();
        mirrored
    }

    /// World-to-view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::rotation_x(utils::deg_to_rad(self.pitch))
            * Mat4::rotation_y(utils::deg_to_rad(self.yaw))
            * Mat4::new_translation(&-self.position)
    }

    /// View-to-clip transform
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(utils::deg_to_rad(self.fov_degrees), self.aspect, self.near, self.far)
    }

    /// Combined `projection * view`
    pub fn projection_view_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vector the camera looks along, in world space
    pub fn look_direction(&self) -> Vec3 {
        let forward = self.view_matrix().transpose() * Vec4::new(0.0, 0.0, -1.0, 0.0);
        forward.xyz().normalize()
    }

    /// Basis snapshot for culling and shadow-volume fitting this frame
    pub fn orientation(&self) -> CameraOrientation {
        CameraOrientation::new(self.position, &self.view_matrix(), self.fov_degrees, self.near, self.aspect)
    }
}

impl Default for Camera {
    /// Standing a little above the origin, looking down -Z with a 70° field of view
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 5.0, 0.0), 70.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert_relative_eq!(camera.look_direction(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_positive_yaw_turns_right() {
        let camera = Camera::default().with_rotation(0.0, 90.0);
        assert_relative_eq!(camera.look_direction(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_positive_pitch_looks_down() {
        let camera = Camera::default().with_rotation(30.0, 0.0);
        assert!(camera.look_direction().y < 0.0);
    }

    #[test]
    fn test_view_matrix_moves_camera_to_origin() {
        let camera = Camera::perspective(Vec3::new(4.0, 2.0, -3.0), 70.0, 1.0, 0.1, 100.0)
            .with_rotation(20.0, -45.0);
        let eye = camera.view_matrix() * Vec4::new(4.0, 2.0, -3.0, 1.0);
        assert_relative_eq!(eye, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_mirrored_camera() {
        let camera = Camera::perspective(Vec3::new(1.0, 12.0, 2.0), 70.0, 1.0, 0.1, 100.0)
            .with_rotation(25.0, 10.0);
        let mirrored = camera.mirrored_about(2.0);
        assert_relative_eq!(mirrored.position, Vec3::new(1.0, -8.0, 2.0));
        assert_relative_eq!(mirrored.pitch, -25.0);
        assert_relative_eq!(mirrored.yaw, 10.0);
    }

    #[test]
    fn test_move_relative_follows_yaw() {
        let mut camera = Camera::default().with_rotation(0.0, 90.0);
        camera.move_relative(2.0, 0.0, 0.0);
        assert_relative_eq!(camera.position, Vec3::new(2.0, 5.0, 0.0), epsilon = 1e-5);
    }
}
