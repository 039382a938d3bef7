//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics. All matrices follow
//! nalgebra's column-vector convention (`v' = M * v`) and OpenGL-style clip
//! space (right-handed view space, camera looking down -Z, NDC depth in [-1, 1]).

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Mat4Ext, Vec2, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Build a model matrix from a translation, Euler rotations in degrees and a uniform scale
    ///
    /// Rotations are applied X, then Y, then Z in the model's local frame:
    /// `T * Rx * Ry * Rz * S`.
    pub fn create_transformation_matrix(translation: &Vec3, rx: f32, ry: f32, rz: f32, scale: f32) -> Mat4 {
        Mat4::new_translation(translation)
            * Mat4::rotation_x(deg_to_rad(rx))
            * Mat4::rotation_y(deg_to_rad(ry))
            * Mat4::rotation_z(deg_to_rad(rz))
            * Mat4::new_scaling(scale)
    }

    /// Build a 2D overlay transform (translation in NDC, non-uniform scale)
    pub fn create_overlay_matrix(translation: &Vec2, scale: &Vec2) -> Mat4 {
        Mat4::new_translation(&Vec3::new(translation.x, translation.y, 0.0))
            * Mat4::new_nonuniform_scaling(&Vec3::new(scale.x, scale.y, 1.0))
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis (radians)
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis (radians)
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis (radians)
    fn rotation_z(angle: f32) -> Mat4;

    /// Create an OpenGL-style perspective projection matrix
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection centred on the origin with the given box extents
    ///
    /// Only the diagonal is populated (`2/w`, `2/h`, `-2/l`, `1`); the box is expected
    /// to have been centred on the origin by the view matrix.
    fn orthographic_box(width: f32, height: f32, length: f32) -> Mat4;

    /// Create the bias matrix mapping NDC `[-1, 1]` into texture space `[0, 1]`
    fn ndc_to_texture_bias() -> Mat4;

    /// Return a copy of this matrix with its translation column cleared
    fn without_translation(&self) -> Mat4;

    /// Inverse of a rotation-plus-translation matrix
    ///
    /// Uses the transpose of the rotation block, so the result is only
    /// meaningful for rigid transforms such as view matrices.
    fn rigid_inverse(&self) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        // P = [1/(a·tan(φ/2))  0            0              0            ]
        //     [0               1/tan(φ/2)   0              0            ]
        //     [0               0            -(f+n)/(f-n)   -2fn/(f-n)   ]
        //     [0               0            -1             0            ]
        let y_scale = 1.0 / (fov_y * 0.5).tan();
        let x_scale = y_scale / aspect;
        let frustum_length = far - near;

        let mut result = Mat4::zeros();
        result[(0, 0)] = x_scale;
        result[(1, 1)] = y_scale;
        result[(2, 2)] = -((far + near) / frustum_length);
        result[(2, 3)] = -((2.0 * near * far) / frustum_length);
        result[(3, 2)] = -1.0;
        result
    }

    fn orthographic_box(width: f32, height: f32, length: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result[(0, 0)] = 2.0 / width;
        result[(1, 1)] = 2.0 / height;
        result[(2, 2)] = -2.0 / length;
        result[(3, 3)] = 1.0;
        result
    }

    fn ndc_to_texture_bias() -> Mat4 {
        Mat4::new_translation(&Vec3::new(0.5, 0.5, 0.5)) * Mat4::new_scaling(0.5)
    }

    fn without_translation(&self) -> Mat4 {
        let mut result = *self;
        result[(0, 3)] = 0.0;
        result[(1, 3)] = 0.0;
        result[(2, 3)] = 0.0;
        result
    }

    fn rigid_inverse(&self) -> Mat4 {
        let rotation_t = self.fixed_view::<3, 3>(0, 0).transpose();
        let translation = -(rotation_t * self.fixed_view::<3, 1>(0, 3));
        let mut result = Mat4::identity();
        result.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation_t);
        result.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bias_maps_ndc_corners_to_unit_cube() {
        let bias = Mat4::ndc_to_texture_bias();
        let low = bias * Vec4::new(-1.0, -1.0, -1.0, 1.0);
        let high = bias * Vec4::new(1.0, 1.0, 1.0, 1.0);

        assert_relative_eq!(low, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_relative_eq!(high, Vec4::new(1.0, 1.0, 1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_orthographic_box_maps_extents_to_ndc() {
        let ortho = Mat4::orthographic_box(20.0, 10.0, 40.0);
        let corner = ortho * Vec4::new(10.0, -5.0, -20.0, 1.0);
        assert_relative_eq!(corner, Vec4::new(1.0, -1.0, 1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_perspective_maps_near_and_far_planes() {
        let proj = Mat4::perspective(utils::deg_to_rad(70.0), 1.5, 0.1, 1000.0);

        let near = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -1000.0, 1.0);

        assert_relative_eq!(near.z / near.w, -1.0, epsilon = 1e-4);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rigid_inverse_matches_general_inverse() {
        let m = Mat4::rotation_x(0.4) * Mat4::rotation_y(-1.2) * Mat4::new_translation(&Vec3::new(3.0, -7.0, 2.5));
        let expected = m.try_inverse().expect("rigid transform is invertible");
        assert_relative_eq!(m.rigid_inverse(), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_transformation_matrix_translates_origin() {
        let translation = Vec3::new(3.0, -2.0, 7.0);
        let model = utils::create_transformation_matrix(&translation, 30.0, 45.0, 10.0, 2.0);
        let origin = model.transform_point(&Point3::origin());
        assert_relative_eq!(origin.coords, translation, epsilon = 1e-5);
    }
}
