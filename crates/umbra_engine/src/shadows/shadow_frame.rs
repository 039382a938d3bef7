//! Per-frame shadow matrices
//!
//! [`compute_shadow_frame`] turns the sun and the camera into everything the
//! shadow pass and the shadow-receiving shaders need for one frame, returned
//! as an immutable [`ShadowFrame`].
//!
//! The light frame is built from Euler angles recovered from the light
//! direction: a pitch about X equal to the direction's elevation below the
//! horizon, and a yaw about Y that turns the direction's horizontal component
//! onto -Z. Directions pointing upwards are not supported; the pitch is
//! always taken as a downward tilt.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::primitives::CameraOrientation;
use crate::scene::Light;
use crate::shadows::ShadowBox;

/// Below this horizontal length a light direction counts as vertical
const VERTICAL_EPSILON: f32 = 1e-6;

/// Shadow matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowFrame {
    /// Normalized direction the light travels in
    pub light_direction: Vec3,
    /// Tilt of the light frame about X, in degrees
    pub pitch: f32,
    /// Turn of the light frame about Y, in degrees
    pub yaw: f32,
    /// World centre of the shadow box
    pub center: Vec3,
    /// World to light space, centred on the shadow box
    pub light_view: Mat4,
    /// Orthographic projection sized to the shadow box
    pub projection: Mat4,
    /// `projection * light_view`
    pub projection_view: Mat4,
    /// World to shadow-map texture space
    pub to_shadow_map_space: Mat4,
}

/// Euler angles `(pitch, yaw)` in degrees of the light frame for `direction`
///
/// `direction` must already be normalized. For a vertical direction the yaw
/// is undefined; it is reported as `None` and callers pick a value.
pub fn light_angles(direction: &Vec3) -> (f32, Option<f32>) {
    let horizontal = (direction.x * direction.x + direction.z * direction.z).sqrt();
    let pitch = utils::rad_to_deg(horizontal.min(1.0).acos());

    if horizontal < VERTICAL_EPSILON {
        return (pitch, None);
    }

    let yaw = if direction.z == 0.0 {
        // atan(x / ±0) would pick the quadrant from the sign of zero
        if direction.x > 0.0 { -90.0 } else { 90.0 }
    } else {
        let yaw = utils::rad_to_deg((direction.x / direction.z).atan());
        if direction.z > 0.0 { yaw - 180.0 } else { yaw }
    };

    (pitch, Some(yaw))
}

/// Rotation-only light frame `Rx(pitch) * Ry(-yaw)` for angles in degrees
pub fn light_rotation(pitch: f32, yaw: f32) -> Mat4 {
    Mat4::rotation_x(utils::deg_to_rad(pitch)) * Mat4::rotation_y(-utils::deg_to_rad(yaw))
}

/// Fit the shadow box for this frame and derive the shadow matrices
///
/// The box is refitted in the rotation-only light frame first, so the light
/// view's translation uses this frame's box centre rather than last frame's.
/// A vertical light gets a yaw of zero and a warning.
pub fn compute_shadow_frame(orientation: &CameraOrientation, light: &Light, shadow_box: &mut ShadowBox) -> ShadowFrame {
    let light_direction = light.direction().normalize();
    let (pitch, yaw) = light_angles(&light_direction);
    let yaw = yaw.unwrap_or_else(|| {
        log::warn!("Light direction {:?} is vertical; shadow yaw defaults to 0", light_direction);
        0.0
    });

    let rotation = light_rotation(pitch, yaw);
    shadow_box.update(orientation, &rotation);
    let center = shadow_box.center();

    let light_view = rotation * Mat4::new_translation(&-center);
    let projection = Mat4::orthographic_box(shadow_box.width(), shadow_box.height(), shadow_box.length());
    let projection_view = projection * light_view;
    let to_shadow_map_space = Mat4::ndc_to_texture_bias() * projection_view;

    log::trace!(
        "Shadow frame: pitch {:.2}°, yaw {:.2}°, box {:.1}x{:.1}x{:.1}",
        pitch,
        yaw,
        shadow_box.width(),
        shadow_box.height(),
        shadow_box.length()
    );

    ShadowFrame {
        light_direction,
        pitch,
        yaw,
        center,
        light_view,
        projection,
        projection_view,
        to_shadow_map_space,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use crate::render::api::ShadowConfig;
    use crate::render::primitives::Camera;
    use approx::assert_relative_eq;

    fn frame_for(light_position: Vec3) -> (ShadowFrame, ShadowBox) {
        let camera = Camera::perspective(Vec3::new(100.0, 10.0, -50.0), 70.0, 16.0 / 9.0, 0.1, 1000.0)
            .with_rotation(10.0, 30.0);
        let mut shadow_box = ShadowBox::new(&ShadowConfig::default());
        let light = Light::new(light_position, Vec3::new(1.0, 1.0, 1.0));
        let frame = compute_shadow_frame(&camera.orientation(), &light, &mut shadow_box);
        (frame, shadow_box)
    }

    fn transform(m: &Mat4, v: &Vec3, w: f32) -> Vec3 {
        (m * Vec4::new(v.x, v.y, v.z, w)).xyz()
    }

    #[test]
    fn test_high_sun_points_down() {
        let (frame, _) = frame_for(Vec3::new(0.0, 10000.0, -7000.0));
        assert!(frame.light_direction.y < 0.0);
        assert_relative_eq!(frame.light_direction.norm(), 1.0, epsilon = 1e-6);
        // atan(10000 / 7000)
        assert_relative_eq!(frame.pitch, 55.008, epsilon = 1e-3);
        assert_relative_eq!(frame.yaw, -180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_steep_sun_pitch_is_near_vertical() {
        let (frame, _) = frame_for(Vec3::new(0.0, 10000.0, -1000.0));
        assert!(frame.pitch >= 80.0 && frame.pitch <= 90.0, "pitch {}", frame.pitch);
    }

    #[test]
    fn test_light_view_maps_direction_to_negative_z() {
        for position in [
            Vec3::new(0.0, 10000.0, -7000.0),
            Vec3::new(3000.0, 8000.0, 2000.0),
            Vec3::new(-5000.0, 4000.0, -500.0),
            Vec3::new(-2000.0, 6000.0, 0.0),
            Vec3::new(2000.0, 6000.0, 0.0),
        ] {
            let (frame, _) = frame_for(position);
            let mapped = transform(&frame.light_view, &frame.light_direction, 0.0);
            assert_relative_eq!(mapped, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_box_center_maps_to_middle_of_shadow_map() {
        let (frame, _) = frame_for(Vec3::new(3000.0, 8000.0, 2000.0));
        let texture_space = transform(&frame.to_shadow_map_space, &frame.center, 1.0);
        assert_relative_eq!(texture_space, Vec3::new(0.5, 0.5, 0.5), epsilon = 1e-4);
    }

    #[test]
    fn test_view_volume_lands_inside_shadow_map() {
        let camera = Camera::perspective(Vec3::new(100.0, 10.0, -50.0), 70.0, 16.0 / 9.0, 0.1, 1000.0)
            .with_rotation(10.0, 30.0);
        let (frame, _) = frame_for(Vec3::new(3000.0, 8000.0, 2000.0));
        let visible = camera.position + camera.look_direction() * 75.0;
        let p = transform(&frame.to_shadow_map_space, &visible, 1.0);
        for coordinate in [p.x, p.y, p.z] {
            assert!((0.0..=1.0).contains(&coordinate), "{p:?} outside the shadow map");
        }
    }

    #[test]
    fn test_projection_matches_box_extents() {
        let (frame, shadow_box) = frame_for(Vec3::new(-5000.0, 4000.0, -500.0));
        assert_relative_eq!(frame.projection[(0, 0)], 2.0 / shadow_box.width(), epsilon = 1e-6);
        assert_relative_eq!(frame.projection[(1, 1)], 2.0 / shadow_box.height(), epsilon = 1e-6);
        assert_relative_eq!(frame.projection[(2, 2)], -2.0 / shadow_box.length(), epsilon = 1e-6);
        assert_relative_eq!(frame.projection_view, frame.projection * frame.light_view);
    }

    #[test]
    fn test_vertical_light_uses_zero_yaw() {
        let (frame, _) = frame_for(Vec3::new(0.0, 5000.0, 0.0));
        assert_relative_eq!(frame.yaw, 0.0);
        assert_relative_eq!(frame.pitch, 90.0, epsilon = 1e-4);
        let mapped = transform(&frame.light_view, &frame.light_direction, 0.0);
        assert_relative_eq!(mapped, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_light_angles_quadrants() {
        let (_, yaw) = light_angles(&Vec3::new(0.6, -0.8, 0.0));
        assert_eq!(yaw, Some(-90.0));
        let (_, yaw) = light_angles(&Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(yaw, None);
    }
}
