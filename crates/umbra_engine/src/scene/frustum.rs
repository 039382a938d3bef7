//! View frustum for visibility culling
//!
//! The six planes are built directly from a [`CameraOrientation`], so no
//! matrix inversion or plane extraction from the projection is needed. Each
//! plane is stored as a point on the plane plus a unit normal pointing into the
//! visible volume.

use crate::foundation::math::Vec3;
use crate::render::primitives::CameraOrientation;

/// Named frustum plane, usable as an index into [`Frustum::planes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumPlane {
    /// Near clipping plane
    Near = 0,
    /// Far clipping plane
    Far = 1,
    /// Upper side plane
    Top = 2,
    /// Lower side plane
    Bottom = 3,
    /// Left side plane
    Left = 4,
    /// Right side plane
    Right = 5,
}

impl FrustumPlane {
    /// All planes in index order
    pub const ALL: [FrustumPlane; 6] = [
        FrustumPlane::Near,
        FrustumPlane::Far,
        FrustumPlane::Top,
        FrustumPlane::Bottom,
        FrustumPlane::Left,
        FrustumPlane::Right,
    ];
}

/// Half-space bounded by a plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Any point on the plane
    pub point: Vec3,
    /// Unit normal pointing into the kept half-space
    pub normal: Vec3,
}

impl Plane {
    /// Create a plane from a point and a normal
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Signed distance of `point`, positive on the interior side
    pub fn signed_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(&(point - self.point))
    }
}

/// Camera frustum truncated at a far distance
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Build the six planes for `orientation`, cut off at `far_distance`
    ///
    /// Side planes pass through the camera position. Their normals come from
    /// the direction towards the midpoint of the matching near-plane edge,
    /// crossed with the basis axis lying in that plane, which avoids computing
    /// far corners at all.
    pub fn new(orientation: &CameraOrientation, far_distance: f32) -> Self {
        let o = orientation;
        let half_height = o.h_near / 2.0;
        let half_width = o.w_near / 2.0;

        let mut planes = [Plane::new(Vec3::zeros(), Vec3::zeros()); 6];
        planes[FrustumPlane::Near as usize] = Plane::new(o.near_center, o.look_at);
        planes[FrustumPlane::Far as usize] = Plane::new(o.far_center(far_distance), -o.look_at);
        planes[FrustumPlane::Top as usize] = Plane::new(o.position, side_normal(o, &o.up, half_height, &o.left));
        planes[FrustumPlane::Bottom as usize] = Plane::new(o.position, side_normal(o, &o.down, half_height, &o.right));
        planes[FrustumPlane::Left as usize] = Plane::new(o.position, side_normal(o, &o.left, half_width, &o.down));
        planes[FrustumPlane::Right as usize] = Plane::new(o.position, side_normal(o, &o.right, half_width, &o.up));

        Self { planes }
    }

    /// All planes, indexed by [`FrustumPlane`]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// A single named plane
    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }

    /// Signed distance of `point` from a named plane (positive inside)
    pub fn distance(&self, which: FrustumPlane, point: &Vec3) -> f32 {
        self.plane(which).signed_distance(point)
    }

    /// Conservative sphere test
    ///
    /// True unless the sphere lies entirely outside some plane. A radius of zero
    /// turns this into a point test.
    pub fn contains(&self, point: &Vec3, radius: f32) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(point) >= -radius)
    }
}

/// `ortho × normalize(edge_midpoint - position)`
fn side_normal(o: &CameraOrientation, dir: &Vec3, half_extent: f32, ortho: &Vec3) -> Vec3 {
    let edge = (dir * half_extent + o.near_center - o.position).normalize();
    ortho.cross(&edge).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use crate::render::primitives::Camera;
    use approx::assert_relative_eq;

    fn origin_camera_frustum() -> Frustum {
        let camera = Camera::perspective(Vec3::zeros(), 70.0, 4.0 / 3.0, 0.1, 1000.0);
        Frustum::new(&camera.orientation(), 1000.0)
    }

    #[test]
    fn test_point_ahead_is_inside_and_behind_is_outside() {
        let frustum = origin_camera_frustum();
        assert!(frustum.contains(&Vec3::new(0.0, 0.0, -500.0), 0.0));
        assert!(!frustum.contains(&Vec3::new(0.0, 0.0, 500.0), 0.0));
    }

    #[test]
    fn test_far_plane_cuts_off() {
        let frustum = origin_camera_frustum();
        assert!(frustum.contains(&Vec3::new(0.0, 0.0, -999.0), 0.0));
        assert!(!frustum.contains(&Vec3::new(0.0, 0.0, -1001.0), 0.0));
        assert!(frustum.contains(&Vec3::new(0.0, 0.0, -1001.0), 2.0));
    }

    #[test]
    fn test_side_planes_are_symmetric_on_axis() {
        let frustum = origin_camera_frustum();
        let on_axis = Vec3::new(0.0, 0.0, -42.0);
        assert_relative_eq!(
            frustum.distance(FrustumPlane::Left, &on_axis),
            frustum.distance(FrustumPlane::Right, &on_axis),
            epsilon = 1e-4
        );
        assert_relative_eq!(
            frustum.distance(FrustumPlane::Top, &on_axis),
            frustum.distance(FrustumPlane::Bottom, &on_axis),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_normals_point_inward() {
        let camera = Camera::perspective(Vec3::new(10.0, 3.0, -4.0), 60.0, 16.0 / 9.0, 0.5, 300.0)
            .with_rotation(15.0, 60.0);
        let frustum = Frustum::new(&camera.orientation(), 300.0);
        let inside = camera.position + camera.look_direction() * 100.0;
        for which in FrustumPlane::ALL {
            assert!(frustum.distance(which, &inside) > 0.0, "{which:?} normal points outward");
            assert_relative_eq!(frustum.plane(which).normal.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_side_planes_match_projection_edges() {
        // Points just inside/outside the clip-space edges agree with the plane test.
        let camera = Camera::perspective(Vec3::new(1.0, 2.0, 3.0), 70.0, 4.0 / 3.0, 0.1, 1000.0)
            .with_rotation(-10.0, 200.0);
        let frustum = Frustum::new(&camera.orientation(), 1000.0);
        let inverse = camera.projection_view_matrix().try_inverse().expect("invertible");

        let unproject = |x: f32, y: f32| {
            let p = inverse * Vec4::new(x, y, 0.5, 1.0);
            p.xyz() / p.w
        };

        for (x, y) in [(0.95, 0.0), (-0.95, 0.0), (0.0, 0.95), (0.0, -0.95)] {
            assert!(frustum.contains(&unproject(x, y), 0.0));
        }
        for (x, y) in [(1.05, 0.0), (-1.05, 0.0), (0.0, 1.05), (0.0, -1.05)] {
            assert!(!frustum.contains(&unproject(x, y), 0.0));
        }
    }

    #[test]
    fn test_sphere_overlapping_side_plane_is_kept() {
        let frustum = origin_camera_frustum();
        let orientation = Camera::perspective(Vec3::zeros(), 70.0, 4.0 / 3.0, 0.1, 1000.0).orientation();
        let half_width = orientation.far(100.0).width / 2.0;
        let just_outside = Vec3::new(half_width + 1.0, 0.0, -100.0);
        assert!(!frustum.contains(&just_outside, 0.0));
        assert!(frustum.contains(&just_outside, 5.0));
    }
}
