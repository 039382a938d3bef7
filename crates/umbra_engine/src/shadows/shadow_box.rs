//! Light-space bounding box of the shadowed part of the view volume
//!
//! Each frame the camera's view volume, truncated at the shadow distance, is
//! turned into eight world-space corners. Those corners are moved into the
//! light's frame and enclosed in an axis-aligned box, which later becomes the
//! orthographic projection of the shadow pass.
//!
//! The box only exists after [`ShadowBox::update`] has run; reading extents
//! before that is a programming error and panics.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3, Vec4};
use crate::render::api::ShadowConfig;
use crate::render::primitives::CameraOrientation;

/// Extents computed by the last [`ShadowBox::update`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpaceBounds {
    /// Minimum corner in light space
    pub min: Vec3,
    /// Maximum corner in light space (z already pushed out by the z offset)
    pub max: Vec3,
    /// Light view the corners were transformed with
    pub light_view: Mat4,
    /// The eight corners in light space, before the z offset
    pub corners: [Vec3; 8],
}

/// Shadow volume fitted around the visible part of the scene
#[derive(Debug, Clone)]
pub struct ShadowBox {
    shadow_distance: f32,
    transition_distance: f32,
    z_offset: f32,
    bounds: Option<LightSpaceBounds>,
}

impl ShadowBox {
    /// Create a box with the distances from `config`
    pub fn new(config: &ShadowConfig) -> Self {
        Self {
            shadow_distance: config.shadow_distance,
            transition_distance: config.transition_distance,
            z_offset: config.z_offset,
            bounds: None,
        }
    }

    /// Refit the box around the view volume of `orientation`
    ///
    /// `light_view` defines the light-space axes. Calling this twice with the
    /// same inputs yields the same extents.
    pub fn update(&mut self, orientation: &CameraOrientation, light_view: &Mat4) {
        let world_corners = frustum_corners(orientation, self.shadow_distance);
        let corners = world_corners.map(|corner| to_light_space(light_view, &corner));

        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min = min.inf(corner);
            max = max.sup(corner);
        }
        max.z += self.z_offset;

        log::trace!("Shadow box updated: min {:?}, max {:?}", min, max);

        self.bounds = Some(LightSpaceBounds {
            min,
            max,
            light_view: *light_view,
            corners,
        });
    }

    /// Extents of the last update
    ///
    /// # Panics
    /// If [`update`](Self::update) has never been called.
    pub fn bounds(&self) -> &LightSpaceBounds {
        self.bounds
            .as_ref()
            .unwrap_or_else(|| panic!("ShadowBox extents read before update() was called"))
    }

    /// Whether [`update`](Self::update) has run at least once
    pub fn is_updated(&self) -> bool {
        self.bounds.is_some()
    }

    /// Extent along light-space X
    pub fn width(&self) -> f32 {
        let b = self.bounds();
        b.max.x - b.min.x
    }

    /// Extent along light-space Y
    pub fn height(&self) -> f32 {
        let b = self.bounds();
        b.max.y - b.min.y
    }

    /// Extent along light-space Z, including the z offset
    pub fn length(&self) -> f32 {
        let b = self.bounds();
        b.max.z - b.min.z
    }

    /// Centre of the box in world space
    pub fn center(&self) -> Vec3 {
        let b = self.bounds();
        let mid = (b.min + b.max) / 2.0;
        let world = b.light_view.rigid_inverse() * Vec4::new(mid.x, mid.y, mid.z, 1.0);
        world.xyz()
    }

    /// Light-space corners of the last update
    pub fn light_space_corners(&self) -> &[Vec3; 8] {
        &self.bounds().corners
    }

    /// Distance up to which shadows are cast
    pub fn shadow_distance(&self) -> f32 {
        self.shadow_distance
    }

    /// Length of the fade-out band before the shadow distance
    pub fn transition_distance(&self) -> f32 {
        self.transition_distance
    }
}

/// World-space corners of the view volume cut off at `distance`
///
/// Order: far-top-right, far-top-left, far-bottom-right, far-bottom-left,
/// then the same four on the near plane.
pub fn frustum_corners(orientation: &CameraOrientation, distance: f32) -> [Vec3; 8] {
    let o = orientation;
    let far = o.far(distance);
    let far_center = o.far_center(distance);

    let far_top = far_center + o.up * far.height;
    let far_bottom = far_center + o.down * far.height;
    let near_top = o.near_center + o.up * o.h_near;
    let near_bottom = o.near_center + o.down * o.h_near;

    [
        far_top + o.right * far.width,
        far_top + o.left * far.width,
        far_bottom + o.right * far.width,
        far_bottom + o.left * far.width,
        near_top + o.right * o.w_near,
        near_top + o.left * o.w_near,
        near_bottom + o.right * o.w_near,
        near_bottom + o.left * o.w_near,
    ]
}

fn to_light_space(light_view: &Mat4, point: &Vec3) -> Vec3 {
    (light_view * Vec4::new(point.x, point.y, point.z, 1.0)).xyz()
}
