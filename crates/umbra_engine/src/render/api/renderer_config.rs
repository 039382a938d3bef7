//! Renderer configuration for application-specific settings
//!
//! This module provides configuration structures that applications can use
//! to customize the renderer behavior without hardcoding values in the
//! rendering system itself. All structs load from TOML or RON through
//! [`Config`].

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;

/// Shadow mapping parameters
///
/// Distances are in world units. The defaults are tuned for a terrain scene
/// viewed from roughly head height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Edge length of the square depth texture in texels
    pub map_size: u32,
    /// How far from the camera shadows are cast
    pub shadow_distance: f32,
    /// Length of the fade-out band at the end of the shadow distance
    pub transition_distance: f32,
    /// Percentage-closer filtering kernel radius in texels
    pub pcf_count: i32,
    /// Extra depth added towards the light so off-screen casters still land in the map
    pub z_offset: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 4096,
            shadow_distance: 150.0,
            transition_distance: 10.0,
            pcf_count: 2,
            z_offset: 10.0,
        }
    }
}

impl ShadowConfig {
    /// Set the shadow map resolution
    pub fn with_map_size(mut self, map_size: u32) -> Self {
        self.map_size = map_size;
        self
    }

    /// Set the shadow and transition distances
    pub fn with_distances(mut self, shadow_distance: f32, transition_distance: f32) -> Self {
        self.shadow_distance = shadow_distance;
        self.transition_distance = transition_distance;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "shadows.map_size",
                reason: "shadow map size must be non-zero".to_string(),
            });
        }
        if !(self.shadow_distance > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "shadows.shadow_distance",
                reason: format!("must be positive, got {}", self.shadow_distance),
            });
        }
        if self.transition_distance < 0.0 || self.transition_distance > self.shadow_distance {
            return Err(ConfigError::InvalidValue {
                field: "shadows.transition_distance",
                reason: format!(
                    "must lie in [0, {}], got {}",
                    self.shadow_distance, self.transition_distance
                ),
            });
        }
        if self.pcf_count < 0 {
            return Err(ConfigError::InvalidValue {
                field: "shadows.pcf_count",
                reason: format!("must not be negative, got {}", self.pcf_count),
            });
        }
        Ok(())
    }
}

/// Water reflection/refraction target parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Reflection target width in pixels
    pub reflection_width: u32,
    /// Reflection target height in pixels
    pub reflection_height: u32,
    /// Refraction target width in pixels
    pub refraction_width: u32,
    /// Refraction target height in pixels
    pub refraction_height: u32,
    /// Slack added to the clip planes to hide the seam at the water line
    pub clip_epsilon: f32,
    /// Speed at which the distortion map scrolls, in texture units per second
    pub wave_speed: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            reflection_width: 320,
            reflection_height: 180,
            refraction_width: 1280,
            refraction_height: 720,
            clip_epsilon: 1.0,
            wave_speed: 0.03,
        }
    }
}

impl WaterConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("water.reflection_width", self.reflection_width),
            ("water.reflection_height", self.reflection_height),
            ("water.refraction_width", self.refraction_width),
            ("water.refraction_height", self.refraction_height),
        ];
        for (field, value) in sizes {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "target dimensions must be non-zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Configuration for the master renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping distance
    pub near_plane: f32,
    /// Far clipping distance (also the culling distance)
    pub far_plane: f32,
    /// Fog and clear colour
    pub sky_colour: Vec3,
    /// Skybox rotation speed in degrees per second
    pub skybox_rotation_speed: f32,
    /// Shadow mapping parameters
    pub shadows: ShadowConfig,
    /// Water target parameters
    pub water: WaterConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            sky_colour: Vec3::new(0.5444, 0.62, 0.69),
            skybox_rotation_speed: 1.0,
            shadows: ShadowConfig::default(),
            water: WaterConfig::default(),
        }
    }
}

impl Config for RendererConfig {}

impl RendererConfig {
    /// Set the projection parameters
    pub fn with_projection(mut self, fov_degrees: f32, near_plane: f32, far_plane: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self.near_plane = near_plane;
        self.far_plane = far_plane;
        self
    }

    /// Set shadow configuration
    pub fn with_shadows(mut self, shadows: ShadowConfig) -> Self {
        self.shadows = shadows;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::InvalidValue {
                field: "fov_degrees",
                reason: format!("must lie in (0, 180), got {}", self.fov_degrees),
            });
        }
        if !(self.near_plane > 0.0) || self.near_plane >= self.far_plane {
            return Err(ConfigError::InvalidValue {
                field: "near_plane",
                reason: format!(
                    "need 0 < near < far, got near={} far={}",
                    self.near_plane, self.far_plane
                ),
            });
        }
        self.shadows.validate()?;
        self.water.validate()
    }
}
