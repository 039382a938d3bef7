//! Point lights
//!
//! The first light in a [`Scene`](crate::scene::Scene) is the sun. It is placed
//! very far away so the shadow pass can treat it as a directional light whose
//! rays travel along `-position`.

use crate::foundation::math::Vec3;

/// Point light with distance attenuation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// World position
    pub position: Vec3,

    /// RGB intensity
    pub colour: Vec3,

    /// Constant, linear and quadratic attenuation factors
    pub attenuation: Vec3,
}

impl Light {
    /// Unattenuated light, as used for the sun
    pub fn new(position: Vec3, colour: Vec3) -> Self {
        Self {
            position,
            colour,
            attenuation: Vec3::new(1.0, 0.0, 0.0),
        }
    }

    /// Set the attenuation factors
    pub fn with_attenuation(mut self, attenuation: Vec3) -> Self {
        self.attenuation = attenuation;
        self
    }

    /// Direction the light's rays travel when treated as directional
    ///
    /// Not normalized; a light at the origin yields the zero vector.
    pub fn direction(&self) -> Vec3 {
        -self.position
    }

    /// Placeholder for unused shader light slots: black and unattenuated
    pub fn unused() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros())
    }
}
