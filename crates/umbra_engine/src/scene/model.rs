//! Textured models shared by many entities
//!
//! A [`TexturedModel`] pairs an uploaded mesh with the surface parameters the
//! entity shaders need. Entities only refer to a model by [`ModelKey`], so the
//! renderers can batch every instance of a model under a single mesh and
//! texture bind.
//!
//! [`ModelKey`]: crate::scene::ModelKey

use crate::render::api::TextureHandle;
use crate::render::primitives::GpuMesh;

/// Diffuse texture and lighting parameters of a model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTexture {
    /// Diffuse texture (possibly an atlas)
    pub texture: TextureHandle,

    /// Tangent-space normal map; models with one go through the normal-mapping pass
    pub normal_map: Option<TextureHandle>,

    /// Specular exponent
    pub shine_damper: f32,

    /// Specular intensity
    pub reflectivity: f32,

    /// Texture has cut-out alpha, so both faces must be drawn
    pub has_transparency: bool,

    /// Light as if the normal pointed straight up (grass, ferns)
    pub use_fake_lighting: bool,

    /// Rows (and columns) of the texture atlas; 1 for a plain texture
    pub number_of_rows: u32,
}

impl ModelTexture {
    /// Plain opaque texture with default lighting parameters
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            normal_map: None,
            shine_damper: 1.0,
            reflectivity: 0.0,
            has_transparency: false,
            use_fake_lighting: false,
            number_of_rows: 1,
        }
    }

    /// Set specular parameters
    pub fn with_specular(mut self, shine_damper: f32, reflectivity: f32) -> Self {
        self.shine_damper = shine_damper;
        self.reflectivity = reflectivity;
        self
    }

    /// Mark the texture as containing transparent cut-outs
    pub fn with_transparency(mut self, has_transparency: bool) -> Self {
        self.has_transparency = has_transparency;
        self
    }

    /// Enable or disable fake lighting
    pub fn with_fake_lighting(mut self, use_fake_lighting: bool) -> Self {
        self.use_fake_lighting = use_fake_lighting;
        self
    }

    /// Treat the texture as a square atlas with `rows` rows
    pub fn with_atlas_rows(mut self, rows: u32) -> Self {
        self.number_of_rows = rows.max(1);
        self
    }

    /// Attach a normal map
    pub fn with_normal_map(mut self, normal_map: TextureHandle) -> Self {
        self.normal_map = Some(normal_map);
        self
    }
}

/// Uploaded mesh plus its texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedModel {
    /// Geometry on the backend
    pub mesh: GpuMesh,

    /// Surface parameters
    pub texture: ModelTexture,

    /// Radius of the origin-centred sphere enclosing the mesh at unit scale
    pub bounding_radius: f32,
}

impl TexturedModel {
    /// Create a model
    pub fn new(mesh: GpuMesh, texture: ModelTexture, bounding_radius: f32) -> Self {
        Self {
            mesh,
            texture,
            bounding_radius,
        }
    }

    /// Whether this model is drawn by the normal-mapping renderer
    pub fn is_normal_mapped(&self) -> bool {
        self.texture.normal_map.is_some()
    }
}
