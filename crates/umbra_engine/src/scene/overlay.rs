//! Screen-space overlay elements
//!
//! Positions and scales are in normalized device coordinates. Text layout is
//! done elsewhere; a [`TextMesh`] is an already-built quad mesh sampling a
//! signed-distance-field font atlas.

use crate::foundation::math::{Vec2, Vec3};
use crate::render::api::TextureHandle;
use crate::render::primitives::GpuMesh;

/// Textured GUI quad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuiElement {
    /// Texture drawn on the quad
    pub texture: TextureHandle,

    /// Centre in NDC
    pub position: Vec2,

    /// Half extents in NDC
    pub scale: Vec2,
}

impl GuiElement {
    /// Create a GUI element
    pub fn new(texture: TextureHandle, position: Vec2, scale: Vec2) -> Self {
        Self { texture, position, scale }
    }
}

/// Laid-out text ready for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMesh {
    /// Glyph quads
    pub mesh: GpuMesh,

    /// Distance-field font atlas
    pub font_atlas: TextureHandle,

    /// Screen offset in NDC
    pub position: Vec2,

    /// Fill colour
    pub colour: Vec3,

    /// Outline colour
    pub outline_colour: Vec3,

    /// Distance-field threshold of the glyph body
    pub width: f32,

    /// Softness of the glyph edge
    pub edge: f32,

    /// Outline threshold; zero disables the outline
    pub border_width: f32,

    /// Softness of the outline edge
    pub border_edge: f32,
}

impl TextMesh {
    /// Plain text without an outline
    pub fn new(mesh: GpuMesh, font_atlas: TextureHandle, position: Vec2, colour: Vec3) -> Self {
        Self {
            mesh,
            font_atlas,
            position,
            colour,
            outline_colour: Vec3::zeros(),
            width: 0.5,
            edge: 0.1,
            border_width: 0.0,
            border_edge: 0.1,
        }
    }

    /// Add an outline
    pub fn with_outline(mut self, colour: Vec3, border_width: f32, border_edge: f32) -> Self {
        self.outline_colour = colour;
        self.border_width = border_width;
        self.border_edge = border_edge;
        self
    }
}
