//! Backend abstraction traits for the rendering system
//!
//! This module defines the capabilities a graphics backend must provide for the
//! high-level renderers: shader programs with uniform upload, meshes, textures,
//! off-screen framebuffers and fixed-function state toggles. Everything is
//! expressed through opaque handles so renderers never touch API objects.
//!
//! The model is an immediate-mode context owned by a single render thread: a
//! program or framebuffer stays bound until something else is bound over it.

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::primitives::MeshData;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a mesh resource (vertex + index buffers) stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Handle to a sampleable texture stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Handle to an off-screen framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u64);

/// Location of a uniform inside a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// A value uploaded to a uniform slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Single float
    Float(f32),
    /// Single signed integer (also used for samplers and booleans)
    Int(i32),
    /// Two-component vector
    Vec2(Vec2),
    /// Three-component vector
    Vec3(Vec3),
    /// Four-component vector
    Vec4(Vec4),
    /// Column-major 4x4 matrix
    Mat4(Mat4),
}

bitflags! {
    /// Fixed-function pipeline state that passes toggle between draws
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderState: u32 {
        /// Depth testing against the bound depth attachment
        const DEPTH_TEST = 1 << 0;
        /// Writes into the depth attachment
        const DEPTH_WRITE = 1 << 1;
        /// Back-face culling
        const CULL_BACK_FACES = 1 << 2;
        /// Colour blending
        const BLEND = 1 << 3;
        /// User clip distance 0 (water reflection/refraction clipping)
        const CLIP_DISTANCE0 = 1 << 4;
    }
}

bitflags! {
    /// Attachments cleared by [`RenderBackend::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Colour attachment
        const COLOR = 1 << 0;
        /// Depth attachment
        const DEPTH = 1 << 1;
    }
}

/// Blend equation used while [`RenderState::BLEND`] is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `src * a + dst * (1 - a)`
    Alpha,
    /// `src * a + dst`
    Additive,
}

/// Pixel rectangle that rasterization writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Left edge in pixels
    pub x: i32,
    /// Bottom edge in pixels
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Viewport covering `width` x `height` from the origin
    pub fn new(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Source locations and vertex attribute bindings for a shader program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDescriptor {
    /// Debug name of the program
    pub name: String,
    /// Path of the vertex stage source
    pub vertex_path: String,
    /// Path of the fragment stage source
    pub fragment_path: String,
    /// Attribute names bound to locations `0..n`
    pub attributes: Vec<String>,
}

impl ShaderDescriptor {
    /// Create a descriptor for a program with the given stage paths
    pub fn new(name: impl Into<String>, vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
            attributes: Vec::new(),
        }
    }

    /// Bind the next attribute location to `name`
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }
}

/// Depth attachment flavour of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthAttachment {
    /// No depth attachment
    None,
    /// Depth render buffer (testable, not sampleable)
    RenderBuffer,
    /// Depth texture (testable and sampleable)
    Texture,
}

/// Description of an off-screen framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferDescriptor {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Whether a sampleable colour texture is attached
    pub color_texture: bool,
    /// Depth attachment flavour
    pub depth: DepthAttachment,
}

impl FramebufferDescriptor {
    /// Depth-only target (shadow maps)
    pub fn depth_only(width: u32, height: u32) -> Self {
        Self { width, height, color_texture: false, depth: DepthAttachment::Texture }
    }

    /// Colour target with the given depth attachment
    pub fn color(width: u32, height: u32, depth: DepthAttachment) -> Self {
        Self { width, height, color_texture: true, depth }
    }
}

/// Capability to upload uniform values
///
/// Implemented by backends (uploads go to the currently bound program) and by
/// [`BoundProgram`](crate::render::shaders::BoundProgram), which is what the
/// logical shaders normally write through.
pub trait UniformSink {
    /// Upload a raw value into a uniform slot of the bound program
    fn upload_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Upload a float
    fn set_float(&mut self, location: UniformLocation, value: f32) {
        self.upload_uniform(location, UniformValue::Float(value));
    }

    /// Upload an integer (sampler units included)
    fn set_int(&mut self, location: UniformLocation, value: i32) {
        self.upload_uniform(location, UniformValue::Int(value));
    }

    /// Upload a boolean as `0`/`1`
    fn set_bool(&mut self, location: UniformLocation, value: bool) {
        self.upload_uniform(location, UniformValue::Int(i32::from(value)));
    }

    /// Upload a 2D vector
    fn set_vec2(&mut self, location: UniformLocation, value: &Vec2) {
        self.upload_uniform(location, UniformValue::Vec2(*value));
    }

    /// Upload a 3D vector
    fn set_vec3(&mut self, location: UniformLocation, value: &Vec3) {
        self.upload_uniform(location, UniformValue::Vec3(*value));
    }

    /// Upload a 4D vector
    fn set_vec4(&mut self, location: UniformLocation, value: &Vec4) {
        self.upload_uniform(location, UniformValue::Vec4(*value));
    }

    /// Upload a 4x4 matrix
    fn set_matrix(&mut self, location: UniformLocation, value: &Mat4) {
        self.upload_uniform(location, UniformValue::Mat4(*value));
    }
}

/// Main rendering backend trait
///
/// Abstracts over immediate-mode graphics APIs and provides the operations the
/// per-pass renderers and the master renderer sequence each frame.
pub trait RenderBackend: UniformSink {
    /// Compile and link a shader program
    fn create_program(&mut self, descriptor: &ShaderDescriptor) -> BackendResult<ProgramHandle>;

    /// Look up a uniform slot by name
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> BackendResult<UniformLocation>;

    /// Make `program` current for uniform uploads and draws
    fn bind_program(&mut self, program: ProgramHandle);

    /// Unbind the current program
    fn unbind_program(&mut self);

    /// Release a shader program
    fn destroy_program(&mut self, program: ProgramHandle);

    /// Upload mesh data into vertex and index buffers
    fn upload_mesh(&mut self, mesh: &MeshData) -> BackendResult<MeshHandle>;

    /// Release the vertex and index buffers of a mesh
    fn destroy_mesh(&mut self, mesh: MeshHandle);

    /// Bind a mesh and enable its first `attribute_count` vertex attributes
    fn bind_mesh(&mut self, mesh: MeshHandle, attribute_count: u32);

    /// Disable attributes and unbind the current mesh
    fn unbind_mesh(&mut self);

    /// Draw `index_count` indices of the bound mesh as triangles
    fn draw_indexed(&mut self, index_count: u32);

    /// Bind a texture on a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Allocate an off-screen framebuffer
    fn create_framebuffer(&mut self, descriptor: &FramebufferDescriptor) -> BackendResult<FramebufferHandle>;

    /// Bind a framebuffer for writing and set the viewport to its size
    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle, width: u32, height: u32);

    /// Return to the default framebuffer, restoring `viewport`
    fn unbind_framebuffer(&mut self, viewport: Viewport);

    /// Sampleable colour texture of a framebuffer
    fn color_texture(&self, framebuffer: FramebufferHandle) -> BackendResult<TextureHandle>;

    /// Sampleable depth texture of a framebuffer
    fn depth_texture(&self, framebuffer: FramebufferHandle) -> BackendResult<TextureHandle>;

    /// Release a framebuffer and its attachments
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Enable pipeline state
    fn enable(&mut self, state: RenderState);

    /// Disable pipeline state
    fn disable(&mut self, state: RenderState);

    /// Select the blend equation
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Clear attachments of the bound framebuffer
    fn clear(&mut self, flags: ClearFlags, color: Vec4);

    /// Viewport of the default (window) framebuffer
    fn default_viewport(&self) -> Viewport;
}
