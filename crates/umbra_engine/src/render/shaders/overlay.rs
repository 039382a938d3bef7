//! Screen-space shaders: textured GUI quads and distance-field text

use crate::foundation::math::Mat4;
use crate::render::api::{BackendResult, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink};
use crate::render::shaders::ShaderProgram;
use crate::scene::TextMesh;

/// GUI quad program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayShader {
    /// Linked program
    pub program: ShaderProgram,
    transformation_matrix: UniformLocation,
    gui_texture: UniformLocation,
}

impl OverlayShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new("gui", "resources/shaders/gui.vert", "resources/shaders/gui.frag")
            .with_attribute("position")
    }

    /// Compile the program and resolve its uniforms
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let program = ShaderProgram::load(backend, &Self::descriptor())?;
        Ok(Self {
            transformation_matrix: program.uniform(backend, "transformationMatrix")?,
            gui_texture: program.uniform(backend, "guiTexture")?,
            program,
        })
    }
}

/// Sample the GUI texture from unit 0
pub fn connect_texture_units(sink: &mut impl UniformSink, shader: &OverlayShader) {
    sink.set_int(shader.gui_texture, 0);
}

/// Upload a quad's screen transform
pub fn load_transformation(sink: &mut impl UniformSink, shader: &OverlayShader, transformation: &Mat4) {
    sink.set_matrix(shader.transformation_matrix, transformation);
}

/// Text program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontShader {
    /// Linked program
    pub program: ShaderProgram,
    colour: UniformLocation,
    translation: UniformLocation,
    width: UniformLocation,
    edge: UniformLocation,
    border_width: UniformLocation,
    border_edge: UniformLocation,
    outline_colour: UniformLocation,
    font_atlas: UniformLocation,
}

impl FontShader {
    /// Source files and attribute bindings
    pub fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new("font", "resources/shaders/font.vert", "resources/shaders/font.frag")
            .with_attribute("position")
            .with_attribute("textureCoords")
    }

    /// Compile the program and resolve its uniforms
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B) -> BackendResult<Self> {
        let program = ShaderProgram::load(backend, &Self::descriptor())?;
        Ok(Self {
            colour: program.uniform(backend, "colour")?,
            translation: program.uniform(backend, "translation")?,
            width: program.uniform(backend, "width")?,
            edge: program.uniform(backend, "edge")?,
            border_width: program.uniform(backend, "borderWidth")?,
            border_edge: program.uniform(backend, "borderEdge")?,
            outline_colour: program.uniform(backend, "outlineColour")?,
            font_atlas: program.uniform(backend, "fontAtlas")?,
            program,
        })
    }
}

/// Sample the font atlas from unit 0
pub fn connect_font_texture_units(sink: &mut impl UniformSink, shader: &FontShader) {
    sink.set_int(shader.font_atlas, 0);
}

/// Upload everything a text mesh needs
pub fn load_text(sink: &mut impl UniformSink, shader: &FontShader, text: &TextMesh) {
    sink.set_vec3(shader.colour, &text.colour);
    sink.set_vec2(shader.translation, &text.position);
    sink.set_float(shader.width, text.width);
    sink.set_float(shader.edge, text.edge);
    sink.set_float(shader.border_width, text.border_width);
    sink.set_float(shader.border_edge, text.border_edge);
    sink.set_vec3(shader.outline_colour, &text.outline_colour);
}
