//! Command-recording backend
//!
//! [`RecordingBackend`] implements [`RenderBackend`] without a GPU. Every call
//! is appended to an in-memory command log and resources are tracked by
//! handle, so misuse (unknown handles, uniforms on unknown programs) surfaces
//! as errors. Tests assert on the log to check pass ordering; the demo
//! application uses it to run the full frame loop headless.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::foundation::math::Vec4;
use crate::render::api::{
    BackendResult, BlendMode, ClearFlags, DepthAttachment, FramebufferDescriptor, FramebufferHandle, MeshHandle,
    ProgramHandle, RenderBackend, RenderState, ShaderDescriptor, TextureHandle, UniformLocation, UniformSink,
    UniformValue, Viewport,
};
use crate::render::primitives::MeshData;
use crate::render::RenderError;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// A program was linked
    CreateProgram {
        /// New handle
        program: ProgramHandle,
        /// Debug name
        name: String,
    },
    /// A program became current
    BindProgram(ProgramHandle),
    /// The current program was unbound
    UnbindProgram,
    /// A program was released
    DestroyProgram(ProgramHandle),
    /// A uniform was written
    Uniform {
        /// Program bound at the time
        program: Option<ProgramHandle>,
        /// Uniform name
        name: String,
        /// Uploaded value
        value: UniformValue,
    },
    /// Mesh data was uploaded
    UploadMesh {
        /// New handle
        mesh: MeshHandle,
        /// Debug name
        name: String,
        /// Number of indices
        index_count: u32,
    },
    /// A mesh was released
    DestroyMesh(MeshHandle),
    /// A mesh was bound
    BindMesh {
        /// Mesh handle
        mesh: MeshHandle,
        /// Enabled attribute count
        attribute_count: u32,
    },
    /// The current mesh was unbound
    UnbindMesh,
    /// An indexed draw was issued
    Draw {
        /// Program bound at the time
        program: Option<ProgramHandle>,
        /// Mesh bound at the time
        mesh: Option<MeshHandle>,
        /// Target framebuffer (`None` = window)
        framebuffer: Option<FramebufferHandle>,
        /// Indices drawn
        index_count: u32,
    },
    /// A texture was bound on a unit
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Texture handle
        texture: TextureHandle,
    },
    /// A framebuffer was allocated
    CreateFramebuffer {
        /// New handle
        framebuffer: FramebufferHandle,
        /// Requested layout
        descriptor: FramebufferDescriptor,
    },
    /// A framebuffer became the render target
    BindFramebuffer {
        /// Framebuffer handle
        framebuffer: FramebufferHandle,
        /// Viewport width
        width: u32,
        /// Viewport height
        height: u32,
    },
    /// Rendering returned to the window with this viewport
    UnbindFramebuffer(Viewport),
    /// A framebuffer was released
    DestroyFramebuffer(FramebufferHandle),
    /// State was enabled
    Enable(RenderState),
    /// State was disabled
    Disable(RenderState),
    /// The blend equation changed
    SetBlendMode(BlendMode),
    /// Attachments were cleared
    Clear {
        /// Cleared attachments
        flags: ClearFlags,
        /// Clear colour
        color: Vec4,
    },
}

#[derive(Debug, Clone)]
struct FramebufferRecord {
    descriptor: FramebufferDescriptor,
    color: Option<TextureHandle>,
    depth: Option<TextureHandle>,
}

/// Headless [`RenderBackend`] that records every call
#[derive(Debug)]
pub struct RecordingBackend {
    commands: Vec<RenderCommand>,
    next_id: u64,
    window: Viewport,
    programs: HashMap<ProgramHandle, String>,
    uniforms: RefCell<Vec<(ProgramHandle, String)>>,
    meshes: HashMap<MeshHandle, u32>,
    framebuffers: HashMap<FramebufferHandle, FramebufferRecord>,
    textures: HashMap<TextureHandle, String>,
    bound_program: Option<ProgramHandle>,
    bound_mesh: Option<MeshHandle>,
    bound_framebuffer: Option<FramebufferHandle>,
    viewport: Viewport,
    state: RenderState,
}

impl RecordingBackend {
    /// Backend whose window is `width` x `height` pixels
    pub fn new(width: u32, height: u32) -> Self {
        let window = Viewport::new(width, height);
        Self {
            commands: Vec::new(),
            next_id: 1,
            window,
            programs: HashMap::new(),
            uniforms: RefCell::new(Vec::new()),
            meshes: HashMap::new(),
            framebuffers: HashMap::new(),
            textures: HashMap::new(),
            bound_program: None,
            bound_mesh: None,
            bound_framebuffer: None,
            viewport: window,
            state: RenderState::empty(),
        }
    }

    fn next_handle(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn record(&mut self, command: RenderCommand) {
        log::trace!("Recorded {:?}", command);
        self.commands.push(command);
    }

    /// Create a texture as if it had been loaded from disk
    pub fn register_texture(&mut self, name: impl Into<String>) -> TextureHandle {
        let handle = TextureHandle(self.next_handle());
        self.textures.insert(handle, name.into());
        handle
    }

    /// Everything recorded so far
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Drain the command log
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded draw calls, in order
    pub fn draws(&self) -> impl Iterator<Item = &RenderCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, RenderCommand::Draw { .. }))
    }

    /// Index of the first command matching `predicate`
    pub fn position_of(&self, predicate: impl Fn(&RenderCommand) -> bool) -> Option<usize> {
        self.commands.iter().position(predicate)
    }

    /// Index of the last command matching `predicate`
    pub fn last_position_of(&self, predicate: impl Fn(&RenderCommand) -> bool) -> Option<usize> {
        self.commands.iter().rposition(predicate)
    }

    /// Debug name of a program
    pub fn program_name(&self, program: ProgramHandle) -> Option<&str> {
        self.programs.get(&program).map(String::as_str)
    }

    /// Handle of the live program called `name`
    pub fn program_named(&self, name: &str) -> Option<ProgramHandle> {
        self.programs
            .iter()
            .find(|(_, program_name)| program_name.as_str() == name)
            .map(|(handle, _)| *handle)
    }

    /// Number of live programs
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of live meshes
    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Number of live framebuffers
    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }

    /// Currently enabled pipeline state
    pub fn enabled_state(&self) -> RenderState {
        self.state
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Currently bound framebuffer (`None` = window)
    pub fn bound_framebuffer(&self) -> Option<FramebufferHandle> {
        self.bound_framebuffer
    }

    /// Resize the window
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window = Viewport::new(width, height);
        if self.bound_framebuffer.is_none() {
            self.viewport = self.window;
        }
    }

    fn unknown(kind: &'static str, id: u64) -> RenderError {
        RenderError::UnknownHandle { kind, id }
    }
}

impl UniformSink for RecordingBackend {
    fn upload_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let name = usize::try_from(location.0)
            .ok()
            .and_then(|index| self.uniforms.borrow().get(index).map(|(_, name)| name.clone()))
            .unwrap_or_else(|| format!("<location {}>", location.0));
        if self.bound_program.is_none() {
            log::warn!("Uniform '{}' uploaded with no program bound", name);
        }
        self.record(RenderCommand::Uniform {
            program: self.bound_program,
            name,
            value,
        });
    }
}

impl RenderBackend for RecordingBackend {
    fn create_program(&mut self, descriptor: &ShaderDescriptor) -> BackendResult<ProgramHandle> {
        if descriptor.vertex_path.is_empty() || descriptor.fragment_path.is_empty() {
            return Err(RenderError::ResourceCreationFailed(format!(
                "program '{}' is missing a shader stage",
                descriptor.name
            )));
        }
        let program = ProgramHandle(self.next_handle());
        self.programs.insert(program, descriptor.name.clone());
        log::debug!("Created program '{}' ({:?})", descriptor.name, program);
        self.record(RenderCommand::CreateProgram {
            program,
            name: descriptor.name.clone(),
        });
        Ok(program)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> BackendResult<UniformLocation> {
        if !self.programs.contains_key(&program) {
            return Err(Self::unknown("program", program.0));
        }
        let mut uniforms = self.uniforms.borrow_mut();
        let index = match uniforms.iter().position(|(p, n)| *p == program && n == name) {
            Some(index) => index,
            None => {
                uniforms.push((program, name.to_string()));
                uniforms.len() - 1
            }
        };
        i32::try_from(index)
            .map(UniformLocation)
            .map_err(|_| RenderError::BackendError("uniform table overflow".to_string()))
    }

    fn bind_program(&mut self, program: ProgramHandle) {
        self.bound_program = Some(program);
        self.record(RenderCommand::BindProgram(program));
    }

    fn unbind_program(&mut self) {
        self.bound_program = None;
        self.record(RenderCommand::UnbindProgram);
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program).is_none() {
            log::warn!("Destroying unknown program {:?}", program);
        }
        self.record(RenderCommand::DestroyProgram(program));
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> BackendResult<MeshHandle> {
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return Err(RenderError::ResourceCreationFailed(format!("mesh '{}' is empty", mesh.name)));
        }
        let handle = MeshHandle(self.next_handle());
        self.meshes.insert(handle, mesh.index_count());
        log::debug!(
            "Uploaded mesh '{}': {} vertex bytes, {} index bytes",
            mesh.name,
            mesh.vertex_bytes().len(),
            mesh.index_bytes().len()
        );
        self.record(RenderCommand::UploadMesh {
            mesh: handle,
            name: mesh.name.clone(),
            index_count: mesh.index_count(),
        });
        Ok(handle)
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        if self.meshes.remove(&mesh).is_none() {
            log::warn!("Destroying unknown mesh {:?}", mesh);
        }
        self.record(RenderCommand::DestroyMesh(mesh));
    }

    fn bind_mesh(&mut self, mesh: MeshHandle, attribute_count: u32) {
        if !self.meshes.contains_key(&mesh) {
            log::warn!("Binding unknown mesh {:?}", mesh);
        }
        self.bound_mesh = Some(mesh);
        self.record(RenderCommand::BindMesh { mesh, attribute_count });
    }

    fn unbind_mesh(&mut self) {
        self.bound_mesh = None;
        self.record(RenderCommand::UnbindMesh);
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.record(RenderCommand::Draw {
            program: self.bound_program,
            mesh: self.bound_mesh,
            framebuffer: self.bound_framebuffer,
            index_count,
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.record(RenderCommand::BindTexture { unit, texture });
    }

    fn create_framebuffer(&mut self, descriptor: &FramebufferDescriptor) -> BackendResult<FramebufferHandle> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "framebuffer size {}x{} is empty",
                descriptor.width, descriptor.height
            )));
        }
        let framebuffer = FramebufferHandle(self.next_handle());
        let color = descriptor.color_texture.then(|| TextureHandle(self.next_handle()));
        let depth = (descriptor.depth == DepthAttachment::Texture).then(|| TextureHandle(self.next_handle()));
        self.framebuffers.insert(
            framebuffer,
            FramebufferRecord {
                descriptor: *descriptor,
                color,
                depth,
            },
        );
        self.record(RenderCommand::CreateFramebuffer {
            framebuffer,
            descriptor: *descriptor,
        });
        Ok(framebuffer)
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle, width: u32, height: u32) {
        match self.framebuffers.get(&framebuffer) {
            Some(record) if record.descriptor.width != width || record.descriptor.height != height => {
                log::warn!(
                    "Framebuffer {:?} is {}x{} but bound with a {}x{} viewport",
                    framebuffer,
                    record.descriptor.width,
                    record.descriptor.height,
                    width,
                    height
                );
            }
            Some(_) => {}
            None => log::warn!("Binding unknown framebuffer {:?}", framebuffer),
        }
        self.bound_framebuffer = Some(framebuffer);
        self.viewport = Viewport::new(width, height);
        self.record(RenderCommand::BindFramebuffer {
            framebuffer,
            width,
            height,
        });
    }

    fn unbind_framebuffer(&mut self, viewport: Viewport) {
        self.bound_framebuffer = None;
        self.viewport = viewport;
        self.record(RenderCommand::UnbindFramebuffer(viewport));
    }

    fn color_texture(&self, framebuffer: FramebufferHandle) -> BackendResult<TextureHandle> {
        self.framebuffers
            .get(&framebuffer)
            .ok_or_else(|| Self::unknown("framebuffer", framebuffer.0))?
            .color
            .ok_or_else(|| RenderError::BackendError(format!("framebuffer {} has no colour texture", framebuffer.0)))
    }

    fn depth_texture(&self, framebuffer: FramebufferHandle) -> BackendResult<TextureHandle> {
        self.framebuffers
            .get(&framebuffer)
            .ok_or_else(|| Self::unknown("framebuffer", framebuffer.0))?
            .depth
            .ok_or_else(|| RenderError::BackendError(format!("framebuffer {} has no depth texture", framebuffer.0)))
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if self.framebuffers.remove(&framebuffer).is_none() {
            log::warn!("Destroying unknown framebuffer {:?}", framebuffer);
        }
        self.record(RenderCommand::DestroyFramebuffer(framebuffer));
    }

    fn enable(&mut self, state: RenderState) {
        self.state.insert(state);
        self.record(RenderCommand::Enable(state));
    }

    fn disable(&mut self, state: RenderState) {
        self.state.remove(state);
        self.record(RenderCommand::Disable(state));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.record(RenderCommand::SetBlendMode(mode));
    }

    fn clear(&mut self, flags: ClearFlags, color: Vec4) {
        self.record(RenderCommand::Clear { flags, color });
    }

    fn default_viewport(&self) -> Viewport {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_locations_are_stable_per_program() {
        let mut backend = RecordingBackend::new(800, 600);
        let a = backend
            .create_program(&ShaderDescriptor::new("a", "a.vert", "a.frag"))
            .expect("program");
        let b = backend
            .create_program(&ShaderDescriptor::new("b", "b.vert", "b.frag"))
            .expect("program");

        let first = backend.uniform_location(a, "viewMatrix").expect("location");
        assert_eq!(backend.uniform_location(a, "viewMatrix").expect("location"), first);
        assert_ne!(backend.uniform_location(b, "viewMatrix").expect("location"), first);
    }

    #[test]
    fn test_uniform_upload_records_name_and_program() {
        let mut backend = RecordingBackend::new(800, 600);
        let program = backend
            .create_program(&ShaderDescriptor::new("p", "p.vert", "p.frag"))
            .expect("program");
        let location = backend.uniform_location(program, "moveFactor").expect("location");
        backend.bind_program(program);
        backend.set_float(location, 0.25);

        assert_eq!(
            backend.commands().last(),
            Some(&RenderCommand::Uniform {
                program: Some(program),
                name: "moveFactor".to_string(),
                value: UniformValue::Float(0.25),
            })
        );
    }

    #[test]
    fn test_unknown_handles_are_errors() {
        let backend = RecordingBackend::new(800, 600);
        assert!(matches!(
            backend.uniform_location(ProgramHandle(99), "x"),
            Err(RenderError::UnknownHandle { kind: "program", id: 99 })
        ));
        assert!(backend.depth_texture(FramebufferHandle(7)).is_err());
    }

    #[test]
    fn test_framebuffer_binding_tracks_viewport() {
        let mut backend = RecordingBackend::new(1280, 720);
        let fb = backend
            .create_framebuffer(&FramebufferDescriptor::color(320, 180, DepthAttachment::RenderBuffer))
            .expect("framebuffer");
        assert!(backend.color_texture(fb).is_ok());
        assert!(backend.depth_texture(fb).is_err());

        backend.bind_framebuffer(fb, 320, 180);
        assert_eq!(backend.viewport(), Viewport::new(320, 180));
        assert_eq!(backend.bound_framebuffer(), Some(fb));

        let window = backend.default_viewport();
        backend.unbind_framebuffer(window);
        assert_eq!(backend.viewport(), Viewport::new(1280, 720));
        assert_eq!(backend.bound_framebuffer(), None);
    }

    #[test]
    fn test_draw_captures_bound_state() {
        let mut backend = RecordingBackend::new(800, 600);
        let mesh = backend.upload_mesh(&MeshData::quad()).expect("mesh");
        backend.bind_mesh(mesh, 1);
        backend.draw_indexed(6);
        assert_eq!(
            backend.draws().next(),
            Some(&RenderCommand::Draw {
                program: None,
                mesh: Some(mesh),
                framebuffer: None,
                index_count: 6,
            })
        );
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let mut backend = RecordingBackend::new(800, 600);
        let empty = MeshData::new("empty", Vec::new(), Vec::new());
        assert!(matches!(backend.upload_mesh(&empty), Err(RenderError::ResourceCreationFailed(_))));
    }

    #[test]
    fn test_destroyed_mesh_is_no_longer_live() {
        let mut backend = RecordingBackend::new(800, 600);
        let cube = backend.upload_mesh(&MeshData::cube()).expect("cube");
        let quad = backend.upload_mesh(&MeshData::quad()).expect("quad");
        assert_eq!(backend.live_meshes(), 2);

        backend.destroy_mesh(cube);
        assert_eq!(backend.live_meshes(), 1);
        assert_eq!(backend.commands().last(), Some(&RenderCommand::DestroyMesh(cube)));

        backend.destroy_mesh(quad);
        assert_eq!(backend.live_meshes(), 0);
    }
}
