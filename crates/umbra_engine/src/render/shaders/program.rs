//! Generic shader program wrapper
//!
//! [`ShaderProgram`] owns a linked program on the backend and resolves uniform
//! names to locations once, at load time. Binding it yields a
//! [`BoundProgram`] guard: uniform uploads go through the guard, and the
//! program is unbound again when the guard is dropped.

use std::ops::{Deref, DerefMut};

use crate::render::api::{
    BackendResult, ProgramHandle, RenderBackend, ShaderDescriptor, UniformLocation, UniformSink, UniformValue,
};

/// A linked shader program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    handle: ProgramHandle,
    name: String,
}

impl ShaderProgram {
    /// Compile and link the program described by `descriptor`
    pub fn load<B: RenderBackend + ?Sized>(backend: &mut B, descriptor: &ShaderDescriptor) -> BackendResult<Self> {
        let handle = backend.create_program(descriptor)?;
        log::debug!("Loaded shader program '{}' as {:?}", descriptor.name, handle);
        Ok(Self {
            handle,
            name: descriptor.name.clone(),
        })
    }

    /// Resolve a uniform by name
    pub fn uniform<B: RenderBackend + ?Sized>(&self, backend: &B, name: &str) -> BackendResult<UniformLocation> {
        backend.uniform_location(self.handle, name)
    }

    /// Resolve the first `N` elements of a uniform array (`name[0]`, `name[1]`, ...)
    pub fn uniform_array<B: RenderBackend + ?Sized, const N: usize>(
        &self,
        backend: &B,
        name: &str,
    ) -> BackendResult<[UniformLocation; N]> {
        let mut locations = [UniformLocation(-1); N];
        for (i, location) in locations.iter_mut().enumerate() {
            *location = self.uniform(backend, &format!("{name}[{i}]"))?;
        }
        Ok(locations)
    }

    /// Make the program current until the returned guard is dropped
    pub fn bind<'a, B: RenderBackend + ?Sized>(&self, backend: &'a mut B) -> BoundProgram<'a, B> {
        backend.bind_program(self.handle);
        BoundProgram { backend }
    }

    /// Release the program
    pub fn destroy<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        log::debug!("Destroying shader program '{}'", self.name);
        backend.destroy_program(self.handle);
    }

    /// Backend handle
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Guard for a bound program
///
/// Dereferences to the backend so draws can be issued while the program is
/// bound.
pub struct BoundProgram<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
}

impl<B: RenderBackend + ?Sized> UniformSink for BoundProgram<'_, B> {
    fn upload_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.backend.upload_uniform(location, value);
    }
}

impl<B: RenderBackend + ?Sized> Deref for BoundProgram<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> DerefMut for BoundProgram<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> Drop for BoundProgram<'_, B> {
    fn drop(&mut self) {
        self.backend.unbind_program();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::{RecordingBackend, RenderCommand};
    use crate::render::RenderError;

    fn descriptor() -> ShaderDescriptor {
        ShaderDescriptor::new("probe", "shaders/probe.vert", "shaders/probe.frag").with_attribute("position")
    }

    #[test]
    fn test_guard_unbinds_on_drop() {
        let mut backend = RecordingBackend::new(640, 480);
        let program = ShaderProgram::load(&mut backend, &descriptor()).expect("program");
        let location = program.uniform(&backend, "strength").expect("uniform");
        backend.take_commands();

        {
            let mut bound = program.bind(&mut backend);
            bound.set_float(location, 0.5);
        }

        assert_eq!(
            backend.commands(),
            &[
                RenderCommand::BindProgram(program.handle()),
                RenderCommand::Uniform {
                    program: Some(program.handle()),
                    name: "strength".to_string(),
                    value: UniformValue::Float(0.5),
                },
                RenderCommand::UnbindProgram,
            ]
        );
    }

    #[test]
    fn test_uniform_array_resolves_indexed_names() {
        let mut backend = RecordingBackend::new(640, 480);
        let program = ShaderProgram::load(&mut backend, &descriptor()).expect("program");
        let locations: [UniformLocation; 3] = program.uniform_array(&backend, "lightColour").expect("array");
        assert_eq!(locations[0], program.uniform(&backend, "lightColour[0]").expect("uniform"));
        assert_eq!(locations[2], program.uniform(&backend, "lightColour[2]").expect("uniform"));
        assert_ne!(locations[0], locations[1]);
    }

    #[test]
    fn test_destroyed_program_rejects_lookups() {
        let mut backend = RecordingBackend::new(640, 480);
        let program = ShaderProgram::load(&mut backend, &descriptor()).expect("program");
        let copy = program.clone();
        program.destroy(&mut backend);
        assert_eq!(backend.live_programs(), 0);
        assert!(matches!(
            copy.uniform(&backend, "strength"),
            Err(RenderError::UnknownHandle { kind: "program", .. })
        ));
    }
}
