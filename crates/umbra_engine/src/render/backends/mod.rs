//! Backend implementations for the render module
//!
//! Currently only the headless recording backend ships with the engine; GPU
//! backends implement [`RenderBackend`](crate::render::RenderBackend) in the
//! application that owns the window and graphics context.

/// Headless backend that records every call
pub mod recording;

pub use recording::{RecordingBackend, RenderCommand};
