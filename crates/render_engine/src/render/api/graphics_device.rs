//! Backend abstraction trait for the rendering system
//!
//! A backend (OpenGL, Vulkan, or the headless reference backend) implements
//! [`GraphicsDevice`]. Resource creation hands back exclusively-owned trait
//! objects; the draw side is a small set of bind and draw primitives that the
//! rendering path drives. Backends downcast resources they receive through
//! `as_any()` to reach their own handles.

use serde::{Deserialize, Serialize};

use crate::render::pipeline::{GraphicsContextState, StateChanges};
use crate::render::resources::{
    BufferDescriptor, DrawPrimitive, GpuBuffer, GpuMaterial, GpuMesh, GpuTexture,
    MaterialDescriptor, MeshDescriptor, TextureDescriptor,
};
use crate::render::scene::InstanceData;
use super::frame_data::{FrameConstants, LightData};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Which graphics API a device drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Fixed-function / immediate-mode style API
    OpenGl,
    /// Explicit command-buffer API
    Vulkan,
    /// In-memory reference backend with no GPU
    Headless,
}

/// Errors reported by a backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// A draw call could not be submitted; the frame can continue
    #[error("Draw submission failed: {0}")]
    DrawFailed(String),

    /// A resource could not be bound; the frame can continue
    #[error("Resource binding failed: {0}")]
    BindFailed(String),

    /// A resource could not be created or written
    #[error("Resource operation failed: {0}")]
    ResourceFailed(String),

    /// The device is gone; nothing else will succeed until it is recreated
    #[error("Graphics device lost: {0}")]
    DeviceLost(String),

    /// The API context is gone
    #[error("Graphics context lost: {0}")]
    ContextLost(String),
}

impl BackendError {
    /// Whether the error ends the frame and requires reinitialization
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeviceLost(_) | Self::ContextLost(_))
    }
}

/// Main rendering backend trait
pub trait GraphicsDevice {
    /// Which API this device drives
    fn kind(&self) -> BackendKind;

    /// Create a buffer initialized with `data`
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<Box<dyn GpuBuffer>>;

    /// Create a texture initialized with `data`
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> BackendResult<Box<dyn GpuTexture>>;

    /// Create a mesh that takes ownership of its vertex and index buffers
    fn create_mesh(
        &mut self,
        descriptor: &MeshDescriptor,
        vertices: Box<dyn GpuBuffer>,
        indices: Option<Box<dyn GpuBuffer>>,
    ) -> BackendResult<Box<dyn GpuMesh>>;

    /// Create a material that takes ownership of its constant buffer
    fn create_material(
        &mut self,
        descriptor: &MaterialDescriptor,
        constants: Box<dyn GpuBuffer>,
    ) -> BackendResult<Box<dyn GpuMaterial>>;

    /// Start a frame and bind camera and light data
    fn begin_frame(&mut self, frame: &FrameConstants, lights: &[LightData]) -> BackendResult<()>;

    /// Apply the listed groups of `state`; other groups are left untouched
    fn apply_state(&mut self, state: &GraphicsContextState, changes: StateChanges) -> BackendResult<()>;

    /// Bind a material and the textures it samples, in binding order
    fn bind_material(
        &mut self,
        material: &dyn GpuMaterial,
        textures: &[&dyn GpuTexture],
    ) -> BackendResult<()>;

    /// Bind a mesh's vertex and index buffers
    fn bind_mesh(&mut self, mesh: &dyn GpuMesh) -> BackendResult<()>;

    /// Bind per-instance data for the next draw
    fn bind_instance(&mut self, instance: &InstanceData) -> BackendResult<()>;

    /// Issue a draw call with the currently bound state
    fn draw(&mut self, primitive: &DrawPrimitive) -> BackendResult<()>;

    /// Finish the frame and submit
    fn end_frame(&mut self) -> BackendResult<()>;
}

impl std::fmt::Debug for dyn GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice").field("kind", &self.kind()).finish()
    }
}
