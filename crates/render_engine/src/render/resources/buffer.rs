//! Backend-neutral GPU buffer contract

use std::any::Any;

use crate::render::api::BackendResult;

bitflags::bitflags! {
    /// How a buffer will be bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Vertex attribute data
        const VERTEX = 1 << 0;
        /// Index data
        const INDEX = 1 << 1;
        /// Uniform / constant data
        const UNIFORM = 1 << 2;
        /// Per-instance attribute data
        const INSTANCE = 1 << 3;
        /// Can be written after creation
        const COPY_DST = 1 << 4;
    }
}

/// Construction arguments for a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// Optional label for debugging and name lookup
    pub label: Option<String>,
    /// Size in bytes
    pub size: u64,
    /// Intended bindings
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a descriptor
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    /// Set the debug label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A buffer living on a backend
///
/// The implementing type owns the backend handle exclusively and releases it
/// in `Drop`. Buffers are never cloned; they move into a mesh, a material, or
/// the resource registry.
pub trait GpuBuffer: std::fmt::Debug {
    /// Construction arguments
    fn descriptor(&self) -> &BufferDescriptor;

    /// Raw backend handle, for logging and backend-side lookups
    fn backend_handle(&self) -> u64;

    /// Overwrite `data.len()` bytes starting at `offset`
    fn write(&mut self, offset: u64, data: &[u8]) -> BackendResult<()>;

    /// Access the concrete backend type
    fn as_any(&self) -> &dyn Any;
}
