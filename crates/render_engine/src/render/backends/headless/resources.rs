//! Headless implementations of the resource traits
//!
//! Each resource holds a [`HandleGuard`], so dropping the resource releases
//! its handle exactly once. Meshes and materials own the buffers they were
//! built from and release them together.

use std::any::Any;

use super::state::{HandleGuard, HandleKind, SharedState};
use crate::render::api::{BackendError, BackendResult};
use crate::render::resources::{
    BufferDescriptor, GpuBuffer, GpuMaterial, GpuMesh, GpuTexture, MaterialConstants,
    MaterialDescriptor, MaterialParams, MeshDescriptor, TextureDescriptor,
};

/// CPU-side buffer
#[derive(Debug)]
pub struct HeadlessBuffer {
    descriptor: BufferDescriptor,
    contents: Vec<u8>,
    guard: HandleGuard,
}

impl HeadlessBuffer {
    pub(crate) fn new(state: &SharedState, descriptor: BufferDescriptor, data: &[u8]) -> BackendResult<Self> {
        let size = usize::try_from(descriptor.size)
            .map_err(|_| BackendError::ResourceFailed(format!("buffer size {} too large", descriptor.size)))?;
        if data.len() > size {
            return Err(BackendError::ResourceFailed(format!(
                "initial data ({} bytes) larger than buffer ({} bytes)",
                data.len(),
                size
            )));
        }

        let mut contents = vec![0; size];
        contents[..data.len()].copy_from_slice(data);

        Ok(Self {
            descriptor,
            contents,
            guard: HandleGuard::new(state, HandleKind::Buffer),
        })
    }

    /// Current buffer contents
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

impl GpuBuffer for HeadlessBuffer {
    fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    fn backend_handle(&self) -> u64 {
        self.guard.handle()
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> BackendResult<()> {
        self.guard.state().borrow().check_alive()?;

        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let end = start.checked_add(data.len()).filter(|end| *end <= self.contents.len());
        let Some(end) = end else {
            return Err(BackendError::ResourceFailed(format!(
                "write of {} bytes at offset {} exceeds buffer size {}",
                data.len(),
                offset,
                self.contents.len()
            )));
        };

        self.contents[start..end].copy_from_slice(data);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// CPU-side texture
#[derive(Debug)]
pub struct HeadlessTexture {
    descriptor: TextureDescriptor,
    guard: HandleGuard,
}

impl HeadlessTexture {
    pub(crate) fn new(state: &SharedState, descriptor: TextureDescriptor) -> Self {
        Self {
            descriptor,
            guard: HandleGuard::new(state, HandleKind::Texture),
        }
    }
}

impl GpuTexture for HeadlessTexture {
    fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    fn backend_handle(&self) -> u64 {
        self.guard.handle()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Mesh owning its vertex and index buffers
#[derive(Debug)]
pub struct HeadlessMesh {
    descriptor: MeshDescriptor,
    vertices: Box<dyn GpuBuffer>,
    indices: Option<Box<dyn GpuBuffer>>,
    guard: HandleGuard,
}

impl HeadlessMesh {
    pub(crate) fn new(
        state: &SharedState,
        descriptor: MeshDescriptor,
        vertices: Box<dyn GpuBuffer>,
        indices: Option<Box<dyn GpuBuffer>>,
    ) -> Self {
        Self {
            descriptor,
            vertices,
            indices,
            guard: HandleGuard::new(state, HandleKind::Mesh),
        }
    }
}

impl GpuMesh for HeadlessMesh {
    fn descriptor(&self) -> &MeshDescriptor {
        &self.descriptor
    }

    fn backend_handle(&self) -> u64 {
        self.guard.handle()
    }

    fn vertex_buffer(&self) -> &dyn GpuBuffer {
        self.vertices.as_ref()
    }

    fn index_buffer(&self) -> Option<&dyn GpuBuffer> {
        self.indices.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Material owning its constant buffer
#[derive(Debug)]
pub struct HeadlessMaterial {
    descriptor: MaterialDescriptor,
    constants: Box<dyn GpuBuffer>,
    guard: HandleGuard,
}

impl HeadlessMaterial {
    pub(crate) fn new(state: &SharedState, descriptor: MaterialDescriptor, constants: Box<dyn GpuBuffer>) -> Self {
        Self {
            descriptor,
            constants,
            guard: HandleGuard::new(state, HandleKind::Material),
        }
    }
}

impl GpuMaterial for HeadlessMaterial {
    fn descriptor(&self) -> &MaterialDescriptor {
        &self.descriptor
    }

    fn backend_handle(&self) -> u64 {
        self.guard.handle()
    }

    fn constants_buffer(&self) -> &dyn GpuBuffer {
        self.constants.as_ref()
    }

    fn update_params(&mut self, params: MaterialParams) -> BackendResult<()> {
        let constants = MaterialConstants::from_params(&params, &self.descriptor.textures);
        self.constants.write(0, bytemuck::bytes_of(&constants))?;
        self.descriptor.params = params;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
