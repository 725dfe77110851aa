//! Backend-neutral mesh contract and vertex layout

use std::any::Any;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::buffer::GpuBuffer;

/// Vertex data structure for 3D rendering with position, normal, and texture coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// How vertices are assembled into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Every three elements form a triangle
    #[default]
    TriangleList,
    /// Each element after the second forms a triangle with the previous two
    TriangleStrip,
    /// Every two elements form a line
    LineList,
    /// Consecutive elements form connected lines
    LineStrip,
    /// Each element is a point
    PointList,
}

/// What a single draw call submits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPrimitive {
    /// Primitive assembly
    pub topology: PrimitiveTopology,
    /// Number of vertices in the vertex buffer
    pub vertex_count: u32,
    /// Number of indices, `None` for non-indexed draws
    pub index_count: Option<u32>,
}

impl DrawPrimitive {
    /// Number of elements the draw walks, indices when present
    pub fn element_count(&self) -> u32 {
        self.index_count.unwrap_or(self.vertex_count)
    }

    /// Number of triangles the draw produces
    pub fn triangle_count(&self) -> usize {
        let elements = self.element_count() as usize;
        match self.topology {
            PrimitiveTopology::TriangleList => elements / 3,
            PrimitiveTopology::TriangleStrip => elements.saturating_sub(2),
            PrimitiveTopology::LineList | PrimitiveTopology::LineStrip | PrimitiveTopology::PointList => 0,
        }
    }
}

/// Construction arguments for a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshDescriptor {
    /// Optional label for debugging and name lookup
    pub label: Option<String>,
    /// Primitive assembly
    pub topology: PrimitiveTopology,
    /// Number of vertices
    pub vertex_count: u32,
    /// Number of indices, `None` for non-indexed meshes
    pub index_count: Option<u32>,
}

impl MeshDescriptor {
    /// The draw primitive this mesh submits
    pub fn draw_primitive(&self) -> DrawPrimitive {
        DrawPrimitive {
            topology: self.topology,
            vertex_count: self.vertex_count,
            index_count: self.index_count,
        }
    }
}

/// A mesh living on a backend
///
/// A mesh owns its vertex and index buffers; dropping the mesh releases them.
pub trait GpuMesh: std::fmt::Debug {
    /// Construction arguments
    fn descriptor(&self) -> &MeshDescriptor;

    /// Raw backend handle
    fn backend_handle(&self) -> u64;

    /// Vertex buffer owned by this mesh
    fn vertex_buffer(&self) -> &dyn GpuBuffer;

    /// Index buffer owned by this mesh, if indexed
    fn index_buffer(&self) -> Option<&dyn GpuBuffer>;

    /// Access the concrete backend type
    fn as_any(&self) -> &dyn Any;

    /// The draw primitive this mesh submits
    fn draw_primitive(&self) -> DrawPrimitive {
        self.descriptor().draw_primitive()
    }
}
