//! Backend-neutral resource types
//!
//! Each resource kind is a capability trait ([`GpuBuffer`], [`GpuTexture`],
//! [`GpuMesh`], [`GpuMaterial`]) implemented per backend. The batching and
//! dispatch code only sees these traits. Resources are created through the
//! graphics system, owned by the [`ResourceRegistry`], and referenced
//! everywhere else by handle.

pub mod buffer;
pub mod texture;
pub mod mesh;
pub mod material;
pub mod registry;

pub use buffer::{BufferDescriptor, BufferUsage, GpuBuffer};
pub use texture::{GpuTexture, TextureDescriptor, TextureFormat};
pub use mesh::{DrawPrimitive, GpuMesh, MeshDescriptor, PrimitiveTopology, Vertex};
pub use material::{
    GpuMaterial, MaterialConstants, MaterialDescriptor, MaterialParams, TextureBinding,
};
pub use registry::ResourceRegistry;
