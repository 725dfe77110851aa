//! # Render Engine
//!
//! Render batching and backend abstraction for real-time renderers.
//!
//! ## Features
//!
//! - **Batching**: renderables grouped by render group and material, sub-grouped
//!   by mesh, maintained incrementally as the scene changes
//! - **Backend Abstraction**: one resource contract for OpenGL, Vulkan and the
//!   bundled headless backend
//! - **State Diffing**: only changed context state reaches the device
//! - **Statistics**: per-frame bind, draw and skip counters
//!
//! ## Quick Start
//!
//! ```rust
//! use render_engine::prelude::*;
//!
//! # fn main() -> Result<(), RenderError> {
//! let (mut graphics, _probe) = GraphicsSystem::headless(RendererConfig::default());
//! let vertices = [
//!     Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
//!     Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
//!     Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
//! ];
//! let mesh = graphics.create_mesh("triangle", &vertices, None, PrimitiveTopology::TriangleList)?;
//! let material = graphics.create_material(MaterialDescriptor::new("standard"))?;
//!
//! let mut scene = graphics.create_scene();
//! scene.on_attached(Renderable::new(mesh, material));
//!
//! let stats = graphics.render_frame(&scene, &FrameData::default())?;
//! assert_eq!(stats.draw_calls(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::new_ret_no_self)]

pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::{
            collections::{MaterialId, MeshId, RenderableId, TextureId},
            math::{Mat4, Transform, Vec3},
        },
        render::{
            BatchingPolicy, FrameData, GraphicsContextState, GraphicsSystem, LightData,
            MaterialDescriptor, MaterialParams, PrimitiveTopology, RenderError, RenderGroup,
            RenderResult, RenderScene, Renderable, RendererConfig, RenderingPathKind,
            RenderingStatistics, TextureDescriptor, TextureFormat, Vertex,
        },
    };
}
