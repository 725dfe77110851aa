//! # Rendering System
//!
//! Backend-neutral batching and dispatch.
//!
//! ## Architecture
//!
//! - **Resources**: capability traits for buffers, textures, meshes and
//!   materials, owned by a [`ResourceRegistry`] and referenced by handle
//! - **Scene**: [`Renderable`]s attached to a [`RenderScene`], which keeps them
//!   grouped by the chosen [`BatchingPolicy`]
//! - **Rendering paths**: walk the batches each frame and drive a
//!   [`GraphicsDevice`], binding each material once per batch and each mesh
//!   once per mesh bucket
//! - **Graphics system**: the façade that creates resources, owns the device
//!   and renders frames
//!
//! ## Frame flow
//!
//! Scene mutation → batch update → `render_frame` → begin frame → groups in
//! order → batches → mesh buckets → draws → end frame → statistics.

pub mod api;
pub mod backends;
pub mod graphics_system;
pub mod pipeline;
pub mod resources;
pub mod scene;
pub mod systems;

pub use api::{
    BackendError, BackendKind, BackendResult, FrameData, GraphicsDevice, LightData, RendererConfig,
};
pub use graphics_system::GraphicsSystem;
pub use pipeline::{GraphicsContextState, StateChanges, StateTracker};
pub use resources::{
    MaterialDescriptor, MaterialParams, PrimitiveTopology, ResourceRegistry, TextureDescriptor,
    TextureFormat, Vertex,
};
pub use scene::{InstanceData, RenderGroup, RenderScene, Renderable};
pub use systems::batching::{BatchingError, BatchingPolicy, BatchingStrategy, RenderBatch};
pub use systems::path::{RenderingPath, RenderingPathKind};
pub use systems::RenderingStatistics;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur in the rendering system
#[derive(Error, Debug)]
pub enum RenderError {
    /// A resource could not be created or updated
    ///
    /// Occurs on invalid input data or when the backend rejects the resource.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// The batching API was misused
    #[error("Batching logic error: {0}")]
    Logic(#[from] BatchingError),

    /// The device is unusable; the graphics system must be recreated
    #[error("Fatal backend error: {0}")]
    BackendFatal(BackendError),

    /// Renderer configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
