//! Scene-facing side of the renderer
//!
//! Renderables and the scene that batches them.

pub mod render_scene;
pub mod renderable;

pub use render_scene::RenderScene;
pub use renderable::{InstanceData, RenderGroup, Renderable};
