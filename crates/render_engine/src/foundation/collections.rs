//! Typed handles for engine-owned objects
//!
//! Every handle is a slot map key. Two handles compare equal only when they
//! name the same slot and generation, so identity survives value equality:
//! two materials with identical parameters still have distinct handles, and a
//! handle to a destroyed object never resolves again.

pub use slotmap::{SlotMap, SecondaryMap};

slotmap::new_key_type! {
    /// Handle to a GPU buffer owned by a [`ResourceRegistry`](crate::render::resources::ResourceRegistry)
    pub struct BufferId;

    /// Handle to a GPU texture owned by a [`ResourceRegistry`](crate::render::resources::ResourceRegistry)
    pub struct TextureId;

    /// Handle to a mesh owned by a [`ResourceRegistry`](crate::render::resources::ResourceRegistry)
    pub struct MeshId;

    /// Handle to a material owned by a [`ResourceRegistry`](crate::render::resources::ResourceRegistry)
    pub struct MaterialId;

    /// Handle to a renderable tracked by a [`RenderScene`](crate::render::scene::RenderScene)
    pub struct RenderableId;

    /// Handle to a render batch inside a batching strategy
    pub struct BatchId;
}
