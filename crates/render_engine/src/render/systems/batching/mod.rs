//! Batching system
//!
//! Groups renderables into batches so traversal can bind each material once
//! per batch and each mesh once per mesh bucket.

pub mod batch_collection;
pub mod material_groups;
pub mod render_batch;
pub mod single_batch;
pub mod strategy;

pub use batch_collection::BatchCollection;
pub use material_groups::MaterialGroupsStrategy;
pub use render_batch::{BatchKey, BatchMaterial, MeshBucket, RenderBatch};
pub use single_batch::SingleBatchStrategy;
pub use strategy::{BatchingError, BatchingPolicy, BatchingStrategy};
