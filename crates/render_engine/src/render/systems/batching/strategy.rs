//! Batching strategy abstraction
//!
//! A strategy decides which batch a renderable belongs to. The batch
//! bookkeeping itself lives in [`BatchCollection`]; strategies only supply the
//! key, so every policy shares the same add/remove transaction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::batch_collection::BatchCollection;
use super::material_groups::MaterialGroupsStrategy;
use super::render_batch::{BatchKey, RenderBatch};
use super::single_batch::SingleBatchStrategy;
use crate::foundation::collections::{BatchId, RenderableId};
use crate::render::scene::Renderable;

/// Misuse of the batching API
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchingError {
    /// The renderable is already in a batch
    #[error("Renderable {0:?} is already tracked")]
    AlreadyTracked(RenderableId),

    /// The renderable is not in any batch
    #[error("Renderable {0:?} is not tracked")]
    NotTracked(RenderableId),

    /// The handle does not name a live renderable
    #[error("Renderable {0:?} does not exist")]
    UnknownRenderable(RenderableId),
}

/// Which batching strategy a scene uses
///
/// Chosen once when the scene is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BatchingPolicy {
    /// One batch per (render group, material)
    #[default]
    MaterialGroups,
    /// Everything in one batch regardless of material
    SingleBatch,
}

impl BatchingPolicy {
    /// Build the strategy for this policy
    pub fn create_strategy(self) -> Box<dyn BatchingStrategy> {
        match self {
            Self::MaterialGroups => Box::new(MaterialGroupsStrategy::new()),
            Self::SingleBatch => Box::new(SingleBatchStrategy::new()),
        }
    }
}

/// Maps renderables to batches and keeps the batch set current
pub trait BatchingStrategy {
    /// Policy implemented by this strategy
    fn policy(&self) -> BatchingPolicy;

    /// Batch a renderable belongs in
    fn batch_key(&self, renderable: &Renderable) -> BatchKey;

    /// Batches maintained by this strategy
    fn batches(&self) -> &BatchCollection;

    /// Mutable batch storage
    ///
    /// Strategies only change their batches through the default
    /// `add_renderable`, `remove_renderable` and `clear` methods; the
    /// collection's mutators are not public.
    fn batches_mut(&mut self) -> &mut BatchCollection;

    /// Insert a renderable into its batch, creating the batch if absent
    ///
    /// Adding a renderable that is already tracked fails without touching
    /// any batch.
    fn add_renderable(&mut self, id: RenderableId, renderable: &Renderable) -> Result<BatchId, BatchingError> {
        let key = self.batch_key(renderable);
        self.batches_mut().insert(id, key, renderable.mesh())
    }

    /// Remove a renderable from its batch, destroying the batch if it empties
    ///
    /// Removing an untracked renderable is reported, never ignored.
    fn remove_renderable(&mut self, id: RenderableId) -> Result<(), BatchingError> {
        self.batches_mut().remove(id).map(|_| ())
    }

    /// Whether a renderable is tracked
    fn contains(&self, id: RenderableId) -> bool {
        self.batches().contains(id)
    }

    /// The batch currently holding a renderable
    fn batch_for(&self, id: RenderableId) -> Option<&RenderBatch> {
        let batches = self.batches();
        batches.batch_of(id).and_then(|batch| batches.get(batch))
    }

    /// Forget every renderable
    fn clear(&mut self) {
        self.batches_mut().clear();
    }
}

impl std::fmt::Debug for dyn BatchingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchingStrategy")
            .field("policy", &self.policy())
            .field("batches", &self.batches().batch_count())
            .field("renderables", &self.batches().renderable_count())
            .finish()
    }
}
