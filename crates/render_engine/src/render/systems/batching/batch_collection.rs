//! Batch storage and the renderable → batch index
//!
//! A [`BatchCollection`] owns the batches of one strategy. Batches are created
//! lazily on the first renderable with a new key and destroyed as soon as
//! their last renderable leaves. Every mutation updates the batch set and the
//! index together, so there is never a cleanup pass.

use std::collections::{BTreeMap, HashMap};

use slotmap::{SecondaryMap, SlotMap};

use super::render_batch::{BatchKey, RenderBatch};
use super::BatchingError;
use crate::foundation::collections::{BatchId, MeshId, RenderableId};
use crate::render::scene::RenderGroup;

#[derive(Debug, Clone, Copy)]
struct Placement {
    batch: BatchId,
    mesh: Option<MeshId>,
}

/// The batches of one strategy, ordered for traversal
///
/// Read access is public. Mutation is crate-private and goes through the
/// default methods of [`BatchingStrategy`](super::BatchingStrategy), which
/// always key a renderable with the strategy's own `batch_key`:
///
/// ```compile_fail
/// use render_engine::render::BatchingPolicy;
///
/// let mut strategy = BatchingPolicy::MaterialGroups.create_strategy();
/// strategy.batches_mut().clear();
/// ```
#[derive(Debug, Default)]
pub struct BatchCollection {
    batches: SlotMap<BatchId, RenderBatch>,
    lookup: HashMap<BatchKey, BatchId>,
    // BTreeMap keeps groups in traversal order; `None` (all groups) comes first.
    order: BTreeMap<Option<RenderGroup>, Vec<BatchId>>,
    placements: SecondaryMap<RenderableId, Placement>,
}

impl BatchCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live batches
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Number of tracked renderables
    pub fn renderable_count(&self) -> usize {
        self.placements.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Whether a renderable is tracked
    pub fn contains(&self, id: RenderableId) -> bool {
        self.placements.contains_key(id)
    }

    /// Get a batch by handle
    pub fn get(&self, id: BatchId) -> Option<&RenderBatch> {
        self.batches.get(id)
    }

    /// The batch for a key
    pub fn find(&self, key: &BatchKey) -> Option<&RenderBatch> {
        self.lookup.get(key).and_then(|id| self.batches.get(*id))
    }

    /// The batch holding a renderable
    pub fn batch_of(&self, id: RenderableId) -> Option<BatchId> {
        self.placements.get(id).map(|p| p.batch)
    }

    /// Batches of one scope in first-seen order
    ///
    /// `None` selects batches that span every group.
    pub fn group(&self, group: Option<RenderGroup>) -> impl Iterator<Item = &RenderBatch> + '_ {
        self.order
            .get(&group)
            .into_iter()
            .flatten()
            .filter_map(|id| self.batches.get(*id))
    }

    /// Scopes with at least one batch, in traversal order
    pub fn groups(&self) -> impl Iterator<Item = Option<RenderGroup>> + '_ {
        self.order.keys().copied()
    }

    /// Every batch in traversal order: group by group, first-seen within a group
    pub fn iter(&self) -> impl Iterator<Item = (BatchId, &RenderBatch)> + '_ {
        self.order
            .values()
            .flatten()
            .filter_map(|id| self.batches.get(*id).map(|batch| (*id, batch)))
    }

    /// Track a renderable under `key`, creating the batch if needed
    pub(crate) fn insert(
        &mut self,
        id: RenderableId,
        key: BatchKey,
        mesh: Option<MeshId>,
    ) -> Result<BatchId, BatchingError> {
        if self.placements.contains_key(id) {
            return Err(BatchingError::AlreadyTracked(id));
        }

        let batch_id = match self.lookup.get(&key) {
            Some(batch_id) => *batch_id,
            None => {
                let batch_id = self.batches.insert(RenderBatch::new(key));
                self.lookup.insert(key, batch_id);
                self.order.entry(key.group).or_default().push(batch_id);
                log::debug!("Created batch {:?} for {:?}", batch_id, key);
                batch_id
            }
        };

        self.batches[batch_id].insert(id, mesh);
        self.placements.insert(id, Placement { batch: batch_id, mesh });
        Ok(batch_id)
    }

    /// Stop tracking a renderable, destroying its batch if it was the last member
    ///
    /// On error the index and the batches are left as they were.
    pub(crate) fn remove(&mut self, id: RenderableId) -> Result<BatchId, BatchingError> {
        let placement = *self.placements.get(id).ok_or(BatchingError::NotTracked(id))?;

        let Some(batch) = self.batches.get_mut(placement.batch) else {
            log::error!("Renderable {:?} indexed to missing batch {:?}", id, placement.batch);
            return Err(BatchingError::NotTracked(id));
        };

        if !batch.remove(id, placement.mesh) {
            log::error!("Renderable {:?} missing from its indexed batch {:?}", id, placement.batch);
            return Err(BatchingError::NotTracked(id));
        }

        let emptied = batch.is_empty();
        self.placements.remove(id);
        if emptied {
            self.destroy_batch(placement.batch);
        }

        Ok(placement.batch)
    }

    /// Drop every batch and index entry
    pub(crate) fn clear(&mut self) {
        self.batches.clear();
        self.lookup.clear();
        self.order.clear();
        self.placements.clear();
    }

    fn destroy_batch(&mut self, batch_id: BatchId) {
        let Some(batch) = self.batches.remove(batch_id) else {
            return;
        };
        let key = batch.key();
        self.lookup.remove(&key);

        if let Some(order) = self.order.get_mut(&key.group) {
            order.retain(|id| *id != batch_id);
            if order.is_empty() {
                self.order.remove(&key.group);
            }
        }

        log::debug!("Destroyed empty batch {:?} for {:?}", batch_id, key);
    }
}
