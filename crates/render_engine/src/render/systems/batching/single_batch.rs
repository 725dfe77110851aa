//! Everything in one batch
//!
//! Minimal bookkeeping: the batch spans all render groups and materials, so
//! traversal binds materials per renderable. Useful for trivial scenes and as
//! a debug baseline for the material-grouped path.

use super::batch_collection::BatchCollection;
use super::render_batch::BatchKey;
use super::strategy::{BatchingPolicy, BatchingStrategy};
use crate::render::scene::Renderable;

/// Puts every renderable in one mixed-material batch
#[derive(Debug, Default)]
pub struct SingleBatchStrategy {
    batches: BatchCollection,
}

impl SingleBatchStrategy {
    /// Create an empty strategy
    pub fn new() -> Self {
        Self::default()
    }
}

impl BatchingStrategy for SingleBatchStrategy {
    fn policy(&self) -> BatchingPolicy {
        BatchingPolicy::SingleBatch
    }

    fn batch_key(&self, _renderable: &Renderable) -> BatchKey {
        BatchKey::everything()
    }

    fn batches(&self) -> &BatchCollection {
        &self.batches
    }

    fn batches_mut(&mut self) -> &mut BatchCollection {
        &mut self.batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::{MaterialId, MeshId, RenderableId};
    use crate::render::scene::RenderGroup;
    use crate::render::systems::batching::BatchMaterial;
    use slotmap::SlotMap;

    #[test]
    fn test_everything_lands_in_one_batch() {
        let mut meshes: SlotMap<MeshId, ()> = SlotMap::with_key();
        let mut materials: SlotMap<MaterialId, ()> = SlotMap::with_key();
        let mut renderables: SlotMap<RenderableId, Renderable> = SlotMap::with_key();
        let (mesh_a, mesh_b) = (meshes.insert(()), meshes.insert(()));
        let (mat_x, mat_y) = (materials.insert(()), materials.insert(()));

        let r1 = renderables.insert(Renderable::new(mesh_a, mat_x));
        let r2 = renderables.insert(Renderable::new(mesh_a, mat_x));
        let r3 = renderables.insert(Renderable::new(mesh_b, mat_y).in_group(RenderGroup::Transparent));

        let mut strategy = SingleBatchStrategy::new();
        for id in [r1, r2, r3] {
            strategy.add_renderable(id, &renderables[id]).unwrap();
        }

        assert_eq!(strategy.batches().batch_count(), 1);
        let batch = strategy.batch_for(r3).unwrap();
        assert_eq!(batch.material(), BatchMaterial::Mixed);
        assert_eq!(batch.group(), None);
        assert_eq!(batch.bucket_count(), 2);
        assert_eq!(batch.len(), 3);

        for id in [r1, r2, r3] {
            strategy.remove_renderable(id).unwrap();
        }
        assert_eq!(strategy.batches().batch_count(), 0);
    }
}
