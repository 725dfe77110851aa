//! One batch per (render group, material) pair
//!
//! Material identity is handle identity: two materials with equal parameters
//! but different handles never share a batch.

use super::batch_collection::BatchCollection;
use super::render_batch::BatchKey;
use super::strategy::{BatchingPolicy, BatchingStrategy};
use crate::render::scene::Renderable;

/// Default strategy, minimizes material and state changes
#[derive(Debug, Default)]
pub struct MaterialGroupsStrategy {
    batches: BatchCollection,
}

impl MaterialGroupsStrategy {
    /// Create an empty strategy
    pub fn new() -> Self {
        Self::default()
    }
}

impl BatchingStrategy for MaterialGroupsStrategy {
    fn policy(&self) -> BatchingPolicy {
        BatchingPolicy::MaterialGroups
    }

    fn batch_key(&self, renderable: &Renderable) -> BatchKey {
        BatchKey::material(renderable.group(), renderable.material())
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
    use crate::render::systems::batching::{BatchMaterial, BatchingError};
    use slotmap::SlotMap;

    struct Handles {
        renderables: SlotMap<RenderableId, Renderable>,
        meshes: Vec<MeshId>,
        materials: Vec<MaterialId>,
    }

    impl Handles {
        fn new() -> Self {
            let mut meshes: SlotMap<MeshId, ()> = SlotMap::with_key();
            let mut materials: SlotMap<MaterialId, ()> = SlotMap::with_key();
            Self {
                renderables: SlotMap::with_key(),
                meshes: (0..2).map(|_| meshes.insert(())).collect(),
                materials: (0..2).map(|_| materials.insert(())).collect(),
            }
        }

        fn add(&mut self, renderable: Renderable) -> RenderableId {
            self.renderables.insert(renderable)
        }
    }

    #[test]
    fn test_same_material_shares_batch() {
        let mut h = Handles::new();
        let (mesh_a, mesh_b) = (h.meshes[0], h.meshes[1]);
        let (mat_x, mat_y) = (h.materials[0], h.materials[1]);
        let r1 = h.add(Renderable::new(mesh_a, mat_x));
        let r2 = h.add(Renderable::new(mesh_a, mat_x));
        let r3 = h.add(Renderable::new(mesh_b, mat_y));

        let mut strategy = MaterialGroupsStrategy::new();
        for id in [r1, r2, r3] {
            strategy.add_renderable(id, &h.renderables[id]).unwrap();
        }

        assert_eq!(strategy.batches().batch_count(), 2);
        let x = strategy.batch_for(r1).unwrap();
        assert_eq!(x.material(), BatchMaterial::Shared(Some(mat_x)));
        assert_eq!(x.bucket_count(), 1);
        assert_eq!(x.bucket(Some(mesh_a)).unwrap().renderables(), &[r1, r2]);

        let y = strategy.batch_for(r3).unwrap();
        assert_eq!(y.material(), BatchMaterial::Shared(Some(mat_y)));
        assert_eq!(y.bucket(Some(mesh_b)).unwrap().renderables(), &[r3]);
    }

    #[test]
    fn test_groups_split_batches() {
        let mut h = Handles::new();
        let opaque = h.add(Renderable::new(h.meshes[0], h.materials[0]));
        let overlay = h.add(Renderable::new(h.meshes[0], h.materials[0]).in_group(RenderGroup::Overlay));

        let mut strategy = MaterialGroupsStrategy::new();
        strategy.add_renderable(opaque, &h.renderables[opaque]).unwrap();
        strategy.add_renderable(overlay, &h.renderables[overlay]).unwrap();

        assert_eq!(strategy.batches().batch_count(), 2);
        assert_ne!(strategy.batches().batch_of(opaque), strategy.batches().batch_of(overlay));
    }

    #[test]
    fn test_missing_material_batches_together() {
        let mut h = Handles::new();
        let a = h.add(Renderable::from_parts(Some(h.meshes[0]), None));
        let b = h.add(Renderable::from_parts(None, None));

        let mut strategy = MaterialGroupsStrategy::new();
        strategy.add_renderable(a, &h.renderables[a]).unwrap();
        strategy.add_renderable(b, &h.renderables[b]).unwrap();

        let batch = strategy.batch_for(a).unwrap();
        assert_eq!(batch.material(), BatchMaterial::Shared(None));
        assert_eq!(batch.bucket_count(), 2);
    }

    #[test]
    fn test_double_add_and_stray_remove_are_errors() {
        let mut h = Handles::new();
        let r = h.add(Renderable::new(h.meshes[0], h.materials[0]));
        let mut strategy = MaterialGroupsStrategy::new();

        assert_eq!(strategy.remove_renderable(r), Err(BatchingError::NotTracked(r)));
        strategy.add_renderable(r, &h.renderables[r]).unwrap();
        assert_eq!(
            strategy.add_renderable(r, &h.renderables[r]),
            Err(BatchingError::AlreadyTracked(r))
        );
        assert_eq!(strategy.batches().renderable_count(), 1);
    }

    #[test]
    fn test_add_remove_add_matches_single_add() {
        let mut h = Handles::new();
        let r = h.add(Renderable::new(h.meshes[0], h.materials[0]));

        let mut once = MaterialGroupsStrategy::new();
        once.add_renderable(r, &h.renderables[r]).unwrap();

        let mut cycled = MaterialGroupsStrategy::new();
        cycled.add_renderable(r, &h.renderables[r]).unwrap();
        cycled.remove_renderable(r).unwrap();
        cycled.add_renderable(r, &h.renderables[r]).unwrap();

        let snapshot = |s: &MaterialGroupsStrategy| -> Vec<_> {
            s.batches().iter().map(|(_, b)| b.clone()).collect()
        };
        assert_eq!(snapshot(&once), snapshot(&cycled));
    }
}
