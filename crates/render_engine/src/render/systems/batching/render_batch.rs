//! # Render Batch
//!
//! A batch groups renderables that can share bindings. Inside a batch,
//! renderables are bucketed by mesh so a traversal binds each mesh once.
//! Buckets keep first-seen order and renderables keep insertion order within
//! their bucket.

use crate::foundation::collections::{MaterialId, MeshId, RenderableId};
use crate::render::scene::RenderGroup;

/// Material binding shared by a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchMaterial {
    /// Every member uses this material; `None` groups renderables whose material failed to load
    Shared(Option<MaterialId>),
    /// Members may use different materials, bound per renderable
    Mixed,
}

/// Identity of a batch inside a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchKey {
    /// Render group, `None` for a batch spanning every group
    pub group: Option<RenderGroup>,
    /// Shared material
    pub material: BatchMaterial,
}

impl BatchKey {
    /// Key for one material within one group
    pub fn material(group: RenderGroup, material: Option<MaterialId>) -> Self {
        Self {
            group: Some(group),
            material: BatchMaterial::Shared(material),
        }
    }

    /// Key for a batch holding everything
    pub fn everything() -> Self {
        Self {
            group: None,
            material: BatchMaterial::Mixed,
        }
    }
}

/// Renderables sharing a mesh inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshBucket {
    mesh: Option<MeshId>,
    renderables: Vec<RenderableId>,
}

impl MeshBucket {
    /// Mesh shared by every renderable in the bucket, `None` if it failed to load
    pub fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }

    /// Renderables in insertion order
    pub fn renderables(&self) -> &[RenderableId] {
        &self.renderables
    }

    /// Number of renderables
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    /// Whether the bucket has no renderables
    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }
}

/// A batch of renderables submitted together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBatch {
    key: BatchKey,
    buckets: Vec<MeshBucket>,
    len: usize,
}

impl RenderBatch {
    /// Create an empty batch
    pub fn new(key: BatchKey) -> Self {
        Self {
            key,
            buckets: Vec::new(),
            len: 0,
        }
    }

    /// Batch identity
    pub fn key(&self) -> BatchKey {
        self.key
    }

    /// Render group, `None` for a batch spanning every group
    pub fn group(&self) -> Option<RenderGroup> {
        self.key.group
    }

    /// Material binding shared by the batch
    pub fn material(&self) -> BatchMaterial {
        self.key.material
    }

    /// Mesh buckets in first-seen order
    pub fn buckets(&self) -> &[MeshBucket] {
        &self.buckets
    }

    /// The bucket for a mesh
    pub fn bucket(&self, mesh: Option<MeshId>) -> Option<&MeshBucket> {
        self.buckets.iter().find(|b| b.mesh == mesh)
    }

    /// Number of mesh buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of renderables across all buckets
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the batch has no renderables
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the batch holds a renderable
    pub fn contains(&self, id: RenderableId) -> bool {
        self.buckets.iter().any(|b| b.renderables.contains(&id))
    }

    /// Every renderable, bucket by bucket
    pub fn renderables(&self) -> impl Iterator<Item = RenderableId> + '_ {
        self.buckets.iter().flat_map(|b| b.renderables.iter().copied())
    }

    pub(crate) fn insert(&mut self, id: RenderableId, mesh: Option<MeshId>) {
        match self.buckets.iter_mut().find(|b| b.mesh == mesh) {
            Some(bucket) => bucket.renderables.push(id),
            None => self.buckets.push(MeshBucket {
                mesh,
                renderables: vec![id],
            }),
        }
        self.len += 1;
    }

    /// Remove a renderable from its mesh bucket, dropping the bucket when it empties
    pub(crate) fn remove(&mut self, id: RenderableId, mesh: Option<MeshId>) -> bool {
        let Some(bucket_index) = self.buckets.iter().position(|b| b.mesh == mesh) else {
            return false;
        };

        let bucket = &mut self.buckets[bucket_index];
        let Some(position) = bucket.renderables.iter().position(|r| *r == id) else {
            return false;
        };

        bucket.renderables.remove(position);
        if bucket.renderables.is_empty() {
            self.buckets.remove(bucket_index);
        }
        self.len -= 1;
        true
    }
}
