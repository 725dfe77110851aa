//! Render scene: the renderable store and its batching strategy
//!
//! The scene graph drives a [`RenderScene`] through three lifecycle callbacks:
//! attach, detach and material/mesh change. The scene keeps the batch index in
//! step with every callback. Misuse (detaching twice, touching a renderable
//! that was never attached) is a logic error: it is logged, and panics when
//! strict mode is on. The batch index is never left half-updated.

use slotmap::SlotMap;

use super::renderable::{InstanceData, RenderGroup, Renderable};
use crate::foundation::collections::{MaterialId, MeshId, RenderableId};
use crate::foundation::math::Transform;
use crate::render::api::RendererConfig;
use crate::render::RenderResult;
use crate::render::systems::batching::{
    BatchCollection, BatchingError, BatchingPolicy, BatchingStrategy,
};

/// Renderables currently visible, grouped into batches
#[derive(Debug)]
pub struct RenderScene {
    renderables: SlotMap<RenderableId, Renderable>,
    strategy: Box<dyn BatchingStrategy>,
    strict_logic_errors: bool,
    logic_errors: usize,
}

impl RenderScene {
    /// Create an empty scene using `policy`
    ///
    /// Logic errors panic in debug builds and are logged in release builds.
    pub fn new(policy: BatchingPolicy) -> Self {
        Self {
            renderables: SlotMap::with_key(),
            strategy: policy.create_strategy(),
            strict_logic_errors: cfg!(debug_assertions),
            logic_errors: 0,
        }
    }

    /// Create an empty scene from renderer configuration
    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(config.batching_policy).with_strict_logic_errors(config.strict_logic_errors_enabled())
    }

    /// Panic on logic errors instead of logging them
    pub fn with_strict_logic_errors(mut self, strict: bool) -> Self {
        self.strict_logic_errors = strict;
        self
    }

    /// Batching policy in use
    pub fn policy(&self) -> BatchingPolicy {
        self.strategy.policy()
    }

    /// Current batches
    pub fn batches(&self) -> &BatchCollection {
        self.strategy.batches()
    }

    /// The batching strategy
    pub fn strategy(&self) -> &dyn BatchingStrategy {
        self.strategy.as_ref()
    }

    /// Look up a renderable
    pub fn get(&self, id: RenderableId) -> Option<&Renderable> {
        self.renderables.get(id)
    }

    /// Every live renderable
    pub fn iter(&self) -> impl Iterator<Item = (RenderableId, &Renderable)> + '_ {
        self.renderables.iter()
    }

    /// Number of live renderables
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    /// Logic errors reported since the scene was created
    pub fn logic_error_count(&self) -> usize {
        self.logic_errors
    }

    /// A drawable was attached to the scene
    pub fn on_attached(&mut self, renderable: Renderable) -> RenderableId {
        let id = self.renderables.insert(renderable);
        if let Err(error) = self.strategy.add_renderable(id, &self.renderables[id]) {
            self.report_logic_error(error);
        }
        log::trace!("Attached renderable {:?}", id);
        id
    }

    /// A drawable was detached from the scene
    ///
    /// Returns the renderable so the caller can re-attach it later.
    pub fn on_detached(&mut self, id: RenderableId) -> Option<Renderable> {
        let Some(renderable) = self.renderables.remove(id) else {
            self.report_logic_error(BatchingError::UnknownRenderable(id));
            return None;
        };

        if let Err(error) = self.strategy.remove_renderable(id) {
            self.report_logic_error(error);
        }
        log::trace!("Detached renderable {:?}", id);
        Some(renderable)
    }

    /// A drawable swapped its mesh or material
    ///
    /// Removes the renderable from its batch, updates it and adds it back.
    pub fn on_material_or_mesh_changed(
        &mut self,
        id: RenderableId,
        mesh: Option<MeshId>,
        material: Option<MaterialId>,
    ) -> bool {
        self.rebatch(id, |renderable| renderable.set_resources(mesh, material))
    }

    /// Move a renderable to another render group
    pub fn set_group(&mut self, id: RenderableId, group: RenderGroup) -> bool {
        self.rebatch(id, |renderable| renderable.set_group(group))
    }

    /// Enable or disable drawing; the renderable stays in its batch
    pub fn set_enabled(&mut self, id: RenderableId, enabled: bool) -> bool {
        self.update(id, |renderable| renderable.set_enabled(enabled))
    }

    /// Replace per-instance data
    pub fn set_instance(&mut self, id: RenderableId, instance: InstanceData) -> bool {
        self.update(id, |renderable| renderable.set_instance(instance))
    }

    /// Replace the transform, keeping the instance color
    pub fn set_transform(&mut self, id: RenderableId, transform: &Transform) -> bool {
        self.update(id, |renderable| {
            let color = renderable.instance().color;
            renderable.set_instance(InstanceData::from_transform(transform).with_color(color));
        })
    }

    /// Check that every live renderable sits in exactly one batch and that
    /// no batch holds a renderable the scene no longer has
    pub fn validate(&self) -> RenderResult<()> {
        let batches = self.strategy.batches();
        if let Some((id, _)) = self.renderables.iter().find(|(id, _)| !batches.contains(*id)) {
            return Err(BatchingError::NotTracked(id).into());
        }

        let stray = batches
            .iter()
            .flat_map(|(_, batch)| batch.renderables())
            .find(|id| !self.renderables.contains_key(*id));
        if let Some(id) = stray {
            return Err(BatchingError::UnknownRenderable(id).into());
        }

        Ok(())
    }

    /// Detach everything
    pub fn clear(&mut self) {
        self.renderables.clear();
        self.strategy.clear();
    }

    fn update(&mut self, id: RenderableId, apply: impl FnOnce(&mut Renderable)) -> bool {
        match self.renderables.get_mut(id) {
            Some(renderable) => {
                apply(renderable);
                true
            }
            None => {
                self.report_logic_error(BatchingError::UnknownRenderable(id));
                false
            }
        }
    }

    fn rebatch(&mut self, id: RenderableId, apply: impl FnOnce(&mut Renderable)) -> bool {
        let Some(renderable) = self.renderables.get_mut(id) else {
            self.report_logic_error(BatchingError::UnknownRenderable(id));
            return false;
        };

        let removed = self.strategy.remove_renderable(id);
        apply(renderable);
        let added = self.strategy.add_renderable(id, renderable);

        for error in [removed.err(), added.err()].into_iter().flatten() {
            self.report_logic_error(error);
        }
        true
    }

    fn report_logic_error(&mut self, error: BatchingError) {
        self.logic_errors += 1;
        log::error!("Batching logic error: {}", error);
        if self.strict_logic_errors {
            panic!("batching logic error: {error}");
        }
    }
}
