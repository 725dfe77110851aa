//! Forward rendering path
//!
//! Visits batches group by group. A batch with a shared material applies the
//! material's state and binds it once, then binds each mesh bucket once and
//! draws its renderables. A mixed batch applies the default state once and
//! binds materials per renderable.

use super::{
    absorb, apply_state, begin_frame, draw_renderable, enabled_counts, enabled_renderables,
    resolve_material, resolve_mesh, skip, FrameContext, RenderingPath, RenderingPathKind,
};
use crate::foundation::collections::MaterialId;
use crate::render::api::BackendResult;
use crate::render::systems::batching::{BatchMaterial, RenderBatch};
use crate::render::systems::statistics::RenderingStatistics;

/// Batched traversal with bindings hoisted to batch and bucket level
#[derive(Debug, Default)]
pub struct ForwardRenderingPath;

impl ForwardRenderingPath {
    /// Create the forward path
    pub fn new() -> Self {
        Self
    }

    fn render_shared(
        &self,
        ctx: &mut FrameContext<'_>,
        batch: &RenderBatch,
        material: Option<MaterialId>,
        stats: &mut RenderingStatistics,
    ) -> BackendResult<()> {
        let scene = ctx.scene;
        let resources = ctx.resources;

        let (enabled, disabled) = enabled_counts(scene, batch);
        stats.record_disabled(disabled);
        if enabled == 0 {
            return Ok(());
        }

        let Some(resolved) = resolve_material(resources, material) else {
            skip(ctx, enabled, "material or one of its textures is missing", stats);
            return Ok(());
        };

        if !apply_state(ctx, resolved.state(), stats)? {
            return Ok(());
        }

        let bound = ctx.device.bind_material(resolved.material, &resolved.textures);
        if !absorb(bound, "material bind", || stats.record_failed_bind())? {
            return Ok(());
        }
        stats.record_batch_bind();
        stats.record_material_bind();

        for bucket in batch.buckets() {
            let renderables = enabled_renderables(scene, bucket.renderables());
            if renderables.is_empty() {
                continue;
            }

            let Some(mesh) = resolve_mesh(resources, bucket.mesh()) else {
                skip(ctx, renderables.len(), "mesh is missing", stats);
                continue;
            };

            let bound = ctx.device.bind_mesh(mesh);
            if !absorb(bound, "mesh bind", || stats.record_failed_bind())? {
                continue;
            }
            stats.record_mesh_bind();

            for (id, renderable) in renderables {
                draw_renderable(ctx, id, renderable, mesh, stats)?;
            }
        }

        Ok(())
    }

    fn render_mixed(
        &self,
        ctx: &mut FrameContext<'_>,
        batch: &RenderBatch,
        stats: &mut RenderingStatistics,
    ) -> BackendResult<()> {
        let scene = ctx.scene;
        let resources = ctx.resources;
        let default_state = ctx.config.default_state;

        let (enabled, disabled) = enabled_counts(scene, batch);
        stats.record_disabled(disabled);
        if enabled == 0 {
            return Ok(());
        }

        if !apply_state(ctx, &default_state, stats)? {
            return Ok(());
        }
        stats.record_batch_bind();

        for bucket in batch.buckets() {
            let renderables = enabled_renderables(scene, bucket.renderables());
            if renderables.is_empty() {
                continue;
            }

            let Some(mesh) = resolve_mesh(resources, bucket.mesh()) else {
                skip(ctx, renderables.len(), "mesh is missing", stats);
                continue;
            };

            let bound = ctx.device.bind_mesh(mesh);
            if !absorb(bound, "mesh bind", || stats.record_failed_bind())? {
                continue;
            }
            stats.record_mesh_bind();

            for (id, renderable) in renderables {
                let Some(resolved) = resolve_material(resources, renderable.material()) else {
                    skip(ctx, 1, "material or one of its textures is missing", stats);
                    continue;
                };

                if !apply_state(ctx, resolved.state(), stats)? {
                    continue;
                }
                let bound = ctx.device.bind_material(resolved.material, &resolved.textures);
                if !absorb(bound, "material bind", || stats.record_failed_bind())? {
                    continue;
                }
                stats.record_material_bind();

                draw_renderable(ctx, id, renderable, mesh, stats)?;
            }
        }

        Ok(())
    }
}

impl RenderingPath for ForwardRenderingPath {
    fn kind(&self) -> RenderingPathKind {
        RenderingPathKind::Forward
    }

    fn render(&mut self, mut ctx: FrameContext<'_>, stats: &mut RenderingStatistics) -> BackendResult<()> {
        begin_frame(&mut ctx)?;

        let scene = ctx.scene;
        for (batch_id, batch) in scene.batches().iter() {
            stats.record_batch_visited();
            log::trace!("Visiting batch {:?} ({} renderables)", batch_id, batch.len());

            match batch.material() {
                BatchMaterial::Shared(material) => self.render_shared(&mut ctx, batch, material, stats)?,
                BatchMaterial::Mixed => self.render_mixed(&mut ctx, batch, stats)?,
            }
        }

        ctx.device.end_frame()
    }
}

#[cfg(test)]
mod tests {
    use crate::render::api::{FrameData, RendererConfig};
    use crate::render::backends::headless::HeadlessCommand;
    use crate::render::resources::{MaterialDescriptor, MaterialParams, PrimitiveTopology, Vertex};
    use crate::render::scene::{RenderGroup, Renderable};
    use crate::render::GraphicsSystem;

    fn triangle() -> [Vertex; 3] {
        [
            Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ]
    }

    #[test]
    fn test_material_bound_once_per_batch() {
        let (mut system, probe) = GraphicsSystem::headless(RendererConfig::default());
        let mesh = system.create_mesh("tri", &triangle(), None, PrimitiveTopology::TriangleList).unwrap();
        let material = system
            .create_material(MaterialDescriptor::opaque("standard", MaterialParams::default()))
            .unwrap();

        let mut scene = system.create_scene();
        for _ in 0..4 {
            scene.on_attached(Renderable::new(mesh, material));
        }

        let stats = system.render_frame(&scene, &FrameData::default()).unwrap().clone();
        assert_eq!(stats.material_binds(), 1);
        assert_eq!(stats.mesh_binds(), 1);
        assert_eq!(stats.draw_calls(), 4);
        assert_eq!(stats.triangles(), 4);
        assert_eq!(probe.count_commands(|c| matches!(c, HeadlessCommand::BindMaterial { .. })), 1);
    }

    #[test]
    fn test_groups_draw_in_fixed_order() {
        let (mut system, probe) = GraphicsSystem::headless(RendererConfig::default());
        let mesh = system.create_mesh("tri", &triangle(), None, PrimitiveTopology::TriangleList).unwrap();
        let overlay = system
            .create_material(MaterialDescriptor::opaque("hud", MaterialParams::default()).with_label("overlay"))
            .unwrap();
        let opaque = system
            .create_material(MaterialDescriptor::opaque("standard", MaterialParams::default()).with_label("opaque"))
            .unwrap();

        let mut scene = system.create_scene();
        scene.on_attached(Renderable::new(mesh, overlay).in_group(RenderGroup::Overlay));
        scene.on_attached(Renderable::new(mesh, opaque));
        system.render_frame(&scene, &FrameData::default()).unwrap();

        let opaque_handle = system.resources().material(opaque).unwrap().backend_handle();
        let first_bind = probe.commands().into_iter().find_map(|c| match c {
            HeadlessCommand::BindMaterial { handle, .. } => Some(handle),
            _ => None,
        });
        assert_eq!(first_bind, Some(opaque_handle));
    }
}
