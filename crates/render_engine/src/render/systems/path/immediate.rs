//! Immediate rendering path
//!
//! Walks the same batches in the same order as the forward path but rebinds
//! material and mesh for every renderable. Draw output is identical; the bind
//! counts show what batching saves.

use super::{
    absorb, apply_state, begin_frame, draw_renderable, resolve_material, resolve_mesh, skip,
    FrameContext, RenderingPath, RenderingPathKind,
};
use crate::render::api::BackendResult;
use crate::render::systems::statistics::RenderingStatistics;

/// Unbatched traversal that rebinds everything for each renderable
#[derive(Debug, Default)]
pub struct ImmediateRenderingPath;

impl ImmediateRenderingPath {
    /// Create the immediate path
    pub fn new() -> Self {
        Self
    }
}

impl RenderingPath for ImmediateRenderingPath {
    fn kind(&self) -> RenderingPathKind {
        RenderingPathKind::Immediate
    }

    fn render(&mut self, mut ctx: FrameContext<'_>, stats: &mut RenderingStatistics) -> BackendResult<()> {
        begin_frame(&mut ctx)?;

        let scene = ctx.scene;
        let resources = ctx.resources;

        for (_, batch) in scene.batches().iter() {
            stats.record_batch_visited();

            for id in batch.renderables() {
                let Some(renderable) = scene.get(id) else {
                    continue;
                };
                if !renderable.is_enabled() {
                    stats.record_disabled(1);
                    continue;
                }

                let material = resolve_material(resources, renderable.material());
                let mesh = resolve_mesh(resources, renderable.mesh());
                let (Some(resolved), Some(mesh)) = (material, mesh) else {
                    skip(&ctx, 1, "mesh, material or texture is missing", stats);
                    continue;
                };

                if !apply_state(&mut ctx, resolved.state(), stats)? {
                    continue;
                }

                let bound = ctx.device.bind_material(resolved.material, &resolved.textures);
                if !absorb(bound, "material bind", || stats.record_failed_bind())? {
                    continue;
                }
                stats.record_material_bind();

                let bound = ctx.device.bind_mesh(mesh);
                if !absorb(bound, "mesh bind", || stats.record_failed_bind())? {
                    continue;
                }
                stats.record_mesh_bind();

                draw_renderable(&mut ctx, id, renderable, mesh, stats)?;
            }
        }

        ctx.device.end_frame()
    }
}

#[cfg(test)]
mod tests {
    use crate::render::api::{FrameData, RendererConfig};
    use crate::render::resources::{MaterialDescriptor, MaterialParams, PrimitiveTopology, Vertex};
    use crate::render::scene::Renderable;
    use crate::render::systems::path::RenderingPathKind;
    use crate::render::GraphicsSystem;

    #[test]
    fn test_binds_per_renderable_with_same_draws() {
        let vertices = [
            Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        let config = RendererConfig::default().with_rendering_path(RenderingPathKind::Immediate);
        let (mut system, _probe) = GraphicsSystem::headless(config);
        let mesh = system.create_mesh("tri", &vertices, None, PrimitiveTopology::TriangleList).unwrap();
        let material = system
            .create_material(MaterialDescriptor::opaque("standard", MaterialParams::default()))
            .unwrap();

        let mut scene = system.create_scene();
        for _ in 0..3 {
            scene.on_attached(Renderable::new(mesh, material));
        }

        let stats = system.render_frame(&scene, &FrameData::default()).unwrap();
        assert_eq!(stats.draw_calls(), 3);
        assert_eq!(stats.material_binds(), 3);
        assert_eq!(stats.mesh_binds(), 3);
        assert_eq!(stats.batch_binds(), 0);
    }
}
