//! Rendering paths
//!
//! A rendering path walks the batch set of a scene once per frame and drives
//! the device: begin the frame, apply state, bind, draw, end the frame.
//! Recoverable backend errors are absorbed where they happen; fatal ones end
//! the frame and are returned.

pub mod forward;
pub mod immediate;

use serde::{Deserialize, Serialize};

pub use forward::ForwardRenderingPath;
pub use immediate::ImmediateRenderingPath;

use super::batching::RenderBatch;
use super::statistics::RenderingStatistics;
use crate::foundation::collections::{MaterialId, MeshId, RenderableId};
use crate::render::api::{BackendResult, FrameData, GraphicsDevice, RendererConfig};
use crate::render::pipeline::{GraphicsContextState, StateTracker};
use crate::render::resources::{GpuMaterial, GpuMesh, GpuTexture, ResourceRegistry};
use crate::render::scene::{RenderScene, Renderable};

/// Which rendering path a graphics system uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderingPathKind {
    /// Batched traversal: material once per batch, mesh once per bucket
    #[default]
    Forward,
    /// Rebinds everything per renderable, for debugging and comparison
    Immediate,
}

impl RenderingPathKind {
    /// Build the path for this kind
    pub fn create_path(self) -> Box<dyn RenderingPath> {
        match self {
            Self::Forward => Box::new(ForwardRenderingPath::new()),
            Self::Immediate => Box::new(ImmediateRenderingPath::new()),
        }
    }
}

/// Everything a path needs for one frame
pub struct FrameContext<'a> {
    /// Device receiving the commands
    pub device: &'a mut dyn GraphicsDevice,
    /// Resources the renderables refer to
    pub resources: &'a ResourceRegistry,
    /// Scene whose batches are walked
    pub scene: &'a RenderScene,
    /// Camera and lights for this frame
    pub frame: &'a FrameData,
    /// Context state already applied to the device
    pub state: &'a mut StateTracker,
    /// Renderer settings
    pub config: &'a RendererConfig,
}

/// Walks batches and issues backend commands
pub trait RenderingPath {
    /// Which path this is
    fn kind(&self) -> RenderingPathKind;

    /// Render one frame, accumulating into `stats`
    ///
    /// Returns an error only when the frame could not be completed.
    fn render(&mut self, ctx: FrameContext<'_>, stats: &mut RenderingStatistics) -> BackendResult<()>;
}

impl std::fmt::Debug for dyn RenderingPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderingPath").field("kind", &self.kind()).finish()
    }
}

/// A material with every texture it samples
pub(crate) struct ResolvedMaterial<'a> {
    pub material: &'a dyn GpuMaterial,
    pub textures: Vec<&'a dyn GpuTexture>,
}

impl ResolvedMaterial<'_> {
    /// Context state the material requires
    pub fn state(&self) -> &GraphicsContextState {
        &self.material.descriptor().state
    }
}

/// Resolve a material and its textures; `None` if anything is missing
pub(crate) fn resolve_material(
    resources: &ResourceRegistry,
    id: Option<MaterialId>,
) -> Option<ResolvedMaterial<'_>> {
    let material = resources.material(id?)?;
    let textures = material
        .descriptor()
        .textures
        .iter()
        .map(|binding| resources.texture(binding.texture))
        .collect::<Option<Vec<_>>>()?;
    Some(ResolvedMaterial { material, textures })
}

pub(crate) fn resolve_mesh(resources: &ResourceRegistry, id: Option<MeshId>) -> Option<&dyn GpuMesh> {
    resources.mesh(id?)
}

/// Live, enabled renderables from `ids`, in order
pub(crate) fn enabled_renderables<'a>(
    scene: &'a RenderScene,
    ids: &[RenderableId],
) -> Vec<(RenderableId, &'a Renderable)> {
    ids.iter()
        .filter_map(|id| scene.get(*id).map(|renderable| (*id, renderable)))
        .filter(|(_, renderable)| renderable.is_enabled())
        .collect()
}

/// Enabled and disabled renderable counts of a batch
pub(crate) fn enabled_counts(scene: &RenderScene, batch: &RenderBatch) -> (usize, usize) {
    batch
        .renderables()
        .filter_map(|id| scene.get(id))
        .fold((0, 0), |(enabled, disabled), renderable| {
            if renderable.is_enabled() {
                (enabled + 1, disabled)
            } else {
                (enabled, disabled + 1)
            }
        })
}

/// Turn a backend result into "did it work", failing only on fatal errors
pub(crate) fn absorb(
    result: BackendResult<()>,
    what: &str,
    on_failure: impl FnOnce(),
) -> BackendResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_fatal() => {
            log::error!("Fatal backend error during {}: {}", what, e);
            Err(e)
        }
        Err(e) => {
            log::warn!("{} failed, continuing frame: {}", what, e);
            on_failure();
            Ok(false)
        }
    }
}

/// Apply context state through the tracker, counting changed groups
pub(crate) fn apply_state(
    ctx: &mut FrameContext<'_>,
    state: &GraphicsContextState,
    stats: &mut RenderingStatistics,
) -> BackendResult<bool> {
    match ctx.state.apply(&mut *ctx.device, state) {
        Ok(changes) => {
            stats.record_state_changes(changes.count());
            Ok(true)
        }
        Err(e) => absorb(Err(e), "state apply", || stats.record_failed_bind()),
    }
}

/// Bind per-instance data and draw one renderable with the bound mesh
pub(crate) fn draw_renderable(
    ctx: &mut FrameContext<'_>,
    id: RenderableId,
    renderable: &Renderable,
    mesh: &dyn GpuMesh,
    stats: &mut RenderingStatistics,
) -> BackendResult<()> {
    let bound = ctx.device.bind_instance(renderable.instance());
    if !absorb(bound, "instance bind", || stats.record_failed_bind())? {
        return Ok(());
    }

    let primitive = mesh.draw_primitive();
    let drawn = ctx.device.draw(&primitive);
    if absorb(drawn, "draw", || stats.record_failed_draw())? {
        log::trace!("Drew renderable {:?} ({} elements)", id, primitive.element_count());
        stats.record_draw(primitive.triangle_count());
    }
    Ok(())
}

/// Count renderables skipped for a missing resource
pub(crate) fn skip(ctx: &FrameContext<'_>, count: usize, reason: &str, stats: &mut RenderingStatistics) {
    if count == 0 {
        return;
    }
    stats.record_skipped(count);
    if ctx.config.warn_on_skipped {
        log::warn!("Skipped {} renderable(s): {}", count, reason);
    }
}

/// Begin the frame: forget tracked state and bind camera and lights
pub(crate) fn begin_frame(ctx: &mut FrameContext<'_>) -> BackendResult<()> {
    ctx.state.invalidate();
    let constants = ctx.frame.constants(ctx.config.clear_color);
    ctx.device.begin_frame(&constants, &ctx.frame.lights)
}
