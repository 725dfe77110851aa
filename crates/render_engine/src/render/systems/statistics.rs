//! Per-frame rendering statistics
//!
//! Reset by the graphics system at frame start and only incremented during
//! traversal. Readers get a finished snapshot through
//! [`GraphicsSystem::statistics`](crate::render::GraphicsSystem::statistics).

use std::fmt;
use std::time::Duration;

/// Counters for one rendered frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderingStatistics {
    frame_index: u64,
    batches_visited: usize,
    batch_binds: usize,
    material_binds: usize,
    mesh_binds: usize,
    draw_calls: usize,
    triangles: usize,
    skipped_renderables: usize,
    disabled_renderables: usize,
    failed_draws: usize,
    failed_binds: usize,
    state_changes: usize,
    traversal_time_us: u64,
}

impl RenderingStatistics {
    /// Frame these counters belong to
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Batches walked, including ones that drew nothing
    pub fn batches_visited(&self) -> usize {
        self.batches_visited
    }

    /// Batch-level binds: one per batch that drew something
    pub fn batch_binds(&self) -> usize {
        self.batch_binds
    }

    /// Material binds issued
    pub fn material_binds(&self) -> usize {
        self.material_binds
    }

    /// Mesh binds issued
    pub fn mesh_binds(&self) -> usize {
        self.mesh_binds
    }

    /// Draw calls submitted successfully
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    /// Triangles submitted successfully
    pub fn triangles(&self) -> usize {
        self.triangles
    }

    /// Renderables skipped because a resource is missing
    pub fn skipped_renderables(&self) -> usize {
        self.skipped_renderables
    }

    /// Renderables not drawn because they are disabled
    pub fn disabled_renderables(&self) -> usize {
        self.disabled_renderables
    }

    /// Draw calls the backend rejected
    pub fn failed_draws(&self) -> usize {
        self.failed_draws
    }

    /// Material or mesh binds the backend rejected
    pub fn failed_binds(&self) -> usize {
        self.failed_binds
    }

    /// Context state groups re-applied
    pub fn state_changes(&self) -> usize {
        self.state_changes
    }

    /// CPU time spent walking batches
    pub fn traversal_time(&self) -> Duration {
        Duration::from_micros(self.traversal_time_us)
    }

    /// Average successful draws per batch bind
    pub fn avg_draws_per_batch(&self) -> f32 {
        if self.batch_binds == 0 {
            0.0
        } else {
            self.draw_calls as f32 / self.batch_binds as f32
        }
    }

    /// Record one batch reached during traversal
    pub fn record_batch_visited(&mut self) {
        self.batches_visited += 1;
    }

    /// Record one batch-level setup
    pub fn record_batch_bind(&mut self) {
        self.batch_binds += 1;
    }

    /// Record one material bind
    pub fn record_material_bind(&mut self) {
        self.material_binds += 1;
    }

    /// Record one mesh bind
    pub fn record_mesh_bind(&mut self) {
        self.mesh_binds += 1;
    }

    /// Record a successful draw of `triangles` triangles
    pub fn record_draw(&mut self, triangles: usize) {
        self.draw_calls += 1;
        self.triangles += triangles;
    }

    /// Record `count` renderables skipped for missing resources
    pub fn record_skipped(&mut self, count: usize) {
        self.skipped_renderables += count;
    }

    /// Record `count` disabled renderables passed over
    pub fn record_disabled(&mut self, count: usize) {
        self.disabled_renderables += count;
    }

    /// Record a draw the backend rejected
    pub fn record_failed_draw(&mut self) {
        self.failed_draws += 1;
    }

    /// Record a bind the backend rejected
    pub fn record_failed_bind(&mut self) {
        self.failed_binds += 1;
    }

    /// Record `count` context state groups applied
    pub fn record_state_changes(&mut self, count: usize) {
        self.state_changes += count;
    }

    pub(crate) fn reset(&mut self, frame_index: u64) {
        *self = Self {
            frame_index,
            ..Self::default()
        };
    }

    pub(crate) fn finish(&mut self, traversal_time: Duration) {
        self.traversal_time_us = u64::try_from(traversal_time.as_micros()).unwrap_or(u64::MAX);
    }
}

impl fmt::Display for RenderingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {}: {} draws ({} tris) in {} batches, {} material binds, {} mesh binds, {} state changes, {} skipped, {} failed, {}us",
            self.frame_index,
            self.draw_calls,
            self.triangles,
            self.batch_binds,
            self.material_binds,
            self.mesh_binds,
            self.state_changes,
            self.skipped_renderables,
            self.failed_draws + self.failed_binds,
            self.traversal_time_us,
        )
    }
}
