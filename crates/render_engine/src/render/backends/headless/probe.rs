//! Inspection and fault injection for the headless device

use std::rc::Rc;

use super::state::{HandleKind, SharedState};
use crate::render::pipeline::StateChanges;
use crate::render::resources::PrimitiveTopology;
use crate::render::scene::InstanceData;

/// A command the headless device received
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessCommand {
    /// Frame opened with this many lights
    BeginFrame { light_count: usize },
    /// Context state groups re-applied
    ApplyState { changes: StateChanges },
    /// Material bound with its texture handles
    BindMaterial { handle: u64, textures: Vec<u64> },
    /// Mesh buffers bound
    BindMesh { handle: u64 },
    /// Per-instance data bound
    BindInstance { instance: InstanceData },
    /// Draw of `elements` vertices or indices
    Draw { topology: PrimitiveTopology, elements: u32 },
    /// Frame closed
    EndFrame,
}

/// Test-side view of a headless device
///
/// Shares state with the device it was created with, so it can be kept after
/// the device moves into a graphics system.
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    pub(crate) state: SharedState,
}

impl HeadlessProbe {
    /// Every command recorded so far
    pub fn commands(&self) -> Vec<HeadlessCommand> {
        self.state.borrow().commands.clone()
    }

    /// Number of recorded commands matching `predicate`
    pub fn count_commands(&self, predicate: impl Fn(&HeadlessCommand) -> bool) -> usize {
        self.state.borrow().commands.iter().filter(|c| predicate(c)).count()
    }

    /// Forget recorded commands
    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    /// Handles currently allocated
    pub fn live_handles(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Live handles of one kind
    pub fn live_handles_of(&self, kind: HandleKind) -> usize {
        self.state.borrow().live.values().filter(|k| **k == kind).count()
    }

    /// Handles released so far
    pub fn released_count(&self) -> usize {
        self.state.borrow().released
    }

    /// Releases of handles that were not live
    pub fn double_releases(&self) -> usize {
        self.state.borrow().double_releases
    }

    /// Frames that reached `end_frame`
    pub fn frames_completed(&self) -> u64 {
        self.state.borrow().frames_completed
    }

    /// Make every following call fail with `DeviceLost`
    pub fn lose_device(&self) {
        log::warn!("Headless device marked lost");
        self.state.borrow_mut().device_lost = true;
    }

    /// Bring a lost device back
    pub fn restore_device(&self) {
        let mut state = self.state.borrow_mut();
        state.device_lost = false;
        state.frame_open = false;
    }

    /// Fail the next `count` draw calls with a recoverable error
    pub fn fail_next_draws(&self, count: usize) {
        self.state.borrow_mut().failing_draws = count;
    }

    /// Fail the next `count` material or mesh binds with a recoverable error
    pub fn fail_next_binds(&self, count: usize) {
        self.state.borrow_mut().failing_binds = count;
    }

    pub(crate) fn new(state: &SharedState) -> Self {
        Self {
            state: Rc::clone(state),
        }
    }
}
