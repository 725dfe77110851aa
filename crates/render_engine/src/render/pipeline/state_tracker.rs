//! Tracks the context state last applied to a backend
//!
//! Only state groups that differ from the tracked state reach the backend.
//! After [`StateTracker::invalidate`] the next apply sends every group.

use super::context_state::{GraphicsContextState, StateChanges};
use crate::render::api::{BackendResult, GraphicsDevice};

/// Remembers the last state applied through a device
#[derive(Debug, Default)]
pub struct StateTracker {
    current: Option<GraphicsContextState>,
}

impl StateTracker {
    /// Create a tracker with unknown backend state
    pub fn new() -> Self {
        Self::default()
    }

    /// The state last applied, if known
    pub fn current(&self) -> Option<&GraphicsContextState> {
        self.current.as_ref()
    }

    /// Forget the tracked state so the next apply is complete
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Apply `target`, sending only the groups that differ
    ///
    /// Returns the applied changes; an empty set means no backend call was made.
    /// On error the tracked state is invalidated since the backend may be partially updated.
    pub fn apply(
        &mut self,
        device: &mut dyn GraphicsDevice,
        target: &GraphicsContextState,
    ) -> BackendResult<StateChanges> {
        let changes = match &self.current {
            Some(current) => current.diff(target),
            None => StateChanges::all(),
        };

        if changes.is_empty() {
            return Ok(changes);
        }

        if let Err(e) = device.apply_state(target, changes) {
            self.current = None;
            return Err(e);
        }

        log::trace!("Applied context state changes: {:?}", changes);
        self.current = Some(*target);
        Ok(changes)
    }
}
