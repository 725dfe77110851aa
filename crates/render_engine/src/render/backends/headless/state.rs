//! Shared bookkeeping behind the headless device, its resources and its probe

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::probe::HeadlessCommand;
use crate::render::api::{BackendError, BackendResult};

/// What a live handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// A [`HeadlessBuffer`](super::HeadlessBuffer)
    Buffer,
    /// A [`HeadlessTexture`](super::HeadlessTexture)
    Texture,
    /// A [`HeadlessMesh`](super::HeadlessMesh)
    Mesh,
    /// A [`HeadlessMaterial`](super::HeadlessMaterial)
    Material,
}

#[derive(Debug, Default)]
pub(crate) struct HeadlessState {
    next_handle: u64,
    pub(crate) live: HashMap<u64, HandleKind>,
    pub(crate) released: usize,
    pub(crate) double_releases: usize,
    pub(crate) commands: Vec<HeadlessCommand>,
    pub(crate) failing_draws: usize,
    pub(crate) failing_binds: usize,
    pub(crate) device_lost: bool,
    pub(crate) frame_open: bool,
    pub(crate) frames_completed: u64,
}

pub(crate) type SharedState = Rc<RefCell<HeadlessState>>;

impl HeadlessState {
    pub(crate) fn allocate(&mut self, kind: HandleKind) -> u64 {
        self.next_handle += 1;
        let handle = self.next_handle;
        self.live.insert(handle, kind);
        log::trace!("Allocated headless {:?} handle {}", kind, handle);
        handle
    }

    pub(crate) fn release(&mut self, handle: u64) {
        match self.live.remove(&handle) {
            Some(kind) => {
                self.released += 1;
                log::trace!("Released headless {:?} handle {}", kind, handle);
            }
            None => {
                self.double_releases += 1;
                log::error!("Headless handle {} released twice", handle);
            }
        }
    }

    pub(crate) fn is_live(&self, handle: u64, kind: HandleKind) -> bool {
        self.live.get(&handle) == Some(&kind)
    }

    pub(crate) fn check_alive(&self) -> BackendResult<()> {
        if self.device_lost {
            Err(BackendError::DeviceLost("headless device marked lost".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Owns one backend handle and releases it on drop
#[derive(Debug)]
pub(crate) struct HandleGuard {
    handle: u64,
    state: SharedState,
}

impl HandleGuard {
    pub(crate) fn new(state: &SharedState, kind: HandleKind) -> Self {
        let handle = state.borrow_mut().allocate(kind);
        Self {
            handle,
            state: Rc::clone(state),
        }
    }

    pub(crate) fn handle(&self) -> u64 {
        self.handle
    }

    pub(crate) fn state(&self) -> &SharedState {
        &self.state
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.state.borrow_mut().release(self.handle);
    }
}
