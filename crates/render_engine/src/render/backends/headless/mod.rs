//! Headless reference backend
//!
//! Runs the whole device contract on the CPU. Used by tests, by the demo, and
//! as a template for real backends: every resource type owns a handle that is
//! released in `Drop`, and every draw-side call is validated and recorded.

mod device;
mod probe;
mod resources;
mod state;

pub use device::HeadlessDevice;
pub use probe::{HeadlessCommand, HeadlessProbe};
pub use resources::{HeadlessBuffer, HeadlessMaterial, HeadlessMesh, HeadlessTexture};
pub use state::HandleKind;
