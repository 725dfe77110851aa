//! Context state configuration and redundant-state elimination
//!
//! Materials declare the fixed-function state they need; the tracker diffs it
//! against what the backend already has before each batch draws.

pub mod context_state;
pub mod state_tracker;

pub use context_state::{
    BlendMode, CompareOp, CullMode, DepthBias, DepthState, GraphicsContextState, PolygonMode,
    ScissorRect, StateChanges, StencilOp, StencilState,
};
pub use state_tracker::StateTracker;
