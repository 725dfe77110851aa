//! Active rendering systems
//!
//! Batching keeps renderables grouped as the scene changes; rendering paths
//! walk those groups each frame and fill in the statistics.

pub mod batching;
pub mod path;
pub mod statistics;

pub use statistics::RenderingStatistics;
