//! Public rendering API
//!
//! This module contains the backend contract, per-frame data and the
//! renderer configuration.

pub mod graphics_device;
pub mod renderer_config;
pub mod frame_data;

pub use graphics_device::{BackendError, BackendKind, BackendResult, GraphicsDevice};
pub use renderer_config::RendererConfig;
pub use frame_data::{FrameConstants, FrameData, LightData};
