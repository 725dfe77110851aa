//! Backend implementations for the render module
//!
//! Only the headless reference backend ships here; OpenGL and Vulkan devices
//! implement [`GraphicsDevice`](crate::render::api::GraphicsDevice) outside
//! this crate.

pub mod headless;
