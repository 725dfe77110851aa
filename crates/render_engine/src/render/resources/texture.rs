//! Backend-neutral GPU texture contract

use std::any::Any;

use serde::{Deserialize, Serialize};

/// Texel formats understood by every backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// 8-bit RGBA, linear
    Rgba8Unorm,
    /// 8-bit RGBA, sRGB encoded
    Rgba8Srgb,
    /// Single 8-bit channel
    R8Unorm,
    /// 32-bit float depth
    Depth32Float,
}

impl TextureFormat {
    /// Bytes per texel
    pub fn bytes_per_pixel(self) -> u64 {
        match self {
            Self::Rgba8Unorm | Self::Rgba8Srgb | Self::Depth32Float => 4,
            Self::R8Unorm => 1,
        }
    }
}

/// Construction arguments for a 2D texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Optional label for debugging and name lookup
    pub label: Option<String>,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Texel format
    pub format: TextureFormat,
}

impl TextureDescriptor {
    /// Create a descriptor
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label: None,
            width,
            height,
            format,
        }
    }

    /// Set the debug label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Size in bytes of the initial data this texture expects
    pub fn expected_size(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * self.format.bytes_per_pixel()
    }
}

/// A texture living on a backend
///
/// The implementing type owns the backend handle exclusively and releases it in `Drop`.
pub trait GpuTexture: std::fmt::Debug {
    /// Construction arguments
    fn descriptor(&self) -> &TextureDescriptor;

    /// Raw backend handle
    fn backend_handle(&self) -> u64;

    /// Access the concrete backend type
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_size() {
        assert_eq!(TextureDescriptor::new(4, 2, TextureFormat::Rgba8Unorm).expected_size(), 32);
        assert_eq!(TextureDescriptor::new(4, 2, TextureFormat::R8Unorm).expected_size(), 8);
    }
}
