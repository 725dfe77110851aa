//! Backend-neutral material contract
//!
//! A material is a shader, its parameters, the textures it samples, and the
//! context state it draws with. Parameters are uploaded to a backend constant
//! buffer as [`MaterialConstants`].

use std::any::Any;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::buffer::GpuBuffer;
use crate::foundation::collections::TextureId;
use crate::foundation::math::Vec3;
use crate::render::api::BackendResult;
use crate::render::pipeline::GraphicsContextState;

/// Number of texture slots reflected in [`MaterialConstants::texture_flags`]
pub const FLAGGED_TEXTURE_SLOTS: usize = 4;

/// Standard material parameters for PBR rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    /// Base color (albedo) - RGB values
    pub base_color: Vec3,
    /// Alpha transparency value
    pub alpha: f32,
    /// Metallic factor (0.0 = dielectric, 1.0 = metallic)
    pub metallic: f32,
    /// Roughness factor (0.0 = mirror, 1.0 = completely rough)
    pub roughness: f32,
    /// Ambient occlusion factor
    pub ambient_occlusion: f32,
    /// Emission color for self-illuminated materials
    pub emission: Vec3,
    /// Emission strength
    pub emission_strength: f32,
    /// Normal map scale factor
    pub normal_scale: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            base_color: Vec3::new(0.8, 0.8, 0.8),
            alpha: 1.0,
            metallic: 0.0,
            roughness: 0.5,
            ambient_occlusion: 1.0,
            emission: Vec3::new(0.0, 0.0, 0.0),
            emission_strength: 0.0,
            normal_scale: 1.0,
        }
    }
}

impl MaterialParams {
    /// Parameters with the given base color
    pub fn with_color(r: f32, g: f32, b: f32) -> Self {
        Self {
            base_color: Vec3::new(r, g, b),
            ..Self::default()
        }
    }

    /// Set the alpha value
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Material constant data uploaded for shader access
///
/// Layout must match the corresponding shader uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    /// Base color (albedo) - RGB + alpha
    pub base_color: [f32; 4],
    /// Metallic, roughness, ambient occlusion, normal_scale
    pub metallic_roughness_ao_normal: [f32; 4],
    /// Emission color - RGB + emission strength
    pub emission: [f32; 4],
    /// Texture usage flags for slots 0..4
    pub texture_flags: [u32; 4],
}

impl MaterialConstants {
    /// Build constants from parameters and the texture slots in use
    pub fn from_params(params: &MaterialParams, textures: &[TextureBinding]) -> Self {
        let mut texture_flags = [0; FLAGGED_TEXTURE_SLOTS];
        for binding in textures {
            if let Some(flag) = texture_flags.get_mut(binding.slot as usize) {
                *flag = 1;
            }
        }

        Self {
            base_color: [params.base_color.x, params.base_color.y, params.base_color.z, params.alpha],
            metallic_roughness_ao_normal: [
                params.metallic,
                params.roughness,
                params.ambient_occlusion,
                params.normal_scale,
            ],
            emission: [
                params.emission.x,
                params.emission.y,
                params.emission.z,
                params.emission_strength,
            ],
            texture_flags,
        }
    }
}

/// A texture bound to a material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    /// Shader binding slot
    pub slot: u32,
    /// Texture owned by the resource registry
    pub texture: TextureId,
}

/// Construction arguments for a material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    /// Optional label for debugging and name lookup
    pub label: Option<String>,
    /// Shader program name resolved by the backend
    pub shader: String,
    /// Shading parameters
    pub params: MaterialParams,
    /// Textures sampled by the shader
    pub textures: Vec<TextureBinding>,
    /// Context state required while drawing with this material
    pub state: GraphicsContextState,
}

impl MaterialDescriptor {
    /// Create an opaque material for `shader` with default parameters
    pub fn new(shader: impl Into<String>) -> Self {
        Self {
            label: None,
            shader: shader.into(),
            params: MaterialParams::default(),
            textures: Vec::new(),
            state: GraphicsContextState::opaque(),
        }
    }

    /// Create an opaque material
    pub fn opaque(shader: impl Into<String>, params: MaterialParams) -> Self {
        Self::new(shader).with_params(params)
    }

    /// Create an alpha-blended material
    pub fn transparent(shader: impl Into<String>, params: MaterialParams) -> Self {
        Self::new(shader)
            .with_params(params)
            .with_state(GraphicsContextState::transparent())
    }

    /// Set the debug label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the shading parameters
    pub fn with_params(mut self, params: MaterialParams) -> Self {
        self.params = params;
        self
    }

    /// Bind a texture to a slot, replacing any texture already in that slot
    pub fn with_texture(mut self, slot: u32, texture: TextureId) -> Self {
        self.textures.retain(|binding| binding.slot != slot);
        self.textures.push(TextureBinding { slot, texture });
        self
    }

    /// Set the required context state
    pub fn with_state(mut self, state: GraphicsContextState) -> Self {
        self.state = state;
        self
    }

    /// Constant data for the current parameters
    pub fn constants(&self) -> MaterialConstants {
        MaterialConstants::from_params(&self.params, &self.textures)
    }
}

/// A material living on a backend
///
/// The implementing type owns its constant buffer and backend handle exclusively.
/// Textures are shared and referenced by [`TextureId`].
pub trait GpuMaterial: std::fmt::Debug {
    /// Construction arguments, with parameters kept current
    fn descriptor(&self) -> &MaterialDescriptor;

    /// Raw backend handle
    fn backend_handle(&self) -> u64;

    /// Backend constant buffer holding [`MaterialConstants`]
    fn constants_buffer(&self) -> &dyn GpuBuffer;

    /// Replace the shading parameters and re-upload the constants
    ///
    /// Only valid between frames.
    fn update_params(&mut self, params: MaterialParams) -> BackendResult<()>;

    /// Access the concrete backend type
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_constants_layout() {
        assert_eq!(std::mem::size_of::<MaterialConstants>(), 64);
    }

    #[test]
    fn test_constants_from_params() {
        let params = MaterialParams::with_color(1.0, 0.5, 0.25).with_alpha(0.5);
        let constants = MaterialConstants::from_params(&params, &[]);
        assert_eq!(constants.base_color, [1.0, 0.5, 0.25, 0.5]);
        assert_eq!(constants.texture_flags, [0, 0, 0, 0]);
    }

    #[test]
    fn test_texture_slots_set_flags_and_replace() {
        let mut textures: SlotMap<TextureId, ()> = SlotMap::with_key();
        let a = textures.insert(());
        let b = textures.insert(());

        let descriptor = MaterialDescriptor::new("standard")
            .with_texture(0, a)
            .with_texture(2, a)
            .with_texture(0, b)
            .with_texture(9, b);

        assert_eq!(descriptor.textures.len(), 3);
        assert_eq!(descriptor.constants().texture_flags, [1, 0, 1, 0]);
        assert!(descriptor.textures.contains(&TextureBinding { slot: 0, texture: b }));
    }

    #[test]
    fn test_transparent_preset_uses_blending() {
        let descriptor = MaterialDescriptor::transparent("glass", MaterialParams::default());
        assert_eq!(descriptor.state, GraphicsContextState::transparent());
    }
}
