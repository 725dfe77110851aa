//! Graphics context state and field-by-field diffing
//!
//! A [`GraphicsContextState`] describes the fixed-function configuration a
//! batch needs: depth, stencil, blending, culling, scissor, polygon mode and
//! depth bias. States compare by value. [`GraphicsContextState::diff`] reports
//! exactly which groups of fields differ so a backend only touches those.

use serde::{Deserialize, Serialize};

/// Comparison function used by depth and stencil tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// Test never passes
    Never,
    /// Passes when the incoming value is less than the stored value
    Less,
    /// Passes when the values are equal
    Equal,
    /// Passes when the incoming value is less than or equal to the stored value
    LessOrEqual,
    /// Passes when the incoming value is greater than the stored value
    Greater,
    /// Passes when the values differ
    NotEqual,
    /// Passes when the incoming value is greater than or equal to the stored value
    GreaterOrEqual,
    /// Test always passes
    Always,
}

/// Depth buffer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthState {
    /// Enable depth testing
    pub test: bool,
    /// Enable depth writing
    pub write: bool,
    /// Depth comparison function
    pub compare: CompareOp,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test: true,
            write: true,
            compare: CompareOp::Less,
        }
    }
}

/// Action taken on the stencil buffer after a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StencilOp {
    /// Keep the current value
    Keep,
    /// Set the value to zero
    Zero,
    /// Replace the value with the reference value
    Replace,
    /// Increment and clamp
    IncrementClamp,
    /// Decrement and clamp
    DecrementClamp,
    /// Bitwise invert
    Invert,
}

/// Stencil buffer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StencilState {
    /// Enable stencil testing
    pub enabled: bool,
    /// Stencil comparison function
    pub compare: CompareOp,
    /// Reference value for comparison and replace
    pub reference: u8,
    /// Mask applied when reading
    pub read_mask: u8,
    /// Mask applied when writing
    pub write_mask: u8,
    /// Operation when the stencil test fails
    pub fail_op: StencilOp,
    /// Operation when both stencil and depth tests pass
    pub pass_op: StencilOp,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            enabled: false,
            compare: CompareOp::Always,
            reference: 0,
            read_mask: 0xFF,
            write_mask: 0xFF,
            fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
        }
    }
}

/// Blending modes for different rendering effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Blending disabled, source replaces destination
    #[default]
    Disabled,
    /// Standard alpha blending
    Alpha,
    /// Additive blending for particles and lights
    Additive,
    /// Multiplicative blending for shadows
    Multiplicative,
    /// Pre-multiplied alpha
    Premultiplied,
}

/// Face culling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    #[default]
    Back,
}

/// Polygon rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolygonMode {
    /// Normal solid rendering
    #[default]
    Fill,
    /// Wireframe mode
    Line,
    /// Point cloud mode
    Point,
}

/// Scissor rectangle in framebuffer pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScissorRect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Depth bias configuration to prevent z-fighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBias {
    /// Constant depth bias factor
    pub constant_factor: f32,
    /// Slope-scaled depth bias factor
    pub slope_factor: f32,
    /// Maximum depth bias clamp value
    pub clamp: f32,
}

bitflags::bitflags! {
    /// Groups of context state that differ between two states
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateChanges: u32 {
        /// Depth test enable or compare function
        const DEPTH_TEST = 1 << 0;
        /// Depth write enable
        const DEPTH_WRITE = 1 << 1;
        /// Any stencil field
        const STENCIL = 1 << 2;
        /// Blend mode
        const BLEND = 1 << 3;
        /// Cull mode
        const CULL = 1 << 4;
        /// Scissor rectangle or scissor enable
        const SCISSOR = 1 << 5;
        /// Polygon mode
        const POLYGON_MODE = 1 << 6;
        /// Depth bias
        const DEPTH_BIAS = 1 << 7;
    }
}

impl StateChanges {
    /// Number of state groups that need re-applying
    pub fn count(self) -> usize {
        self.bits().count_ones() as usize
    }
}

/// Complete fixed-function configuration applied before a batch draws
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsContextState {
    /// Depth buffer configuration
    pub depth: DepthState,
    /// Stencil buffer configuration
    pub stencil: StencilState,
    /// Blend mode
    pub blend: BlendMode,
    /// Face culling
    pub cull: CullMode,
    /// Scissor rectangle, `None` disables the scissor test
    pub scissor: Option<ScissorRect>,
    /// Polygon rasterization mode
    pub polygon_mode: PolygonMode,
    /// Depth bias, `None` disables it
    pub depth_bias: Option<DepthBias>,
}

impl GraphicsContextState {
    /// State for opaque geometry: depth test and write, back-face culling
    pub fn opaque() -> Self {
        Self::default()
    }

    /// State for transparent geometry: depth test without write, alpha blending, no culling
    pub fn transparent() -> Self {
        Self {
            depth: DepthState {
                write: false,
                ..DepthState::default()
            },
            blend: BlendMode::Alpha,
            cull: CullMode::None,
            ..Self::default()
        }
    }

    /// State for screen-space overlays: no depth, alpha blending, no culling
    pub fn overlay() -> Self {
        Self {
            depth: DepthState {
                test: false,
                write: false,
                compare: CompareOp::Always,
            },
            blend: BlendMode::Alpha,
            cull: CullMode::None,
            ..Self::default()
        }
    }

    /// Set the blend mode
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Set the cull mode
    pub fn with_cull(mut self, cull: CullMode) -> Self {
        self.cull = cull;
        self
    }

    /// Set the scissor rectangle
    pub fn with_scissor(mut self, scissor: Option<ScissorRect>) -> Self {
        self.scissor = scissor;
        self
    }

    /// Set the polygon mode
    pub fn with_polygon_mode(mut self, polygon_mode: PolygonMode) -> Self {
        self.polygon_mode = polygon_mode;
        self
    }

    /// Compare against `target` and report which state groups differ
    ///
    /// Only fields are inspected; no backend is involved.
    pub fn diff(&self, target: &Self) -> StateChanges {
        let mut changes = StateChanges::empty();

        if self.depth.test != target.depth.test || self.depth.compare != target.depth.compare {
            changes |= StateChanges::DEPTH_TEST;
        }
        if self.depth.write != target.depth.write {
            changes |= StateChanges::DEPTH_WRITE;
        }
        if self.stencil != target.stencil {
            changes |= StateChanges::STENCIL;
        }
        if self.blend != target.blend {
            changes |= StateChanges::BLEND;
        }
        if self.cull != target.cull {
            changes |= StateChanges::CULL;
        }
        if self.scissor != target.scissor {
            changes |= StateChanges::SCISSOR;
        }
        if self.polygon_mode != target.polygon_mode {
            changes |= StateChanges::POLYGON_MODE;
        }
        if self.depth_bias != target.depth_bias {
            changes |= StateChanges::DEPTH_BIAS;
        }

        changes
    }
}
