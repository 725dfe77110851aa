//! Renderables: the unit the scene contributes to rendering

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::foundation::collections::{MaterialId, MeshId};
use crate::foundation::math::{Mat4, Mat4Ext, Transform};

/// Render group determines when objects are rendered relative to others
///
/// Groups are visited in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum RenderGroup {
    /// Skybox, far background
    Background = 1000,
    /// Opaque solid objects
    #[default]
    Opaque = 2000,
    /// Cutout materials (alpha testing)
    AlphaTest = 2450,
    /// Transparent objects, pre-sorted back-to-front by the producer
    Transparent = 3000,
    /// UI, screen-space effects
    Overlay = 4000,
}

impl RenderGroup {
    /// Every group in traversal order
    pub const ALL: [Self; 5] = [
        Self::Background,
        Self::Opaque,
        Self::AlphaTest,
        Self::Transparent,
        Self::Overlay,
    ];
}

/// Per-instance data bound before each draw
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix, column-major
    pub model: [[f32; 4]; 4],
    /// Per-instance color multiplier
    pub color: [f32; 4],
}

impl Default for InstanceData {
    fn default() -> Self {
        Self::from_matrix(&Mat4::identity())
    }
}

impl InstanceData {
    /// Instance data for a model matrix
    pub fn from_matrix(model: &Mat4) -> Self {
        Self {
            model: model.to_cols_array(),
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Instance data for a transform
    pub fn from_transform(transform: &Transform) -> Self {
        Self::from_matrix(&transform.to_matrix())
    }

    /// Set the color multiplier
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

/// A mesh and material pair drawn with per-instance data
///
/// Mesh and material are handles into the resource registry; `None` marks a
/// resource that failed to load. Renderables are created by plain factory
/// calls and handed to a [`RenderScene`](super::RenderScene), which owns them
/// from then on.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    mesh: Option<MeshId>,
    material: Option<MaterialId>,
    group: RenderGroup,
    instance: InstanceData,
    enabled: bool,
}

impl Renderable {
    /// Create an enabled opaque renderable
    pub fn new(mesh: MeshId, material: MaterialId) -> Self {
        Self::from_parts(Some(mesh), Some(material))
    }

    /// Create a renderable whose resources may be missing
    pub fn from_parts(mesh: Option<MeshId>, material: Option<MaterialId>) -> Self {
        Self {
            mesh,
            material,
            group: RenderGroup::default(),
            instance: InstanceData::default(),
            enabled: true,
        }
    }

    /// Place the renderable in a render group
    pub fn in_group(mut self, group: RenderGroup) -> Self {
        self.group = group;
        self
    }

    /// Set the transform
    pub fn with_transform(mut self, transform: &Transform) -> Self {
        self.instance = InstanceData::from_transform(transform);
        self
    }

    /// Set the per-instance data
    pub fn with_instance(mut self, instance: InstanceData) -> Self {
        self.instance = instance;
        self
    }

    /// Start disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mesh handle, `None` if it failed to load
    pub fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }

    /// Material handle, `None` if it failed to load
    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// Render group
    pub fn group(&self) -> RenderGroup {
        self.group
    }

    /// Per-instance data
    pub fn instance(&self) -> &InstanceData {
        &self.instance
    }

    /// Whether the renderable is drawn
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_resources(&mut self, mesh: Option<MeshId>, material: Option<MaterialId>) {
        self.mesh = mesh;
        self.material = material;
    }

    pub(crate) fn set_group(&mut self, group: RenderGroup) {
        self.group = group;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_instance(&mut self, instance: InstanceData) {
        self.instance = instance;
    }
}
