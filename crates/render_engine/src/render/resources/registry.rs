//! Resource registry owning every backend resource
//!
//! The registry is an explicit object owned by the graphics system. It hands
//! out typed handles, resolves them back to resources, and keeps optional
//! name lookups for meshes, materials and textures. Removing a resource drops
//! it, which releases its backend handle; the old handle then resolves to
//! nothing and renderables still pointing at it are drawn as missing.

use std::collections::HashMap;

use slotmap::SlotMap;

use super::{GpuBuffer, GpuMaterial, GpuMesh, GpuTexture};
use crate::foundation::collections::{BufferId, MaterialId, MeshId, TextureId};

/// Central owner of buffers, textures, meshes and materials
#[derive(Default)]
pub struct ResourceRegistry {
    buffers: SlotMap<BufferId, Box<dyn GpuBuffer>>,
    textures: SlotMap<TextureId, Box<dyn GpuTexture>>,
    meshes: SlotMap<MeshId, Box<dyn GpuMesh>>,
    materials: SlotMap<MaterialId, Box<dyn GpuMaterial>>,
    texture_names: HashMap<String, TextureId>,
    mesh_names: HashMap<String, MeshId>,
    material_names: HashMap<String, MaterialId>,
}

fn register_name<K: Copy + std::fmt::Debug>(names: &mut HashMap<String, K>, label: Option<&String>, id: K) {
    if let Some(label) = label {
        if let Some(previous) = names.insert(label.clone(), id) {
            log::warn!("Resource name '{}' moved from {:?} to {:?}", label, previous, id);
        }
    }
}

fn unregister_name<K: PartialEq>(names: &mut HashMap<String, K>, label: Option<&String>, id: K) {
    if let Some(label) = label {
        if names.get(label) == Some(&id) {
            names.remove(label);
        }
    }
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_buffer(&mut self, buffer: Box<dyn GpuBuffer>) -> BufferId {
        self.buffers.insert(buffer)
    }

    pub(crate) fn insert_texture(&mut self, texture: Box<dyn GpuTexture>) -> TextureId {
        let label = texture.descriptor().label.clone();
        let id = self.textures.insert(texture);
        register_name(&mut self.texture_names, label.as_ref(), id);
        id
    }

    pub(crate) fn insert_mesh(&mut self, mesh: Box<dyn GpuMesh>) -> MeshId {
        let label = mesh.descriptor().label.clone();
        let id = self.meshes.insert(mesh);
        register_name(&mut self.mesh_names, label.as_ref(), id);
        id
    }

    pub(crate) fn insert_material(&mut self, material: Box<dyn GpuMaterial>) -> MaterialId {
        let label = material.descriptor().label.clone();
        let id = self.materials.insert(material);
        register_name(&mut self.material_names, label.as_ref(), id);
        id
    }

    /// Get a buffer by handle
    pub fn buffer(&self, id: BufferId) -> Option<&dyn GpuBuffer> {
        self.buffers.get(id).map(|b| b.as_ref())
    }

    pub(crate) fn buffer_mut(&mut self, id: BufferId) -> Option<&mut Box<dyn GpuBuffer>> {
        self.buffers.get_mut(id)
    }

    /// Get a texture by handle
    pub fn texture(&self, id: TextureId) -> Option<&dyn GpuTexture> {
        self.textures.get(id).map(|t| t.as_ref())
    }

    /// Get a mesh by handle
    pub fn mesh(&self, id: MeshId) -> Option<&dyn GpuMesh> {
        self.meshes.get(id).map(|m| m.as_ref())
    }

    /// Get a material by handle
    pub fn material(&self, id: MaterialId) -> Option<&dyn GpuMaterial> {
        self.materials.get(id).map(|m| m.as_ref())
    }

    pub(crate) fn material_mut(&mut self, id: MaterialId) -> Option<&mut Box<dyn GpuMaterial>> {
        self.materials.get_mut(id)
    }

    /// Look up a texture by label
    pub fn texture_by_name(&self, name: &str) -> Option<TextureId> {
        self.texture_names.get(name).copied()
    }

    /// Look up a mesh by label
    pub fn mesh_by_name(&self, name: &str) -> Option<MeshId> {
        self.mesh_names.get(name).copied()
    }

    /// Look up a material by label
    pub fn material_by_name(&self, name: &str) -> Option<MaterialId> {
        self.material_names.get(name).copied()
    }

    /// Remove and release a buffer
    pub fn remove_buffer(&mut self, id: BufferId) -> bool {
        self.buffers.remove(id).is_some()
    }

    /// Remove and release a texture
    pub fn remove_texture(&mut self, id: TextureId) -> bool {
        match self.textures.remove(id) {
            Some(texture) => {
                unregister_name(&mut self.texture_names, texture.descriptor().label.as_ref(), id);
                true
            }
            None => false,
        }
    }

    /// Remove and release a mesh together with its buffers
    pub fn remove_mesh(&mut self, id: MeshId) -> bool {
        match self.meshes.remove(id) {
            Some(mesh) => {
                unregister_name(&mut self.mesh_names, mesh.descriptor().label.as_ref(), id);
                true
            }
            None => false,
        }
    }

    /// Remove and release a material together with its constant buffer
    pub fn remove_material(&mut self, id: MaterialId) -> bool {
        match self.materials.remove(id) {
            Some(material) => {
                unregister_name(&mut self.material_names, material.descriptor().label.as_ref(), id);
                true
            }
            None => false,
        }
    }

    /// Number of standalone buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of materials
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Release everything
    pub fn clear(&mut self) {
        log::debug!(
            "Releasing {} materials, {} meshes, {} textures, {} buffers",
            self.materials.len(),
            self.meshes.len(),
            self.textures.len(),
            self.buffers.len()
        );
        self.materials.clear();
        self.meshes.clear();
        self.textures.clear();
        self.buffers.clear();
        self.material_names.clear();
        self.mesh_names.clear();
        self.texture_names.clear();
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("buffers", &self.buffers.len())
            .field("textures", &self.textures.len())
            .field("meshes", &self.meshes.len())
            .field("materials", &self.materials.len())
            .finish()
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        log::debug!("ResourceRegistry dropping with {} materials", self.materials.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::GraphicsDevice;
    use crate::render::backends::headless::HeadlessDevice;
    use crate::render::resources::{BufferDescriptor, BufferUsage, MaterialDescriptor};

    fn make_material(device: &mut HeadlessDevice, label: &str) -> Box<dyn GpuMaterial> {
        let descriptor = MaterialDescriptor::new("standard").with_label(label);
        let constants = device
            .create_buffer(&BufferDescriptor::new(64, BufferUsage::UNIFORM), &[0; 64])
            .unwrap();
        device.create_material(&descriptor, constants).unwrap()
    }

    #[test]
    fn test_name_lookup_and_removal() {
        let (mut device, probe) = HeadlessDevice::new();
        let mut registry = ResourceRegistry::new();

        let id = registry.insert_material(make_material(&mut device, "hull"));
        assert_eq!(registry.material_by_name("hull"), Some(id));
        assert_eq!(probe.live_handles(), 2);

        assert!(registry.remove_material(id));
        assert_eq!(registry.material_by_name("hull"), None);
        assert!(registry.material(id).is_none());
        assert!(!registry.remove_material(id));
        assert_eq!(probe.live_handles(), 0);
        assert_eq!(probe.double_releases(), 0);
    }

    #[test]
    fn test_duplicate_name_points_to_latest() {
        let (mut device, _probe) = HeadlessDevice::new();
        let mut registry = ResourceRegistry::new();

        let first = registry.insert_material(make_material(&mut device, "paint"));
        let second = registry.insert_material(make_material(&mut device, "paint"));
        assert_eq!(registry.material_by_name("paint"), Some(second));

        // Removing the older material must not drop the newer name entry
        registry.remove_material(first);
        assert_eq!(registry.material_by_name("paint"), Some(second));
    }

    #[test]
    fn test_clear_releases_all_handles() {
        let (mut device, probe) = HeadlessDevice::new();
        let mut registry = ResourceRegistry::new();
        registry.insert_material(make_material(&mut device, "a"));
        registry.insert_material(make_material(&mut device, "b"));

        registry.clear();
        assert_eq!(registry.material_count(), 0);
        assert_eq!(probe.live_handles(), 0);
    }
}
