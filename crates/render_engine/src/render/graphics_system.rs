//! # Graphics System
//!
//! The application-facing façade over one graphics device. It is the only
//! place resources are created, owns the [`ResourceRegistry`] they live in,
//! and renders [`RenderScene`]s through the configured rendering path.
//!
//! Borrowing keeps frames consistent: `render_frame` borrows the scene and the
//! registry for the whole traversal, so a material cannot be mutated while its
//! batch is being drawn.

use std::time::Instant;

use super::api::{BackendKind, FrameData, GraphicsDevice, RendererConfig};
use super::backends::headless::{HeadlessDevice, HeadlessProbe};
use super::pipeline::StateTracker;
use super::resources::{
    BufferDescriptor, BufferUsage, MaterialDescriptor, MaterialParams, MeshDescriptor,
    PrimitiveTopology, ResourceRegistry, TextureDescriptor, Vertex,
};
use super::scene::RenderScene;
use super::systems::path::{FrameContext, RenderingPath};
use super::systems::RenderingStatistics;
use super::{RenderError, RenderResult};
use crate::foundation::collections::{BufferId, MaterialId, MeshId, TextureId};

/// High-level graphics coordinator
#[derive(Debug)]
pub struct GraphicsSystem {
    device: Box<dyn GraphicsDevice>,
    resources: ResourceRegistry,
    path: Box<dyn RenderingPath>,
    state: StateTracker,
    statistics: RenderingStatistics,
    config: RendererConfig,
    frame_index: u64,
}

impl GraphicsSystem {
    /// Create a graphics system driving `device`
    pub fn new(device: Box<dyn GraphicsDevice>, config: RendererConfig) -> Self {
        log::info!(
            "Initializing graphics system: {:?} backend, {:?} batching, {:?} path",
            device.kind(),
            config.batching_policy,
            config.rendering_path
        );

        Self {
            device,
            resources: ResourceRegistry::new(),
            path: config.rendering_path.create_path(),
            state: StateTracker::new(),
            statistics: RenderingStatistics::default(),
            config,
            frame_index: 0,
        }
    }

    /// Create a graphics system on the headless backend
    pub fn headless(config: RendererConfig) -> (Self, HeadlessProbe) {
        let (device, probe) = HeadlessDevice::new();
        (Self::new(Box::new(device), config), probe)
    }

    /// Create a graphics system from a `.toml` or `.ron` config file
    pub fn from_config_file(device: Box<dyn GraphicsDevice>, path: &str) -> RenderResult<Self> {
        use crate::config::Config;
        let config = RendererConfig::load_from_file(path)?;
        Ok(Self::new(device, config))
    }

    /// Which API the device drives
    pub fn device_kind(&self) -> BackendKind {
        self.device.kind()
    }

    /// Active configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Create an empty scene using the configured batching policy
    pub fn create_scene(&self) -> RenderScene {
        RenderScene::from_config(&self.config)
    }

    /// Every resource created through this system
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Create a standalone buffer
    pub fn create_buffer(&mut self, descriptor: &BufferDescriptor, data: &[u8]) -> RenderResult<BufferId> {
        let buffer = self.device.create_buffer(descriptor, data).map_err(creation_failed("buffer"))?;
        Ok(self.resources.insert_buffer(buffer))
    }

    /// Overwrite part of a standalone buffer
    pub fn write_buffer(&mut self, id: BufferId, offset: u64, data: &[u8]) -> RenderResult<()> {
        let buffer = self
            .resources
            .buffer_mut(id)
            .ok_or_else(|| RenderError::ResourceCreationFailed(format!("buffer {:?} does not exist", id)))?;
        buffer.write(offset, data).map_err(creation_failed("buffer write"))
    }

    /// Create a texture; `data` must be empty or exactly one full image
    pub fn create_texture(&mut self, descriptor: &TextureDescriptor, data: &[u8]) -> RenderResult<TextureId> {
        if !data.is_empty() && data.len() as u64 != descriptor.expected_size() {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture {:?} expects {} bytes, got {}",
                descriptor.label,
                descriptor.expected_size(),
                data.len()
            )));
        }

        let texture = self.device.create_texture(descriptor, data).map_err(creation_failed("texture"))?;
        Ok(self.resources.insert_texture(texture))
    }

    /// Create a mesh from vertices and optional indices
    pub fn create_mesh(
        &mut self,
        label: &str,
        vertices: &[Vertex],
        indices: Option<&[u32]>,
        topology: PrimitiveTopology,
    ) -> RenderResult<MeshId> {
        if vertices.is_empty() {
            return Err(RenderError::ResourceCreationFailed(format!("mesh '{}' has no vertices", label)));
        }
        let vertex_count = u32::try_from(vertices.len())
            .map_err(|_| RenderError::ResourceCreationFailed(format!("mesh '{}' has too many vertices", label)))?;
        if let Some(out_of_range) = indices.and_then(|indices| indices.iter().find(|i| **i >= vertex_count)) {
            return Err(RenderError::ResourceCreationFailed(format!(
                "mesh '{}' index {} out of range for {} vertices",
                label, out_of_range, vertex_count
            )));
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let vertex_buffer = self
            .device
            .create_buffer(
                &BufferDescriptor::new(vertex_bytes.len() as u64, BufferUsage::VERTEX).with_label(format!("{label} vertices")),
                vertex_bytes,
            )
            .map_err(creation_failed("vertex buffer"))?;

        let index_buffer = match indices {
            Some(indices) => {
                let index_bytes: &[u8] = bytemuck::cast_slice(indices);
                let buffer = self
                    .device
                    .create_buffer(
                        &BufferDescriptor::new(index_bytes.len() as u64, BufferUsage::INDEX).with_label(format!("{label} indices")),
                        index_bytes,
                    )
                    .map_err(creation_failed("index buffer"))?;
                Some(buffer)
            }
            None => None,
        };

        let descriptor = MeshDescriptor {
            label: Some(label.to_string()),
            topology,
            vertex_count,
            index_count: indices.map(|indices| indices.len() as u32),
        };

        let mesh = self
            .device
            .create_mesh(&descriptor, vertex_buffer, index_buffer)
            .map_err(creation_failed("mesh"))?;
        log::debug!("Created mesh '{}' ({} vertices)", label, vertex_count);
        Ok(self.resources.insert_mesh(mesh))
    }

    /// Create a material and its constant buffer
    ///
    /// Every texture the descriptor references must already exist.
    pub fn create_material(&mut self, descriptor: MaterialDescriptor) -> RenderResult<MaterialId> {
        if let Some(missing) = descriptor
            .textures
            .iter()
            .find(|binding| self.resources.texture(binding.texture).is_none())
        {
            return Err(RenderError::ResourceCreationFailed(format!(
                "material {:?} references missing texture {:?} in slot {}",
                descriptor.label, missing.texture, missing.slot
            )));
        }

        let constants = descriptor.constants();
        let constant_bytes = bytemuck::bytes_of(&constants);
        let buffer = self
            .device
            .create_buffer(
                &BufferDescriptor::new(constant_bytes.len() as u64, BufferUsage::UNIFORM | BufferUsage::COPY_DST),
                constant_bytes,
            )
            .map_err(creation_failed("material constants"))?;

        let material = self
            .device
            .create_material(&descriptor, buffer)
            .map_err(creation_failed("material"))?;
        log::debug!("Created material {:?} with shader '{}'", descriptor.label, descriptor.shader);
        Ok(self.resources.insert_material(material))
    }

    /// Change material parameters between frames
    pub fn update_material_params(&mut self, id: MaterialId, params: MaterialParams) -> RenderResult<()> {
        let material = self
            .resources
            .material_mut(id)
            .ok_or_else(|| RenderError::ResourceCreationFailed(format!("material {:?} does not exist", id)))?;
        material.update_params(params).map_err(creation_failed("material update"))
    }

    /// Destroy a buffer, releasing its backend handle
    pub fn destroy_buffer(&mut self, id: BufferId) -> bool {
        self.resources.remove_buffer(id)
    }

    /// Destroy a texture; materials sampling it are skipped from then on
    pub fn destroy_texture(&mut self, id: TextureId) -> bool {
        self.resources.remove_texture(id)
    }

    /// Destroy a mesh; renderables using it are skipped from then on
    pub fn destroy_mesh(&mut self, id: MeshId) -> bool {
        self.resources.remove_mesh(id)
    }

    /// Destroy a material; renderables using it are skipped from then on
    pub fn destroy_material(&mut self, id: MaterialId) -> bool {
        self.resources.remove_material(id)
    }

    /// Render one frame of `scene`
    ///
    /// Broken resources and recoverable backend errors are absorbed and
    /// counted. A fatal backend error ends the frame and is returned; the
    /// device has to be recreated before rendering again.
    pub fn render_frame(&mut self, scene: &RenderScene, frame: &FrameData) -> RenderResult<&RenderingStatistics> {
        if cfg!(debug_assertions) {
            scene.validate()?;
        }

        self.frame_index += 1;
        self.statistics.reset(self.frame_index);
        log::trace!("Begin frame {}", self.frame_index);

        let start = Instant::now();
        let ctx = FrameContext {
            device: self.device.as_mut(),
            resources: &self.resources,
            scene,
            frame,
            state: &mut self.state,
            config: &self.config,
        };
        let result = self.path.render(ctx, &mut self.statistics);
        self.statistics.finish(start.elapsed());

        match result {
            Ok(()) => {
                log::trace!("{}", self.statistics);
                Ok(&self.statistics)
            }
            Err(e) if e.is_fatal() => {
                log::error!("Frame {} aborted: {}", self.frame_index, e);
                self.state.invalidate();
                Err(RenderError::BackendFatal(e))
            }
            Err(e) => {
                log::warn!("Frame {} dropped: {}", self.frame_index, e);
                self.state.invalidate();
                Ok(&self.statistics)
            }
        }
    }

    /// Statistics of the last rendered frame
    pub fn statistics(&self) -> &RenderingStatistics {
        &self.statistics
    }

    /// Frames rendered so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

fn creation_failed(what: &'static str) -> impl Fn(super::api::BackendError) -> RenderError {
    move |e| {
        if e.is_fatal() {
            RenderError::BackendFatal(e)
        } else {
            RenderError::ResourceCreationFailed(format!("{what}: {e}"))
        }
    }
}

impl Drop for GraphicsSystem {
    fn drop(&mut self) {
        log::debug!(
            "Shutting down graphics system after {} frames ({} meshes, {} materials)",
            self.frame_index,
            self.resources.mesh_count(),
            self.resources.material_count()
        );
    }
}
