//! Headless graphics device
//!
//! Implements the full device contract without a GPU. Every bind and draw is
//! validated against the live-handle table and recorded as a
//! [`HeadlessCommand`], so tests can assert exactly what a traversal
//! submitted.

use std::cell::RefCell;
use std::rc::Rc;

use super::probe::{HeadlessCommand, HeadlessProbe};
use super::resources::{HeadlessBuffer, HeadlessMaterial, HeadlessMesh, HeadlessTexture};
use super::state::{HandleKind, HeadlessState, SharedState};
use crate::render::api::{
    BackendError, BackendKind, BackendResult, FrameConstants, GraphicsDevice, LightData,
};
use crate::render::pipeline::{GraphicsContextState, StateChanges};
use crate::render::resources::{
    BufferDescriptor, DrawPrimitive, GpuBuffer, GpuMaterial, GpuMesh, GpuTexture,
    MaterialDescriptor, MeshDescriptor, TextureDescriptor,
};
use crate::render::scene::InstanceData;

/// Graphics device that records commands instead of submitting them
#[derive(Debug)]
pub struct HeadlessDevice {
    state: SharedState,
    bound_mesh: Option<u64>,
}

impl HeadlessDevice {
    /// Create a device and the probe that observes it
    pub fn new() -> (Self, HeadlessProbe) {
        let state = Rc::new(RefCell::new(HeadlessState::default()));
        let probe = HeadlessProbe::new(&state);
        log::info!("Headless graphics device created");
        (
            Self {
                state,
                bound_mesh: None,
            },
            probe,
        )
    }

    fn check_alive(&self) -> BackendResult<()> {
        self.state.borrow().check_alive()
    }

    fn check_frame(&self, operation: &str) -> BackendResult<()> {
        let state = self.state.borrow();
        state.check_alive()?;
        if state.frame_open {
            Ok(())
        } else {
            Err(BackendError::DrawFailed(format!("{} outside of a frame", operation)))
        }
    }

    fn take_bind_failure(&self) -> BackendResult<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_binds > 0 {
            state.failing_binds -= 1;
            return Err(BackendError::BindFailed("injected bind failure".to_string()));
        }
        Ok(())
    }

    fn record(&self, command: HeadlessCommand) {
        log::trace!("Headless command: {:?}", command);
        self.state.borrow_mut().commands.push(command);
    }

    fn ensure_live(&self, handle: u64, kind: HandleKind) -> BackendResult<()> {
        if self.state.borrow().is_live(handle, kind) {
            Ok(())
        } else {
            Err(BackendError::BindFailed(format!("{:?} handle {} is not live", kind, handle)))
        }
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn kind(&self) -> BackendKind {
        BackendKind::Headless
    }

    fn create_buffer(&mut self, descriptor: &BufferDescriptor, data: &[u8]) -> BackendResult<Box<dyn GpuBuffer>> {
        self.check_alive()?;
        let buffer = HeadlessBuffer::new(&self.state, descriptor.clone(), data)?;
        Ok(Box::new(buffer))
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor, data: &[u8]) -> BackendResult<Box<dyn GpuTexture>> {
        self.check_alive()?;
        let expected = descriptor.expected_size();
        if !data.is_empty() && data.len() as u64 != expected {
            return Err(BackendError::ResourceFailed(format!(
                "texture data is {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Box::new(HeadlessTexture::new(&self.state, descriptor.clone())))
    }

    fn create_mesh(
        &mut self,
        descriptor: &MeshDescriptor,
        vertices: Box<dyn GpuBuffer>,
        indices: Option<Box<dyn GpuBuffer>>,
    ) -> BackendResult<Box<dyn GpuMesh>> {
        self.check_alive()?;
        if descriptor.index_count.is_some() != indices.is_some() {
            return Err(BackendError::ResourceFailed(
                "index count and index buffer must be given together".to_string(),
            ));
        }
        Ok(Box::new(HeadlessMesh::new(&self.state, descriptor.clone(), vertices, indices)))
    }

    fn create_material(
        &mut self,
        descriptor: &MaterialDescriptor,
        constants: Box<dyn GpuBuffer>,
    ) -> BackendResult<Box<dyn GpuMaterial>> {
        self.check_alive()?;
        Ok(Box::new(HeadlessMaterial::new(&self.state, descriptor.clone(), constants)))
    }

    fn begin_frame(&mut self, frame: &FrameConstants, lights: &[LightData]) -> BackendResult<()> {
        self.check_alive()?;
        debug_assert_eq!(frame.light_count as usize, lights.len());
        self.state.borrow_mut().frame_open = true;
        self.bound_mesh = None;
        self.record(HeadlessCommand::BeginFrame { light_count: lights.len() });
        Ok(())
    }

    fn apply_state(&mut self, _state: &GraphicsContextState, changes: StateChanges) -> BackendResult<()> {
        self.check_alive()?;
        self.record(HeadlessCommand::ApplyState { changes });
        Ok(())
    }

    fn bind_material(&mut self, material: &dyn GpuMaterial, textures: &[&dyn GpuTexture]) -> BackendResult<()> {
        self.check_frame("bind_material")?;
        self.take_bind_failure()?;

        let material = material
            .as_any()
            .downcast_ref::<HeadlessMaterial>()
            .ok_or_else(|| BackendError::BindFailed("material from another backend".to_string()))?;
        self.ensure_live(material.backend_handle(), HandleKind::Material)?;

        let mut texture_handles = Vec::with_capacity(textures.len());
        for texture in textures {
            let texture = texture
                .as_any()
                .downcast_ref::<HeadlessTexture>()
                .ok_or_else(|| BackendError::BindFailed("texture from another backend".to_string()))?;
            self.ensure_live(texture.backend_handle(), HandleKind::Texture)?;
            texture_handles.push(texture.backend_handle());
        }

        self.record(HeadlessCommand::BindMaterial {
            handle: material.backend_handle(),
            textures: texture_handles,
        });
        Ok(())
    }

    fn bind_mesh(&mut self, mesh: &dyn GpuMesh) -> BackendResult<()> {
        self.check_frame("bind_mesh")?;
        self.take_bind_failure()?;

        let mesh = mesh
            .as_any()
            .downcast_ref::<HeadlessMesh>()
            .ok_or_else(|| BackendError::BindFailed("mesh from another backend".to_string()))?;
        self.ensure_live(mesh.backend_handle(), HandleKind::Mesh)?;

        self.bound_mesh = Some(mesh.backend_handle());
        self.record(HeadlessCommand::BindMesh { handle: mesh.backend_handle() });
        Ok(())
    }

    fn bind_instance(&mut self, instance: &InstanceData) -> BackendResult<()> {
        self.check_frame("bind_instance")?;
        self.record(HeadlessCommand::BindInstance { instance: *instance });
        Ok(())
    }

    fn draw(&mut self, primitive: &DrawPrimitive) -> BackendResult<()> {
        self.check_frame("draw")?;
        if self.bound_mesh.is_none() {
            return Err(BackendError::DrawFailed("draw without a bound mesh".to_string()));
        }

        {
            let mut state = self.state.borrow_mut();
            if state.failing_draws > 0 {
                state.failing_draws -= 1;
                return Err(BackendError::DrawFailed("injected draw failure".to_string()));
            }
        }

        self.record(HeadlessCommand::Draw {
            topology: primitive.topology,
            elements: primitive.element_count(),
        });
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        self.check_frame("end_frame")?;
        {
            let mut state = self.state.borrow_mut();
            state.frame_open = false;
            state.frames_completed += 1;
        }
        self.bound_mesh = None;
        self.record(HeadlessCommand::EndFrame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::FrameData;
    use crate::render::resources::{BufferUsage, MaterialParams, TextureFormat};

    fn begin(device: &mut HeadlessDevice) {
        let frame = FrameData::default();
        device.begin_frame(&frame.constants([0.0; 4]), &frame.lights).unwrap();
    }

    #[test]
    fn test_buffer_write_is_bounds_checked() {
        let (mut device, _probe) = HeadlessDevice::new();
        let mut buffer = device
            .create_buffer(&BufferDescriptor::new(8, BufferUsage::UNIFORM), &[1, 2, 3])
            .unwrap();

        buffer.write(4, &[9, 9, 9, 9]).unwrap();
        assert!(buffer.write(6, &[0, 0, 0]).is_err());

        let contents = buffer.as_any().downcast_ref::<HeadlessBuffer>().unwrap().contents();
        assert_eq!(contents, &[1, 2, 3, 0, 9, 9, 9, 9]);
    }

    #[test]
    fn test_mesh_releases_its_buffers_once() {
        let (mut device, probe) = HeadlessDevice::new();
        let vertices = device
            .create_buffer(&BufferDescriptor::new(32, BufferUsage::VERTEX), &[])
            .unwrap();
        let descriptor = MeshDescriptor {
            label: None,
            topology: Default::default(),
            vertex_count: 3,
            index_count: None,
        };
        let mesh = device.create_mesh(&descriptor, vertices, None).unwrap();
        assert_eq!(probe.live_handles(), 2);

        drop(mesh);
        assert_eq!(probe.live_handles(), 0);
        assert_eq!(probe.released_count(), 2);
        assert_eq!(probe.double_releases(), 0);
    }

    #[test]
    fn test_texture_size_validation() {
        let (mut device, _probe) = HeadlessDevice::new();
        let descriptor = TextureDescriptor::new(2, 2, TextureFormat::Rgba8Unorm);
        assert!(device.create_texture(&descriptor, &[0; 16]).is_ok());
        assert!(device.create_texture(&descriptor, &[0; 15]).is_err());
    }

    #[test]
    fn test_draw_requires_frame_and_mesh() {
        let (mut device, probe) = HeadlessDevice::new();
        let primitive = DrawPrimitive {
            topology: Default::default(),
            vertex_count: 3,
            index_count: None,
        };

        assert!(matches!(device.draw(&primitive), Err(BackendError::DrawFailed(_))));
        begin(&mut device);
        assert!(matches!(device.draw(&primitive), Err(BackendError::DrawFailed(_))));
        assert_eq!(probe.count_commands(|c| matches!(c, HeadlessCommand::Draw { .. })), 0);
    }

    #[test]
    fn test_lost_device_fails_everything() {
        let (mut device, probe) = HeadlessDevice::new();
        probe.lose_device();

        let result = device.create_buffer(&BufferDescriptor::new(4, BufferUsage::VERTEX), &[]);
        assert!(matches!(result, Err(BackendError::DeviceLost(_))));
        let frame = FrameData::default();
        let result = device.begin_frame(&frame.constants([0.0; 4]), &[]);
        assert!(result.unwrap_err().is_fatal());

        probe.restore_device();
        begin(&mut device);
        device.end_frame().unwrap();
        assert_eq!(probe.frames_completed(), 1);
    }

    #[test]
    fn test_material_update_rewrites_constants() {
        let (mut device, _probe) = HeadlessDevice::new();
        let descriptor = MaterialDescriptor::new("standard");
        let constants = device
            .create_buffer(&BufferDescriptor::new(64, BufferUsage::UNIFORM), bytemuck::bytes_of(&descriptor.constants()))
            .unwrap();
        let mut material = device.create_material(&descriptor, constants).unwrap();

        let params = MaterialParams::with_color(0.5, 0.25, 1.0);
        material.update_params(params.clone()).unwrap();

        assert_eq!(material.descriptor().params, params);
        let buffer = material
            .constants_buffer()
            .as_any()
            .downcast_ref::<HeadlessBuffer>()
            .unwrap();
        let stored: crate::render::resources::MaterialConstants =
            bytemuck::pod_read_unaligned(&buffer.contents()[..64]);
        assert_eq!(stored.base_color, [0.5, 0.25, 1.0, 1.0]);
    }
}
