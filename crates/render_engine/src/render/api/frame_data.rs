//! Frame Rendering Data Structures
//!
//! The application provides [`FrameData`] once per frame: camera matrices and
//! the light list. The rendering path converts it to [`FrameConstants`] and
//! binds it before any batch draws.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// Light data uploaded to the backend
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct LightData {
    /// Direction (w = 0) or position (w = 1)
    pub position_or_direction: [f32; 4],
    /// RGB color and intensity
    pub color_intensity: [f32; 4],
}

impl LightData {
    /// Directional light shining along `direction`
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        let direction = direction.try_normalize(f32::EPSILON).unwrap_or_else(|| Vec3::new(0.0, -1.0, 0.0));
        Self {
            position_or_direction: [direction.x, direction.y, direction.z, 0.0],
            color_intensity: [color.x, color.y, color.z, intensity],
        }
    }

    /// Point light at `position`
    pub fn point(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position_or_direction: [position.x, position.y, position.z, 1.0],
            color_intensity: [color.x, color.y, color.z, intensity],
        }
    }

    /// Whether this is a directional light
    pub fn is_directional(&self) -> bool {
        self.position_or_direction[3] == 0.0
    }
}

/// Per-frame constant data uploaded to the backend
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameConstants {
    /// View matrix, column-major
    pub view: [[f32; 4]; 4],
    /// Projection matrix, column-major
    pub projection: [[f32; 4]; 4],
    /// Projection * view, column-major
    pub view_projection: [[f32; 4]; 4],
    /// Camera position (w = 1)
    pub camera_position: [f32; 4],
    /// Framebuffer clear color
    pub clear_color: [f32; 4],
    /// Number of lights bound with this frame
    pub light_count: u32,
    /// Padding to 16-byte alignment
    pub _padding: [u32; 3],
}

/// Complete frame rendering data
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Camera view matrix
    pub view: Mat4,
    /// Camera projection matrix
    pub projection: Mat4,
    /// Camera position in world space
    pub camera_position: Vec3,
    /// All lights in the scene
    pub lights: Vec<LightData>,
}

impl Default for FrameData {
    fn default() -> Self {
        Self {
            view: Mat4::identity(),
            projection: Mat4::identity(),
            camera_position: Vec3::zeros(),
            lights: Vec::new(),
        }
    }
}

impl FrameData {
    /// Frame data for a perspective camera at `eye` looking at `target`
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Self {
        Self {
            view: Mat4::look_at(eye, target, Vec3::new(0.0, 1.0, 0.0)),
            projection: Mat4::perspective(fov_y, aspect, 0.1, 100.0),
            camera_position: eye,
            lights: Vec::new(),
        }
    }

    /// Add a light
    pub fn with_light(mut self, light: LightData) -> Self {
        self.lights.push(light);
        self
    }

    /// Constant data for upload
    pub fn constants(&self, clear_color: [f32; 4]) -> FrameConstants {
        let view_projection = self.projection * self.view;
        FrameConstants {
            view: self.view.to_cols_array(),
            projection: self.projection.to_cols_array(),
            view_projection: view_projection.to_cols_array(),
            camera_position: [self.camera_position.x, self.camera_position.y, self.camera_position.z, 1.0],
            clear_color,
            light_count: u32::try_from(self.lights.len()).unwrap_or(u32::MAX),
            _padding: [0; 3],
        }
    }
}
